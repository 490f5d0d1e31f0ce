//! Obstacle spawning
//!
//! One obstacle per `SPAWN_INTERVAL_MS` of run-clock time. Leftover time
//! carries into the next tick, so cadence does not depend on frame rate.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::registry::EntityRegistry;
use super::state::EntityId;
use crate::consts::*;
use crate::error::SettingsError;

#[derive(Debug, Clone)]
pub struct Spawner {
    field_width: f32,
    interval_ms: f64,
    accumulated_ms: f64,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(field_width: f32, seed: u64) -> Result<Self, SettingsError> {
        if !field_width.is_finite() || field_width <= 0.0 {
            return Err(SettingsError::InvalidFieldWidth(field_width));
        }
        Ok(Self {
            field_width,
            interval_ms: SPAWN_INTERVAL_MS,
            accumulated_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    /// Time accumulated toward the next spawn
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Advance by `dt_ms` and create whatever obstacles fell due
    pub fn advance(&mut self, dt_ms: f64, registry: &mut EntityRegistry) -> Vec<EntityId> {
        self.accumulated_ms += dt_ms.max(0.0);
        let mut spawned = Vec::new();
        while self.accumulated_ms >= self.interval_ms {
            self.accumulated_ms -= self.interval_ms;
            spawned.push(self.spawn_one(registry));
        }
        spawned
    }

    fn spawn_one(&mut self, registry: &mut EntityRegistry) -> EntityId {
        let x = self.rng.random_range(0.0..=self.field_width);
        let scale = self
            .rng
            .random_range(OBSTACLE_SCALE_MIN..=OBSTACLE_SCALE_MAX);
        let vel = Vec2::new(
            self.rng.random_range(OBSTACLE_VEL_X.0..=OBSTACLE_VEL_X.1),
            self.rng.random_range(OBSTACLE_VEL_Y.0..=OBSTACLE_VEL_Y.1),
        );
        let angular_vel = self.rng.random_range(OBSTACLE_SPIN.0..=OBSTACLE_SPIN.1);
        registry.spawn_obstacle(Vec2::new(x, OBSTACLE_SPAWN_Y), vel, angular_vel, scale)
    }
}
