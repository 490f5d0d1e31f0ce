//! Live obstacles and projectiles
//!
//! Both lists stay sorted by id, which is also creation order, so lookups are
//! binary searches and traversal is stable. Removal is immediate: anything
//! destroyed earlier in a tick is invisible to the rest of that tick.

use glam::Vec2;

use super::state::{EntityId, Obstacle, Projectile};
use crate::consts::OBSTACLE_IMPACTS;

/// What `destroy` removed
#[derive(Debug, Clone, PartialEq)]
pub enum Destroyed {
    Obstacle(Obstacle),
    Projectile(Projectile),
}

#[derive(Debug, Clone)]
pub struct EntityRegistry {
    obstacles: Vec<Obstacle>,
    projectiles: Vec<Projectile>,
    next_id: u32,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn_obstacle(&mut self, pos: Vec2, vel: Vec2, angular_vel: f32, scale: f32) -> EntityId {
        let id = self.allocate();
        self.obstacles.push(Obstacle {
            id,
            pos,
            vel,
            angular_vel,
            scale,
            impacts_left: OBSTACLE_IMPACTS,
            target_lock: None,
        });
        log::debug!("Obstacle {} spawned at ({:.0}, {:.0})", id.0, pos.x, pos.y);
        id
    }

    pub fn spawn_projectile(&mut self, pos: Vec2, vel: Vec2) -> EntityId {
        let id = self.allocate();
        self.projectiles.push(Projectile { id, pos, vel });
        id
    }

    /// Remove an entity. Returns None if it is already gone.
    pub fn destroy(&mut self, id: EntityId) -> Option<Destroyed> {
        if let Ok(i) = self.obstacles.binary_search_by_key(&id, |o| o.id) {
            let mut obstacle = self.obstacles.remove(i);
            obstacle.target_lock = None;
            log::debug!("Obstacle {} destroyed", id.0);
            return Some(Destroyed::Obstacle(obstacle));
        }
        if let Ok(i) = self.projectiles.binary_search_by_key(&id, |p| p.id) {
            return Some(Destroyed::Projectile(self.projectiles.remove(i)));
        }
        None
    }

    /// Remove every obstacle, in creation order
    pub fn clear_obstacles(&mut self) -> Vec<Obstacle> {
        std::mem::take(&mut self.obstacles)
    }

    pub fn obstacle(&self, id: EntityId) -> Option<&Obstacle> {
        self.obstacles
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &self.obstacles[i])
    }

    pub fn obstacle_mut(&mut self, id: EntityId) -> Option<&mut Obstacle> {
        self.obstacles
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(move |i| &mut self.obstacles[i])
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.projectiles[i])
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.obstacle(id).is_some() || self.projectile(id).is_some()
    }

    /// Visit obstacles in creation order
    pub fn for_each_obstacle(&mut self, mut visitor: impl FnMut(&mut Obstacle)) {
        for obstacle in &mut self.obstacles {
            visitor(obstacle);
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Position/velocity access for the physics collaborator
    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut [Projectile] {
        &mut self.projectiles
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty() && self.projectiles.is_empty()
    }
}
