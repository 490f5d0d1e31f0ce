//! Collision outcomes
//!
//! Turns overlap notifications from the physics collaborator into damage,
//! destruction and score. Notifications naming an entity that is already gone
//! are ignored, which makes duplicates harmless.

use serde::{Deserialize, Serialize};

use super::registry::{Destroyed, EntityRegistry};
use super::state::{Craft, DestroyCause, EntityId, GameEvent, TargetLock};
use crate::consts::{DESTROY_BONUS, HIT_SCORE};

/// Notification from the physics collaborator, at most one per overlap onset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    ProjectileObstacle {
        projectile: EntityId,
        obstacle: EntityId,
    },
    CraftObstacle {
        obstacle: EntityId,
    },
    /// The entity left the play field
    LeftField {
        entity: EntityId,
    },
}

/// What a notice amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Stale, duplicate, or arrived while the craft was inert
    Ignored,
    /// Projectile hit, obstacle still standing
    Hit { obstacle: EntityId, points: u64 },
    /// Projectile hit that broke the obstacle up
    ShotDown { obstacle: EntityId, points: u64 },
    /// The craft was struck and lost a life
    CraftStruck { lives_lost: u32 },
    /// Something left the field
    Departed,
}

/// Apply one notice to the registry and craft, emitting presentation events
pub fn resolve(
    notice: &Notice,
    registry: &mut EntityRegistry,
    craft: &mut Craft,
    clock_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    match *notice {
        Notice::ProjectileObstacle {
            projectile,
            obstacle,
        } => projectile_hit(projectile, obstacle, registry, clock_ms, events),
        Notice::CraftObstacle { obstacle } => craft_hit(obstacle, registry, craft, events),
        Notice::LeftField { entity } => match registry.destroy(entity) {
            Some(destroyed) => {
                emit_destroyed(destroyed, DestroyCause::LeftField, events);
                Resolution::Departed
            }
            None => Resolution::Ignored,
        },
    }
}

fn projectile_hit(
    projectile: EntityId,
    obstacle: EntityId,
    registry: &mut EntityRegistry,
    clock_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    if registry.projectile(projectile).is_none() || registry.obstacle(obstacle).is_none() {
        return Resolution::Ignored;
    }

    // Projectiles never pierce
    if registry.destroy(projectile).is_some() {
        events.push(GameEvent::ProjectileDestroyed { id: projectile });
    }

    let Some(target) = registry.obstacle_mut(obstacle) else {
        return Resolution::Ignored;
    };
    target.impacts_left = target.impacts_left.saturating_sub(1);

    if target.impacts_left == 0 {
        if let Some(destroyed) = registry.destroy(obstacle) {
            emit_destroyed(destroyed, DestroyCause::ShotDown, events);
        }
        return Resolution::ShotDown {
            obstacle,
            points: HIT_SCORE + DESTROY_BONUS,
        };
    }

    if target.target_lock.is_none() {
        target.target_lock = Some(TargetLock {
            locked_at_ms: clock_ms,
            pulse: 0.0,
        });
        events.push(GameEvent::TargetLocked { id: obstacle });
    }
    Resolution::Hit {
        obstacle,
        points: HIT_SCORE,
    }
}

fn craft_hit(
    obstacle: EntityId,
    registry: &mut EntityRegistry,
    craft: &mut Craft,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    if craft.disabled {
        return Resolution::Ignored;
    }
    let Some(destroyed) = registry.destroy(obstacle) else {
        return Resolution::Ignored;
    };
    emit_destroyed(destroyed, DestroyCause::Rammed, events);
    craft.strike();
    log::info!("Craft hit ({} lives lost)", craft.lives_lost);
    Resolution::CraftStruck {
        lives_lost: craft.lives_lost,
    }
}

pub(crate) fn emit_destroyed(destroyed: Destroyed, cause: DestroyCause, events: &mut Vec<GameEvent>) {
    match destroyed {
        Destroyed::Obstacle(o) => events.push(GameEvent::ObstacleDestroyed {
            id: o.id,
            pos: o.pos,
            cause,
        }),
        Destroyed::Projectile(p) => events.push(GameEvent::ProjectileDestroyed { id: p.id }),
    }
}
