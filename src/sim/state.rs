//! Run state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::registry::EntityRegistry;
use super::schedule::Scheduler;
use super::spawner::Spawner;
use crate::consts::LIVES;
use crate::error::SettingsError;
use crate::settings::Settings;

/// Identity of a live obstacle or projectile. Never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Damage indicator shown once an obstacle has been hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetLock {
    /// Run-clock time of the first hit
    pub locked_at_ms: f64,
    /// Indicator animation phase in [0, 1)
    pub pulse: f32,
}

/// A falling obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees per second
    pub angular_vel: f32,
    pub scale: f32,
    /// Hits left before the obstacle breaks up
    pub impacts_left: u8,
    pub target_lock: Option<TargetLock>,
}

/// A shot fired by the craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// The player's craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Craft {
    pub pos: Vec2,
    /// Where the craft starts and respawns
    pub start: Vec2,
    pub lives_lost: u32,
    /// Set between a hit and the respawn; collisions and controls are ignored
    pub disabled: bool,
    pub visible: bool,
}

impl Craft {
    pub fn new(start: Vec2) -> Self {
        Self {
            pos: start,
            start,
            lives_lost: 0,
            disabled: false,
            visible: true,
        }
    }

    pub fn lives_left(&self) -> u32 {
        LIVES.saturating_sub(self.lives_lost)
    }

    /// Take a hit: lose a life and go inert
    pub fn strike(&mut self) {
        self.lives_lost += 1;
        self.disabled = true;
        self.visible = false;
    }

    /// Back to the start position, controllable again
    pub fn respawn(&mut self) {
        self.pos = self.start;
        self.disabled = false;
        self.visible = true;
    }
}

/// Gameplay phase of a run (pause is tracked separately)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Craft is controllable
    Running,
    /// Post-hit window: craft hidden, threats keep coming
    Disabled,
    /// Run ended
    GameOver,
}

/// Externally visible run state. Paused takes precedence over Running/Disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Paused,
    Disabled,
    GameOver,
}

/// Final result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub final_score: u64,
}

/// Why an obstacle went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyCause {
    /// Broken up by projectile hits
    ShotDown,
    /// Collided with the craft
    Rammed,
    /// Fell out of the play field
    LeftField,
    /// Swept away when the craft respawned
    Cleared,
}

/// Effects for the presentation layer, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ObstacleCreated {
        id: EntityId,
        pos: Vec2,
        scale: f32,
        vel: Vec2,
        angular_vel: f32,
    },
    ObstacleDestroyed {
        id: EntityId,
        pos: Vec2,
        cause: DestroyCause,
    },
    /// First hit on an obstacle; start showing its damage indicator
    TargetLocked { id: EntityId },
    ProjectileCreated { id: EntityId, pos: Vec2 },
    ProjectileDestroyed { id: EntityId },
    ScoreChanged(u64),
    LivesChanged { lives_lost: u32 },
    StatusChanged(RunStatus),
    RunEnded(RunOutcome),
}

/// Delayed run transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTimer {
    /// Clear the field and bring the craft back
    Respawn,
    /// Hand the final score on
    EndRun,
}

/// Held control state, fed by input edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// A fire press arrived since the last control step (catches quick taps)
    pub fire_pressed: bool,
    /// Pause key is down; repeats are ignored until release
    pub pause_held: bool,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run clock (ms). Frozen while paused.
    pub clock_ms: f64,
    pub score: u64,
    pub phase: RunPhase,
    pub paused: bool,
    pub craft: Craft,
    pub controls: Controls,
    /// Run-clock time of the last shot
    pub last_shot_ms: Option<f64>,
    pub registry: EntityRegistry,
    pub spawner: Spawner,
    pub timers: Scheduler<RunTimer>,
    pub outcome: Option<RunOutcome>,
    /// Craft move speed, see `Settings::move_speed`
    pub move_speed: f64,
    pub(crate) last_status: RunStatus,
    pub(crate) events: Vec<GameEvent>,
}

impl RunState {
    /// Start a fresh run
    pub fn new(settings: &Settings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let spawner = Spawner::new(settings.field_width, seed)?;
        log::info!("Run started (seed {seed})");
        Ok(Self {
            clock_ms: 0.0,
            score: 0,
            phase: RunPhase::Running,
            paused: false,
            craft: Craft::new(settings.craft_start()),
            controls: Controls::default(),
            last_shot_ms: None,
            registry: EntityRegistry::new(),
            spawner,
            timers: Scheduler::new(),
            outcome: None,
            move_speed: settings.move_speed,
            last_status: RunStatus::Running,
            events: Vec::new(),
        })
    }

    /// Current externally visible state
    pub fn status(&self) -> RunStatus {
        match (self.phase, self.paused) {
            (RunPhase::GameOver, _) => RunStatus::GameOver,
            (_, true) => RunStatus::Paused,
            (RunPhase::Disabled, false) => RunStatus::Disabled,
            (RunPhase::Running, false) => RunStatus::Running,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn award(&mut self, points: u64) {
        if points > 0 {
            self.score += points;
            self.emit(GameEvent::ScoreChanged(self.score));
        }
    }

    /// Emit a status change if the visible state moved
    pub(crate) fn sync_status(&mut self) {
        let status = self.status();
        if status != self.last_status {
            self.last_status = status;
            self.emit(GameEvent::StatusChanged(status));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run() {
        let run = RunState::new(&Settings::default(), 1).unwrap();
        assert_eq!(run.status(), RunStatus::Running);
        assert_eq!(run.score, 0);
        assert_eq!(run.craft.lives_left(), LIVES);
        assert!(run.craft.visible);
        assert!(run.registry.is_empty());
    }

    #[test]
    fn test_new_run_rejects_bad_settings() {
        let settings = Settings {
            field_width: -1.0,
            ..Default::default()
        };
        assert!(RunState::new(&settings, 1).is_err());
    }

    #[test]
    fn test_pause_takes_precedence() {
        let mut run = RunState::new(&Settings::default(), 1).unwrap();
        run.phase = RunPhase::Disabled;
        assert_eq!(run.status(), RunStatus::Disabled);
        run.paused = true;
        assert_eq!(run.status(), RunStatus::Paused);
        run.phase = RunPhase::GameOver;
        assert_eq!(run.status(), RunStatus::GameOver);
    }

    #[test]
    fn test_craft_strike_and_respawn() {
        let mut craft = Craft::new(Vec2::new(10.0, 20.0));
        craft.pos.x = 99.0;
        craft.strike();
        assert_eq!(craft.lives_lost, 1);
        assert!(craft.disabled && !craft.visible);
        craft.respawn();
        assert_eq!(craft.pos, Vec2::new(10.0, 20.0));
        assert!(!craft.disabled && craft.visible);
        assert_eq!(craft.lives_lost, 1);
    }
}
