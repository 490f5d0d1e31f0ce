//! Rock Rain - an arcade shoot-'em-up core
//!
//! Core modules:
//! - `sim`: Tick-driven run simulation (entities, spawning, combat, run state)
//! - `leaderboard`: Top-10 ranking
//! - `persistence`: Injected leaderboard storage
//! - `initials`: Initials entry after a run
//! - `flow`: Scene sequencing (logo, run, game over, initials, exit)
//! - `settings`: Validated configuration

pub mod error;
pub mod flow;
pub mod initials;
pub mod leaderboard;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{SettingsError, StoreError};
pub use flow::{FrameInput, Scene, SceneFlow};
pub use leaderboard::{Initials, Leaderboard, LeaderboardEntry, SubmitOutcome};
pub use settings::Settings;

/// Gameplay constants. Times are milliseconds of run-clock time.
pub mod consts {
    /// One obstacle per interval, accumulated across ticks
    pub const SPAWN_INTERVAL_MS: f64 = 1000.0;
    /// Obstacles appear above the visible field
    pub const OBSTACLE_SPAWN_Y: f32 = -80.0;
    pub const OBSTACLE_SCALE_MIN: f32 = 0.4;
    pub const OBSTACLE_SCALE_MAX: f32 = 0.8;
    /// Horizontal speed range (units/s)
    pub const OBSTACLE_VEL_X: (f32, f32) = (-50.0, 50.0);
    /// Downward speed range (units/s)
    pub const OBSTACLE_VEL_Y: (f32, f32) = (80.0, 200.0);
    /// Angular velocity range (degrees/s)
    pub const OBSTACLE_SPIN: (f32, f32) = (-100.0, 100.0);
    /// Hits an obstacle absorbs before breaking up
    pub const OBSTACLE_IMPACTS: u8 = 5;

    /// Minimum gap between two shots
    pub const SHOT_COOLDOWN_MS: f64 = 180.0;
    /// Projectiles leave from the craft's nose
    pub const PROJECTILE_OFFSET_Y: f32 = 55.0;
    /// Upward projectile speed (units/s)
    pub const PROJECTILE_SPEED: f32 = 400.0;

    /// Score per projectile hit
    pub const HIT_SCORE: u64 = 10;
    /// Extra score when an obstacle breaks up
    pub const DESTROY_BONUS: u64 = 100;

    /// Lives per run; the run ends when this many are lost
    pub const LIVES: u32 = 3;
    /// Delay between losing a life and the craft reappearing
    pub const RESPAWN_DELAY_MS: f64 = 3000.0;
    /// Delay between losing the last life and game over
    pub const GAME_OVER_DELAY_MS: f64 = 1000.0;
    /// How long the game over screen shows before initials entry
    pub const GAME_OVER_SCREEN_MS: f64 = 3000.0;

    /// Craft start position, measured up from the bottom of the field
    pub const CRAFT_START_FROM_BOTTOM: f32 = 130.0;
}
