//! Run simulation
//!
//! All gameplay logic lives here. Rendering, physics integration and input
//! devices are collaborators outside this module:
//! - Driven by one `tick` per frame with the frame's elapsed milliseconds
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Overlaps arrive as `Notice`s and are resolved synchronously

pub mod combat;
pub mod registry;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;

pub use combat::{Notice, Resolution};
pub use registry::{Destroyed, EntityRegistry};
pub use schedule::Scheduler;
pub use spawner::Spawner;
pub use state::{
    Craft, DestroyCause, EntityId, GameEvent, Obstacle, Projectile, RunOutcome, RunPhase,
    RunState, RunStatus, RunTimer, TargetLock,
};
pub use tick::{InputEvent, TickInput, tick};
