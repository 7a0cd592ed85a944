//! Zodiac Arena - simulation core for a 3D arena minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, interaction rules)
//! - `events`: Typed publish/subscribe channel for scoring/HUD/audio consumers
//! - `timestep`: Fixed timestep loop driven by the host's frame callback
//! - `settings`: Data-driven tuning, loadable from JSON

pub mod events;
pub mod settings;
pub mod sim;
pub mod timestep;

pub use events::{EventBus, GameEvent, Subscription};
pub use settings::{ConfigError, SimConfig};
pub use timestep::{FrameScheduler, GameLoop};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Upper bound on a single frame delta to prevent spiral of death
    pub const MAX_FRAME_DT: f64 = 0.25;

    /// Spatial hash cell edge length (world units)
    pub const DEFAULT_CELL_SIZE: f32 = 3.0;

    /// Hit points at session start, and the clamp ceiling
    pub const MAX_HP: i32 = 100;

    /// Score for collecting a pickup
    pub const PICKUP_SCORE: u64 = 10;
    /// Score for a projectile destroying an enemy
    pub const KILL_SCORE: u64 = 25;
    /// Hit points lost per tick of player/enemy contact
    pub const CONTACT_DAMAGE: i32 = 5;

    /// Directions shorter than this are treated as zero
    pub const DIRECTION_EPSILON: f32 = 0.001;
}
