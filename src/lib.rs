//! Lane Runner - A lane-based endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, entities, collisions, run state)
//! - `port`: Output port and input commands consumed by the simulation
//! - `platform`: Fixed-tick scheduling for whatever host drives the sim
//! - `settings`: Named constants supplied at initialization
//! - `autopilot`: Demo player that steers by itself

pub mod autopilot;
pub mod platform;
pub mod port;
pub mod settings;
pub mod sim;

pub use autopilot::Autopilot;
pub use port::{Command, Flash, LogPort, NullPort, RenderPort, TokenHandle};
pub use settings::{Difficulty, Settings, SettingsError};
pub use sim::{EntityKind, RunPhase, Simulation, TickOutcome};

/// Reference game constants (the defaults behind [`Settings`])
pub mod consts {
    /// Playfield dimensions (the canvas the tokens live on)
    pub const PLAYFIELD_WIDTH: f32 = 600.0;
    pub const PLAYFIELD_HEIGHT: f32 = 320.0;

    /// Number of horizontal lanes
    pub const LANES: u32 = 4;

    /// Simulation rate
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Speed ramp: +SPEED_STEP every SPEED_INTERVAL ticks
    pub const SPEED_INTERVAL: u64 = 250;
    pub const SPEED_STEP: u32 = 1;
    pub const START_SPEED: u32 = 1;

    pub const START_LIVES: u32 = 3;
    pub const START_SCORE: u64 = 0;
    /// Score added for each pickup collected
    pub const PICKUP_BONUS: u64 = 1000;

    /// Player token (square)
    pub const PLAYER_SIDE: f32 = 40.0;
    /// Player sits one side-length in from the left edge
    pub const PLAYER_X: f32 = 40.0;
    pub const PLAYER_START_LANE: u32 = 1;

    /// Pickup/obstacle tokens (square)
    pub const TOKEN_SIDE: f32 = 30.0;
    pub const TOKEN_COUNT: usize = 4;
    /// Initial layout: first token at TOKEN_START_X, then every TOKEN_SPACING
    pub const TOKEN_START_X: f32 = 250.0;
    pub const TOKEN_SPACING: f32 = 150.0;

    /// Respawn offset past the right edge, [min, max)
    pub const RESPAWN_OFFSET_MIN: u32 = 20;
    pub const RESPAWN_OFFSET_MAX: u32 = 100;

    /// Maximum ticks run per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
