//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (tokens in creation order)
//! - No rendering or platform dependencies; drawing goes through the port

pub mod collision;
pub mod entity;
pub mod lane;
pub mod state;
pub mod tick;

pub use collision::{Span, lane_collision};
pub use entity::{Entity, EntityKind, Respawn, roll_kind, roll_spawn_kind};
pub use lane::{LaneGrid, LaneStep};
pub use state::{RngState, RunEvent, RunPhase, RunRules, RunState};
pub use tick::{Simulation, TickOutcome, tick};
