//! Entities: the player and the pickup/obstacle tokens scrolling toward it
//!
//! Tokens are never destroyed. Once off-screen or resolved against the player
//! they are recycled in place with a fresh kind, lane and position.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Span, lane_collision};
use super::lane::{LaneGrid, LaneStep};
use crate::port::{RenderPort, TokenHandle};

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    /// Adds the pickup bonus to the score
    Pickup,
    /// Costs one life
    Obstacle,
}

impl EntityKind {
    /// Only pickups and obstacles are ever recycled
    #[inline]
    pub fn is_recyclable(self) -> bool {
        !matches!(self, EntityKind::Player)
    }
}

/// Kind for a recycled token: one in three Pickup, two in three Obstacle
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R) -> EntityKind {
    match rng.random_range(0..3u32) {
        0 => EntityKind::Pickup,
        _ => EntityKind::Obstacle,
    }
}

/// Kind for a token in the initial layout: even split
pub fn roll_spawn_kind<R: Rng + ?Sized>(rng: &mut R) -> EntityKind {
    match rng.random_range(0..2u32) {
        0 => EntityKind::Pickup,
        _ => EntityKind::Obstacle,
    }
}

/// Where recycled tokens re-enter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Respawn {
    /// Right edge of the playfield
    pub right_edge: f32,
    /// Offset past the edge, [offset_min, offset_max)
    pub offset_min: u32,
    pub offset_max: u32,
}

/// A square entity on the lane grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Top-left corner, playfield units
    pub pos: Vec2,
    /// Side length
    pub size: f32,
    pub lane: u32,
    /// Token drawn for this entity by the output port
    pub handle: TokenHandle,
}

impl Entity {
    /// Create an entity at `x` in `lane` and have the port draw it
    pub fn spawn(
        kind: EntityKind,
        x: f32,
        lane: u32,
        size: f32,
        grid: &LaneGrid,
        port: &mut dyn RenderPort,
    ) -> Self {
        let pos = Vec2::new(x, grid.lane_to_y(lane, size));
        let handle = port.create_token(kind, pos.x, pos.y, size, size);
        Self {
            kind,
            pos,
            size,
            lane,
            handle,
        }
    }

    /// Horizontal extent used for collisions
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.pos.x, self.size)
    }

    /// Trailing edge has scrolled past the left boundary
    #[inline]
    pub fn is_off_screen_left(&self) -> bool {
        self.pos.x + self.size <= 0.0
    }

    /// Move horizontally by `dx`
    pub fn advance(&mut self, dx: f32, port: &mut dyn RenderPort) {
        self.pos.x += dx;
        port.move_token(self.handle, dx, 0.0);
    }

    /// Step one lane up or down. Returns false (and does nothing) at the
    /// top or bottom lane.
    pub fn change_lane(&mut self, step: LaneStep, grid: &LaneGrid, port: &mut dyn RenderPort) -> bool {
        let Some(lane) = grid.step(self.lane, step) else {
            return false;
        };
        let dy = step.offset() as f32 * grid.lane_height();
        self.lane = lane;
        self.pos.y += dy;
        port.move_token(self.handle, 0.0, dy);
        true
    }

    /// Teleport to `x` in `lane`
    pub fn place(&mut self, x: f32, lane: u32, grid: &LaneGrid, port: &mut dyn RenderPort) {
        let target = Vec2::new(x, grid.lane_to_y(lane, self.size));
        let delta = target - self.pos;
        self.pos = target;
        self.lane = lane;
        if delta != Vec2::ZERO {
            port.move_token(self.handle, delta.x, delta.y);
        }
    }

    /// Re-roll kind and lane, and move just past the right edge
    pub fn recycle<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        respawn: &Respawn,
        grid: &LaneGrid,
        port: &mut dyn RenderPort,
    ) {
        assert!(self.kind.is_recyclable(), "the player entity is never recycled");

        self.kind = roll_kind(rng);
        port.recolor_token(self.handle, self.kind);

        // Random offset so recycled tokens don't re-enter in lockstep
        let offset = rng.random_range(respawn.offset_min..respawn.offset_max);
        let lane = rng.random_range(0..grid.lanes());
        self.place(respawn.right_edge + offset as f32, lane, grid, port);
    }

    /// Same lane and overlapping horizontal extents
    pub fn overlaps(&self, other: &Entity) -> bool {
        lane_collision(self.lane, self.span(), other.lane, other.span())
    }
}
