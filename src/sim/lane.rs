//! Lane grid geometry
//!
//! The playfield height is split into equal horizontal bands. Lane 0 is the
//! topmost band and y grows downward, for the player and every token alike.

use serde::{Deserialize, Serialize};

/// One step across the lane grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneStep {
    /// Toward lane 0 (top of the playfield)
    Up,
    /// Toward the last lane (bottom of the playfield)
    Down,
}

impl LaneStep {
    /// Signed lane delta (-1 or +1)
    #[inline]
    pub fn offset(self) -> i32 {
        match self {
            LaneStep::Up => -1,
            LaneStep::Down => 1,
        }
    }
}

/// Maps lane indices to vertical positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneGrid {
    lanes: u32,
    lane_height: f32,
}

impl LaneGrid {
    pub fn new(lanes: u32, playfield_height: f32) -> Self {
        assert!(lanes > 0, "lane grid needs at least one lane");
        Self {
            lanes,
            lane_height: playfield_height / lanes as f32,
        }
    }

    #[inline]
    pub fn lanes(&self) -> u32 {
        self.lanes
    }

    #[inline]
    pub fn lane_height(&self) -> f32 {
        self.lane_height
    }

    #[inline]
    pub fn last_lane(&self) -> u32 {
        self.lanes - 1
    }

    #[inline]
    pub fn contains(&self, lane: u32) -> bool {
        lane < self.lanes
    }

    /// Top edge of an entity of `size` centred in `lane`
    pub fn lane_to_y(&self, lane: u32, size: f32) -> f32 {
        assert!(self.contains(lane), "lane {lane} out of range 0..{}", self.lanes);
        lane as f32 * self.lane_height + (self.lane_height - size) / 2.0
    }

    /// Lane reached by taking `step` from `lane`, or None at the grid edge
    pub fn step(&self, lane: u32, step: LaneStep) -> Option<u32> {
        match step {
            LaneStep::Up => lane.checked_sub(1),
            LaneStep::Down => Some(lane + 1).filter(|&l| self.contains(l)),
        }
    }
}
