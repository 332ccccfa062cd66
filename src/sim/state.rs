//! Run state: score, speed, lives and the run phase machine
//!
//! Only the simulation loop writes to this. Entities never touch it; they
//! are handed the current speed as a scroll delta.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Active gameplay
    Running,
    /// Suspended; ticks keep coming but skip all logic
    Paused,
    /// Out of lives. Only a restart leaves this phase
    Ended,
    /// Quit. Nothing leaves this phase
    Terminated,
}

/// Score/speed/lives policy for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRules {
    pub start_score: u64,
    pub start_speed: u32,
    pub start_lives: u32,
    /// Ticks between speed increases
    pub speed_interval: u64,
    pub speed_step: u32,
    pub pickup_bonus: u64,
}

impl Default for RunRules {
    fn default() -> Self {
        Self {
            start_score: START_SCORE,
            start_speed: START_SPEED,
            start_lives: START_LIVES,
            speed_interval: SPEED_INTERVAL,
            speed_step: SPEED_STEP,
            pickup_bonus: PICKUP_BONUS,
        }
    }
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEvent {
    SpeedUp { speed: u32, tick: u64 },
    PickupCollected { bonus: u64, score: u64 },
    ObstacleHit { lives: u32 },
    GameOver { score: u64, ticks: u64 },
    Paused,
    Resumed,
    Restarted,
    Terminated,
}

/// RNG seed wrapper, kept so a run can be reproduced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Score, speed, lives and phase of the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Scroll distance per tick
    pub speed: u32,
    pub lives: u32,
    /// Running ticks since the run (re)started
    pub tick_count: u64,
    pub phase: RunPhase,
    rules: RunRules,
}

impl RunState {
    pub fn new(rules: RunRules) -> Self {
        assert!(rules.speed_interval > 0, "speed interval must be non-zero");
        Self {
            score: rules.start_score,
            speed: rules.start_speed,
            lives: rules.start_lives,
            tick_count: 0,
            phase: RunPhase::Running,
            rules,
        }
    }

    pub fn rules(&self) -> &RunRules {
        &self.rules
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Count one running tick: +1 score, and ramp speed every
    /// `speed_interval` ticks. Returns the new speed when it ramped.
    pub fn tick(&mut self) -> Option<u32> {
        assert!(self.is_running(), "tick in phase {:?}", self.phase);
        self.tick_count += 1;
        self.score += 1;
        if self.tick_count.is_multiple_of(self.rules.speed_interval) {
            self.speed += self.rules.speed_step;
            Some(self.speed)
        } else {
            None
        }
    }

    /// Add the pickup bonus; returns the bonus applied
    pub fn apply_pickup(&mut self) -> u64 {
        self.score += self.rules.pickup_bonus;
        self.rules.pickup_bonus
    }

    /// Take one life. Returns true if that ended the run.
    pub fn apply_hit(&mut self) -> bool {
        assert!(self.lives > 0, "hit applied with no lives left");
        self.lives -= 1;
        if self.lives == 0 {
            self.phase = RunPhase::Ended;
            true
        } else {
            false
        }
    }

    /// Running -> Paused. False if not running.
    pub fn pause(&mut self) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        self.phase = RunPhase::Paused;
        true
    }

    /// Paused -> Running. False if not paused.
    pub fn resume(&mut self) -> bool {
        if self.phase != RunPhase::Paused {
            return false;
        }
        self.phase = RunPhase::Running;
        true
    }

    /// Any phase -> Terminated. False if already terminated.
    pub fn terminate(&mut self) -> bool {
        if self.phase == RunPhase::Terminated {
            return false;
        }
        self.phase = RunPhase::Terminated;
        true
    }

    /// Back to the starting values, Running
    pub fn reset(&mut self) {
        assert!(self.phase != RunPhase::Terminated, "reset after terminate");
        *self = Self::new(self.rules);
    }
}
