//! Idle/demo mode - the game plays itself
//!
//! Looks at the tokens coming up in the player's lane and the two lanes next
//! to it, and steps toward whichever lane is safest, preferring pickups.

use crate::platform::CommandSource;
use crate::port::Command;
use crate::sim::{EntityKind, LaneStep, Simulation};

/// Base look-ahead in front of the player, playfield units
const BASE_LOOKAHEAD: f32 = 120.0;
/// Extra look-ahead per point of speed
const LOOKAHEAD_PER_SPEED: f32 = 40.0;
/// Obstacles outweigh pickups
const OBSTACLE_WEIGHT: f32 = 3.0;
const PICKUP_WEIGHT: f32 = 1.0;

/// Demo player that emits lane changes
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    moves: u64,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lane changes issued so far
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Pick a lane step for the coming tick, if any
    pub fn decide(&mut self, sim: &Simulation) -> Option<LaneStep> {
        if !sim.run.is_running() {
            return None;
        }

        let current = sim.player.lane;
        let mut best = (self.lane_value(sim, current), None);
        for step in [LaneStep::Up, LaneStep::Down] {
            let Some(lane) = sim.grid.step(current, step) else {
                continue;
            };
            let value = self.lane_value(sim, lane);
            // Strictly better only, so the player doesn't jitter between equal lanes
            if value > best.0 {
                best = (value, Some(step));
            }
        }

        if best.1.is_some() {
            self.moves += 1;
        }
        best.1
    }

    /// How attractive `lane` is right now: pickups add, obstacles subtract,
    /// both weighted by how close they are to the player
    fn lane_value(&self, sim: &Simulation, lane: u32) -> f32 {
        let player = sim.player.span();
        let lookahead = BASE_LOOKAHEAD + sim.run.speed as f32 * LOOKAHEAD_PER_SPEED;
        // Whatever reaches the player by next tick counts as already touching
        let reach = player.end() + sim.run.speed as f32;

        sim.tokens
            .iter()
            .filter(|t| t.lane == lane && t.span().end() > player.start)
            .filter_map(|t| {
                let gap = (t.pos.x - reach).max(0.0);
                if gap > lookahead {
                    return None;
                }
                let urgency = 1.0 - gap / lookahead;
                Some(match t.kind {
                    EntityKind::Obstacle => -OBSTACLE_WEIGHT * urgency,
                    EntityKind::Pickup => PICKUP_WEIGHT * urgency,
                    EntityKind::Player => 0.0,
                })
            })
            .sum()
    }
}

impl CommandSource for Autopilot {
    fn poll(&mut self, sim: &Simulation, out: &mut Vec<Command>) {
        if let Some(step) = self.decide(sim) {
            out.push(Command::ChangeLane(step));
        }
    }
}
