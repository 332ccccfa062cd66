//! Platform glue: turns wall-clock time into simulation ticks
//!
//! The sim only knows [`tick`]. This module supplies the two ways a host
//! drives it: a frame-callback accumulator and a blocking sleep loop.

use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::MAX_SUBSTEPS;
use crate::port::{Command, RenderPort};
use crate::sim::{Simulation, TickOutcome, tick};

/// Something that produces player commands between ticks
pub trait CommandSource {
    /// Append any commands that arrived since the last poll
    fn poll(&mut self, sim: &Simulation, out: &mut Vec<Command>);
}

/// Commands sent from another thread (keyboard reader, UI thread)
impl CommandSource for Receiver<Command> {
    fn poll(&mut self, _sim: &Simulation, out: &mut Vec<Command>) {
        out.extend(self.try_iter());
    }
}

/// Converts frame deltas into a bounded number of fixed ticks
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
    max_substeps: u32,
}

impl FixedTimestep {
    pub fn new(step: Duration) -> Self {
        assert!(!step.is_zero(), "tick step must be non-zero");
        Self {
            step,
            accumulator: Duration::ZERO,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Feed one frame's elapsed time; returns how many ticks to run now
    pub fn advance(&mut self, frame_dt: Duration) -> u32 {
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            self.accumulator -= self.step;
            substeps += 1;
        }

        // Too far behind: drop the backlog instead of spiralling
        if self.accumulator >= self.step {
            log::warn!("Dropping {:?} of simulation backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        substeps
    }
}

/// Options for [`run_blocking`]
#[derive(Debug, Clone, Copy)]
pub struct HostOptions {
    /// Sleep to each tick boundary; false runs as fast as possible
    pub realtime: bool,
    /// Stop after this many ticks even if the run is still going
    pub max_ticks: Option<u64>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            realtime: true,
            max_ticks: None,
        }
    }
}

/// Sleep-based host loop
///
/// Polls `source` before each tick, ticks, then yields until the next tick
/// boundary. Returns when the run ends, the player quits, or `max_ticks`
/// is reached (as [`TickOutcome::Continue`]).
pub fn run_blocking(
    sim: &mut Simulation,
    port: &mut dyn RenderPort,
    source: &mut dyn CommandSource,
    options: HostOptions,
) -> TickOutcome {
    let interval = sim.settings.tick_interval();
    let mut pending = Vec::new();
    let mut ticks = 0u64;
    let mut next_tick = Instant::now();

    loop {
        source.poll(sim, &mut pending);
        for command in pending.drain(..) {
            sim.push_command(command);
        }

        let outcome = tick(sim, port);
        ticks += 1;
        if outcome != TickOutcome::Continue {
            return outcome;
        }
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            return TickOutcome::Continue;
        }

        if options.realtime {
            next_tick += interval;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            } else if now - next_tick > interval * MAX_SUBSTEPS {
                log::warn!("Tick loop fell {:?} behind, resyncing", now - next_tick);
                next_tick = now;
            }
        }
    }
}
