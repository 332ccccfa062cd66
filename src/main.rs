//! Lane Runner entry point
//!
//! Headless native host: the autopilot plays on a sleep-based tick loop and
//! everything the game would draw is reported through the log facade.
//!
//! Usage: `lane-runner [SETTINGS.json] [--seed N] [--runs N] [--difficulty NAME] [--fast]`

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use lane_runner::platform::{HostOptions, run_blocking};
#[cfg(not(target_arch = "wasm32"))]
use lane_runner::sim::RunEvent;
#[cfg(not(target_arch = "wasm32"))]
use lane_runner::{Autopilot, Command, Difficulty, LogPort, Settings, Simulation, TickOutcome};

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(name = "lane-runner")]
#[command(about = "Headless lane runner driven by the autopilot")]
struct Args {
    /// JSON settings file; reference defaults when omitted
    settings: Option<PathBuf>,
    /// RNG seed (clock-derived when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Runs to play back to back
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    runs: u32,
    /// Difficulty preset: casual, normal or hard
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
    /// Tick as fast as possible instead of in real time
    #[arg(long)]
    fast: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty `{s}`"))
}

/// Finished runs of this process
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
struct Session {
    finished: u32,
    best: Option<u64>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Session {
    /// Count a finished run; true when it beats every earlier one
    fn record(&mut self, score: u64) -> bool {
        self.finished += 1;
        let best = self.best.is_none_or(|best| score > best);
        if best {
            self.best = Some(score);
        }
        best
    }
}

/// Seed from the clock when none was given
#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Lane Runner (native) starting...");

    let args = Args::parse();

    let mut settings = match Settings::load_or_default(args.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(difficulty) = args.difficulty {
        settings.apply_preset(difficulty);
        log::info!("Difficulty: {}", difficulty.as_str());
    }

    let seed = args.seed.unwrap_or_else(clock_seed);
    let mut port = LogPort::new();
    let mut sim = match Simulation::new(settings, seed, &mut port) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let options = HostOptions {
        realtime: !args.fast,
        max_ticks: None,
    };
    let runs = args.runs;
    let mut pilot = Autopilot::new();
    let mut session = Session::default();

    for run in 1..=runs {
        let outcome = run_blocking(&mut sim, &mut port, &mut pilot, options);

        for event in sim.drain_events() {
            if let RunEvent::GameOver { score, ticks } = event {
                if session.record(score) {
                    log::info!("Run {run}: score {score} in {ticks} ticks (new best)");
                } else {
                    log::info!("Run {run}: score {score} in {ticks} ticks");
                }
            }
        }

        if outcome == TickOutcome::Terminated {
            break;
        }
        if run < runs {
            sim.push_command(Command::Restart);
        }
    }

    sim.push_command(Command::Quit);
    lane_runner::sim::tick(&mut sim, &mut port);

    match session.best {
        Some(best) => log::info!(
            "Best score {best} over {} finished runs ({} lane changes)",
            session.finished,
            pilot.moves()
        ),
        None => log::info!("No finished runs"),
    }
    log::info!("Game loop terminated");
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build has no native host; embed the library instead
}
