//! Fixed timestep simulation tick
//!
//! [`Simulation`] is the whole run context; [`tick`] advances it by one step.
//! Hosts call `tick` at a fixed rate from whatever loop they have.

use std::collections::VecDeque;

use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Entity, EntityKind, Respawn, roll_spawn_kind};
use super::lane::LaneGrid;
use super::state::{RngState, RunEvent, RunPhase, RunState};
use crate::port::{Command, Flash, RenderPort};
use crate::settings::{Settings, SettingsError};

/// What the host should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking (running or paused)
    Continue,
    /// Run is over; only a restart brings it back
    Ended,
    /// Quit; stop the loop and release the port
    Terminated,
}

/// One simulation instance: run state, entities, RNG and pending input
#[derive(Debug, Clone)]
pub struct Simulation {
    pub settings: Settings,
    pub grid: LaneGrid,
    pub run: RunState,
    pub player: Entity,
    /// Pickups and obstacles, processed in this order every tick
    pub tokens: Vec<Entity>,
    pub rng_state: RngState,
    rng: Pcg32,
    commands: VecDeque<Command>,
    events: Vec<RunEvent>,
}

impl Simulation {
    /// Build a run from validated settings and draw its entities
    pub fn new(settings: Settings, seed: u64, port: &mut dyn RenderPort) -> Result<Self, SettingsError> {
        settings.validate()?;

        let grid = LaneGrid::new(settings.lanes, settings.playfield_height);
        let rng_state = RngState::new(seed);
        let mut rng = rng_state.to_rng();

        let player = Entity::spawn(
            EntityKind::Player,
            settings.player_x,
            settings.player_start_lane,
            settings.player_side,
            &grid,
            port,
        );

        let tokens = (0..settings.token_count)
            .map(|i| {
                let kind = roll_spawn_kind(&mut rng);
                let lane = rng.random_range(0..grid.lanes());
                let x = settings.token_start_x + i as f32 * settings.token_spacing;
                Entity::spawn(kind, x, lane, settings.token_side, &grid, port)
            })
            .collect::<Vec<_>>();

        log::info!(
            "Run started with seed {seed}: {} tokens across {} lanes",
            tokens.len(),
            grid.lanes()
        );

        Ok(Self {
            run: RunState::new(settings.rules()),
            settings,
            grid,
            player,
            tokens,
            rng_state,
            rng,
            commands: VecDeque::new(),
            events: Vec::new(),
        })
    }

    #[inline]
    pub fn phase(&self) -> RunPhase {
        self.run.phase
    }

    /// Queue a command for the next tick boundary
    pub fn push_command(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Events recorded since the last drain, oldest first
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, RunEvent> {
        self.events.drain(..)
    }

    fn respawn(&self) -> Respawn {
        Respawn {
            right_edge: self.settings.playfield_width,
            offset_min: self.settings.respawn_offset_min,
            offset_max: self.settings.respawn_offset_max,
        }
    }

    /// Fresh run: starting counters, every token recycled, player back home
    pub fn restart(&mut self, port: &mut dyn RenderPort) {
        assert!(self.run.phase != RunPhase::Terminated, "restart after quit");
        self.run.reset();

        let respawn = self.respawn();
        for token in &mut self.tokens {
            token.recycle(&mut self.rng, &respawn, &self.grid, port);
        }
        self.player.place(
            self.settings.player_x,
            self.settings.player_start_lane,
            &self.grid,
            port,
        );

        self.events.push(RunEvent::Restarted);
        log::info!("Run restarted");
    }

    fn apply_command(&mut self, command: Command, port: &mut dyn RenderPort) {
        match command {
            Command::ChangeLane(step) => {
                if self.run.is_running() {
                    self.player.change_lane(step, &self.grid, port);
                } else {
                    log::debug!("Ignoring lane change while {:?}", self.run.phase);
                }
            }
            Command::Pause => {
                if self.run.pause() {
                    self.events.push(RunEvent::Paused);
                } else {
                    log::debug!("Ignoring pause while {:?}", self.run.phase);
                }
            }
            Command::Resume => {
                if self.run.resume() {
                    self.events.push(RunEvent::Resumed);
                } else {
                    log::debug!("Ignoring resume while {:?}", self.run.phase);
                }
            }
            Command::Restart => {
                if self.run.phase == RunPhase::Terminated {
                    log::debug!("Ignoring restart after quit");
                } else {
                    self.restart(port);
                }
            }
            Command::Quit => {
                if self.run.terminate() {
                    self.events.push(RunEvent::Terminated);
                    log::info!("Quit requested");
                }
            }
        }
    }
}

/// Advance the simulation by one fixed tick
pub fn tick(sim: &mut Simulation, port: &mut dyn RenderPort) -> TickOutcome {
    // Input queued since the last tick applies at the boundary
    while let Some(command) = sim.commands.pop_front() {
        sim.apply_command(command, port);
    }

    match sim.run.phase {
        RunPhase::Terminated => return TickOutcome::Terminated,
        RunPhase::Ended => return TickOutcome::Ended,
        RunPhase::Paused => {
            port.set_status(sim.run.score, sim.run.lives);
            port.set_background_flash(Flash::Neutral);
            return TickOutcome::Continue;
        }
        RunPhase::Running => {}
    }

    if let Some(speed) = sim.run.tick() {
        log::debug!("Speed up to {speed} at tick {}", sim.run.tick_count);
        sim.events.push(RunEvent::SpeedUp {
            speed,
            tick: sim.run.tick_count,
        });
    }

    let respawn = sim.respawn();
    let Simulation {
        grid,
        run,
        player,
        tokens,
        rng,
        events,
        ..
    } = sim;

    let dx = -(run.speed as f32);
    let mut flash = Flash::Neutral;

    for token in tokens.iter_mut() {
        token.advance(dx, port);

        // Off-screen recycling wins over a same-tick collision
        if token.is_off_screen_left() {
            token.recycle(rng, &respawn, grid, port);
            continue;
        }
        if !player.overlaps(token) {
            continue;
        }

        match token.kind {
            EntityKind::Pickup => {
                let bonus = run.apply_pickup();
                flash = Flash::PickupHit;
                log::debug!("Pickup +{bonus} (score {})", run.score);
                events.push(RunEvent::PickupCollected {
                    bonus,
                    score: run.score,
                });
            }
            EntityKind::Obstacle => {
                run.apply_hit();
                flash = Flash::ObstacleHit;
                log::debug!("Obstacle hit ({} lives left)", run.lives);
                events.push(RunEvent::ObstacleHit { lives: run.lives });
            }
            EntityKind::Player => unreachable!("the player is never in the token list"),
        }
        // A resolved collision always respawns the token
        token.recycle(rng, &respawn, grid, port);

        if run.phase == RunPhase::Ended {
            break;
        }
    }

    if run.phase == RunPhase::Ended {
        log::info!("Game over: score {} after {} ticks", run.score, run.tick_count);
        events.push(RunEvent::GameOver {
            score: run.score,
            ticks: run.tick_count,
        });
        port.set_status(run.score, run.lives);
        port.set_background_flash(flash);
        port.set_game_over();
        return TickOutcome::Ended;
    }

    port.set_status(run.score, run.lives);
    port.set_background_flash(flash);
    TickOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::NullPort;
    use crate::port::testing::RecordingPort;
    use crate::sim::LaneStep;

    /// Settings with no tokens, so tests can place their own
    fn empty_settings() -> Settings {
        Settings {
            token_count: 0,
            ..Default::default()
        }
    }

    fn add_token(
        sim: &mut Simulation,
        port: &mut dyn RenderPort,
        kind: EntityKind,
        x: f32,
        lane: u32,
    ) -> usize {
        let token = Entity::spawn(kind, x, lane, sim.settings.token_side, &sim.grid, port);
        sim.tokens.push(token);
        sim.tokens.len() - 1
    }

    /// Lane the player is not in
    fn other_lane(sim: &Simulation) -> u32 {
        (sim.player.lane + 1) % sim.grid.lanes()
    }

    #[test]
    fn test_new_lays_out_tokens() {
        let mut port = RecordingPort::default();
        let sim = Simulation::new(Settings::default(), 42, &mut port).unwrap();

        assert_eq!(sim.tokens.len(), 4);
        for (i, token) in sim.tokens.iter().enumerate() {
            assert_eq!(token.pos.x, 250.0 + i as f32 * 150.0);
            assert!(sim.grid.contains(token.lane));
            assert!(token.kind.is_recyclable());
        }
        assert_eq!(sim.player.lane, 1);
        assert_eq!(sim.player.pos.x, 40.0);
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(port.tokens.len(), 5);
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let settings = Settings {
            lanes: 0,
            ..Default::default()
        };
        assert!(Simulation::new(settings, 1, &mut NullPort::default()).is_err());
    }

    #[test]
    fn test_score_counts_running_ticks() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(empty_settings(), 1, &mut port).unwrap();

        for _ in 0..100 {
            assert_eq!(tick(&mut sim, &mut port), TickOutcome::Continue);
        }
        assert_eq!(sim.run.score, 100);
        assert_eq!(port.status, Some((100, 3)));
        assert_eq!(port.flashes.last(), Some(&Flash::Neutral));
    }

    #[test]
    fn test_token_scrolls_off_after_x_plus_width_ticks() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(
            Settings {
                token_count: 0,
                speed_interval: 10_000,
                ..Default::default()
            },
            1,
            &mut port,
        )
        .unwrap();
        let lane = other_lane(&sim);
        let idx = add_token(&mut sim, &mut port, EntityKind::Obstacle, 250.0, lane);

        for _ in 0..279 {
            tick(&mut sim, &mut port);
        }
        assert_eq!(sim.tokens[idx].pos.x, -29.0);

        tick(&mut sim, &mut port);
        // Reached x = -30 on tick 280 and was recycled past the right edge
        assert!(sim.tokens[idx].pos.x > 600.0);
        assert_eq!(sim.run.lives, 3);
    }

    #[test]
    fn test_pickup_collision_adds_bonus_and_recycles() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(empty_settings(), 9, &mut port).unwrap();
        let lane = sim.player.lane;
        // Player spans [40, 80); token reaches x = 79 after one tick
        let idx = add_token(&mut sim, &mut port, EntityKind::Pickup, 80.0, lane);

        tick(&mut sim, &mut port);

        assert_eq!(sim.run.score, 1 + 1000);
        assert_eq!(sim.run.lives, 3);
        assert!(sim.tokens[idx].pos.x > 600.0);
        assert_eq!(port.flashes.last(), Some(&Flash::PickupHit));
        let events: Vec<_> = sim.drain_events().collect();
        assert_eq!(events, vec![RunEvent::PickupCollected { bonus: 1000, score: 1001 }]);

        // Feedback lasts one tick
        tick(&mut sim, &mut port);
        assert_eq!(port.flashes.last(), Some(&Flash::Neutral));
    }

    #[test]
    fn test_touching_token_does_not_collide() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(empty_settings(), 9, &mut port).unwrap();
        let lane = sim.player.lane;
        // After one tick x = 80, exactly the player's right edge
        add_token(&mut sim, &mut port, EntityKind::Obstacle, 81.0, lane);

        tick(&mut sim, &mut port);
        assert_eq!(sim.run.lives, 3);
        tick(&mut sim, &mut port);
        assert_eq!(sim.run.lives, 2);
    }

    #[test]
    fn test_three_obstacles_end_the_run() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(empty_settings(), 5, &mut port).unwrap();
        let lane = sim.player.lane;
        let idx = add_token(&mut sim, &mut port, EntityKind::Obstacle, 100.0, lane);

        let mut hits = 0;
        let mut ticks = 0u64;
        loop {
            // Line the token up in front of the player again after each recycle
            if sim.tokens[idx].pos.x > 600.0 {
                let token = &mut sim.tokens[idx];
                token.kind = EntityKind::Obstacle;
                token.place(100.0, lane, &sim.grid, &mut port);
            }
            let outcome = tick(&mut sim, &mut port);
            ticks += 1;
            if sim.run.lives < 3 - hits {
                hits += 1;
            }
            if outcome == TickOutcome::Ended {
                break;
            }
            assert_eq!(outcome, TickOutcome::Continue);
            assert!(ticks < 1000, "run never ended");
        }

        assert_eq!(hits, 3);
        assert_eq!(sim.run.lives, 0);
        assert_eq!(sim.phase(), RunPhase::Ended);
        assert_eq!(sim.run.score, ticks);
        assert!(port.game_over);
        assert_eq!(port.flashes.last(), Some(&Flash::ObstacleHit));

        // Nothing moves once the run has ended
        let score = sim.run.score;
        let x = sim.tokens[idx].pos.x;
        let calls = port.calls;
        assert_eq!(tick(&mut sim, &mut port), TickOutcome::Ended);
        assert_eq!(sim.run.score, score);
        assert_eq!(sim.tokens[idx].pos.x, x);
        assert_eq!(port.calls, calls);
    }

    #[test]
    fn test_tokens_after_final_hit_stay_put() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(
            Settings {
                start_lives: 1,
                token_count: 0,
                ..Default::default()
            },
            6,
            &mut port,
        )
        .unwrap();
        let lane = sim.player.lane;
        add_token(&mut sim, &mut port, EntityKind::Obstacle, 60.0, lane);
        let pickup = add_token(&mut sim, &mut port, EntityKind::Pickup, 60.0, lane);

        assert_eq!(tick(&mut sim, &mut port), TickOutcome::Ended);

        // The pickup is later in token order, so it neither moves nor scores
        assert_eq!(sim.tokens[pickup].pos.x, 60.0);
        assert_eq!(sim.tokens[pickup].kind, EntityKind::Pickup);
        assert_eq!(sim.run.score, 1);
        assert_eq!(port.flashes.last(), Some(&Flash::ObstacleHit));
        let events: Vec<_> = sim.drain_events().collect();
        assert_eq!(
            events,
            vec![
                RunEvent::ObstacleHit { lives: 0 },
                RunEvent::GameOver { score: 1, ticks: 1 },
            ]
        );
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(Settings::default(), 3, &mut port).unwrap();
        tick(&mut sim, &mut port);

        sim.push_command(Command::Pause);
        let xs: Vec<f32> = sim.tokens.iter().map(|t| t.pos.x).collect();
        for _ in 0..10 {
            assert_eq!(tick(&mut sim, &mut port), TickOutcome::Continue);
        }
        assert_eq!(sim.phase(), RunPhase::Paused);
        assert_eq!(sim.run.score, 1);
        assert_eq!(sim.run.tick_count, 1);
        assert_eq!(xs, sim.tokens.iter().map(|t| t.pos.x).collect::<Vec<_>>());

        // Lane changes are ignored while paused
        let lane = sim.player.lane;
        sim.push_command(Command::ChangeLane(LaneStep::Down));
        tick(&mut sim, &mut port);
        assert_eq!(sim.player.lane, lane);

        sim.push_command(Command::Resume);
        tick(&mut sim, &mut port);
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(sim.run.score, 2);
    }

    #[test]
    fn test_lane_commands_move_player() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(empty_settings(), 3, &mut port).unwrap();

        sim.push_command(Command::ChangeLane(LaneStep::Up));
        sim.push_command(Command::ChangeLane(LaneStep::Up));
        tick(&mut sim, &mut port);
        assert_eq!(sim.player.lane, 0);

        sim.push_command(Command::ChangeLane(LaneStep::Down));
        tick(&mut sim, &mut port);
        assert_eq!(sim.player.lane, 1);
        assert_eq!(port.token(sim.player.handle).y, sim.player.pos.y);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut port = RecordingPort::default();
        let mut sim = Simulation::new(Settings::default(), 11, &mut port).unwrap();
        for _ in 0..300 {
            tick(&mut sim, &mut port);
        }
        sim.push_command(Command::ChangeLane(LaneStep::Down));
        sim.push_command(Command::Pause);
        tick(&mut sim, &mut port);

        sim.push_command(Command::Restart);
        tick(&mut sim, &mut port);

        // The restart tick itself counts as a running tick
        assert_eq!(sim.run.tick_count, 1);
        assert_eq!(sim.run.score, 1);
        assert_eq!(sim.run.speed, 1);
        assert_eq!(sim.run.lives, sim.settings.start_lives);
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(sim.player.lane, sim.settings.player_start_lane);
        assert_eq!(sim.player.pos.x, sim.settings.player_x);
        for token in &sim.tokens {
            assert!(token.pos.x > 600.0);
        }
        assert!(sim.drain_events().any(|e| e == RunEvent::Restarted));
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut port = NullPort::default();
        let mut sim = Simulation::new(
            Settings {
                start_lives: 1,
                token_count: 0,
                ..Default::default()
            },
            2,
            &mut port,
        )
        .unwrap();
        let lane = sim.player.lane;
        add_token(&mut sim, &mut port, EntityKind::Obstacle, 60.0, lane);
        assert_eq!(tick(&mut sim, &mut port), TickOutcome::Ended);

        sim.push_command(Command::Restart);
        assert_eq!(tick(&mut sim, &mut port), TickOutcome::Continue);
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(sim.run.lives, 1);
        assert_eq!(sim.run.score, 1);
        assert_eq!(sim.run.tick_count, 1);
    }

    #[test]
    fn test_quit_from_any_phase() {
        let mut port = NullPort::default();
        let mut sim = Simulation::new(Settings::default(), 2, &mut port).unwrap();
        sim.push_command(Command::Pause);
        tick(&mut sim, &mut port);

        sim.push_command(Command::Quit);
        sim.push_command(Command::Restart);
        assert_eq!(tick(&mut sim, &mut port), TickOutcome::Terminated);
        assert_eq!(sim.phase(), RunPhase::Terminated);
        assert_eq!(tick(&mut sim, &mut port), TickOutcome::Terminated);
    }

    #[test]
    fn test_speed_ramp_events() {
        let mut port = NullPort::default();
        let mut sim = Simulation::new(empty_settings(), 2, &mut port).unwrap();
        for _ in 0..500 {
            tick(&mut sim, &mut port);
        }
        let ramps: Vec<_> = sim
            .drain_events()
            .filter(|e| matches!(e, RunEvent::SpeedUp { .. }))
            .collect();
        assert_eq!(
            ramps,
            vec![
                RunEvent::SpeedUp { speed: 2, tick: 250 },
                RunEvent::SpeedUp { speed: 3, tick: 500 },
            ]
        );
        assert_eq!(sim.run.speed, 3);
    }

    #[test]
    fn test_determinism() {
        let mut port1 = NullPort::default();
        let mut port2 = NullPort::default();
        let mut sim1 = Simulation::new(Settings::default(), 99999, &mut port1).unwrap();
        let mut sim2 = Simulation::new(Settings::default(), 99999, &mut port2).unwrap();

        let script = [
            (10, Command::ChangeLane(LaneStep::Up)),
            (200, Command::ChangeLane(LaneStep::Down)),
            (400, Command::ChangeLane(LaneStep::Down)),
        ];
        for t in 0..2000u64 {
            for (at, command) in script {
                if at == t {
                    sim1.push_command(command);
                    sim2.push_command(command);
                }
            }
            let a = tick(&mut sim1, &mut port1);
            let b = tick(&mut sim2, &mut port2);
            assert_eq!(a, b);
        }

        assert_eq!(sim1.run.score, sim2.run.score);
        assert_eq!(sim1.run.lives, sim2.run.lives);
        assert_eq!(sim1.phase(), sim2.phase());
        for (a, b) in sim1.tokens.iter().zip(&sim2.tokens) {
            assert_eq!((a.kind, a.lane, a.pos), (b.kind, b.lane, b.pos));
        }
    }
}
