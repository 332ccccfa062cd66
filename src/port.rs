//! Boundaries between the simulation and whatever presents it
//!
//! The sim pushes drawing updates through [`RenderPort`] and receives player
//! intent as [`Command`]s. Neither side knows how the other is implemented.

use serde::{Deserialize, Serialize};

use crate::sim::{EntityKind, LaneStep};

/// Opaque id for a drawn token, issued by the port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenHandle(pub u32);

/// Background feedback for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flash {
    #[default]
    Neutral,
    PickupHit,
    ObstacleHit,
}

/// Player intent, queued and applied at the next tick boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    ChangeLane(LaneStep),
    Pause,
    Resume,
    Restart,
    Quit,
}

/// Output port implemented by the presentation layer
///
/// Coordinates are playfield units with y growing downward. Moves are
/// relative, so a port only has to translate whatever it drew at creation.
pub trait RenderPort {
    fn create_token(&mut self, kind: EntityKind, x: f32, y: f32, width: f32, height: f32) -> TokenHandle;
    fn move_token(&mut self, handle: TokenHandle, dx: f32, dy: f32);
    /// Token changed kind; presentation picks the colour
    fn recolor_token(&mut self, handle: TokenHandle, kind: EntityKind);
    fn set_status(&mut self, score: u64, lives: u32);
    fn set_background_flash(&mut self, flash: Flash);
    /// The run has ended; replaces the lives readout
    fn set_game_over(&mut self) {}
}

/// Port that draws nothing
#[derive(Debug, Default)]
pub struct NullPort {
    next_handle: u32,
}

impl RenderPort for NullPort {
    fn create_token(&mut self, _kind: EntityKind, _x: f32, _y: f32, _w: f32, _h: f32) -> TokenHandle {
        let handle = TokenHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn move_token(&mut self, _handle: TokenHandle, _dx: f32, _dy: f32) {}

    fn recolor_token(&mut self, _handle: TokenHandle, _kind: EntityKind) {}

    fn set_status(&mut self, _score: u64, _lives: u32) {}

    fn set_background_flash(&mut self, _flash: Flash) {}
}

/// Port that reports through the log facade (headless host)
#[derive(Debug, Default)]
pub struct LogPort {
    next_handle: u32,
    lives: Option<u32>,
    score: u64,
}

impl LogPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last score seen by the port
    pub fn score(&self) -> u64 {
        self.score
    }
}

impl RenderPort for LogPort {
    fn create_token(&mut self, kind: EntityKind, x: f32, y: f32, width: f32, height: f32) -> TokenHandle {
        let handle = TokenHandle(self.next_handle);
        self.next_handle += 1;
        log::debug!("token {} {:?} at ({x}, {y}) {width}x{height}", handle.0, kind);
        handle
    }

    fn move_token(&mut self, handle: TokenHandle, dx: f32, dy: f32) {
        log::trace!("token {} moved by ({dx}, {dy})", handle.0);
    }

    fn recolor_token(&mut self, handle: TokenHandle, kind: EntityKind) {
        log::debug!("token {} is now {:?}", handle.0, kind);
    }

    fn set_status(&mut self, score: u64, lives: u32) {
        self.score = score;
        if self.lives != Some(lives) {
            log::info!("Score: {score}  Lives remaining: {lives}");
            self.lives = Some(lives);
        }
    }

    fn set_background_flash(&mut self, flash: Flash) {
        if flash != Flash::Neutral {
            log::debug!("flash {:?}", flash);
        }
    }

    fn set_game_over(&mut self) {
        log::info!("Game Over (score {})", self.score);
        self.lives = None;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::*;

    /// What the port last drew for a token
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct DrawnToken {
        pub kind: EntityKind,
        pub x: f32,
        pub y: f32,
        pub width: f32,
        pub height: f32,
    }

    /// Port that keeps a copy of everything it was told
    #[derive(Debug, Default)]
    pub struct RecordingPort {
        pub tokens: HashMap<TokenHandle, DrawnToken>,
        pub status: Option<(u64, u32)>,
        pub flashes: Vec<Flash>,
        pub game_over: bool,
        pub calls: usize,
    }

    impl RecordingPort {
        pub fn token(&self, handle: TokenHandle) -> DrawnToken {
            self.tokens[&handle]
        }
    }

    impl RenderPort for RecordingPort {
        fn create_token(&mut self, kind: EntityKind, x: f32, y: f32, width: f32, height: f32) -> TokenHandle {
            self.calls += 1;
            let handle = TokenHandle(self.tokens.len() as u32);
            self.tokens.insert(handle, DrawnToken { kind, x, y, width, height });
            handle
        }

        fn move_token(&mut self, handle: TokenHandle, dx: f32, dy: f32) {
            self.calls += 1;
            let token = self.tokens.get_mut(&handle).expect("move of unknown token");
            token.x += dx;
            token.y += dy;
        }

        fn recolor_token(&mut self, handle: TokenHandle, kind: EntityKind) {
            self.calls += 1;
            self.tokens.get_mut(&handle).expect("recolor of unknown token").kind = kind;
        }

        fn set_status(&mut self, score: u64, lives: u32) {
            self.calls += 1;
            self.status = Some((score, lives));
        }

        fn set_background_flash(&mut self, flash: Flash) {
            self.calls += 1;
            self.flashes.push(flash);
        }

        fn set_game_over(&mut self) {
            self.calls += 1;
            self.game_over = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_issue_distinct_handles() {
        let mut null = NullPort::default();
        let a = null.create_token(EntityKind::Player, 0.0, 0.0, 40.0, 40.0);
        let b = null.create_token(EntityKind::Pickup, 0.0, 0.0, 30.0, 30.0);
        assert_ne!(a, b);

        let mut log_port = LogPort::new();
        let a = log_port.create_token(EntityKind::Obstacle, 0.0, 0.0, 30.0, 30.0);
        let b = log_port.create_token(EntityKind::Obstacle, 0.0, 0.0, 30.0, 30.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_log_port_tracks_score() {
        let mut port = LogPort::new();
        port.set_status(42, 3);
        port.set_status(43, 3);
        assert_eq!(port.score(), 43);
        port.set_game_over();
        assert_eq!(port.score(), 43);
    }
}
