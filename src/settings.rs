//! Game settings
//!
//! The named constants a run is built from. Loaded from a JSON file;
//! any field left out falls back to the reference value in [`crate::consts`].

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::RunRules;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Casual,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Casual => "Casual",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(Difficulty::Casual),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Ticks between speed increases for this preset
    pub fn speed_interval(&self) -> u64 {
        match self {
            Difficulty::Casual => 400,
            Difficulty::Normal => SPEED_INTERVAL,
            Difficulty::Hard => 150,
        }
    }

    /// Lives at the start of each run
    pub fn start_lives(&self) -> u32 {
        match self {
            Difficulty::Casual => 5,
            Difficulty::Normal => START_LIVES,
            Difficulty::Hard => 2,
        }
    }
}

/// Errors raised while loading or validating settings
#[derive(Debug)]
pub enum SettingsError {
    /// Settings file could not be read
    Io(std::io::Error),
    /// Settings file is not valid JSON for [`Settings`]
    Parse(serde_json::Error),
    /// A value would break a simulation invariant
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read settings: {e}"),
            Self::Parse(e) => write!(f, "failed to parse settings: {e}"),
            Self::Invalid { field, reason } => write!(f, "invalid setting `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Game settings, supplied once at initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preset the ramp interval and starting lives came from
    pub difficulty: Difficulty,

    // === Playfield ===
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub lanes: u32,

    // === Timing ===
    pub ticks_per_second: u32,
    /// Ticks between speed increases
    pub speed_interval: u64,
    pub speed_step: u32,
    pub start_speed: u32,

    // === Run ===
    pub start_lives: u32,
    pub start_score: u64,
    pub pickup_bonus: u64,

    // === Player ===
    pub player_side: f32,
    pub player_x: f32,
    pub player_start_lane: u32,

    // === Pickups / obstacles ===
    pub token_side: f32,
    pub token_count: usize,
    pub token_start_x: f32,
    pub token_spacing: f32,
    /// Respawn offset past the right edge, [min, max)
    pub respawn_offset_min: u32,
    pub respawn_offset_max: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            lanes: LANES,

            ticks_per_second: TICKS_PER_SECOND,
            speed_interval: SPEED_INTERVAL,
            speed_step: SPEED_STEP,
            start_speed: START_SPEED,

            start_lives: START_LIVES,
            start_score: START_SCORE,
            pickup_bonus: PICKUP_BONUS,

            player_side: PLAYER_SIDE,
            player_x: PLAYER_X,
            player_start_lane: PLAYER_START_LANE,

            token_side: TOKEN_SIDE,
            token_count: TOKEN_COUNT,
            token_start_x: TOKEN_START_X,
            token_spacing: TOKEN_SPACING,
            respawn_offset_min: RESPAWN_OFFSET_MIN,
            respawn_offset_max: RESPAWN_OFFSET_MAX,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a difficulty preset (updates ramp interval and lives)
    pub fn apply_preset(&mut self, preset: Difficulty) {
        self.difficulty = preset;
        self.speed_interval = preset.speed_interval();
        self.start_lives = preset.start_lives();
    }

    /// Parse and validate settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` if given, otherwise use the reference defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { field, reason })
        }

        if !(self.playfield_width > 0.0 && self.playfield_width.is_finite()) {
            return invalid("playfield_width", "must be positive");
        }
        if !(self.playfield_height > 0.0 && self.playfield_height.is_finite()) {
            return invalid("playfield_height", "must be positive");
        }
        if self.lanes == 0 {
            return invalid("lanes", "need at least one lane");
        }
        if self.ticks_per_second == 0 {
            return invalid("ticks_per_second", "must be at least 1");
        }
        if self.speed_interval == 0 {
            return invalid("speed_interval", "must be at least 1");
        }
        if self.start_speed == 0 {
            return invalid("start_speed", "must be at least 1");
        }
        if self.start_lives == 0 {
            return invalid("start_lives", "must be at least 1");
        }
        if self.player_start_lane >= self.lanes {
            return invalid("player_start_lane", "must be below the lane count");
        }
        if !(self.player_side > 0.0 && self.player_side <= self.lane_height()) {
            return invalid("player_side", "must be positive and fit inside one lane");
        }
        if !(self.token_side > 0.0 && self.token_side <= self.lane_height()) {
            return invalid("token_side", "must be positive and fit inside one lane");
        }
        if !(self.player_x >= 0.0 && self.player_x + self.player_side <= self.playfield_width) {
            return invalid("player_x", "player must sit inside the playfield");
        }
        if !self.token_start_x.is_finite() {
            return invalid("token_start_x", "must be a finite position");
        }
        if !(self.token_spacing >= 0.0 && self.token_spacing.is_finite()) {
            return invalid("token_spacing", "must be finite and not negative");
        }
        // Recycled tokens must land strictly past the right edge
        if self.respawn_offset_min == 0 {
            return invalid("respawn_offset_min", "must be at least 1");
        }
        if self.respawn_offset_min >= self.respawn_offset_max {
            return invalid("respawn_offset_min", "respawn offset range is empty");
        }
        Ok(())
    }

    /// Height of one lane band
    pub fn lane_height(&self) -> f32 {
        self.playfield_height / self.lanes as f32
    }

    /// Wall-clock time between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.ticks_per_second as f64)
    }

    /// Score/speed/lives policy for the run state
    pub fn rules(&self) -> RunRules {
        RunRules {
            start_score: self.start_score,
            start_speed: self.start_speed,
            start_lives: self.start_lives,
            speed_interval: self.speed_interval,
            speed_step: self.speed_step,
            pickup_bonus: self.pickup_bonus,
        }
    }
}
