//! AI settings and difficulty profiles
//!
//! Defines all configurable options for the AI opponent. Every
//! difficulty-dependent constant lives here; the engine only reads it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::strategy::SelectionStrategy;
use crate::error::{EngineError, Result};
use crate::game::board::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Upper bound for any single scoring weight
pub const MAX_WEIGHT: f64 = 5.0;
/// Upper bound for the randomness factor
pub const MAX_RANDOMNESS: f64 = 0.5;
/// Upper bound for look-ahead depth
pub const MAX_LOOK_AHEAD: u8 = 3;

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// How the AI scores and selects
    pub difficulty: DifficultyProfile,
    /// Board and roster sizes
    #[serde(default)]
    pub battle: BattleSettings,
    /// Pacing delays between turn steps
    #[serde(default)]
    pub timings: TimingSettings,
    /// Humanized variance on the pacing delays
    #[serde(default)]
    pub pacing: PacingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self::normal_preset()
    }
}

impl Settings {
    /// Settings for a given difficulty level with default battle/timing sections
    pub fn for_level(level: DifficultyLevel) -> Self {
        Self {
            difficulty: DifficultyProfile::for_level(level),
            battle: BattleSettings::default(),
            timings: TimingSettings::default(),
            pacing: PacingSettings::default(),
        }
    }

    /// Random placement, random roster
    pub fn easy_preset() -> Self {
        Self::for_level(DifficultyLevel::Easy)
    }

    /// Weighted formula with a little noise
    pub fn normal_preset() -> Self {
        Self::for_level(DifficultyLevel::Normal)
    }

    /// Formula plus opponent pressure and class counters
    pub fn hard_preset() -> Self {
        Self::for_level(DifficultyLevel::Hard)
    }

    /// Strongest weights, deepest look-ahead, almost no noise
    pub fn expert_preset() -> Self {
        Self::for_level(DifficultyLevel::Expert)
    }

    /// Settings for headless runs and tests: no pacing at all
    pub fn instant(level: DifficultyLevel) -> Self {
        Self {
            timings: TimingSettings::instant(),
            pacing: PacingSettings::disabled(),
            ..Self::for_level(level)
        }
    }

    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section against its documented range
    pub fn validate(&self) -> Result<()> {
        self.difficulty.validate()?;
        self.battle.validate()?;
        self.timings.validate()?;
        self.pacing.validate()
    }
}

/// AI difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl DifficultyLevel {
    /// Check if the level adds pressure and counter terms to the formula
    pub fn is_advanced(&self) -> bool {
        matches!(self, DifficultyLevel::Hard | DifficultyLevel::Expert)
    }
}

/// Numeric configuration of the AI for one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Difficulty level (gates which scoring terms apply)
    pub level: DifficultyLevel,
    /// Weight of attackable enemies
    pub attack_weight: f64,
    /// Weight of protected allies and of danger avoidance
    pub defense_weight: f64,
    /// Weight of board control
    pub control_weight: f64,
    /// Weight of adjacent ally synergy
    pub synergy_weight: f64,
    /// Noise factor, 0.0 - 0.5
    pub randomness: f64,
    /// Opponent look-ahead depth, 0 - 3
    pub look_ahead_turns: u8,
    /// Base thinking time (ms); pacing only
    pub thinking_time_ms: u64,
    /// Roster selection strategy
    pub selection_strategy: SelectionStrategy,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::for_level(DifficultyLevel::Normal)
    }
}

impl DifficultyProfile {
    /// Preset profile for a level
    pub fn for_level(level: DifficultyLevel) -> Self {
        match level {
            DifficultyLevel::Easy => Self::easy(),
            DifficultyLevel::Normal => Self::normal(),
            DifficultyLevel::Hard => Self::hard(),
            DifficultyLevel::Expert => Self::expert(),
        }
    }

    fn easy() -> Self {
        Self {
            level: DifficultyLevel::Easy,
            attack_weight: 0.5,
            defense_weight: 0.5,
            control_weight: 0.5,
            synergy_weight: 0.5,
            randomness: 0.5,
            look_ahead_turns: 0,
            thinking_time_ms: 500,
            selection_strategy: SelectionStrategy::Random,
        }
    }

    fn normal() -> Self {
        Self {
            level: DifficultyLevel::Normal,
            attack_weight: 1.0,
            defense_weight: 0.5,
            control_weight: 0.8,
            synergy_weight: 0.8,
            randomness: 0.1,
            look_ahead_turns: 0,
            thinking_time_ms: 1000,
            selection_strategy: SelectionStrategy::Balanced,
        }
    }

    fn hard() -> Self {
        Self {
            level: DifficultyLevel::Hard,
            attack_weight: 1.2,
            defense_weight: 0.8,
            control_weight: 1.0,
            synergy_weight: 1.0,
            randomness: 0.05,
            look_ahead_turns: 1,
            thinking_time_ms: 1500,
            selection_strategy: SelectionStrategy::Aggressive,
        }
    }

    fn expert() -> Self {
        Self {
            level: DifficultyLevel::Expert,
            attack_weight: 1.5,
            defense_weight: 1.0,
            control_weight: 1.2,
            synergy_weight: 1.2,
            randomness: 0.0,
            look_ahead_turns: 2,
            thinking_time_ms: 2000,
            selection_strategy: SelectionStrategy::Synergy,
        }
    }

    /// Same profile with a different noise factor
    pub fn with_randomness(mut self, randomness: f64) -> Self {
        self.randomness = randomness;
        self
    }

    /// Same profile with a different selection strategy
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selection_strategy = strategy;
        self
    }

    /// Thinking time as a duration
    pub fn thinking_time(&self) -> Duration {
        Duration::from_millis(self.thinking_time_ms)
    }

    /// Reject weights, randomness or look-ahead outside their ranges
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("attack_weight", self.attack_weight),
            ("defense_weight", self.defense_weight),
            ("control_weight", self.control_weight),
            ("synergy_weight", self.synergy_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || !(0.0..=MAX_WEIGHT).contains(&value) {
                return Err(EngineError::InvalidProfile(format!(
                    "{name} must be within 0..={MAX_WEIGHT}, got {value}"
                )));
            }
        }

        if !self.randomness.is_finite() || !(0.0..=MAX_RANDOMNESS).contains(&self.randomness) {
            return Err(EngineError::InvalidProfile(format!(
                "randomness must be within 0..={MAX_RANDOMNESS}, got {}",
                self.randomness
            )));
        }

        if self.look_ahead_turns > MAX_LOOK_AHEAD {
            return Err(EngineError::InvalidProfile(format!(
                "look_ahead_turns must be at most {MAX_LOOK_AHEAD}, got {}",
                self.look_ahead_turns
            )));
        }

        Ok(())
    }
}

/// Board and roster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSettings {
    /// Board width in tiles
    pub board_width: usize,
    /// Board height in tiles
    pub board_height: usize,
    /// Units each side fields
    pub max_characters: usize,
    /// Whether the player deploys first
    pub player_first: bool,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            board_width: DEFAULT_WIDTH,
            board_height: DEFAULT_HEIGHT,
            max_characters: 10,
            player_first: true,
        }
    }
}

impl BattleSettings {
    fn validate(&self) -> Result<()> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(EngineError::InvalidProfile(format!(
                "board must be at least 1x1, got {}x{}",
                self.board_width, self.board_height
            )));
        }
        if self.max_characters == 0 {
            return Err(EngineError::InvalidProfile(
                "max_characters must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Timing settings for turn pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Fraction of the thinking time waited at turn start and turn end
    pub turn_boundary_factor: f64,
    /// Delay after a unit is placed (ms)
    pub placement_delay: u64,
    /// Whether thinking time is waited at all
    pub enabled: bool,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            turn_boundary_factor: 0.5,
            placement_delay: 500,
            enabled: true,
        }
    }
}

impl TimingSettings {
    /// No delays at all
    pub fn instant() -> Self {
        Self {
            turn_boundary_factor: 0.0,
            placement_delay: 0,
            enabled: false,
        }
    }

    fn validate(&self) -> Result<()> {
        let factor = self.turn_boundary_factor;
        if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
            return Err(EngineError::InvalidProfile(format!(
                "turn_boundary_factor must be within 0..=1, got {}",
                factor
            )));
        }
        Ok(())
    }
}

/// Humanized variance applied to pacing delays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingSettings {
    /// Enable humanized timing
    pub humanize_timing: bool,
    /// Delay variance percentage (0-100)
    pub variance_percent: u32,
    /// Probability of an extra hesitation before a placement (0.0-1.0)
    pub hesitation_probability: f64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            humanize_timing: true,
            variance_percent: 30,
            hesitation_probability: 0.05,
        }
    }
}

impl PacingSettings {
    /// No variance (for testing)
    pub fn disabled() -> Self {
        Self {
            humanize_timing: false,
            variance_percent: 0,
            hesitation_probability: 0.0,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.variance_percent > 100 {
            return Err(EngineError::InvalidProfile(format!(
                "variance_percent must be at most 100, got {}",
                self.variance_percent
            )));
        }
        if !(0.0..=1.0).contains(&self.hesitation_probability) {
            return Err(EngineError::InvalidProfile(format!(
                "hesitation_probability must be within 0..=1, got {}",
                self.hesitation_probability
            )));
        }
        Ok(())
    }
}
