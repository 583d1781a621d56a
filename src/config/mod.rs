//! Configuration module
//!
//! Handles difficulty profiles, battle sizes and pacing preferences.

pub mod settings;

pub use settings::{
    BattleSettings, DifficultyLevel, DifficultyProfile, PacingSettings, Settings, TimingSettings,
};
