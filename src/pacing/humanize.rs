//! Humanized thinking time
//!
//! Adds realistic variance to the AI's pacing so it does not move on a
//! metronome. Pacing has its own RNG: drawing delays never shifts the
//! decision stream.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::settings::PacingSettings;

/// Hesitation range in milliseconds
const MIN_HESITATION_MS: u64 = 200;
const MAX_HESITATION_MS: u64 = 800;

/// Shortest delay a humanized pause is clamped to
const MIN_DELAY_MS: u64 = 50;

/// Pacer for generating humanized delays
#[derive(Debug, Clone)]
pub struct Pacer {
    settings: PacingSettings,
    rng: ChaCha8Rng,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(PacingSettings::default())
    }
}

impl Pacer {
    /// Create a pacer seeded from OS entropy
    pub fn new(settings: PacingSettings) -> Self {
        Self {
            settings,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a reproducible pacer
    pub fn seeded(settings: PacingSettings, seed: u64) -> Self {
        Self {
            settings,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Pacer that returns every base delay unchanged
    pub fn disabled() -> Self {
        Self::seeded(PacingSettings::disabled(), 0)
    }

    pub fn settings(&self) -> &PacingSettings {
        &self.settings
    }

    /// Thinking time before a placement: variance plus occasional hesitation
    pub fn thinking_delay(&mut self, base: Duration) -> Duration {
        if !self.settings.humanize_timing || base.is_zero() {
            return base;
        }

        let base_ms = base.as_millis() as u64;
        let mut delay = self.humanize_delay(base_ms, self.settings.variance_percent);

        if self.should_hesitate() {
            delay += self.rng.gen_range(MIN_HESITATION_MS..=MAX_HESITATION_MS);
        }

        Duration::from_millis(delay)
    }

    /// Delay with variance only (turn boundaries, post-placement)
    pub fn pause(&mut self, base: Duration) -> Duration {
        if !self.settings.humanize_timing || base.is_zero() {
            return base;
        }
        let delay = self.humanize_delay(base.as_millis() as u64, self.settings.variance_percent);
        Duration::from_millis(delay)
    }

    /// Humanize a delay with variance
    pub fn humanize_delay(&mut self, base_delay_ms: u64, variance_percent: u32) -> u64 {
        if variance_percent == 0 {
            return base_delay_ms;
        }

        let variance = (base_delay_ms as f64 * variance_percent as f64 / 100.0) as i64;
        let offset = self.rng.gen_range(-variance..=variance);

        (base_delay_ms as i64 + offset).max(MIN_DELAY_MS as i64) as u64
    }

    fn should_hesitate(&mut self) -> bool {
        self.settings.hesitation_probability > 0.0
            && self.rng.gen::<f64>() < self.settings.hesitation_probability
    }
}
