//! Roster selection strategies
//!
//! Defines the named strategies the character selector can follow and the
//! sort keys they rank candidates by.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::unit::UnitTemplate;

/// Type of selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Even spread across job classes
    Balanced,
    /// Highest effective attack first
    Aggressive,
    /// Highest hp + defense first
    Defensive,
    /// Largest same-class synergy groups first
    Synergy,
    /// Reserved for opponent-read logic; currently identical to Defensive
    Counter,
    /// Uniform shuffle
    Random,
}

impl SelectionStrategy {
    /// Every strategy, in declaration order
    pub const ALL: [SelectionStrategy; 6] = [
        SelectionStrategy::Balanced,
        SelectionStrategy::Aggressive,
        SelectionStrategy::Defensive,
        SelectionStrategy::Synergy,
        SelectionStrategy::Counter,
        SelectionStrategy::Random,
    ];

    /// The strategy actually executed
    ///
    /// Counter has no opponent model yet and runs the Defensive ordering.
    pub fn effective(&self) -> SelectionStrategy {
        match self {
            SelectionStrategy::Counter => SelectionStrategy::Defensive,
            other => *other,
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionStrategy::Balanced => "balanced",
            SelectionStrategy::Aggressive => "aggressive",
            SelectionStrategy::Defensive => "defensive",
            SelectionStrategy::Synergy => "synergy",
            SelectionStrategy::Counter => "counter",
            SelectionStrategy::Random => "random",
        };
        f.write_str(name)
    }
}

/// Effective attack used by the aggressive ordering
pub fn effective_attack(template: &UnitTemplate) -> f64 {
    template.attack_power * template.job_class.attack_multiplier()
}

/// Bulk used by the defensive ordering
pub fn bulk(template: &UnitTemplate) -> f64 {
    template.hp + template.defense
}

/// Descending comparison on an f64 key (NaN sorts last)
pub fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Aggressive ordering: effective attack, then range size, both descending
pub fn aggressive_order(a: &UnitTemplate, b: &UnitTemplate) -> Ordering {
    descending(effective_attack(a), effective_attack(b))
        .then_with(|| b.attack_range.size().cmp(&a.attack_range.size()))
}

/// Defensive ordering: hp + defense descending
pub fn defensive_order(a: &UnitTemplate, b: &UnitTemplate) -> Ordering {
    descending(bulk(a), bulk(b))
}

/// Ranking-score ordering, descending
pub fn score_order(a: &UnitTemplate, b: &UnitTemplate) -> Ordering {
    descending(a.selection_score(), b.selection_score())
}
