//! Unit data structures
//!
//! Represents combatants in battle: the roster templates they are created
//! from, their job class, and their placement on the boards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{BoardSide, Position};
use super::pattern::AttackRangePattern;

/// Unique identifier of a unit in a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The human player
    Player = 0,
    /// The AI opponent
    Ai = 1,
}

impl Team {
    /// The opposing team
    pub fn opponent(&self) -> Team {
        match self {
            Team::Player => Team::Ai,
            Team::Ai => Team::Player,
        }
    }
}

/// Job class types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobClass {
    Warrior,
    Knight,
    Mage,
    Priest,
    Assassin,
    Ranger,
    Sage,
    Gunner,
}

impl JobClass {
    /// Attack stat multiplier of this class
    pub fn attack_multiplier(&self) -> f64 {
        match self {
            JobClass::Warrior => 1.2,
            JobClass::Knight => 0.9,
            JobClass::Mage => 0.5,
            JobClass::Priest => 0.5,
            JobClass::Assassin => 1.4,
            JobClass::Ranger => 1.0,
            JobClass::Sage => 1.0,
            JobClass::Gunner => 1.5,
        }
    }

    /// Check if this class has the upper hand against `other`
    pub fn counters(&self, other: JobClass) -> bool {
        use JobClass::*;

        matches!(
            (self, other),
            (Assassin, Mage)
                | (Assassin, Priest)
                | (Warrior, Assassin)
                | (Knight, Warrior)
                | (Mage, Knight)
        )
    }

    /// Check if this class fights from a distance
    pub fn is_ranged(&self) -> bool {
        matches!(self, JobClass::Ranger | JobClass::Mage | JobClass::Sage)
    }

    /// Check if two classes cover each other's weaknesses
    ///
    /// Tank + healer, or one melee with one ranged.
    pub fn is_complementary(&self, other: JobClass) -> bool {
        use JobClass::*;

        if matches!((self, other), (Knight, Priest) | (Priest, Knight)) {
            return true;
        }
        self.is_ranged() != other.is_ranged()
    }
}

/// A roster entry units are created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    /// Template ID (from game data)
    pub id: String,
    /// Display name
    pub name: String,
    /// Job class
    pub job_class: JobClass,
    /// Base attack power
    pub attack_power: f64,
    /// Hit points
    pub hp: f64,
    /// Defense
    pub defense: f64,
    /// Attack range pattern
    pub attack_range: AttackRangePattern,
    /// Whether the unit takes part in job synergies
    #[serde(default)]
    pub has_synergy: bool,
}

impl UnitTemplate {
    /// Create a template with class-typical stats
    pub fn new(id: impl Into<String>, job_class: JobClass, attack_power: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            job_class,
            attack_power,
            hp: 100.0,
            defense: 10.0,
            attack_range: AttackRangePattern::Cross,
            has_synergy: false,
        }
    }

    /// Set the attack range
    pub fn with_range(mut self, attack_range: AttackRangePattern) -> Self {
        self.attack_range = attack_range;
        self
    }

    /// Set hp and defense
    pub fn with_bulk(mut self, hp: f64, defense: f64) -> Self {
        self.hp = hp;
        self.defense = defense;
        self
    }

    /// Mark the template as synergy-capable
    pub fn with_synergy(mut self) -> Self {
        self.has_synergy = true;
        self
    }

    /// Ranking score used by the selection strategies
    pub fn selection_score(&self) -> f64 {
        self.attack_power
            + 2.0 * self.attack_range.size() as f64
            + self.attack_range.uniqueness_score()
    }
}

/// A unit in battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit ID
    pub id: UnitId,
    /// Template ID this unit was created from
    pub template_id: String,
    /// Display name
    pub name: String,
    /// Owning team
    pub team: Team,
    /// Job class
    pub job_class: JobClass,
    /// Base attack power
    pub attack_power: f64,
    /// Hit points
    pub hp: f64,
    /// Defense
    pub defense: f64,
    /// Attack range pattern
    pub attack_range: AttackRangePattern,
    /// Whether the unit takes part in job synergies
    pub has_synergy: bool,
    /// Whether the unit is alive
    pub is_alive: bool,
    /// Tile the unit stands on, if placed
    pub placement: Option<(BoardSide, Position)>,
}

impl Unit {
    /// Create a unit from a roster template
    pub fn from_template(id: UnitId, template: &UnitTemplate, team: Team) -> Self {
        Self {
            id,
            template_id: template.id.clone(),
            name: template.name.clone(),
            team,
            job_class: template.job_class,
            attack_power: template.attack_power,
            hp: template.hp,
            defense: template.defense,
            attack_range: template.attack_range,
            has_synergy: template.has_synergy,
            is_alive: true,
            placement: None,
        }
    }

    /// Check if the unit stands on a tile
    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    /// Check if the unit can still be deployed
    pub fn is_deployable(&self) -> bool {
        self.is_alive && !self.is_placed()
    }

    /// Check if `other` is on the opposing team
    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        self.team != other.team
    }

    /// Absolute positions this unit would threaten from `origin`
    ///
    /// Positions may fall outside the board; callers filter them.
    pub fn threatened_from(&self, origin: Position) -> impl Iterator<Item = (i32, i32)> {
        let (ox, oy) = (origin.x as i32, origin.y as i32);
        self.attack_range
            .offsets()
            .into_iter()
            .map(move |(dx, dy)| (ox + dx, oy + dy))
    }

    /// Check if this unit, standing at `origin`, threatens `target`
    pub fn threatens(&self, origin: Position, target: Position) -> bool {
        let offset = (
            target.x as i32 - origin.x as i32,
            target.y as i32 - origin.y as i32,
        );
        self.attack_range.covers(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_table_is_asymmetric() {
        assert!(JobClass::Assassin.counters(JobClass::Mage));
        assert!(JobClass::Assassin.counters(JobClass::Priest));
        assert!(JobClass::Warrior.counters(JobClass::Assassin));
        assert!(!JobClass::Assassin.counters(JobClass::Warrior));
        assert!(JobClass::Knight.counters(JobClass::Warrior));
        assert!(JobClass::Mage.counters(JobClass::Knight));
        assert!(!JobClass::Priest.counters(JobClass::Knight));
    }

    #[test]
    fn test_complementary_classes() {
        assert!(JobClass::Knight.is_complementary(JobClass::Priest));
        assert!(JobClass::Warrior.is_complementary(JobClass::Ranger));
        assert!(!JobClass::Warrior.is_complementary(JobClass::Knight));
        assert!(!JobClass::Mage.is_complementary(JobClass::Sage));
    }

    #[test]
    fn test_selection_score() {
        let template = UnitTemplate::new("mage", JobClass::Mage, 8.0)
            .with_range(AttackRangePattern::Square(1));
        // 8 + 2 * 8 + 15
        assert_eq!(template.selection_score(), 39.0);
    }

    #[test]
    fn test_unit_from_template() {
        let template = UnitTemplate::new("knight", JobClass::Knight, 9.0).with_synergy();
        let unit = Unit::from_template(UnitId(3), &template, Team::Ai);
        assert_eq!(unit.team, Team::Ai);
        assert!(unit.has_synergy);
        assert!(unit.is_deployable());
        assert!(!unit.is_placed());
    }

    #[test]
    fn test_threatens() {
        let template = UnitTemplate::new("archer", JobClass::Ranger, 7.0)
            .with_range(AttackRangePattern::Line(3));
        let unit = Unit::from_template(UnitId(1), &template, Team::Ai);
        assert!(unit.threatens(Position::new(2, 0), Position::new(2, 1)));
        assert!(!unit.threatens(Position::new(2, 2), Position::new(2, 1)));
    }
}
