//! Game state and logic module
//!
//! This module contains all game-related data structures and rules,
//! including boards, units, attack patterns, combat and victory.

pub mod battle;
pub mod board;
pub mod combat;
pub mod pattern;
pub mod unit;
pub mod victory;

pub use battle::{BattlePhase, BattleSession};
pub use board::{Battlefield, Board, BoardSide, Position, Tile};
pub use combat::{CombatReport, Strike};
pub use pattern::AttackRangePattern;
pub use unit::{JobClass, Team, Unit, UnitId, UnitTemplate};
pub use victory::{BattleResult, GameResult, Ownership};
