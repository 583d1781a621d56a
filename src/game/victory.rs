//! Victory evaluation
//!
//! Each board belongs to whichever team has more alive units on it. The
//! battle result then follows from the two board owners.

use serde::{Deserialize, Serialize};

use super::board::{Battlefield, BoardSide};
use super::unit::Team;

/// Owner of a single board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ownership {
    /// The player holds the majority
    Player,
    /// The AI holds the majority
    Enemy,
    /// Exactly tied (including empty)
    Neutral,
}

/// Aggregate outcome of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Victory,
    Draw,
    Defeat,
}

/// Ownership of both boards plus the aggregate result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub board_a: Ownership,
    pub board_b: Ownership,
    pub result: GameResult,
}

/// Ownership of one board by alive-occupant majority
pub fn ownership(field: &Battlefield, side: BoardSide) -> Ownership {
    let player = field.count_on(side, Team::Player);
    let ai = field.count_on(side, Team::Ai);

    match player.cmp(&ai) {
        std::cmp::Ordering::Greater => Ownership::Player,
        std::cmp::Ordering::Less => Ownership::Enemy,
        std::cmp::Ordering::Equal => Ownership::Neutral,
    }
}

/// Combine the two board owners into a game result
pub fn result(board_a: Ownership, board_b: Ownership) -> GameResult {
    match (board_a, board_b) {
        (Ownership::Player, Ownership::Player) => GameResult::Victory,
        (Ownership::Enemy, Ownership::Enemy) => GameResult::Defeat,
        _ => GameResult::Draw,
    }
}

/// Evaluate the current battlefield
pub fn evaluate(field: &Battlefield) -> BattleResult {
    let board_a = ownership(field, BoardSide::A);
    let board_b = ownership(field, BoardSide::B);

    BattleResult {
        board_a,
        board_b,
        result: result(board_a, board_b),
    }
}
