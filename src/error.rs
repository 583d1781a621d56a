//! Engine error types
//!
//! Every failure the engine can report. None of them are fatal: the turn
//! controller recovers from placement failures on its own, and the rest are
//! returned to the host as values.

use crate::game::battle::BattlePhase;
use crate::game::board::{BoardSide, Position};
use crate::game::unit::{Team, UnitId};

/// Errors produced by the AI engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Both boards are full, there is nowhere to put the unit
    #[error("no empty tile is left on either board")]
    NoLegalTile,

    /// The chosen tile was taken between evaluation and application
    #[error("tile {position} on board {board} is already occupied")]
    StaleTarget { board: BoardSide, position: Position },

    /// Character selection was asked to pick from nothing
    #[error("character pool is empty")]
    EmptyPool,

    /// A difficulty profile or setting is outside its documented range
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// A position lies outside the board
    #[error("position {position} is outside board {board}")]
    OutOfBounds { board: BoardSide, position: Position },

    /// The unit is not registered on the battlefield
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    /// The unit already occupies a tile
    #[error("unit {0} is already placed")]
    AlreadyPlaced(UnitId),

    /// Dead units cannot take a tile
    #[error("unit {0} is dead")]
    DeadUnit(UnitId),

    /// The battle is not in the phase the action needs
    #[error("not allowed during the {0:?} phase")]
    WrongPhase(BattlePhase),

    /// The other team is deploying
    #[error("it is the {0:?} team's turn")]
    NotYourTurn(Team),

    /// Settings could not be parsed or written
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, EngineError>;
