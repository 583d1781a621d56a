//! Board and battlefield state
//!
//! Two fixed-size boards (A and B) are contested in every battle. The
//! `Battlefield` owns both boards together with the units in play, and is
//! the only place tiles and unit placements are mutated.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::unit::{Team, Unit, UnitId};
use crate::error::{EngineError, Result};

/// Default board width (tiles)
pub const DEFAULT_WIDTH: usize = 6;
/// Default board height (tiles)
pub const DEFAULT_HEIGHT: usize = 3;

/// Which of the two boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoardSide {
    A,
    B,
}

impl BoardSide {
    /// Both sides in enumeration order
    pub const ALL: [BoardSide; 2] = [BoardSide::A, BoardSide::B];

    /// Index into the board pair
    pub fn index(&self) -> usize {
        match self {
            BoardSide::A => 0,
            BoardSide::B => 1,
        }
    }
}

impl fmt::Display for BoardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardSide::A => write!(f, "A"),
            BoardSide::B => write!(f, "B"),
        }
    }
}

/// Tile coordinates on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to another position
    pub fn distance(&self, other: Position) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single tile
///
/// Occupant and team are always set and cleared together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    position: Position,
    occupant: Option<UnitId>,
    occupant_team: Option<Team>,
}

impl Tile {
    fn new(position: Position) -> Self {
        Self {
            position,
            occupant: None,
            occupant_team: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    pub fn occupant_team(&self) -> Option<Team> {
        self.occupant_team
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// One grid of tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    side: BoardSide,
    width: usize,
    height: usize,
    /// Row-major tiles
    tiles: Vec<Tile>,
}

impl Board {
    /// Create an empty board
    pub fn new(side: BoardSide, width: usize, height: usize) -> Self {
        let mut tiles = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::new(Position::new(x, y)));
            }
        }
        Self {
            side,
            width,
            height,
            tiles,
        }
    }

    pub fn side(&self) -> BoardSide {
        self.side
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if a position is on the board
    pub fn in_bounds(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Convert signed coordinates into an on-board position
    pub fn checked_position(&self, x: i32, y: i32) -> Option<Position> {
        if x < 0 || y < 0 {
            return None;
        }
        let position = Position::new(x as usize, y as usize);
        self.in_bounds(position).then_some(position)
    }

    /// Get a tile by position
    pub fn tile(&self, position: Position) -> Option<&Tile> {
        if !self.in_bounds(position) {
            return None;
        }
        self.tiles.get(position.y * self.width + position.x)
    }

    fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        if !self.in_bounds(position) {
            return None;
        }
        self.tiles.get_mut(position.y * self.width + position.x)
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Empty tiles in row-major order
    pub fn empty_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| t.is_empty())
    }

    /// Occupied tiles in row-major order
    pub fn occupied_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| !t.is_empty())
    }

    /// Check if no tile is free
    pub fn is_full(&self) -> bool {
        self.tiles.iter().all(|t| !t.is_empty())
    }

    /// Check if the position is a corner tile
    pub fn is_corner(&self, position: Position) -> bool {
        (position.x == 0 || position.x + 1 == self.width)
            && (position.y == 0 || position.y + 1 == self.height)
    }

    /// Check if the position is the exact centre tile
    pub fn is_center(&self, position: Position) -> bool {
        position.x == self.width / 2 && position.y == self.height / 2
    }

    /// Positions within a chebyshev radius of `center`, excluding it
    pub fn neighbours(
        &self,
        center: Position,
        radius: usize,
    ) -> impl Iterator<Item = Position> + '_ {
        let r = radius as i32;
        let (cx, cy) = (center.x as i32, center.y as i32);
        (-r..=r)
            .flat_map(move |dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .filter_map(move |(dx, dy)| self.checked_position(cx + dx, cy + dy))
    }

    fn place(&mut self, position: Position, unit: UnitId, team: Team) -> Result<()> {
        let side = self.side;
        let tile = self
            .tile_mut(position)
            .ok_or(EngineError::OutOfBounds { board: side, position })?;
        if !tile.is_empty() {
            return Err(EngineError::StaleTarget { board: side, position });
        }
        tile.occupant = Some(unit);
        tile.occupant_team = Some(team);
        Ok(())
    }

    fn clear(&mut self, position: Position) -> Option<UnitId> {
        let tile = self.tile_mut(position)?;
        tile.occupant_team = None;
        tile.occupant.take()
    }
}

/// Both boards plus the units in play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battlefield {
    boards: [Board; 2],
    units: BTreeMap<UnitId, Unit>,
    next_id: u32,
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Battlefield {
    /// Create a battlefield with two empty boards of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            boards: [
                Board::new(BoardSide::A, width, height),
                Board::new(BoardSide::B, width, height),
            ],
            units: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Get a board by side
    pub fn board(&self, side: BoardSide) -> &Board {
        &self.boards[side.index()]
    }

    /// Both boards, A first
    pub fn boards(&self) -> &[Board; 2] {
        &self.boards
    }

    /// Allocate a fresh unit id
    pub fn next_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a unit (unplaced) and return its id
    ///
    /// An id already in use, or one with no successor, is replaced by a
    /// fresh one.
    pub fn add_unit(&mut self, mut unit: Unit) -> UnitId {
        if self.units.contains_key(&unit.id) {
            unit.id = self.next_unit_id();
        } else if unit.id.0 >= self.next_id {
            match unit.id.0.checked_add(1) {
                Some(next) => self.next_id = next,
                None => unit.id = self.next_unit_id(),
            }
        }
        unit.placement = None;
        let id = unit.id;
        self.units.insert(id, unit);
        id
    }

    /// Get a unit by id
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable unit by id
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// All registered units
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Units of one team that are still waiting to be deployed
    pub fn deployable_units(&self, team: Team) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.team == team && u.is_deployable())
            .map(|u| u.id)
            .collect()
    }

    /// The alive unit standing on a tile, if any
    pub fn occupant(&self, side: BoardSide, position: Position) -> Option<&Unit> {
        self.board(side)
            .tile(position)?
            .occupant()
            .and_then(|id| self.units.get(&id))
            .filter(|u| u.is_alive)
    }

    /// Alive units standing on a board, in row-major tile order
    pub fn units_on(&self, side: BoardSide) -> impl Iterator<Item = &Unit> {
        self.board(side)
            .occupied_tiles()
            .filter_map(|t| t.occupant().and_then(|id| self.units.get(&id)))
            .filter(|u| u.is_alive)
    }

    /// Count alive units of a team on a board
    pub fn count_on(&self, side: BoardSide, team: Team) -> usize {
        self.units_on(side).filter(|u| u.team == team).count()
    }

    /// Check if both boards are full
    pub fn is_full(&self) -> bool {
        self.boards.iter().all(Board::is_full)
    }

    /// Empty tiles of both boards: A before B, row-major
    pub fn empty_tiles(&self) -> impl Iterator<Item = (BoardSide, Position)> + '_ {
        self.boards
            .iter()
            .flat_map(|b| b.empty_tiles().map(move |t| (b.side(), t.position())))
    }

    /// Put a registered, alive unit on a tile
    pub fn place(&mut self, id: UnitId, side: BoardSide, position: Position) -> Result<()> {
        let unit = self.units.get(&id).ok_or(EngineError::UnknownUnit(id))?;
        if !unit.is_alive {
            return Err(EngineError::DeadUnit(id));
        }
        if unit.is_placed() {
            return Err(EngineError::AlreadyPlaced(id));
        }
        let team = unit.team;
        self.boards[side.index()].place(position, id, team)?;
        if let Some(unit) = self.units.get_mut(&id) {
            unit.placement = Some((side, position));
        }
        Ok(())
    }

    /// Take a unit off its tile, keeping it registered
    pub fn lift(&mut self, id: UnitId) -> Result<()> {
        let unit = self.units.get_mut(&id).ok_or(EngineError::UnknownUnit(id))?;
        if let Some((side, position)) = unit.placement.take() {
            self.boards[side.index()].clear(position);
        }
        Ok(())
    }

    /// Unregister a unit, clearing its tile
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if let Some((side, position)) = unit.placement {
            self.boards[side.index()].clear(position);
        }
        Some(unit)
    }

    /// Mark a unit dead without removing it yet
    pub fn kill(&mut self, id: UnitId) -> Result<()> {
        let unit = self.units.get_mut(&id).ok_or(EngineError::UnknownUnit(id))?;
        unit.is_alive = false;
        Ok(())
    }

    /// Remove every dead unit from boards and registry
    pub fn remove_dead(&mut self) -> Vec<Unit> {
        let dead: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| !u.is_alive)
            .map(|u| u.id)
            .collect();
        dead.into_iter().filter_map(|id| self.remove_unit(id)).collect()
    }

    /// Reset both boards and drop every unit
    pub fn clear(&mut self) {
        let (width, height) = (self.boards[0].width(), self.boards[0].height());
        *self = Self::new(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::unit::{JobClass, UnitTemplate};

    fn unit(field: &mut Battlefield, team: Team) -> UnitId {
        let id = field.next_unit_id();
        let template = UnitTemplate::new("soldier", JobClass::Warrior, 10.0);
        field.add_unit(Unit::from_template(id, &template, team))
    }

    #[test]
    fn test_board_layout() {
        let board = Board::new(BoardSide::A, 6, 3);
        assert_eq!(board.tiles().count(), 18);
        assert!(board.is_corner(Position::new(0, 0)));
        assert!(board.is_corner(Position::new(5, 2)));
        assert!(!board.is_corner(Position::new(3, 0)));
        assert!(board.is_center(Position::new(3, 1)));
        assert_eq!(board.checked_position(-1, 0), None);
        assert_eq!(board.checked_position(6, 0), None);
        assert_eq!(board.checked_position(5, 2), Some(Position::new(5, 2)));
    }

    #[test]
    fn test_neighbours_clip_to_board() {
        let board = Board::new(BoardSide::A, 6, 3);
        assert_eq!(board.neighbours(Position::new(0, 0), 1).count(), 3);
        assert_eq!(board.neighbours(Position::new(2, 1), 1).count(), 8);
    }

    #[test]
    fn test_place_and_stale_target() {
        let mut field = Battlefield::default();
        let a = unit(&mut field, Team::Ai);
        let b = unit(&mut field, Team::Player);

        field.place(a, BoardSide::A, Position::new(1, 1)).unwrap();
        let tile = field.board(BoardSide::A).tile(Position::new(1, 1)).unwrap();
        assert_eq!(tile.occupant(), Some(a));
        assert_eq!(tile.occupant_team(), Some(Team::Ai));

        let err = field.place(b, BoardSide::A, Position::new(1, 1)).unwrap_err();
        assert!(matches!(err, EngineError::StaleTarget { .. }));
        assert!(!field.unit(b).unwrap().is_placed());

        let err = field.place(a, BoardSide::B, Position::new(0, 0)).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyPlaced(_)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut field = Battlefield::default();
        let a = unit(&mut field, Team::Ai);
        let err = field.place(a, BoardSide::B, Position::new(6, 0)).unwrap_err();
        assert!(matches!(err, EngineError::OutOfBounds { .. }));
    }

    #[test]
    fn test_empty_tile_order() {
        let mut field = Battlefield::new(2, 2);
        let a = unit(&mut field, Team::Ai);
        field.place(a, BoardSide::A, Position::new(0, 0)).unwrap();

        let empty: Vec<_> = field.empty_tiles().collect();
        assert_eq!(empty.len(), 7);
        assert_eq!(empty[0], (BoardSide::A, Position::new(1, 0)));
        assert_eq!(empty[3], (BoardSide::B, Position::new(0, 0)));
    }

    #[test]
    fn test_remove_dead_clears_tiles() {
        let mut field = Battlefield::default();
        let a = unit(&mut field, Team::Ai);
        let b = unit(&mut field, Team::Player);
        field.place(a, BoardSide::A, Position::new(0, 0)).unwrap();
        field.place(b, BoardSide::A, Position::new(1, 0)).unwrap();

        field.kill(b).unwrap();
        assert_eq!(field.count_on(BoardSide::A, Team::Player), 0);

        let removed = field.remove_dead();
        assert_eq!(removed.len(), 1);
        assert!(field.unit(b).is_none());
        assert!(field.board(BoardSide::A).tile(Position::new(1, 0)).unwrap().is_empty());
        assert_eq!(field.count_on(BoardSide::A, Team::Ai), 1);
    }

    #[test]
    fn test_dead_unit_cannot_be_placed() {
        let mut field = Battlefield::default();
        let a = unit(&mut field, Team::Ai);
        field.kill(a).unwrap();

        let err = field.place(a, BoardSide::A, Position::new(0, 0)).unwrap_err();
        assert!(matches!(err, EngineError::DeadUnit(id) if id == a));
        assert_eq!(field.empty_tiles().count(), 36);
    }

    #[test]
    fn test_lift_keeps_unit_registered() {
        let mut field = Battlefield::default();
        let a = unit(&mut field, Team::Ai);
        field.place(a, BoardSide::B, Position::new(2, 1)).unwrap();

        field.lift(a).unwrap();
        assert!(!field.unit(a).unwrap().is_placed());
        assert!(field.board(BoardSide::B).tile(Position::new(2, 1)).unwrap().is_empty());

        // Free to go down again somewhere else
        field.place(a, BoardSide::A, Position::new(0, 0)).unwrap();
        assert!(matches!(field.lift(UnitId(99)), Err(EngineError::UnknownUnit(_))));
    }

    #[test]
    fn test_clear_keeps_dimensions() {
        let mut field = Battlefield::new(4, 2);
        let a = unit(&mut field, Team::Ai);
        field.place(a, BoardSide::A, Position::new(3, 1)).unwrap();

        field.clear();
        assert_eq!(field.units().count(), 0);
        assert_eq!(field.empty_tiles().count(), 16);
        for (board, side) in field.boards().iter().zip(BoardSide::ALL) {
            assert_eq!(board.side(), side);
            assert_eq!((board.width(), board.height()), (4, 2));
        }
    }

    #[test]
    fn test_chebyshev_distance() {
        let origin = Position::new(1, 1);
        assert_eq!(origin.distance(origin), 0);
        assert_eq!(origin.distance(Position::new(3, 2)), 2);
        assert_eq!(Position::new(5, 0).distance(origin), 4);
    }

    #[test]
    fn test_add_unit_id_allocation() {
        let template = UnitTemplate::new("soldier", JobClass::Warrior, 10.0);
        let mut field = Battlefield::default();

        let high = field.add_unit(Unit::from_template(UnitId(10), &template, Team::Ai));
        assert_eq!(high, UnitId(10));
        assert_eq!(field.next_unit_id(), UnitId(11));

        let clash = field.add_unit(Unit::from_template(UnitId(10), &template, Team::Player));
        assert_ne!(clash, UnitId(10));

        // No room above the last id, a fresh one is handed out
        let max = field.add_unit(Unit::from_template(UnitId(u32::MAX), &template, Team::Ai));
        assert_eq!(max, UnitId(13));
        assert_eq!(field.units().count(), 3);
    }

    #[test]
    fn test_full_detection() {
        let mut field = Battlefield::new(1, 1);
        let a = unit(&mut field, Team::Ai);
        let b = unit(&mut field, Team::Player);
        field.place(a, BoardSide::A, Position::new(0, 0)).unwrap();
        assert!(!field.is_full());
        field.place(b, BoardSide::B, Position::new(0, 0)).unwrap();
        assert!(field.is_full());
        assert_eq!(field.empty_tiles().count(), 0);
    }
}
