//! Combat resolution
//!
//! After deployment every alive unit strikes each alive enemy inside its
//! attack range on the same board. Strikes are simultaneous: a unit killed
//! this round still gets its own attack in.

use serde::{Deserialize, Serialize};

use super::board::{Battlefield, BoardSide};
use super::unit::UnitId;

/// A single strike during combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    pub board: BoardSide,
    pub attacker: UnitId,
    pub target: UnitId,
}

/// Outcome of one combat round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatReport {
    /// Every strike, in board then row-major attacker order
    pub strikes: Vec<Strike>,
    /// Units killed this round, without duplicates
    pub casualties: Vec<UnitId>,
}

/// Collect the strikes one board would produce, without applying them
pub fn strikes_on(field: &Battlefield, side: BoardSide) -> Vec<Strike> {
    let board = field.board(side);
    let mut strikes = Vec::new();

    for attacker in field.units_on(side) {
        let Some((_, origin)) = attacker.placement else {
            continue;
        };
        for (x, y) in attacker.threatened_from(origin) {
            let Some(target_pos) = board.checked_position(x, y) else {
                continue;
            };
            if let Some(target) = field.occupant(side, target_pos) {
                if target.is_enemy_of(attacker) {
                    strikes.push(Strike {
                        board: side,
                        attacker: attacker.id,
                        target: target.id,
                    });
                }
            }
        }
    }

    strikes
}

/// Resolve one simultaneous combat round on both boards
///
/// Casualties are marked dead but stay on their tiles; call
/// [`Battlefield::remove_dead`] to clear them.
pub fn resolve(field: &mut Battlefield) -> CombatReport {
    let mut report = CombatReport::default();

    for side in BoardSide::ALL {
        report.strikes.extend(strikes_on(field, side));
    }

    for strike in &report.strikes {
        if !report.casualties.contains(&strike.target) {
            report.casualties.push(strike.target);
        }
    }

    for id in &report.casualties {
        if let Some(unit) = field.unit_mut(*id) {
            unit.is_alive = false;
        }
    }

    log::info!(
        "Combat resolved: {} strikes, {} casualties",
        report.strikes.len(),
        report.casualties.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Position;
    use crate::game::pattern::AttackRangePattern;
    use crate::game::pattern::AttackRangePattern::{Cross, Diagonal, Line, Square};
    use crate::game::unit::{JobClass, Team, Unit, UnitTemplate};

    fn deploy(
        field: &mut Battlefield,
        team: Team,
        range: AttackRangePattern,
        side: BoardSide,
        x: usize,
        y: usize,
    ) -> UnitId {
        let id = field.next_unit_id();
        let template = UnitTemplate::new("unit", JobClass::Warrior, 10.0).with_range(range);
        field.add_unit(Unit::from_template(id, &template, team));
        field.place(id, side, Position::new(x, y)).unwrap();
        id
    }

    #[test]
    fn test_mutual_kill_is_simultaneous() {
        let mut field = Battlefield::default();
        let a = deploy(&mut field, Team::Ai, Cross, BoardSide::A, 1, 1);
        let p = deploy(&mut field, Team::Player, Cross, BoardSide::A, 2, 1);

        let report = resolve(&mut field);
        assert_eq!(report.strikes.len(), 2);
        assert!(report.casualties.contains(&a));
        assert!(report.casualties.contains(&p));
    }

    #[test]
    fn test_out_of_range_survives() {
        let mut field = Battlefield::default();
        let a = deploy(&mut field, Team::Ai, Diagonal, BoardSide::A, 0, 0);
        let p = deploy(&mut field, Team::Player, Line(1), BoardSide::A, 1, 0);

        let report = resolve(&mut field);
        assert!(report.casualties.is_empty());
        assert!(field.unit(a).unwrap().is_alive);
        assert!(field.unit(p).unwrap().is_alive);
    }

    #[test]
    fn test_boards_are_independent() {
        let mut field = Battlefield::default();
        deploy(&mut field, Team::Ai, Square(2), BoardSide::A, 2, 1);
        let p = deploy(&mut field, Team::Player, Cross, BoardSide::B, 2, 1);

        let report = resolve(&mut field);
        assert!(report.strikes.is_empty());
        assert!(field.unit(p).unwrap().is_alive);
    }

    #[test]
    fn test_allies_are_not_struck() {
        let mut field = Battlefield::default();
        deploy(&mut field, Team::Ai, Cross, BoardSide::A, 1, 1);
        deploy(&mut field, Team::Ai, Cross, BoardSide::A, 2, 1);

        assert!(strikes_on(&field, BoardSide::A).is_empty());
    }
}
