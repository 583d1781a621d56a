//! Battle session tracking
//!
//! Manages one match from roster selection to the final result: both teams
//! enlist their units, then take turns deploying one unit at a time, then a
//! single combat round decides who holds each board.

use serde::{Deserialize, Serialize};

use super::board::{Battlefield, BoardSide, Position};
use super::combat::{self, CombatReport};
use super::unit::{Team, Unit, UnitId};
use super::victory::{self, BattleResult};
use crate::config::settings::BattleSettings;
use crate::error::{EngineError, Result};

/// Current phase of the battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Teams are enlisting units
    Selection,
    /// Teams alternate placing units
    Deployment,
    /// Everything is deployed, combat pending
    Combat,
    /// Result is final
    Finished,
}

/// Complete state of one match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSession {
    /// Current battle phase
    phase: BattlePhase,
    /// Boards and units
    field: Battlefield,
    /// Team whose deployment turn it is
    active: Team,
    /// Team that deploys first
    first: Team,
    /// Units each team may enlist
    max_characters: usize,
    /// Deployment turns taken so far
    turn: u32,
    /// Combat outcome, once resolved
    report: Option<CombatReport>,
    /// Final result, once resolved
    result: Option<BattleResult>,
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new(&BattleSettings::default())
    }
}

impl BattleSession {
    /// Create a session in the selection phase
    pub fn new(settings: &BattleSettings) -> Self {
        let first = if settings.player_first { Team::Player } else { Team::Ai };
        Self {
            phase: BattlePhase::Selection,
            field: Battlefield::new(settings.board_width, settings.board_height),
            active: first,
            first,
            max_characters: settings.max_characters,
            turn: 0,
            report: None,
            result: None,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn field(&self) -> &Battlefield {
        &self.field
    }

    /// Direct battlefield access, bypassing turn order
    pub fn field_mut(&mut self) -> &mut Battlefield {
        &mut self.field
    }

    /// Team expected to deploy next
    pub fn active_team(&self) -> Team {
        self.active
    }

    /// Deployment turns taken so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn combat_report(&self) -> Option<&CombatReport> {
        self.report.as_ref()
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    /// Units a team has enlisted
    pub fn roster(&self, team: Team) -> Vec<UnitId> {
        self.field
            .units()
            .filter(|u| u.team == team)
            .map(|u| u.id)
            .collect()
    }

    /// Next unit of `team` waiting for a tile, lowest id first
    pub fn next_deployable(&self, team: Team) -> Option<UnitId> {
        self.field.deployable_units(team).into_iter().next()
    }

    /// Enlist units for a team; extras beyond the roster limit are dropped
    pub fn enlist(&mut self, team: Team, units: Vec<Unit>) -> Result<Vec<UnitId>> {
        self.expect_phase(BattlePhase::Selection)?;

        let free = self.max_characters.saturating_sub(self.roster(team).len());
        if units.len() > free {
            log::warn!(
                "{:?} roster is limited to {}, dropping {} unit(s)",
                team,
                self.max_characters,
                units.len() - free
            );
        }

        let ids = units
            .into_iter()
            .take(free)
            .map(|mut unit| {
                unit.team = team;
                self.field.add_unit(unit)
            })
            .collect();
        Ok(ids)
    }

    /// Close selection and hand the first turn to the starting team
    pub fn start_deployment(&mut self) -> Result<()> {
        self.expect_phase(BattlePhase::Selection)?;
        self.phase = BattlePhase::Deployment;
        self.active = self.first;
        log::info!("Deployment started, {:?} goes first", self.active);
        self.advance();
        Ok(())
    }

    /// Place a unit of the active team and pass the turn
    pub fn deploy(&mut self, id: UnitId, board: BoardSide, position: Position) -> Result<()> {
        self.expect_phase(BattlePhase::Deployment)?;
        let team = self.field.unit(id).ok_or(EngineError::UnknownUnit(id))?.team;
        if team != self.active {
            return Err(EngineError::NotYourTurn(self.active));
        }

        self.field.place(id, board, position)?;
        log::info!("{:?} deployed {} on board {} at {}", team, id, board, position);
        self.end_turn(team)
    }

    /// Pass the turn after `team` has acted on the battlefield directly
    pub fn end_turn(&mut self, team: Team) -> Result<()> {
        self.expect_phase(BattlePhase::Deployment)?;
        if team != self.active {
            return Err(EngineError::NotYourTurn(self.active));
        }

        self.turn += 1;
        self.active = team.opponent();
        self.advance();
        Ok(())
    }

    /// Skip teams with nothing left to deploy; enter combat when nobody can
    fn advance(&mut self) {
        let can_deploy = |team: Team| !self.field.deployable_units(team).is_empty();
        let done = self.field.is_full() || (!can_deploy(Team::Player) && !can_deploy(Team::Ai));

        if done {
            log::info!("Deployment complete after {} turn(s)", self.turn);
            self.phase = BattlePhase::Combat;
        } else if !can_deploy(self.active) {
            self.active = self.active.opponent();
        }
    }

    /// Run the combat round and settle the result
    pub fn resolve_combat(&mut self) -> Result<BattleResult> {
        self.expect_phase(BattlePhase::Combat)?;

        let report = combat::resolve(&mut self.field);
        self.field.remove_dead();
        let result = victory::evaluate(&self.field);

        log::info!(
            "Battle finished: board A {:?}, board B {:?}, {:?}",
            result.board_a,
            result.board_b,
            result.result
        );

        self.report = Some(report);
        self.result = Some(result);
        self.phase = BattlePhase::Finished;
        Ok(result)
    }

    fn expect_phase(&self, phase: BattlePhase) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(EngineError::WrongPhase(self.phase))
        }
    }
}
