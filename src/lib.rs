//! Tile Clash - AI opponent for two-board tile occupation battles
//!
//! This library provides the core functionality for the AI side of the
//! game, including roster selection, tile placement scoring, paced turn
//! sequencing and victory evaluation.
//!
//! ## Pacing
//!
//! The `pacing` module adds humanized variance to the delays the turn
//! controller reports, so the AI does not act on a metronome. Delays are
//! returned to the host and never slept on inside the library.

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod pacing;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::{AiEvent, BattleAI, PlacementDecision, Step, TurnState};
use crate::config::{DifficultyLevel, DifficultyProfile, Settings};
use crate::game::battle::{BattlePhase, BattleSession};
use crate::game::board::{Battlefield, BoardSide, Position};
use crate::game::unit::{Team, Unit, UnitId, UnitTemplate};
use crate::game::victory::BattleResult;
use crate::pacing::Pacer;

pub use crate::error::{EngineError, Result};

/// Mixed into the session seed so pacing draws from its own stream
const PACING_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// One match against the AI
pub struct TileClash {
    pub settings: Settings,
    session: BattleSession,
    ai: BattleAI,
    rng: ChaCha8Rng,
}

impl TileClash {
    /// Create a session; the same settings and seed replay the same match
    pub fn new(settings: Settings, seed: u64) -> Result<Self> {
        settings.validate()?;

        let pacer = Pacer::seeded(settings.pacing.clone(), seed ^ PACING_STREAM);
        let ai = BattleAI::from_settings(&settings, pacer);
        let session = BattleSession::new(&settings.battle);

        log::info!(
            "New match: {}x{} boards, {:?} difficulty, seed {}",
            settings.battle.board_width,
            settings.battle.board_height,
            settings.difficulty.level,
            seed
        );

        Ok(Self {
            settings,
            session,
            ai,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn field(&self) -> &Battlefield {
        self.session.field()
    }

    pub fn ai(&self) -> &BattleAI {
        &self.ai
    }

    /// Change the AI difficulty mid-match
    pub fn set_difficulty(&mut self, level: DifficultyLevel) -> Result<()> {
        let profile = DifficultyProfile::for_level(level);
        self.ai.set_profile(profile.clone())?;
        self.settings.difficulty = profile;
        Ok(())
    }

    /// Let the AI pick and enlist its roster from `pool`
    pub fn select_ai_roster(&mut self, pool: &[UnitTemplate]) -> Result<Vec<UnitId>> {
        let units = self
            .ai
            .select_characters(pool, self.settings.battle.max_characters, &mut self.rng)?;
        self.session.enlist(Team::Ai, units)
    }

    /// Enlist the player's chosen units
    pub fn enlist_player(&mut self, templates: &[UnitTemplate]) -> Result<Vec<UnitId>> {
        let field = self.session.field_mut();
        let units: Vec<Unit> = templates
            .iter()
            .map(|t| Unit::from_template(field.next_unit_id(), t, Team::Player))
            .collect();
        self.session.enlist(Team::Player, units)
    }

    /// Close selection and start alternating deployment
    pub fn start_battle(&mut self) -> Result<()> {
        self.session.start_deployment()
    }

    /// Place a player unit on its turn
    pub fn place_player_unit(
        &mut self,
        id: UnitId,
        board: BoardSide,
        position: Position,
    ) -> Result<()> {
        self.session.deploy(id, board, position)
    }

    /// Queue the AI's next unit for a stepwise turn
    pub fn start_ai_turn(&mut self) -> Result<()> {
        if self.session.phase() != BattlePhase::Deployment {
            return Err(EngineError::WrongPhase(self.session.phase()));
        }
        if self.session.active_team() != Team::Ai {
            return Err(EngineError::NotYourTurn(self.session.active_team()));
        }

        let units: Vec<UnitId> = self.session.next_deployable(Team::Ai).into_iter().collect();
        self.ai.start_turn(&units, self.session.field());
        Ok(())
    }

    /// Advance the AI turn by one step; the host waits `delay` before the next
    pub fn tick(&mut self) -> Option<Step> {
        let step = self.ai.tick(self.session.field_mut(), &mut self.rng)?;

        if step.state == TurnState::Idle {
            if let Err(err) = self.session.end_turn(Team::Ai) {
                log::warn!("AI turn finished out of order: {}", err);
            }
        }

        Some(step)
    }

    /// Play the AI's whole turn without waiting
    pub fn run_ai_turn(&mut self) -> Result<Vec<AiEvent>> {
        self.start_ai_turn()?;

        let mut events = Vec::new();
        while let Some(step) = self.tick() {
            events.extend(step.event);
        }
        Ok(events)
    }

    /// Where the AI would put its remaining units, without committing
    pub fn preview_ai_turn(&self) -> Vec<PlacementDecision> {
        let units = self.session.field().deployable_units(Team::Ai);
        self.ai
            .evaluate_turn(&units, self.session.field(), &mut self.rng.clone())
    }

    /// Run combat once deployment is complete
    pub fn resolve_combat(&mut self) -> Result<BattleResult> {
        self.session.resolve_combat()
    }

    /// Ownership and result of the battlefield as it stands
    pub fn compute_result(&self) -> BattleResult {
        self.ai.compute_result(self.session.field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::pattern::AttackRangePattern;
    use crate::game::unit::JobClass;

    fn pool() -> Vec<UnitTemplate> {
        vec![
            UnitTemplate::new("warrior", JobClass::Warrior, 10.0),
            UnitTemplate::new("mage", JobClass::Mage, 8.0)
                .with_range(AttackRangePattern::Square(1)),
            UnitTemplate::new("archer", JobClass::Ranger, 7.0)
                .with_range(AttackRangePattern::Line(3)),
            UnitTemplate::new("knight", JobClass::Knight, 9.0)
                .with_range(AttackRangePattern::LShape),
        ]
    }

    fn small_settings(level: DifficultyLevel) -> Settings {
        let mut settings = Settings::instant(level);
        settings.battle.board_width = 3;
        settings.battle.board_height = 2;
        settings.battle.max_characters = 3;
        settings
    }

    /// Plays a full match, player taking the first empty tile each turn
    fn play(seed: u64) -> (Battlefield, BattleResult) {
        let mut game = TileClash::new(small_settings(DifficultyLevel::Hard), seed).unwrap();
        game.enlist_player(&pool()).unwrap();
        game.select_ai_roster(&pool()).unwrap();
        game.start_battle().unwrap();

        while game.session().phase() == BattlePhase::Deployment {
            match game.session().active_team() {
                Team::Player => {
                    let id = game.session().next_deployable(Team::Player).unwrap();
                    let (board, position) = game.field().empty_tiles().next().unwrap();
                    game.place_player_unit(id, board, position).unwrap();
                }
                Team::Ai => {
                    game.run_ai_turn().unwrap();
                }
            }
        }

        let field = game.field().clone();
        let result = game.resolve_combat().unwrap();
        (field, result)
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.difficulty.randomness = 0.8;
        assert!(matches!(
            TileClash::new(settings, 1),
            Err(EngineError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_full_match_completes() {
        let (field, _) = play(7);
        // Three each on two 3x2 boards
        assert_eq!(field.units().filter(|u| u.is_placed()).count(), 6);
        assert_eq!(field.empty_tiles().count(), 6);
    }

    #[test]
    fn test_match_is_reproducible() {
        assert_eq!(play(11), play(11));
    }

    #[test]
    fn test_ai_turn_out_of_order() {
        let mut game = TileClash::new(small_settings(DifficultyLevel::Normal), 3).unwrap();
        assert!(matches!(
            game.start_ai_turn(),
            Err(EngineError::WrongPhase(BattlePhase::Selection))
        ));

        game.enlist_player(&pool()).unwrap();
        game.select_ai_roster(&pool()).unwrap();
        game.start_battle().unwrap();
        assert!(matches!(
            game.start_ai_turn(),
            Err(EngineError::NotYourTurn(Team::Player))
        ));
    }

    #[test]
    fn test_preview_does_not_commit() {
        let mut game = TileClash::new(small_settings(DifficultyLevel::Normal), 5).unwrap();
        game.select_ai_roster(&pool()).unwrap();

        let before = game.field().clone();
        let preview = game.preview_ai_turn();
        assert_eq!(preview.len(), 3);
        assert_eq!(game.field(), &before);
        assert_eq!(game.preview_ai_turn(), preview);
    }

    #[test]
    fn test_stepwise_turn_hands_back() {
        let mut settings = small_settings(DifficultyLevel::Normal);
        settings.battle.player_first = false;
        let mut game = TileClash::new(settings, 9).unwrap();
        game.enlist_player(&pool()).unwrap();
        game.select_ai_roster(&pool()).unwrap();
        game.start_battle().unwrap();

        game.start_ai_turn().unwrap();
        let mut last = None;
        while let Some(step) = game.tick() {
            last = Some(step);
        }

        assert_eq!(last.map(|s| s.event), Some(Some(AiEvent::TurnEnded)));
        assert_eq!(game.session().active_team(), Team::Player);
        assert_eq!(game.session().turn(), 1);
    }
}
