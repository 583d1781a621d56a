//! Battle AI decision engine
//!
//! Handles roster selection, tile placement and turn sequencing for the
//! AI side of a battle.

pub mod character_selector;
pub mod placement;
pub mod strategy;
pub mod turn;

use rand::Rng;

use crate::config::settings::{DifficultyProfile, Settings, TimingSettings};
use crate::error::Result;
use crate::game::board::{Battlefield, BoardSide, Position};
use crate::game::unit::{Team, Unit, UnitId, UnitTemplate};
use crate::game::victory::{self, BattleResult};
use crate::pacing::Pacer;

pub use character_selector::CharacterSelector;
pub use placement::{PlacementDecision, PlacementEvaluator, ScoreBreakdown};
pub use strategy::SelectionStrategy;
pub use turn::{AiEvent, SkipReason, Step, TurnController, TurnState, MAX_REQUEUES};

/// Main battle AI that coordinates all decision-making
#[derive(Debug, Clone)]
pub struct BattleAI {
    /// Roster selection engine
    selector: CharacterSelector,
    /// Tile scoring engine
    evaluator: PlacementEvaluator,
    /// Turn sequencing state machine
    controller: TurnController,
    /// Current difficulty
    profile: DifficultyProfile,
}

impl BattleAI {
    /// Create a battle AI for a difficulty
    pub fn new(profile: DifficultyProfile, timings: TimingSettings, pacer: Pacer) -> Self {
        Self {
            selector: CharacterSelector::new(),
            evaluator: PlacementEvaluator::new(),
            controller: TurnController::new(profile.clone(), timings, pacer),
            profile,
        }
    }

    /// Create a battle AI from full settings
    pub fn from_settings(settings: &Settings, pacer: Pacer) -> Self {
        Self::new(settings.difficulty.clone(), settings.timings.clone(), pacer)
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Switch difficulty; takes effect from the next evaluation
    pub fn set_profile(&mut self, profile: DifficultyProfile) -> Result<()> {
        profile.validate()?;
        log::info!("AI difficulty set to {:?}", profile.level);
        self.controller.set_profile(profile.clone());
        self.profile = profile;
        Ok(())
    }

    /// Pick the AI roster with the profile's selection strategy
    pub fn select_characters<R: Rng + ?Sized>(
        &self,
        pool: &[UnitTemplate],
        max_count: usize,
        rng: &mut R,
    ) -> Result<Vec<Unit>> {
        let strategy = self.profile.selection_strategy;
        self.selector.select(pool, max_count, strategy, Team::Ai, rng)
    }

    /// Decide placements for `units` without touching `field`
    ///
    /// Each decision is applied to a scratch copy so later units see earlier
    /// ones. Units that are not deployable or find no tile are left out.
    pub fn evaluate_turn<R: Rng + ?Sized>(
        &self,
        units: &[UnitId],
        field: &Battlefield,
        rng: &mut R,
    ) -> Vec<PlacementDecision> {
        let mut scratch = field.clone();
        let mut decisions = Vec::with_capacity(units.len());

        for &id in units {
            let Some(unit) = scratch.unit(id).filter(|u| u.is_deployable()) else {
                continue;
            };
            let best = self.evaluator.best_position(unit, &scratch, &self.profile, rng);
            let Some(decision) = best else {
                continue;
            };
            if scratch.place(id, decision.board, decision.position).is_ok() {
                decisions.push(decision);
            }
        }

        decisions
    }

    /// Begin a stepwise turn for `units`
    pub fn start_turn(&mut self, units: &[UnitId], field: &Battlefield) {
        self.controller.start_turn(units, field);
    }

    /// Advance the turn in flight by one step
    pub fn tick<R: Rng + ?Sized>(&mut self, field: &mut Battlefield, rng: &mut R) -> Option<Step> {
        self.controller.tick(field, rng)
    }

    /// Run the turn in flight to completion
    pub fn run_turn<R: Rng + ?Sized>(
        &mut self,
        field: &mut Battlefield,
        rng: &mut R,
    ) -> Vec<AiEvent> {
        self.controller.run_turn(field, rng)
    }

    /// Abandon the turn in flight
    pub fn cancel_turn(&mut self) {
        self.controller.cancel();
    }

    pub fn turn_state(&self) -> TurnState {
        self.controller.state()
    }

    /// Board ownership and result for the current battlefield
    pub fn compute_result(&self, field: &Battlefield) -> BattleResult {
        victory::evaluate(field)
    }

    /// Score breakdown for every empty tile, best first
    pub fn explain(
        &self,
        unit: &Unit,
        field: &Battlefield,
    ) -> Vec<(BoardSide, Position, ScoreBreakdown)> {
        self.evaluator.rank_positions(unit, field, &self.profile)
    }
}

impl Default for BattleAI {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), Pacer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DifficultyLevel;
    use crate::game::unit::JobClass;
    use crate::game::victory::GameResult;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn instant_ai(level: DifficultyLevel) -> BattleAI {
        BattleAI::from_settings(&Settings::instant(level), Pacer::disabled())
    }

    fn enlist(
        field: &mut Battlefield,
        ai: &BattleAI,
        count: usize,
        rng: &mut ChaCha8Rng,
    ) -> Vec<UnitId> {
        let pool: Vec<UnitTemplate> = (0..count)
            .map(|i| {
                let power = 10.0 + i as f64;
                UnitTemplate::new(format!("unit_{i}"), JobClass::Warrior, power)
            })
            .collect();
        ai.select_characters(&pool, count, rng)
            .unwrap()
            .into_iter()
            .map(|unit| field.add_unit(unit))
            .collect()
    }

    #[test]
    fn test_select_uses_profile_strategy() {
        let ai = instant_ai(DifficultyLevel::Hard);
        let pool = vec![
            UnitTemplate::new("weak", JobClass::Warrior, 5.0),
            UnitTemplate::new("strong", JobClass::Assassin, 12.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let units = ai.select_characters(&pool, 1, &mut rng).unwrap();
        assert_eq!(units[0].template_id, "strong");
        assert_eq!(units[0].team, Team::Ai);
    }

    #[test]
    fn test_evaluate_turn_is_speculative() {
        let ai = instant_ai(DifficultyLevel::Normal);
        let mut field = Battlefield::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let ids = enlist(&mut field, &ai, 3, &mut rng);
        let before = field.clone();

        let decisions = ai.evaluate_turn(&ids, &field, &mut rng);
        assert_eq!(decisions.len(), 3);
        assert_eq!(field, before);

        let mut tiles: Vec<(BoardSide, Position)> =
            decisions.iter().map(|d| (d.board, d.position)).collect();
        tiles.sort();
        tiles.dedup();
        assert_eq!(tiles.len(), 3);
    }

    #[test]
    fn test_evaluate_matches_run_turn() {
        let ai = instant_ai(DifficultyLevel::Expert);
        let mut field = Battlefield::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let ids = enlist(&mut field, &ai, 4, &mut rng);

        let planned = ai.evaluate_turn(&ids, &field, &mut ChaCha8Rng::seed_from_u64(9));

        let mut ai = ai;
        ai.start_turn(&ids, &field);
        let events = ai.run_turn(&mut field, &mut ChaCha8Rng::seed_from_u64(9));
        let placed: Vec<(UnitId, BoardSide, Position)> = events
            .iter()
            .filter_map(|e| match *e {
                AiEvent::UnitPlaced {
                    unit_id,
                    board,
                    position,
                } => Some((unit_id, board, position)),
                _ => None,
            })
            .collect();

        let expected: Vec<(UnitId, BoardSide, Position)> =
            planned.iter().map(|d| (d.unit_id, d.board, d.position)).collect();
        assert_eq!(placed, expected);
    }

    #[test]
    fn test_set_profile_validates() {
        let mut ai = instant_ai(DifficultyLevel::Normal);
        let bad = DifficultyProfile::for_level(DifficultyLevel::Normal).with_randomness(0.9);
        assert!(ai.set_profile(bad).is_err());
        assert_eq!(ai.profile().level, DifficultyLevel::Normal);

        ai.set_profile(DifficultyProfile::for_level(DifficultyLevel::Easy)).unwrap();
        assert_eq!(ai.profile().level, DifficultyLevel::Easy);
    }

    #[test]
    fn test_compute_result_on_empty_field() {
        let ai = BattleAI::default();
        let result = ai.compute_result(&Battlefield::default());
        assert_eq!(result.result, GameResult::Draw);
    }
}
