//! Placement evaluation
//!
//! Scores every empty tile on both boards for a unit, based on attack
//! opportunities, ally support, board control, synergy, position and
//! danger, and picks the best one.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::settings::{DifficultyLevel, DifficultyProfile};
use crate::game::board::{Battlefield, BoardSide, Position};
use crate::game::unit::{Unit, UnitId};

/// Radius (chebyshev) that counts as "around" a tile for synergy and counters
const NEARBY_RADIUS: usize = 2;

/// Allies around a tile above which it becomes a focus-fire target
const CLUSTER_THRESHOLD: usize = 2;

/// Immutable result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementDecision {
    pub unit_id: UnitId,
    pub board: BoardSide,
    pub position: Position,
    /// Final score including noise
    pub score: f64,
}

/// Every term of a tile's score, before noise
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Enemies inside the unit's attack range from this tile
    pub attackable: usize,
    /// Allies in the 8-neighbourhood
    pub protected: usize,
    /// Board control term of the tile's board
    pub control: f64,
    /// Same-class and complementary allies nearby
    pub synergy: f64,
    /// Corner/centre bonus plus centrality
    pub strategic: f64,
    /// Summed attack power of enemies threatening this tile
    pub danger: f64,
    /// Predicted opponent pressure (Hard/Expert)
    pub pressure: f64,
    /// Class counter bonus (Hard/Expert)
    pub counter: f64,
    /// Weighted sum of all terms
    pub total: f64,
}

/// Placement evaluation engine
#[derive(Debug, Clone)]
pub struct PlacementEvaluator {
    /// Points per attackable enemy
    attack_factor: f64,
    /// Points per protected ally
    defense_factor: f64,
    /// Points per unit of board control
    control_factor: f64,
    /// Points per unit of synergy
    synergy_factor: f64,
    /// Points lost per point of enemy attack power covering the tile
    danger_factor: f64,
    /// Bonus for corners and the centre tile
    strategic_bonus: f64,
    /// Bonus per nearby enemy the unit's class counters
    counter_bonus: f64,
    /// Penalty per look-ahead turn on clustered tiles
    pressure_penalty: f64,
}

impl PlacementEvaluator {
    /// Create a new placement evaluator
    pub fn new() -> Self {
        Self {
            attack_factor: 20.0,
            defense_factor: 10.0,
            control_factor: 30.0,
            synergy_factor: 15.0,
            danger_factor: 15.0,
            strategic_bonus: 25.0,
            counter_bonus: 25.0,
            pressure_penalty: 10.0,
        }
    }

    /// Choose the tile for `unit`, or `None` if both boards are full
    ///
    /// Candidates are enumerated board A before B, row-major; the first of
    /// equally scored tiles wins.
    pub fn best_position<R: Rng + ?Sized>(
        &self,
        unit: &Unit,
        field: &Battlefield,
        profile: &DifficultyProfile,
        rng: &mut R,
    ) -> Option<PlacementDecision> {
        let controls = self.control_scores(unit, field);
        let mut best: Option<PlacementDecision> = None;

        for (board, position) in field.empty_tiles() {
            let score = if profile.level == DifficultyLevel::Easy {
                rng.gen_range(0.0..100.0)
            } else {
                let control = controls[board.index()];
                let breakdown = self.breakdown(unit, field, profile, board, position, control);
                breakdown.total + self.noise(profile, rng)
            };

            let better = match &best {
                Some(current) => score > current.score,
                None => true,
            };
            if better {
                best = Some(PlacementDecision {
                    unit_id: unit.id,
                    board,
                    position,
                    score,
                });
            }
        }

        match &best {
            Some(decision) => log::debug!(
                "Best tile for {} ({}): board {} {} score={:.1}",
                unit.name,
                unit.id,
                decision.board,
                decision.position,
                decision.score
            ),
            None => log::debug!("No empty tile left for {} ({})", unit.name, unit.id),
        }

        best
    }

    /// Score one tile without noise
    pub fn score_tile(
        &self,
        unit: &Unit,
        field: &Battlefield,
        profile: &DifficultyProfile,
        board: BoardSide,
        position: Position,
    ) -> ScoreBreakdown {
        let control = self.control_score(unit, field, board);
        self.breakdown(unit, field, profile, board, position, control)
    }

    /// Every empty tile with its noise-free score, best first (stable)
    pub fn rank_positions(
        &self,
        unit: &Unit,
        field: &Battlefield,
        profile: &DifficultyProfile,
    ) -> Vec<(BoardSide, Position, ScoreBreakdown)> {
        let controls = self.control_scores(unit, field);
        let mut ranked: Vec<(BoardSide, Position, ScoreBreakdown)> = field
            .empty_tiles()
            .map(|(board, position)| {
                let control = controls[board.index()];
                let breakdown = self.breakdown(unit, field, profile, board, position, control);
                (board, position, breakdown)
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.2.total
                .partial_cmp(&a.2.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    fn breakdown(
        &self,
        unit: &Unit,
        field: &Battlefield,
        profile: &DifficultyProfile,
        board: BoardSide,
        position: Position,
        control: f64,
    ) -> ScoreBreakdown {
        let mut s = ScoreBreakdown {
            attackable: self.attackable_enemy_count(unit, field, board, position),
            protected: self.protected_ally_count(unit, field, board, position),
            control,
            synergy: self.adjacent_ally_synergy(unit, field, board, position),
            strategic: self.strategic_position_bonus(field, board, position),
            danger: self.danger_score(unit, field, board, position),
            ..Default::default()
        };

        if profile.level.is_advanced() {
            if s.protected > CLUSTER_THRESHOLD {
                s.pressure = -self.pressure_penalty * profile.look_ahead_turns as f64;
            }
            let countered = self.countered_enemy_count(unit, field, board, position);
            s.counter = self.counter_bonus * countered as f64;
        }

        s.total = s.attackable as f64 * profile.attack_weight * self.attack_factor
            + s.protected as f64 * profile.defense_weight * self.defense_factor
            + s.control * profile.control_weight * self.control_factor
            + s.synergy * profile.synergy_weight * self.synergy_factor
            + s.strategic
            - s.danger * profile.defense_weight * self.danger_factor
            + s.pressure
            + s.counter;

        s
    }

    fn noise<R: Rng + ?Sized>(&self, profile: &DifficultyProfile, rng: &mut R) -> f64 {
        if profile.randomness <= 0.0 {
            return 0.0;
        }
        let span = profile.randomness * 100.0;
        rng.gen_range(-span..=span)
    }

    /// Enemies reachable by the unit's pattern from `position`
    pub fn attackable_enemy_count(
        &self,
        unit: &Unit,
        field: &Battlefield,
        board: BoardSide,
        position: Position,
    ) -> usize {
        let grid = field.board(board);
        unit.threatened_from(position)
            .filter_map(|(x, y)| grid.checked_position(x, y))
            .filter_map(|target| field.occupant(board, target))
            .filter(|occupant| occupant.team != unit.team)
            .count()
    }

    /// Allies in the 8-neighbourhood of `position`
    pub fn protected_ally_count(
        &self,
        unit: &Unit,
        field: &Battlefield,
        board: BoardSide,
        position: Position,
    ) -> usize {
        field
            .board(board)
            .neighbours(position, 1)
            .filter_map(|p| field.occupant(board, p))
            .filter(|ally| ally.team == unit.team && ally.id != unit.id)
            .count()
    }

    /// Board control from the unit's side
    ///
    /// A lead counts as-is; a deficit of more than two counts triple, so a
    /// losing board is contested rather than abandoned.
    pub fn control_score(&self, unit: &Unit, field: &Battlefield, board: BoardSide) -> f64 {
        let own = field.count_on(board, unit.team) as f64;
        let other = field.count_on(board, unit.team.opponent()) as f64;
        let diff = own - other;

        if diff > 0.0 {
            diff
        } else if diff < -2.0 {
            -diff * 3.0
        } else {
            0.0
        }
    }

    fn control_scores(&self, unit: &Unit, field: &Battlefield) -> [f64; 2] {
        [
            self.control_score(unit, field, BoardSide::A),
            self.control_score(unit, field, BoardSide::B),
        ]
    }

    /// Same-class allies count 1, complementary allies 2/3
    pub fn adjacent_ally_synergy(
        &self,
        unit: &Unit,
        field: &Battlefield,
        board: BoardSide,
        position: Position,
    ) -> f64 {
        field
            .board(board)
            .neighbours(position, NEARBY_RADIUS)
            .filter_map(|p| field.occupant(board, p))
            .filter(|ally| ally.team == unit.team && ally.id != unit.id)
            .map(|ally| {
                if ally.job_class == unit.job_class {
                    1.0
                } else if ally.job_class.is_complementary(unit.job_class) {
                    2.0 / 3.0
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// Corner or centre bonus plus a pull toward the middle column
    pub fn strategic_position_bonus(
        &self,
        field: &Battlefield,
        board: BoardSide,
        position: Position,
    ) -> f64 {
        let grid = field.board(board);
        let mut bonus = 0.0;

        if grid.is_corner(position) || grid.is_center(position) {
            bonus += self.strategic_bonus;
        }

        let half_width = grid.width() as f64 / 2.0;
        bonus += (5.0 - (position.x as f64 - half_width).abs()) * 5.0;

        bonus
    }

    /// Summed attack power of enemies whose range covers `position`
    pub fn danger_score(
        &self,
        unit: &Unit,
        field: &Battlefield,
        board: BoardSide,
        position: Position,
    ) -> f64 {
        field
            .units_on(board)
            .filter(|enemy| enemy.team != unit.team)
            .filter(|enemy| {
                enemy
                    .placement
                    .is_some_and(|(_, origin)| enemy.threatens(origin, position))
            })
            .map(|enemy| enemy.attack_power)
            .sum()
    }

    /// Nearby enemies whose class the unit counters
    pub fn countered_enemy_count(
        &self,
        unit: &Unit,
        field: &Battlefield,
        board: BoardSide,
        position: Position,
    ) -> usize {
        field
            .board(board)
            .neighbours(position, NEARBY_RADIUS)
            .filter_map(|p| field.occupant(board, p))
            .filter(|enemy| enemy.team != unit.team && unit.job_class.counters(enemy.job_class))
            .count()
    }
}

impl Default for PlacementEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
