//! AI turn sequencing
//!
//! Drives placement one unit at a time as an explicit state machine. Each
//! tick performs one step and reports how long the host should wait before
//! the next one; the controller itself never sleeps.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::placement::{PlacementDecision, PlacementEvaluator};
use crate::config::settings::{DifficultyProfile, TimingSettings};
use crate::error::EngineError;
use crate::game::board::{Battlefield, BoardSide, Position};
use crate::game::unit::UnitId;
use crate::pacing::Pacer;

/// How many times a unit whose tile was taken is put back in the queue
pub const MAX_REQUEUES: u8 = 2;

/// Turn controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnState {
    /// No turn in flight
    Idle,
    /// Turn accepted, start not yet announced
    TurnStarted,
    /// Next unit is about to be evaluated
    Thinking,
    /// A decision is pending application
    Placing,
    /// Queue drained, end not yet announced
    TurnEnded,
}

/// Why a queued unit was not placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// Both boards are full
    NoLegalTile,
    /// The chosen tile kept getting taken
    StaleTarget,
    /// The unit was placed by someone else meanwhile
    AlreadyPlaced,
    /// The unit died before its placement
    Dead,
    /// The unit left the battlefield
    Removed,
}

/// Lifecycle events reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiEvent {
    TurnStarted,
    UnitPlaced {
        unit_id: UnitId,
        board: BoardSide,
        position: Position,
    },
    UnitSkipped {
        unit_id: UnitId,
        reason: SkipReason,
    },
    TurnEnded,
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// State after the tick
    pub state: TurnState,
    /// Event raised by the tick, if any
    pub event: Option<AiEvent>,
    /// How long to wait before the next tick
    pub delay: Duration,
}

/// Sequences placements over a turn
#[derive(Debug, Clone)]
pub struct TurnController {
    state: TurnState,
    queue: VecDeque<UnitId>,
    requeues: HashMap<UnitId, u8>,
    pending: Option<PlacementDecision>,
    evaluator: PlacementEvaluator,
    profile: DifficultyProfile,
    timings: TimingSettings,
    pacer: Pacer,
}

impl TurnController {
    /// Create an idle controller
    pub fn new(profile: DifficultyProfile, timings: TimingSettings, pacer: Pacer) -> Self {
        Self {
            state: TurnState::Idle,
            queue: VecDeque::new(),
            requeues: HashMap::new(),
            pending: None,
            evaluator: PlacementEvaluator::new(),
            profile,
            timings,
            pacer,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Decision waiting to be applied on the next tick
    pub fn pending(&self) -> Option<&PlacementDecision> {
        self.pending.as_ref()
    }

    /// Units still waiting for their turn, front first
    pub fn queued(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.queue.iter().copied()
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Swap the difficulty used for the following evaluations
    pub fn set_profile(&mut self, profile: DifficultyProfile) {
        self.profile = profile;
    }

    /// Check if a turn is in flight
    pub fn is_busy(&self) -> bool {
        self.state != TurnState::Idle
    }

    /// Queue the units to place this turn
    ///
    /// Unknown, dead and already placed units are dropped. A turn still in
    /// flight is abandoned: its queue and pending decision are discarded and
    /// placements it already made stay on the board.
    pub fn start_turn(&mut self, units: &[UnitId], field: &Battlefield) {
        if self.is_busy() {
            log::warn!(
                "Aborting turn in {:?} with {} unit(s) still queued",
                self.state,
                self.queue.len()
            );
        }
        self.reset();

        for &id in units {
            let deployable = field.unit(id).is_some_and(|u| u.is_deployable());
            if deployable && !self.queue.contains(&id) {
                self.queue.push_back(id);
            }
        }

        log::info!("AI turn started with {} unit(s) to place", self.queue.len());
        self.state = TurnState::TurnStarted;
    }

    /// Drop the turn in flight, if any
    pub fn cancel(&mut self) {
        if self.is_busy() {
            log::warn!("AI turn cancelled in {:?}", self.state);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = TurnState::Idle;
        self.queue.clear();
        self.requeues.clear();
        self.pending = None;
    }

    /// Advance the state machine by one step
    ///
    /// Returns `None` when idle.
    pub fn tick<R: Rng + ?Sized>(&mut self, field: &mut Battlefield, rng: &mut R) -> Option<Step> {
        let step = match self.state {
            TurnState::Idle => return None,
            TurnState::TurnStarted => {
                let delay = self.boundary_delay();
                self.step(self.after_unit(), Some(AiEvent::TurnStarted), delay)
            }
            TurnState::Thinking => self.think(field, rng),
            TurnState::Placing => self.place(field),
            TurnState::TurnEnded => {
                log::info!("AI turn ended");
                let delay = self.boundary_delay();
                self.step(TurnState::Idle, Some(AiEvent::TurnEnded), delay)
            }
        };
        Some(step)
    }

    /// Run the current turn to completion, ignoring delays
    pub fn run_turn<R: Rng + ?Sized>(
        &mut self,
        field: &mut Battlefield,
        rng: &mut R,
    ) -> Vec<AiEvent> {
        let mut events = Vec::new();
        while let Some(step) = self.tick(field, rng) {
            events.extend(step.event);
        }
        events
    }

    fn think<R: Rng + ?Sized>(&mut self, field: &Battlefield, rng: &mut R) -> Step {
        let Some(id) = self.queue.pop_front() else {
            return self.step(TurnState::TurnEnded, None, Duration::ZERO);
        };

        let unit = match field.unit(id) {
            None => return self.skip(id, SkipReason::Removed),
            Some(u) if !u.is_alive => return self.skip(id, SkipReason::Dead),
            Some(u) if u.is_placed() => return self.skip(id, SkipReason::AlreadyPlaced),
            Some(u) => u,
        };

        match self.evaluator.best_position(unit, field, &self.profile, rng) {
            Some(decision) => {
                self.pending = Some(decision);
                let delay = if self.timings.enabled {
                    self.pacer.thinking_delay(self.profile.thinking_time())
                } else {
                    Duration::ZERO
                };
                self.step(TurnState::Placing, None, delay)
            }
            None => {
                log::warn!("{}", EngineError::NoLegalTile);
                self.skip(id, SkipReason::NoLegalTile)
            }
        }
    }

    fn place(&mut self, field: &mut Battlefield) -> Step {
        let Some(decision) = self.pending.take() else {
            return self.step(self.after_unit(), None, Duration::ZERO);
        };
        let id = decision.unit_id;

        match field.place(id, decision.board, decision.position) {
            Ok(()) => {
                log::info!("AI placed {} on board {} at {}", id, decision.board, decision.position);
                let event = AiEvent::UnitPlaced {
                    unit_id: id,
                    board: decision.board,
                    position: decision.position,
                };
                let delay = if self.timings.enabled {
                    self.pacer.pause(Duration::from_millis(self.timings.placement_delay))
                } else {
                    Duration::ZERO
                };
                self.step(self.after_unit(), Some(event), delay)
            }
            Err(err @ EngineError::StaleTarget { .. }) => {
                let attempts = self.requeues.entry(id).or_insert(0);
                if *attempts < MAX_REQUEUES {
                    *attempts += 1;
                    log::warn!("{err}; re-queueing {id} (attempt {attempts})");
                    self.queue.push_back(id);
                    self.step(TurnState::Thinking, None, Duration::ZERO)
                } else {
                    log::warn!("{err}; giving up on {id}");
                    self.skip(id, SkipReason::StaleTarget)
                }
            }
            Err(EngineError::AlreadyPlaced(_)) => self.skip(id, SkipReason::AlreadyPlaced),
            Err(EngineError::DeadUnit(_)) => self.skip(id, SkipReason::Dead),
            Err(err) => {
                log::warn!("Dropping placement of {id}: {err}");
                self.skip(id, SkipReason::Removed)
            }
        }
    }

    fn skip(&mut self, unit_id: UnitId, reason: SkipReason) -> Step {
        log::debug!("Skipping {unit_id}: {reason:?}");
        let event = AiEvent::UnitSkipped { unit_id, reason };
        self.step(self.after_unit(), Some(event), Duration::ZERO)
    }

    fn step(&mut self, next: TurnState, event: Option<AiEvent>, delay: Duration) -> Step {
        self.state = next;
        Step {
            state: next,
            event,
            delay,
        }
    }

    fn after_unit(&self) -> TurnState {
        if self.queue.is_empty() {
            TurnState::TurnEnded
        } else {
            TurnState::Thinking
        }
    }

    fn boundary_delay(&mut self) -> Duration {
        if !self.timings.enabled {
            return Duration::ZERO;
        }
        let scaled = self.profile.thinking_time().as_secs_f64() * self.timings.turn_boundary_factor;
        let base = Duration::try_from_secs_f64(scaled).unwrap_or(Duration::ZERO);
        self.pacer.pause(base)
    }
}
