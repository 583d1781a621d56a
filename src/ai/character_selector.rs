//! Character selection algorithm
//!
//! Picks the units the AI fields from its roster, following one of the
//! named selection strategies.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::strategy::{self, SelectionStrategy};
use crate::error::{EngineError, Result};
use crate::game::unit::{JobClass, Team, Unit, UnitId, UnitTemplate};

/// Character selection engine
#[derive(Debug, Clone, Default)]
pub struct CharacterSelector;

impl CharacterSelector {
    /// Create a new character selector
    pub fn new() -> Self {
        Self
    }

    /// Select up to `max_count` units from `pool` and create them for `team`
    ///
    /// Unit ids are numbered from 1 in selection order; the battlefield
    /// re-numbers them on registration if they collide.
    pub fn select<R: Rng + ?Sized>(
        &self,
        pool: &[UnitTemplate],
        max_count: usize,
        strategy: SelectionStrategy,
        team: Team,
        rng: &mut R,
    ) -> Result<Vec<Unit>> {
        let picks = self.pick(pool, max_count, strategy, rng)?;

        log::info!(
            "Selected {} of {} candidates with {} strategy",
            picks.len(),
            pool.len(),
            strategy
        );

        Ok(picks
            .into_iter()
            .enumerate()
            .map(|(n, idx)| {
                let id = UnitId(n as u32 + 1);
                Unit::from_template(id, &pool[idx], team)
            })
            .collect())
    }

    /// Select pool indices, in pick order
    pub fn pick<R: Rng + ?Sized>(
        &self,
        pool: &[UnitTemplate],
        max_count: usize,
        strategy: SelectionStrategy,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        if pool.is_empty() {
            return Err(EngineError::EmptyPool);
        }
        let count = max_count.min(pool.len());

        let picks = match strategy.effective() {
            SelectionStrategy::Balanced => self.pick_balanced(pool, count),
            SelectionStrategy::Aggressive => {
                self.pick_sorted(pool, count, strategy::aggressive_order)
            }
            SelectionStrategy::Defensive | SelectionStrategy::Counter => {
                self.pick_sorted(pool, count, strategy::defensive_order)
            }
            SelectionStrategy::Synergy => self.pick_synergy(pool, count),
            SelectionStrategy::Random => self.pick_random(pool, count, rng),
        };

        Ok(picks)
    }

    /// Take the top `count` under a stable ordering
    fn pick_sorted<F>(&self, pool: &[UnitTemplate], count: usize, order: F) -> Vec<usize>
    where
        F: Fn(&UnitTemplate, &UnitTemplate) -> std::cmp::Ordering,
    {
        let mut indices: Vec<usize> = (0..pool.len()).collect();
        indices.sort_by(|&a, &b| order(&pool[a], &pool[b]));
        indices.truncate(count);
        indices
    }

    /// Round-robin across job classes
    ///
    /// Each round serves the class least represented so far (first seen wins
    /// ties) with its best remaining candidate by ranking score.
    fn pick_balanced(&self, pool: &[UnitTemplate], count: usize) -> Vec<usize> {
        let mut classes: Vec<(JobClass, Vec<usize>)> = Vec::new();
        for (idx, template) in pool.iter().enumerate() {
            match classes.iter_mut().find(|(class, _)| *class == template.job_class) {
                Some((_, members)) => members.push(idx),
                None => classes.push((template.job_class, vec![idx])),
            }
        }
        for (_, members) in &mut classes {
            members.sort_by(|&a, &b| strategy::score_order(&pool[a], &pool[b]));
            // Drained from the back
            members.reverse();
        }

        let mut taken: HashMap<JobClass, usize> = HashMap::new();
        let mut picks = Vec::with_capacity(count);

        while picks.len() < count {
            let next = classes
                .iter_mut()
                .filter(|(_, members)| !members.is_empty())
                .min_by_key(|(class, _)| taken.get(class).copied().unwrap_or(0));

            let Some((class, members)) = next else {
                break;
            };
            if let Some(idx) = members.pop() {
                *taken.entry(*class).or_insert(0) += 1;
                picks.push(idx);
            }
        }

        picks
    }

    /// Drain synergy groups, largest first, then fill in pool order
    fn pick_synergy(&self, pool: &[UnitTemplate], count: usize) -> Vec<usize> {
        let mut groups: Vec<(JobClass, Vec<usize>)> = Vec::new();
        for (idx, template) in pool.iter().enumerate().filter(|(_, t)| t.has_synergy) {
            match groups.iter_mut().find(|(class, _)| *class == template.job_class) {
                Some((_, members)) => members.push(idx),
                None => groups.push((template.job_class, vec![idx])),
            }
        }
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut picks: Vec<usize> = groups
            .into_iter()
            .flat_map(|(_, members)| members)
            .take(count)
            .collect();

        if picks.len() < count {
            let leftovers: Vec<usize> = (0..pool.len())
                .filter(|idx| !picks.contains(idx))
                .collect();
            picks.extend(leftovers.into_iter().take(count - picks.len()));
        }

        picks
    }

    /// Uniform shuffle, then take the head
    fn pick_random<R: Rng + ?Sized>(
        &self,
        pool: &[UnitTemplate],
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..pool.len()).collect();
        indices.shuffle(rng);
        indices.truncate(count);
        indices
    }
}
