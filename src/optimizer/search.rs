// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Portfolio search: every subset of the candidate pool up to the wallet size
//! when the pool is small, a greedy walk when it is not.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{
    Card, CardVariant, ExclusivityKind, InclusionMode, OptimizerInput, OptimizerProgress,
    OptimizerResult, ScoreOptions,
};
use crate::optimizer::pruner::prune_dominated;
use crate::optimizer::variants::{card_variants, combinations};
use crate::scoring::{ScoredPortfolio, score};

/// Pools larger than this use the greedy path.
pub const EXACT_POOL_LIMIT: usize = 24;
/// Results returned by the exact path.
pub const MAX_RESULTS: usize = 20;
/// Subsets between progress updates.
pub const PROGRESS_INTERVAL: usize = 50;

/// Whether `cards` can be held together.
///
/// `cannot_hold_with` fails when any listed id is selected. `one_of_family`
/// treats the card plus its listed ids as a family and allows one member.
pub fn is_exclusivity_compatible<C: Borrow<Card>>(cards: &[C]) -> bool {
    let cards: Vec<&Card> = cards.iter().map(<C as Borrow<Card>>::borrow).collect();
    let selected: HashSet<&str> = cards.iter().map(|c| c.id.as_str()).collect();

    for card in &cards {
        for rule in &card.exclusivity_rules {
            match rule.rule_type {
                ExclusivityKind::CannotHoldWith => {
                    if rule.card_ids.iter().any(|id| selected.contains(id.as_str())) {
                        return false;
                    }
                }
                ExclusivityKind::OneOfFamily => {
                    let members = selected
                        .iter()
                        .filter(|id| **id == card.id || rule.card_ids.iter().any(|f| f == *id))
                        .count();
                    if members > 1 {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// `C(n, k)`, saturating instead of overflowing.
pub fn estimate_combination_count(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 1..=k as u128 {
        result = result * (n as u128 - i + 1) / i;
        if result > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    result as usize
}

/// `Σ C(n, k)` for `k` in `0..=min(n, max_k)`.
pub fn estimate_combination_count_up_to(n: usize, max_k: usize) -> usize {
    (0..=n.min(max_k))
        .map(|k| estimate_combination_count(n, k))
        .fold(0usize, usize::saturating_add)
}

pub fn optimize(input: &OptimizerInput) -> Vec<OptimizerResult> {
    optimize_with_progress(input, |_| {})
}

/// Search for the best portfolios, reporting progress along the way.
///
/// Returns an empty list when the cards marked `include` cannot be held
/// together. Otherwise results are ordered by target value, best first.
pub fn optimize_with_progress<F>(input: &OptimizerInput, mut on_progress: F) -> Vec<OptimizerResult>
where
    F: FnMut(OptimizerProgress),
{
    let eligible: Vec<Arc<Card>> = input
        .cards
        .iter()
        .filter(|card| match input.inclusion_mode(&card.id) {
            InclusionMode::Exclude => false,
            InclusionMode::Include => true,
            InclusionMode::Neutral => card.is_active,
        })
        .cloned()
        .map(Arc::new)
        .collect();
    let candidates = prune_dominated(&eligible);
    debug!(
        catalog = input.cards.len(),
        eligible = eligible.len(),
        after_pruning = candidates.len(),
        "Filtered card catalog"
    );

    let (forced, pool): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|card| input.inclusion_mode(&card.id) == InclusionMode::Include);

    if !is_exclusivity_compatible(&forced) {
        warn!(
            forced = ?forced.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            "Included cards violate an exclusivity rule"
        );
        return Vec::new();
    }

    let results = if pool.len() > EXACT_POOL_LIMIT {
        info!(pool = pool.len(), "Candidate pool too large for exhaustive search, using greedy path");
        greedy_search(&forced, pool, input, &mut on_progress)
    } else {
        exact_search(&forced, &pool, input, &mut on_progress)
    };
    info!(results = results.len(), "Optimization finished");
    results
}

#[derive(Clone)]
struct BestVariantSet {
    cards: Vec<CardVariant>,
    scored: ScoredPortfolio,
    value: f64,
}

impl BestVariantSet {
    fn into_result(self, card_ids: Vec<String>, evaluated_combinations: usize) -> OptimizerResult {
        OptimizerResult {
            card_ids,
            cards: self.cards,
            score: self.scored.score,
            allocation: self.scored.allocation,
            evaluated_combinations,
        }
    }
}

// Best variant combination for one card set, or None if the set is not allowed.
fn score_with_variants(cards: &[Arc<Card>], input: &OptimizerInput) -> Option<BestVariantSet> {
    if !is_exclusivity_compatible(cards) {
        return None;
    }

    let variant_lists: Vec<Vec<CardVariant>> = cards
        .iter()
        .map(|card| {
            let overrides = input
                .choosable_category_overrides
                .get(&card.id)
                .map(Vec::as_slice);
            card_variants(card, &input.monthly_spend, overrides)
        })
        .collect();

    let options = input.score_options();
    let mut best = None;
    let mut picked = Vec::with_capacity(variant_lists.len());
    walk_variants(&variant_lists, &mut picked, input, &options, &mut best);
    best
}

fn walk_variants<'a>(
    lists: &'a [Vec<CardVariant>],
    picked: &mut Vec<&'a CardVariant>,
    input: &OptimizerInput,
    options: &ScoreOptions,
    best: &mut Option<BestVariantSet>,
) {
    let Some((head, rest)) = lists.split_first() else {
        let scored = score(
            picked.as_slice(),
            &input.monthly_spend,
            input.include_sign_on_bonus_in_first_year,
            options,
        );
        let value = scored.score.target_value(input.target);
        if best.as_ref().is_none_or(|b| value > b.value) {
            *best = Some(BestVariantSet {
                cards: picked.iter().map(|v| (*v).clone()).collect(),
                scored,
                value,
            });
        }
        return;
    };

    for variant in head {
        picked.push(variant);
        walk_variants(rest, picked, input, options, best);
        picked.pop();
    }
}

fn card_ids(cards: &[Arc<Card>]) -> Vec<String> {
    cards.iter().map(|c| c.id.clone()).collect()
}

fn exact_search<F>(
    forced: &[Arc<Card>],
    pool: &[Arc<Card>],
    input: &OptimizerInput,
    on_progress: &mut F,
) -> Vec<OptimizerResult>
where
    F: FnMut(OptimizerProgress),
{
    let remaining_slots = input.max_cards.saturating_sub(forced.len());
    let total_estimate = estimate_combination_count_up_to(pool.len(), remaining_slots);
    debug!(
        forced = forced.len(),
        pool = pool.len(),
        subsets = total_estimate,
        "Starting exhaustive search"
    );

    let subsets = (0..=pool.len().min(remaining_slots))
        .flat_map(|k| combinations(pool, k))
        .map(|combo| forced.iter().cloned().chain(combo).collect::<Vec<_>>());

    // Best first; equal values keep enumeration order.
    let mut ranked: Vec<(f64, OptimizerResult)> = Vec::with_capacity(MAX_RESULTS + 1);
    let mut current_best: Option<(f64, OptimizerResult)> = None;
    let last = total_estimate.saturating_sub(1);

    for (idx, subset) in subsets.enumerate() {
        if let Some(best) = score_with_variants(&subset, input) {
            let value = best.value;
            let result = best.into_result(card_ids(&subset), idx + 1);
            if current_best.as_ref().is_none_or(|(v, _)| value > *v) {
                current_best = Some((value, result.clone()));
            }
            let pos = ranked.partition_point(|(v, _)| *v >= value);
            if pos < MAX_RESULTS {
                ranked.insert(pos, (value, result));
                ranked.truncate(MAX_RESULTS);
            }
        }

        if idx % PROGRESS_INTERVAL == 0 || idx == last {
            on_progress(OptimizerProgress {
                evaluated: idx + 1,
                total_estimate,
                current_best: current_best.as_ref().map(|(_, r)| r.clone()),
            });
        }
    }

    ranked.into_iter().map(|(_, result)| result).collect()
}

fn greedy_search<F>(
    forced: &[Arc<Card>],
    mut remaining: Vec<Arc<Card>>,
    input: &OptimizerInput,
    on_progress: &mut F,
) -> Vec<OptimizerResult>
where
    F: FnMut(OptimizerProgress),
{
    let rounds = input.max_cards.saturating_sub(forced.len()).min(remaining.len());
    let total_estimate: usize = (0..rounds).map(|round| remaining.len() - round).sum();

    let mut selected = forced.to_vec();
    let Some(mut best) = score_with_variants(&selected, input) else {
        return Vec::new();
    };
    let mut evaluated = 1;

    while selected.len() < input.max_cards && !remaining.is_empty() {
        let mut round_best: Option<(usize, BestVariantSet)> = None;
        for (idx, candidate) in remaining.iter().enumerate() {
            selected.push(Arc::clone(candidate));
            let trial = score_with_variants(&selected, input);
            selected.pop();
            evaluated += 1;

            if let Some(trial) = trial
                && round_best.as_ref().is_none_or(|(_, b)| trial.value > b.value)
            {
                round_best = Some((idx, trial));
            }
        }

        match round_best {
            Some((idx, trial)) if trial.value > best.value => {
                let card = remaining.remove(idx);
                debug!(card = %card.id, value = trial.value, "Greedy step added card");
                selected.push(card);
                best = trial;
            }
            _ => break,
        }

        on_progress(OptimizerProgress {
            evaluated,
            total_estimate,
            current_best: Some(best.clone().into_result(card_ids(&selected), evaluated)),
        });
    }

    vec![best.into_result(card_ids(&selected), evaluated)]
}
