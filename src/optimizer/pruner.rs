// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Coarse dominance filter run before exhaustive search.
//!
//! Only top-level categories are compared, and conditional bonuses are
//! ignored, so the filter stays conservative; it never feeds into the final
//! score. Rates are in cents per dollar, so point value is included.

use std::borrow::Borrow;

use crate::categories::taxonomy;
use crate::models::{Card, CategoryBonus};

// Whether a choosable slot could be pinned somewhere in `subtree`.
fn slot_reaches(bonus: &CategoryBonus, subtree: &[&str]) -> bool {
    let allowed = bonus.allowed_categories();
    allowed.is_empty() || allowed.iter().any(|id| subtree.contains(&id.as_str()))
}

fn bonus_in(bonus: &CategoryBonus, subtree: &[&str]) -> bool {
    subtree.contains(&bonus.category_id.as_str())
}

/// Highest rate the card could earn anywhere inside `category_id`'s subtree,
/// never less than its base rate.
///
/// Choosable slots count wherever their allow-list lets them land, and
/// rotating bonuses count at their full rate.
pub fn category_match_score(card: &Card, category_id: &str) -> f64 {
    let subtree = taxonomy().descendants(category_id);
    let best = card
        .category_bonuses
        .iter()
        .filter(|bonus| {
            if bonus.is_user_choosable {
                slot_reaches(bonus, &subtree)
            } else {
                bonus_in(bonus, &subtree)
            }
        })
        .map(|bonus| bonus.cashback_percent)
        .fold(card.base_cashback_percent, f64::max);
    best * card.point_multiplier()
}

/// Rate the card is sure to earn somewhere inside `category_id`'s subtree:
/// fixed, non-rotating bonuses only.
pub fn guaranteed_match_score(card: &Card, category_id: &str) -> f64 {
    let subtree = taxonomy().descendants(category_id);
    let best = card
        .category_bonuses
        .iter()
        .filter(|bonus| !bonus.is_user_choosable && !bonus.is_rotating && bonus_in(bonus, &subtree))
        .map(|bonus| bonus.cashback_percent)
        .fold(card.base_cashback_percent, f64::max);
    best * card.point_multiplier()
}

/// True when `a` is at least as good as `b` on fee, perks and every top-level
/// category, and strictly better on at least one category.
///
/// `a` is judged on what it is sure to earn and `b` on the most it could.
pub fn dominates(a: &Card, b: &Card) -> bool {
    if a.annual_fee > b.annual_fee || a.perk_value() < b.perk_value() {
        return false;
    }

    let mut strictly_better = false;
    for category in taxonomy().top_level_ids() {
        let rate_a = guaranteed_match_score(a, category);
        let rate_b = category_match_score(b, category);
        if rate_a < rate_b {
            return false;
        }
        if rate_a > rate_b {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Drop every card some other card in `cards` dominates. Order is preserved.
pub fn prune_dominated<C>(cards: &[C]) -> Vec<C>
where
    C: Borrow<Card> + Clone,
{
    let view: Vec<&Card> = cards.iter().map(<C as Borrow<Card>>::borrow).collect();
    cards
        .iter()
        .enumerate()
        .filter(|&(idx, _)| {
            !view
                .iter()
                .enumerate()
                .any(|(other, card)| other != idx && dominates(card, view[idx]))
        })
        .map(|(_, card)| card.clone())
        .collect()
}
