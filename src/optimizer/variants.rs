// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Resolve user-choosable bonus slots into concrete card variants.

use std::sync::Arc;

use crate::categories::taxonomy;
use crate::models::{Card, CardVariant, SpendProfile};

/// Most categories considered for a choosable slot.
pub const MAX_CHOOSER_CANDIDATES: usize = 8;
/// Most variants generated for a single card.
pub const MAX_VARIANTS_PER_CARD: usize = 24;

/// Expand `card` into the variants the search should try.
///
/// Only the first choosable bonus is expanded; any later choosable bonuses
/// are dropped from the variants. An explicit `override_categories` list
/// yields exactly one variant.
pub fn card_variants(
    card: &Arc<Card>,
    monthly_spend: &SpendProfile,
    override_categories: Option<&[String]>,
) -> Vec<CardVariant> {
    let Some(template) = card.first_choosable_bonus() else {
        return vec![CardVariant::unchanged(Arc::clone(card))];
    };

    let slots = template.max_choosable_slots.unwrap_or(1).max(1);
    let fixed: Vec<_> = card
        .category_bonuses
        .iter()
        .filter(|b| !b.is_user_choosable)
        .cloned()
        .collect();

    let build = |picked: &[&str]| {
        let mut bonuses = fixed.clone();
        bonuses.extend(picked.iter().map(|id| template.pinned_to(id)));
        CardVariant {
            card: Arc::clone(card),
            bonuses,
        }
    };

    if let Some(chosen) = override_categories.filter(|c| !c.is_empty()) {
        let allowed = template.allowed_categories();
        let picked: Vec<&str> = chosen
            .iter()
            .filter(|id| allowed.is_empty() || allowed.contains(id))
            .take(slots)
            .map(String::as_str)
            .collect();
        return vec![build(&picked)];
    }

    let candidates = chooser_candidates(monthly_spend, template.allowed_categories());
    let pick = slots.min(candidates.len());
    combinations(&candidates, pick)
        .take(MAX_VARIANTS_PER_CARD)
        .map(|combo| build(&combo))
        .collect()
}

/// Categories a slot may be pointed at, highest spend first.
///
/// Drawn from the allow-list, or every top-level category when there is none.
/// Spent-on categories come first by amount, then the rest in source order.
pub fn chooser_candidates<'a>(monthly_spend: &SpendProfile, allowed: &'a [String]) -> Vec<&'a str> {
    let source: Vec<&'a str> = if allowed.is_empty() {
        taxonomy().top_level_ids()
    } else {
        allowed.iter().map(String::as_str).collect()
    };

    let mut spent: Vec<(&'a str, f64)> = source
        .iter()
        .filter_map(|&id| {
            monthly_spend
                .get(id)
                .copied()
                .filter(|&amount| amount > 0.0)
                .map(|amount| (id, amount))
        })
        .collect();
    spent.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut out: Vec<&'a str> = Vec::with_capacity(MAX_CHOOSER_CANDIDATES);
    for id in spent.into_iter().map(|(id, _)| id).chain(source.iter().copied()) {
        if out.len() == MAX_CHOOSER_CANDIDATES {
            break;
        }
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// All `k`-element combinations of `items` in lexicographic index order,
/// produced one at a time.
pub fn combinations<T: Clone>(items: &[T], k: usize) -> Combinations<'_, T> {
    Combinations {
        items,
        indices: (0..k).collect(),
        done: k > items.len(),
    }
}

pub struct Combinations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    done: bool,
}

impl<T: Clone> Iterator for Combinations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let combo = self.indices.iter().map(|&i| self.items[i].clone()).collect();

        let n = self.items.len();
        let k = self.indices.len();
        // Rightmost index that can still move forward.
        match (0..k).rev().find(|&i| self.indices[i] != i + n - k) {
            Some(pos) => {
                self.indices[pos] += 1;
                for next in pos + 1..k {
                    self.indices[next] = self.indices[next - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(combo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryBonus;

    fn chooser(slots: usize, allowed: Option<Vec<&str>>) -> Arc<Card> {
        let mut bonus = CategoryBonus::fixed("online-shopping", 5.0);
        bonus.is_user_choosable = true;
        bonus.max_choosable_slots = Some(slots);
        bonus.allowed_category_ids = allowed.map(|ids| ids.into_iter().map(String::from).collect());
        let mut card = Card::flat("chooser", "Chooser", 1.0);
        card.category_bonuses.push(CategoryBonus::fixed("gas", 2.0));
        card.category_bonuses.push(bonus);
        Arc::new(card)
    }

    fn spend(entries: &[(&str, f64)]) -> SpendProfile {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn combinations_are_lexicographic() {
        let combos: Vec<_> = combinations(&['a', 'b', 'c', 'd'], 2).collect();
        assert_eq!(combos.len(), 6);
        assert_eq!(combos[0], vec!['a', 'b']);
        assert_eq!(combos[5], vec!['c', 'd']);
        assert_eq!(combinations(&['a'], 0).collect::<Vec<_>>(), vec![Vec::<char>::new()]);
        assert_eq!(combinations(&['a'], 2).next(), None);
        assert_eq!(combinations(&[1, 2, 3, 4, 5], 3).count(), 10);
    }

    #[test]
    fn combinations_are_produced_lazily() {
        // C(24, 12) is 2.7M; only the first few are ever built here.
        let items: Vec<u32> = (0..24).collect();
        let mut combos = combinations(&items, 12);
        assert_eq!(combos.next(), Some((0..12).collect()));
        let third: Vec<u32> = (0..11).chain([13]).collect();
        assert_eq!(combos.nth(1), Some(third));
    }

    #[test]
    fn plain_card_is_its_own_variant() {
        let card = Arc::new(Card::flat("flat", "Flat", 2.0));
        let variants = card_variants(&card, &SpendProfile::new(), None);
        assert_eq!(variants.len(), 1);
        assert!(variants[0].bonuses.is_empty());
    }

    #[test]
    fn candidates_put_spend_first_then_fill_from_source() {
        let profile = spend(&[("dining", 300.0), ("groceries", 500.0), ("fast-food", 900.0)]);
        let out = chooser_candidates(&profile, &[]);
        assert_eq!(out.len(), MAX_CHOOSER_CANDIDATES);
        assert_eq!(&out[..3], &["groceries", "dining", "gas"]);
    }

    #[test]
    fn slot_expansion_is_capped() {
        let card = chooser(2, None);
        let variants = card_variants(&card, &SpendProfile::new(), None);
        // C(8, 2) = 28, capped.
        assert_eq!(variants.len(), MAX_VARIANTS_PER_CARD);
        assert_eq!(variants[0].chosen_categories(), vec!["groceries", "gas"]);
        assert_eq!(variants[0].bonuses[0].category_id, "gas");
        assert!(variants[0].bonuses.iter().all(|b| !b.is_user_choosable));
    }

    #[test]
    fn override_is_filtered_and_truncated() {
        let card = chooser(1, Some(vec!["dining", "travel"]));
        let picks = vec!["groceries".to_string(), "travel".to_string(), "dining".to_string()];
        let variants = card_variants(&card, &SpendProfile::new(), Some(&picks));
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].chosen_categories(), vec!["travel"]);
    }

    #[test]
    fn allow_list_limits_generated_variants() {
        let card = chooser(1, Some(vec!["dining"]));
        let variants = card_variants(&card, &spend(&[("groceries", 500.0)]), None);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].chosen_categories(), vec!["dining"]);
    }
}
