// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Effective cashback rate for one card on one spend category.
//!
//! `rate = raw × conditional multiplier × rotating factor × point multiplier`.
//! Bonuses are matched against the spend category and every ancestor of it;
//! the best one wins only when it beats the card's base rate.

use crate::categories::taxonomy;
use crate::models::{Card, CardVariant, CategoryBonus, RotatingMode, ScoreOptions};

/// Share of the year a rotating bonus without a schedule is assumed active.
const UNSCHEDULED_ROTATING_SHARE: f64 = 0.25;

/// Anything the allocation engine can score: a card plus the bonus list it
/// should be scored with.
pub trait RewardSource {
    fn card(&self) -> &Card;
    fn bonuses(&self) -> &[CategoryBonus];
}

impl RewardSource for Card {
    fn card(&self) -> &Card {
        self
    }

    fn bonuses(&self) -> &[CategoryBonus] {
        &self.category_bonuses
    }
}

impl RewardSource for CardVariant {
    fn card(&self) -> &Card {
        &self.card
    }

    fn bonuses(&self) -> &[CategoryBonus] {
        &self.bonuses
    }
}

impl<T: RewardSource + ?Sized> RewardSource for &T {
    fn card(&self) -> &Card {
        (**self).card()
    }

    fn bonuses(&self) -> &[CategoryBonus] {
        (**self).bonuses()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BestRate<'a> {
    pub bonus: Option<&'a CategoryBonus>,
    pub rate: f64,
}

/// Rate earned through `bonus`, or through the base rate when `bonus` is `None`.
pub fn effective_rate(
    card: &Card,
    bonus: Option<&CategoryBonus>,
    spend_category_id: &str,
    options: &ScoreOptions,
) -> f64 {
    match bonus {
        Some(bonus) => bonus_rate(card, bonus, spend_category_id, options),
        None => base_rate(card),
    }
}

pub fn base_rate(card: &Card) -> f64 {
    let boost = card
        .active_condition()
        .map(|c| c.base_cashback_boost)
        .unwrap_or(0.0);
    (card.base_cashback_percent + boost) * card.point_multiplier()
}

fn bonus_rate(
    card: &Card,
    bonus: &CategoryBonus,
    spend_category_id: &str,
    options: &ScoreOptions,
) -> f64 {
    let mut rate = bonus.cashback_percent;
    if let Some(condition) = card.active_condition() {
        rate *= condition.category_bonus_multiplier;
    }
    if bonus.is_rotating {
        rate *= rotating_factor(bonus, spend_category_id, options);
    }
    rate * card.point_multiplier()
}

fn rotating_factor(bonus: &CategoryBonus, spend_category_id: &str, options: &ScoreOptions) -> f64 {
    let Some(schedule) = &bonus.rotating_schedule else {
        return match options.rotating_mode {
            RotatingMode::Annualized => UNSCHEDULED_ROTATING_SHARE,
            RotatingMode::CurrentQuarter => 1.0,
        };
    };

    let tree = taxonomy();
    let matches = |categories: &[String]| {
        categories
            .iter()
            .any(|scheduled| {
                scheduled == spend_category_id || tree.is_ancestor_or_self(scheduled, spend_category_id)
            })
    };

    match options.rotating_mode {
        RotatingMode::CurrentQuarter => {
            let active = schedule
                .get(&options.current_quarter)
                .is_some_and(|categories| matches(categories.as_slice()));
            if active { 1.0 } else { 0.0 }
        }
        RotatingMode::Annualized => {
            if schedule.is_empty() {
                return UNSCHEDULED_ROTATING_SHARE;
            }
            let hits = schedule.values().filter(|categories| matches(categories.as_slice())).count();
            hits as f64 / schedule.len() as f64
        }
    }
}

/// Best rate `source` earns on `spend_category_id`.
///
/// Among bonuses on the category or any ancestor, the first one reaching the
/// maximum wins. A bonus that does not beat the base rate is dropped so a
/// bonus can never lower what the card earns.
pub fn best_rate<'a, S: RewardSource + ?Sized>(
    source: &'a S,
    spend_category_id: &str,
    options: &ScoreOptions,
) -> BestRate<'a> {
    let card = source.card();
    let base = base_rate(card);
    let ancestors = taxonomy().ancestors(spend_category_id);

    let mut best: Option<BestRate<'a>> = None;
    for bonus in source.bonuses() {
        if bonus.category_id != spend_category_id && !ancestors.iter().any(|id| *id == bonus.category_id) {
            continue;
        }
        let rate = bonus_rate(card, bonus, spend_category_id, options);
        if best.is_none_or(|b| rate > b.rate) {
            best = Some(BestRate {
                bonus: Some(bonus),
                rate,
            });
        }
    }

    match best {
        Some(b) if b.rate > base => b,
        _ => BestRate {
            bonus: None,
            rate: base,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConditionalBonus, Quarter};
    use std::collections::BTreeMap;

    fn rotating(schedule: Option<BTreeMap<Quarter, Vec<String>>>) -> Card {
        let mut bonus = CategoryBonus::fixed("groceries", 5.0);
        bonus.is_rotating = true;
        bonus.rotating_schedule = schedule;
        let mut card = Card::flat("rot", "Rotating", 1.0);
        card.category_bonuses.push(bonus);
        card
    }

    fn quarterly() -> BTreeMap<Quarter, Vec<String>> {
        BTreeMap::from([
            (Quarter::Q1, vec!["groceries".to_string()]),
            (Quarter::Q2, vec!["gas".to_string()]),
            (Quarter::Q3, vec!["dining".to_string()]),
            (Quarter::Q4, vec!["travel".to_string()]),
        ])
    }

    #[test]
    fn bonus_on_parent_applies_to_child_spend() {
        let mut card = Card::flat("d", "Dining", 1.0);
        card.category_bonuses.push(CategoryBonus::fixed("dining", 3.0));
        let best = best_rate(&card, "fast-food", &ScoreOptions::default());
        assert_eq!(best.rate, 3.0);
        assert!(best.bonus.is_some());
        assert_eq!(best_rate(&card, "groceries", &ScoreOptions::default()).rate, 1.0);
    }

    #[test]
    fn first_of_equal_bonuses_wins() {
        let mut card = Card::flat("d", "Dining", 1.0);
        let mut first = CategoryBonus::fixed("dining", 4.0);
        first.notes = "first".into();
        let mut second = CategoryBonus::fixed("restaurants", 4.0);
        second.notes = "second".into();
        card.category_bonuses = vec![first, second];
        let best = best_rate(&card, "restaurants", &ScoreOptions::default());
        assert_eq!(best.bonus.map(|b| b.notes.as_str()), Some("first"));
    }

    #[test]
    fn bonus_matches_category_outside_the_tree() {
        let mut card = Card::flat("c", "Crypto", 1.0);
        card.category_bonuses.push(CategoryBonus::fixed("crypto", 3.0));
        let best = best_rate(&card, "crypto", &ScoreOptions::default());
        assert_eq!(best.rate, 3.0);
        assert!(best.bonus.is_some());
        assert_eq!(best_rate(&card, "nft", &ScoreOptions::default()).rate, 1.0);
    }

    #[test]
    fn bonus_below_base_falls_back_to_base() {
        let mut card = Card::flat("w", "Weak", 2.0);
        card.category_bonuses.push(CategoryBonus::fixed("groceries", 1.5));
        let best = best_rate(&card, "groceries", &ScoreOptions::default());
        assert!(best.bonus.is_none());
        assert_eq!(best.rate, 2.0);
    }

    #[test]
    fn unscheduled_rotating_is_quartered_when_annualized() {
        let card = rotating(None);
        let annual = ScoreOptions::default();
        let current = ScoreOptions {
            rotating_mode: RotatingMode::CurrentQuarter,
            current_quarter: Quarter::Q3,
        };
        assert_eq!(best_rate(&card, "groceries", &annual).rate, 1.25);
        assert_eq!(best_rate(&card, "groceries", &current).rate, 5.0);
    }

    #[test]
    fn scheduled_rotating_follows_the_quarter() {
        let mut card = rotating(Some(quarterly()));
        card.category_bonuses[0].category_id = "gas".into();
        let q2 = ScoreOptions {
            rotating_mode: RotatingMode::CurrentQuarter,
            current_quarter: Quarter::Q2,
        };
        let q1 = ScoreOptions { current_quarter: Quarter::Q1, ..q2 };
        assert_eq!(best_rate(&card, "gas", &q2).rate, 5.0);
        assert_eq!(best_rate(&card, "gas-stations", &q2).rate, 5.0);
        assert_eq!(best_rate(&card, "gas", &q1).rate, 1.0);
        assert_eq!(best_rate(&card, "gas", &ScoreOptions::default()).rate, 1.25);
    }

    #[test]
    fn empty_schedule_annualizes_to_a_quarter() {
        let card = rotating(Some(BTreeMap::new()));
        assert_eq!(best_rate(&card, "groceries", &ScoreOptions::default()).rate, 1.25);
    }

    #[test]
    fn active_condition_boosts_base_and_scales_bonus() {
        let mut card = Card::flat("c", "Cond", 1.0);
        card.category_bonuses.push(CategoryBonus::fixed("dining", 3.0));
        card.conditional_bonuses.push(ConditionalBonus {
            condition_name: "Preferred".into(),
            condition_description: String::new(),
            base_cashback_boost: 0.5,
            category_bonus_multiplier: 1.5,
            is_active: true,
        });
        let opts = ScoreOptions::default();
        assert_eq!(best_rate(&card, "dining", &opts).rate, 4.5);
        assert_eq!(best_rate(&card, "groceries", &opts).rate, 1.5);
        assert_eq!(effective_rate(&card, None, "groceries", &opts), 1.5);
    }

    #[test]
    fn point_value_scales_every_rate() {
        let mut card = Card::flat("p", "Points", 1.0);
        card.points_system.default_point_value_cents = 2.0;
        card.category_bonuses.push(CategoryBonus::fixed("travel", 3.0));
        let opts = ScoreOptions::default();
        assert_eq!(best_rate(&card, "hotels", &opts).rate, 6.0);
        assert_eq!(best_rate(&card, "pet", &opts).rate, 2.0);
    }
}
