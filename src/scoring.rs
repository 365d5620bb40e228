// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;

use crate::categories::taxonomy;
use crate::models::{CategoryAllocation, PortfolioScore, ScoreOptions, SpendProfile, UNASSIGNED_CARD_ID};
use crate::rates::{RewardSource, base_rate, best_rate};
use crate::spend::effective_spend;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPortfolio {
    pub score: PortfolioScore,
    pub allocation: Vec<CategoryAllocation>,
}

/// Assign every effective spend category to its best card and total it up.
///
/// Never fails: an empty card set scores zero, and categories no card may be
/// used for get an `unassigned` row.
pub fn score<S: RewardSource>(
    cards: &[S],
    monthly_spend: &SpendProfile,
    include_sign_on_bonus: bool,
    options: &ScoreOptions,
) -> ScoredPortfolio {
    if cards.is_empty() {
        return ScoredPortfolio::default();
    }

    let tree = taxonomy();
    let mut allocation = Vec::new();
    let mut monthly_cashback = 0.0;

    for entry in effective_spend(monthly_spend) {
        let category_id = entry.category_id;
        let spend = entry.spend;

        let mut candidates: Vec<_> = cards
            .iter()
            .filter(|source| tree.allows_network(&category_id, source.card().network))
            .map(|source| (source, best_rate(source, &category_id, options)))
            .collect();

        if candidates.is_empty() {
            allocation.push(CategoryAllocation {
                category_id,
                spend,
                card_id: UNASSIGNED_CARD_ID.to_string(),
                card_name: "No eligible card (network restriction)".to_string(),
                rate_percent: 0.0,
                cashback: 0.0,
                overflow_spend: None,
                overflow_to_card_id: None,
                overflow_cashback: None,
            });
            continue;
        }

        // Stable: equal rates keep card order.
        candidates.sort_by(|a, b| b.1.rate.total_cmp(&a.1.rate));
        let (winner, best) = candidates[0];
        let runner_up = candidates.get(1);
        let card = winner.card();

        let ceiling = best
            .bonus
            .and_then(|bonus| bonus.spend_limit.monthly_equivalent());

        let row = match ceiling {
            Some(limit) if spend > limit => {
                let overflow = spend - limit;
                let (fallback_id, fallback_rate) = match runner_up {
                    Some((source, rate)) => (source.card().id.clone(), rate.rate),
                    None => (card.id.clone(), base_rate(card)),
                };
                let overflow_cashback = overflow * fallback_rate / 100.0;
                CategoryAllocation {
                    category_id,
                    spend,
                    card_id: card.id.clone(),
                    card_name: card.name.clone(),
                    rate_percent: best.rate,
                    cashback: limit * best.rate / 100.0 + overflow_cashback,
                    overflow_spend: Some(overflow),
                    overflow_to_card_id: Some(fallback_id),
                    overflow_cashback: Some(overflow_cashback),
                }
            }
            _ => CategoryAllocation {
                category_id,
                spend,
                card_id: card.id.clone(),
                card_name: card.name.clone(),
                rate_percent: best.rate,
                cashback: spend * best.rate / 100.0,
                overflow_spend: None,
                overflow_to_card_id: None,
                overflow_cashback: None,
            },
        };

        monthly_cashback += row.cashback;
        allocation.push(row);
    }

    let annual_cashback = monthly_cashback * 12.0;
    let annual_fees: f64 = cards.iter().map(|s| s.card().annual_fee).sum();
    let annual_perks: f64 = cards.iter().map(|s| s.card().perk_value()).sum();
    let sign_on_value: f64 = if include_sign_on_bonus {
        cards.iter().map(|s| s.card().sign_on_value()).sum()
    } else {
        0.0
    };
    let net_annual_value = annual_cashback + annual_perks - annual_fees;

    ScoredPortfolio {
        score: PortfolioScore {
            monthly_cashback,
            annual_cashback,
            annual_fees,
            annual_perks,
            sign_on_value,
            net_annual_value,
            first_year_value: net_annual_value + sign_on_value,
        },
        allocation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, CategoryBonus, Perk};

    #[test]
    fn perks_and_fees_flow_into_net_value() {
        let mut card = Card::flat("p", "Perky", 1.0);
        card.annual_fee = 250.0;
        card.perks.push(Perk {
            name: "Lounge".into(),
            estimated_annual_value: 300.0,
            user_annual_value: Some(100.0),
            notes: String::new(),
        });
        let spend = SpendProfile::from([("other".to_string(), 1000.0)]);
        let scored = score(&[card], &spend, false, &ScoreOptions::default());
        assert_eq!(scored.score.monthly_cashback, 10.0);
        assert_eq!(scored.score.annual_perks, 100.0);
        assert_eq!(scored.score.net_annual_value, 120.0 + 100.0 - 250.0);
    }

    #[test]
    fn equal_rates_go_to_the_first_card() {
        let a = Card::flat("a", "A", 2.0);
        let b = Card::flat("b", "B", 2.0);
        let spend = SpendProfile::from([("pet".to_string(), 50.0)]);
        let scored = score(&[a, b], &spend, false, &ScoreOptions::default());
        assert_eq!(scored.allocation[0].card_id, "a");
    }

    #[test]
    fn capped_single_card_overflows_to_its_own_base() {
        let mut card = Card::flat("g", "Grocer", 1.0);
        card.category_bonuses.push(
            CategoryBonus::fixed("groceries", 6.0)
                .with_limit(crate::models::SpendLimit::new(1500.0, crate::models::SpendPeriod::Quarter)),
        );
        let spend = SpendProfile::from([("groceries".to_string(), 800.0)]);
        let scored = score(&[card], &spend, false, &ScoreOptions::default());
        let row = &scored.allocation[0];
        assert_eq!(row.overflow_spend, Some(300.0));
        assert_eq!(row.overflow_to_card_id.as_deref(), Some("g"));
        assert!((row.cashback - (500.0 * 0.06 + 300.0 * 0.01)).abs() < 1e-9);
    }
}
