// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::{CategoryAllocation, PortfolioScore};
use crate::scoring::score;
use crate::utils::{fmt_money, fmt_rate, maybe_print_json, pretty_table, select_cards};

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let catalog = super::catalog(m)?;
    let spend = super::spend(m)?;
    let mut settings = super::settings(m)?;
    super::apply_scoring_flags(m, &mut settings);

    let cards = select_cards(&catalog, &super::card_ids(m))?;
    let scored = score(
        &cards,
        &spend,
        settings.include_sign_on_bonus_in_first_year,
        &super::score_options(&settings),
    );

    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &scored)? {
        return Ok(());
    }
    println!("{}", allocation_table(&scored.allocation));
    println!("{}", summary_table(&scored.score));
    Ok(())
}

pub(crate) fn allocation_table(allocation: &[CategoryAllocation]) -> comfy_table::Table {
    let data = allocation
        .iter()
        .map(|row| {
            let overflow = match (&row.overflow_spend, &row.overflow_to_card_id, &row.overflow_cashback) {
                (Some(spend), Some(card), Some(cashback)) => {
                    format!("{} -> {} ({})", fmt_money(*spend), card, fmt_money(*cashback))
                }
                _ => String::new(),
            };
            vec![
                row.category_id.clone(),
                fmt_money(row.spend),
                row.card_name.clone(),
                fmt_rate(row.rate_percent),
                fmt_money(row.cashback),
                overflow,
            ]
        })
        .collect();
    pretty_table(
        &["Category", "Spend", "Card", "Rate", "Cashback", "Overflow"],
        data,
    )
}

pub(crate) fn summary_table(score: &PortfolioScore) -> comfy_table::Table {
    let rows = [
        ("Monthly cashback", score.monthly_cashback),
        ("Annual cashback", score.annual_cashback),
        ("Annual fees", score.annual_fees),
        ("Annual perks", score.annual_perks),
        ("Sign-on value", score.sign_on_value),
        ("Net annual value", score.net_annual_value),
        ("First-year value", score.first_year_value),
    ];
    let data = rows
        .iter()
        .map(|(label, value)| vec![label.to_string(), fmt_money(*value)])
        .collect();
    pretty_table(&["Metric", "Value"], data)
}
