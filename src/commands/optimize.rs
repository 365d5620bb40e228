// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::{InclusionMode, OptimizationTarget, OptimizerProgress, OptimizerResult};
use crate::optimizer::spawn_optimize;
use crate::utils::{fmt_money, maybe_print_json, parse_override, pretty_table};

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let catalog = super::catalog(m)?;
    let spend = super::spend(m)?;
    let mut settings = super::settings(m)?;
    super::apply_scoring_flags(m, &mut settings);

    if let Some(n) = m.get_one::<usize>("max-cards") {
        settings.max_cards_in_wallet = *n;
    }
    if let Some(target) = m.get_one::<OptimizationTarget>("target") {
        settings.optimization_target = *target;
    }
    for id in m.get_many::<String>("include").into_iter().flatten() {
        settings.set_mode(id, InclusionMode::Include);
    }
    for id in m.get_many::<String>("exclude").into_iter().flatten() {
        settings.set_mode(id, InclusionMode::Exclude);
    }
    for raw in m.get_many::<String>("choose").into_iter().flatten() {
        let (card, categories) = parse_override(raw)?;
        settings.choosable_category_overrides.insert(card, categories);
    }

    let target = settings.optimization_target;
    let show_progress = m.get_flag("progress");
    let input = settings.to_optimizer_input(catalog, spend);

    let mut results = spawn_optimize(input).wait(|p| {
        if show_progress {
            report_progress(p, target);
        }
    })?;
    let top = m.get_one::<usize>("top").copied().unwrap_or(5);
    results.truncate(top);

    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &results)? {
        return Ok(());
    }
    if results.is_empty() {
        println!("No feasible portfolio");
        return Ok(());
    }

    let data = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                (i + 1).to_string(),
                describe_cards(r),
                fmt_money(r.score.monthly_cashback),
                fmt_money(r.score.net_annual_value),
                fmt_money(r.score.first_year_value),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["#", "Cards", "Monthly", "Net annual", "First year"],
            data
        )
    );

    let best = &results[0];
    println!("{}", super::score::allocation_table(&best.allocation));
    println!("{}", super::score::summary_table(&best.score));
    Ok(())
}

fn report_progress(p: &OptimizerProgress, target: OptimizationTarget) {
    let best = p
        .current_best
        .as_ref()
        .map(|r| format!("{} ({})", r.card_ids.join(", "), fmt_money(r.score.target_value(target))))
        .unwrap_or_else(|| "-".to_string());
    eprintln!("evaluated {}/{} best: {}", p.evaluated, p.total_estimate, best);
}

// Card ids, with any chosen categories in brackets.
fn describe_cards(result: &OptimizerResult) -> String {
    result
        .cards
        .iter()
        .map(|variant| {
            let chosen = variant.chosen_categories();
            if chosen.is_empty() {
                variant.card.id.clone()
            } else {
                format!("{} [{}]", variant.card.id, chosen.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}
