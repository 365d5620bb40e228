// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::error::InputError;
use crate::scoring::score;
use crate::utils::select_cards;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("allocation", sub)) => export_allocation(sub),
        _ => Ok(()),
    }
}

fn export_allocation(sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .context("Missing --format")?
        .to_lowercase();
    let out = sub.get_one::<String>("out").context("Missing --out")?;
    if fmt != "csv" && fmt != "json" {
        return Err(InputError::UnsupportedFormat(fmt).into());
    }

    let catalog = super::catalog(sub)?;
    let spend = super::spend(sub)?;
    let mut settings = super::settings(sub)?;
    super::apply_scoring_flags(sub, &mut settings);
    let cards = select_cards(&catalog, &super::card_ids(sub))?;
    let scored = score(
        &cards,
        &spend,
        settings.include_sign_on_bonus_in_first_year,
        &super::score_options(&settings),
    );

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "category",
                "spend",
                "card_id",
                "card_name",
                "rate_percent",
                "cashback",
                "overflow_spend",
                "overflow_to_card_id",
                "overflow_cashback",
            ])?;
            for row in &scored.allocation {
                wtr.write_record([
                    row.category_id.clone(),
                    format!("{:.2}", row.spend),
                    row.card_id.clone(),
                    row.card_name.clone(),
                    format!("{:.4}", row.rate_percent),
                    format!("{:.2}", row.cashback),
                    row.overflow_spend.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                    row.overflow_to_card_id.clone().unwrap_or_default(),
                    row.overflow_cashback.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&scored)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    println!("Exported allocation to {}", out);
    Ok(())
}
