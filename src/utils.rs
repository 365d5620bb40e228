// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::categories::default_monthly_spend;
use crate::error::InputError;
use crate::models::{Card, SpendProfile};

pub fn load_catalog(path: &Path) -> Result<Vec<Card>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Read card catalog from {}", path.display()))?;
    let cards: Vec<Card> = serde_json::from_str(&raw)
        .with_context(|| format!("Parse card catalog in {}", path.display()))?;
    Ok(cards)
}

#[derive(Debug, Deserialize)]
struct SpendRow {
    category: String,
    amount: f64,
}

/// Load a monthly spend profile from a `.json` object or a `.csv` file with
/// `category,amount` columns. `None` gives the default household profile.
pub fn load_spend_profile(path: Option<&Path>) -> Result<SpendProfile> {
    let Some(path) = path else {
        return Ok(default_monthly_spend().clone());
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let profile: SpendProfile = match ext.as_str() {
        "json" => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Read spend profile from {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Parse spend profile in {}", path.display()))?
        }
        "csv" => {
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)
                .with_context(|| format!("Open spend profile {}", path.display()))?;
            let mut profile = SpendProfile::new();
            for row in rdr.deserialize::<SpendRow>() {
                let row = row.with_context(|| format!("Parse spend row in {}", path.display()))?;
                *profile.entry(row.category).or_insert(0.0) += row.amount;
            }
            profile
        }
        other => return Err(InputError::UnsupportedFormat(other.to_string()).into()),
    };

    validate_spend(&profile)?;
    Ok(profile)
}

fn validate_spend(profile: &SpendProfile) -> Result<(), InputError> {
    for (category, &amount) in profile {
        if !amount.is_finite() || amount < 0.0 {
            return Err(InputError::NegativeSpend {
                category: category.clone(),
                amount,
            });
        }
    }
    Ok(())
}

/// Parse `CARD=cat1,cat2` into a choosable override.
pub fn parse_override(s: &str) -> Result<(String, Vec<String>), InputError> {
    let (card, cats) = s
        .split_once('=')
        .ok_or_else(|| InputError::InvalidOverride(s.to_string()))?;
    let card = card.trim();
    let cats: Vec<String> = cats
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    if card.is_empty() || cats.is_empty() {
        return Err(InputError::InvalidOverride(s.to_string()));
    }
    Ok((card.to_string(), cats))
}

/// Pick `ids` out of the catalog, in the order given.
pub fn select_cards(catalog: &[Card], ids: &[String]) -> Result<Vec<Card>, InputError> {
    ids.iter()
        .map(|id| {
            catalog
                .iter()
                .find(|c| &c.id == id)
                .cloned()
                .ok_or_else(|| InputError::UnknownCard(id.clone()))
        })
        .collect()
}

pub fn fmt_money(v: f64) -> String {
    format!("${:.2}", v)
}

pub fn fmt_rate(v: f64) -> String {
    format!("{:.2}%", v)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
