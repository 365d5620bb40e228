// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod exporter;
pub mod optimize;
pub mod score;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{Settings, load_settings};
use crate::models::{Card, Quarter, RotatingMode, ScoreOptions, SpendProfile};
use crate::utils::{load_catalog, load_spend_profile};

fn path_arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a Path> {
    m.get_one::<String>(name).map(Path::new)
}

pub(crate) fn catalog(m: &clap::ArgMatches) -> Result<Vec<Card>> {
    let path = path_arg(m, "catalog").context("A card catalog is required (--catalog PATH)")?;
    load_catalog(path)
}

pub(crate) fn spend(m: &clap::ArgMatches) -> Result<SpendProfile> {
    load_spend_profile(path_arg(m, "spend"))
}

pub(crate) fn settings(m: &clap::ArgMatches) -> Result<Settings> {
    load_settings(path_arg(m, "settings"))
}

pub(crate) fn card_ids(m: &clap::ArgMatches) -> Vec<String> {
    m.get_many::<String>("cards")
        .map(|ids| ids.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Apply `--sign-on`, `--rotating-mode` and `--quarter` on top of `settings`.
pub(crate) fn apply_scoring_flags(m: &clap::ArgMatches, settings: &mut Settings) {
    if m.get_flag("sign-on") {
        settings.include_sign_on_bonus_in_first_year = true;
    }
    if let Some(mode) = m.get_one::<RotatingMode>("rotating-mode") {
        settings.rotating_mode = *mode;
    }
    if let Some(quarter) = m.get_one::<Quarter>("quarter") {
        settings.current_quarter = *quarter;
    }
}

pub(crate) fn score_options(settings: &Settings) -> ScoreOptions {
    ScoreOptions {
        rotating_mode: settings.rotating_mode,
        current_quarter: settings.current_quarter,
    }
}
