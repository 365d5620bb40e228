// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{
    Card, CardType, InclusionMode, OptimizationTarget, OptimizerInput, Quarter, RotatingMode,
    SpendProfile,
};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Cardclip", "cardclip"));

fn default_max_cards() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub max_cards_in_wallet: usize,
    pub optimization_target: OptimizationTarget,
    pub rotating_mode: RotatingMode,
    pub current_quarter: Quarter,
    pub include_sign_on_bonus_in_first_year: bool,
    /// Drop every debit card from the search, whatever its inclusion mode.
    pub exclude_debit_cards: bool,
    pub card_inclusion_mode_by_id: HashMap<String, InclusionMode>,
    pub choosable_category_overrides: HashMap<String, Vec<String>>,
    // Older settings files list forced cards instead of per-card modes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forced_include_card_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forced_exclude_card_ids: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_cards_in_wallet: default_max_cards(),
            optimization_target: OptimizationTarget::default(),
            rotating_mode: RotatingMode::default(),
            current_quarter: Quarter::default(),
            include_sign_on_bonus_in_first_year: false,
            exclude_debit_cards: false,
            card_inclusion_mode_by_id: HashMap::new(),
            choosable_category_overrides: HashMap::new(),
            forced_include_card_ids: Vec::new(),
            forced_exclude_card_ids: Vec::new(),
        }
    }
}

impl Settings {
    /// Fold legacy forced lists into per-card modes. Explicit modes win, and
    /// includes are applied before excludes.
    pub fn migrate_legacy(&mut self) {
        for id in self.forced_include_card_ids.drain(..) {
            self.card_inclusion_mode_by_id
                .entry(id)
                .or_insert(InclusionMode::Include);
        }
        for id in self.forced_exclude_card_ids.drain(..) {
            self.card_inclusion_mode_by_id
                .entry(id)
                .or_insert(InclusionMode::Exclude);
        }
    }

    pub fn set_mode(&mut self, card_id: &str, mode: InclusionMode) {
        self.card_inclusion_mode_by_id
            .insert(card_id.to_string(), mode);
    }

    pub fn to_optimizer_input(&self, cards: Vec<Card>, monthly_spend: SpendProfile) -> OptimizerInput {
        let mut modes = self.card_inclusion_mode_by_id.clone();
        if self.exclude_debit_cards {
            for card in cards.iter().filter(|c| c.card_type == CardType::Debit) {
                modes.insert(card.id.clone(), InclusionMode::Exclude);
            }
        }

        let mut input = OptimizerInput::new(cards, monthly_spend, self.max_cards_in_wallet);
        input.card_inclusion_mode_by_id = modes;
        input.choosable_category_overrides = self.choosable_category_overrides.clone();
        input.target = self.optimization_target;
        input.include_sign_on_bonus_in_first_year = self.include_sign_on_bonus_in_first_year;
        input.rotating_mode = self.rotating_mode;
        input.current_quarter = self.current_quarter;
        input
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    Ok(proj.config_dir().join("settings.json"))
}

/// Read settings from `path`, or from the default location when `None`.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = config_path()?;
            if !p.exists() {
                debug!(path = %p.display(), "No settings file, using defaults");
                return Ok(Settings::default());
            }
            p
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Read settings from {}", path.display()))?;
    let mut settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parse settings in {}", path.display()))?;
    settings.migrate_legacy();
    debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}
