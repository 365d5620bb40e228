// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cardclip::config::{Settings, load_settings};
use cardclip::models::{Card, InclusionMode, OptimizationTarget, Quarter, RotatingMode, SpendProfile};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn settings_file(value: serde_json::Value) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    write!(f, "{}", value).unwrap();
    f
}

#[test]
fn empty_file_gives_defaults() {
    let f = settings_file(json!({}));
    let settings = load_settings(Some(f.path())).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.max_cards_in_wallet, 5);
    assert_eq!(settings.optimization_target, OptimizationTarget::MonthlyCashback);
    assert_eq!(settings.rotating_mode, RotatingMode::Annualized);
    assert_eq!(settings.current_quarter, Quarter::Q1);
}

#[test]
fn legacy_forced_lists_fold_into_modes() {
    let f = settings_file(json!({
        "maxCardsInWallet": 3,
        "rotatingMode": "current_quarter",
        "currentQuarter": "Q4",
        "forcedIncludeCardIds": ["a", "b"],
        "forcedExcludeCardIds": ["b", "c", "d"],
        "cardInclusionModeById": { "d": "neutral" },
        "choosableCategoryOverrides": { "a": ["dining"] }
    }));
    let settings = load_settings(Some(f.path())).unwrap();

    let modes = &settings.card_inclusion_mode_by_id;
    assert_eq!(modes["a"], InclusionMode::Include);
    assert_eq!(modes["b"], InclusionMode::Include);
    assert_eq!(modes["c"], InclusionMode::Exclude);
    assert_eq!(modes["d"], InclusionMode::Neutral);
    assert!(settings.forced_include_card_ids.is_empty());
    assert!(settings.forced_exclude_card_ids.is_empty());

    let input = settings.to_optimizer_input(vec![Card::flat("a", "A", 1.0)], SpendProfile::new());
    assert_eq!(input.max_cards, 3);
    assert_eq!(input.rotating_mode, RotatingMode::CurrentQuarter);
    assert_eq!(input.current_quarter, Quarter::Q4);
    assert_eq!(input.choosable_category_overrides["a"], vec!["dining"]);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_settings(Some(dir.path().join("absent.json").as_path())).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_settings_are_reported() {
    let f = settings_file(json!({ "maxCardsInWallet": "lots" }));
    assert!(load_settings(Some(f.path())).is_err());
}
