// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cardclip::{
    cli,
    commands::{categories, exporter, optimize, score},
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct Fixture {
    dir: TempDir,
    catalog: String,
    spend: String,
    settings: String,
}

impl Fixture {
    fn out(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn write_json(path: &Path, value: &serde_json::Value) -> String {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path.to_string_lossy().to_string()
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let catalog = write_json(
        &dir.path().join("cards.json"),
        &json!([
            {
                "id": "flat-2",
                "name": "Flat 2",
                "issuer": "Test",
                "network": "Visa",
                "cardType": "credit",
                "annualFee": 0,
                "baseCashbackPercent": 2,
                "categoryBonuses": [],
                "pointsSystem": { "programName": null, "defaultPointValueCents": 1, "userPointValueCents": null },
                "signOnBonus": null,
                "url": null,
                "lastUpdated": "2026-01-01"
            },
            {
                "id": "grocery-6",
                "name": "Grocery 6",
                "network": "Mastercard",
                "annualFee": 95,
                "baseCashbackPercent": 1,
                "categoryBonuses": [
                    {
                        "categoryId": "groceries",
                        "cashbackPercent": 6,
                        "spendLimit": { "amount": 6000, "period": "year" },
                        "isUserChoosable": false,
                        "maxChoosableSlots": null,
                        "isRotating": false,
                        "rotatingSchedule": null,
                        "notes": ""
                    }
                ],
                "exclusivityRules": [
                    { "ruleType": "cannot_hold_with", "cardIds": ["flat-2"], "notes": "" }
                ]
            }
        ]),
    );
    let spend_path = dir.path().join("spend.csv");
    std::fs::write(&spend_path, "category,amount\ngroceries,600\ndining,300\nother,1000\n").unwrap();
    let spend = spend_path.to_string_lossy().to_string();
    let settings = write_json(&dir.path().join("settings.json"), &json!({}));
    Fixture {
        dir,
        catalog,
        spend,
        settings,
    }
}

#[test]
fn categories_lists_the_tree() {
    let matches = cli::build_cli().get_matches_from(["cardclip", "categories", "--json"]);
    if let Some(("categories", sub)) = matches.subcommand() {
        categories::handle(sub).unwrap();
    } else {
        panic!("no categories subcommand");
    }
}

#[test]
fn score_reads_catalog_and_csv_spend() {
    let fx = fixture();
    let matches = cli::build_cli().get_matches_from([
        "cardclip",
        "--catalog",
        &fx.catalog,
        "--spend",
        &fx.spend,
        "--settings",
        &fx.settings,
        "score",
        "--cards",
        "flat-2,grocery-6",
        "--quarter",
        "q2",
    ]);
    if let Some(("score", sub)) = matches.subcommand() {
        score::handle(sub).unwrap();
    } else {
        panic!("no score subcommand");
    }
}

#[test]
fn score_rejects_unknown_card() {
    let fx = fixture();
    let matches = cli::build_cli().get_matches_from([
        "cardclip",
        "--catalog",
        &fx.catalog,
        "--settings",
        &fx.settings,
        "score",
        "--cards",
        "nope",
    ]);
    if let Some(("score", sub)) = matches.subcommand() {
        let err = score::handle(sub).unwrap_err();
        assert!(err.to_string().contains("nope"));
    } else {
        panic!("no score subcommand");
    }
}

#[test]
fn missing_catalog_is_an_error() {
    let matches = cli::build_cli().get_matches_from(["cardclip", "score", "--cards", "a"]);
    if let Some(("score", sub)) = matches.subcommand() {
        assert!(score::handle(sub).is_err());
    } else {
        panic!("no score subcommand");
    }
}

#[test]
fn optimize_runs_with_overrides() {
    let fx = fixture();
    let matches = cli::build_cli().get_matches_from([
        "cardclip",
        "optimize",
        "--catalog",
        &fx.catalog,
        "--spend",
        &fx.spend,
        "--settings",
        &fx.settings,
        "--max-cards",
        "2",
        "--target",
        "annual_net_value",
        "--include",
        "flat-2",
        "--include",
        "grocery-6",
        "--jsonl",
    ]);
    if let Some(("optimize", sub)) = matches.subcommand() {
        let includes: Vec<&String> = sub.get_many::<String>("include").unwrap().collect();
        assert_eq!(includes.len(), 2);
        // The two included cards conflict, so the search comes back empty.
        optimize::handle(sub).unwrap();
    } else {
        panic!("no optimize subcommand");
    }
}

#[test]
fn optimize_rejects_malformed_choice() {
    let fx = fixture();
    let matches = cli::build_cli().get_matches_from([
        "cardclip",
        "--catalog",
        &fx.catalog,
        "--settings",
        &fx.settings,
        "optimize",
        "--choose",
        "flat-2",
    ]);
    if let Some(("optimize", sub)) = matches.subcommand() {
        assert!(optimize::handle(sub).is_err());
    } else {
        panic!("no optimize subcommand");
    }
}

#[test]
fn export_allocation_writes_json() {
    let fx = fixture();
    let out_path = fx.out("allocation.json");
    let out_str = out_path.to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "cardclip",
        "--catalog",
        &fx.catalog,
        "--spend",
        &fx.spend,
        "--settings",
        &fx.settings,
        "export",
        "allocation",
        "--cards",
        "flat-2,grocery-6",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed["score"]["annualFees"], json!(95.0));
    let groceries = parsed["allocation"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["categoryId"] == "groceries")
        .unwrap();
    assert_eq!(groceries["cardId"], "grocery-6");
    assert_eq!(groceries["overflowSpend"], json!(100.0));
    assert_eq!(groceries["overflowToCardId"], "flat-2");
}

#[test]
fn export_allocation_writes_csv() {
    let fx = fixture();
    let out_path = fx.out("allocation.csv");
    let out_str = out_path.to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "cardclip",
        "--catalog",
        &fx.catalog,
        "--spend",
        &fx.spend,
        "--settings",
        &fx.settings,
        "export",
        "allocation",
        "--cards",
        "flat-2",
        "--format",
        "CSV",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("category,spend,card_id"));
    assert_eq!(lines.next().unwrap(), "other,1000.00,flat-2,Flat 2,2.0000,20.00,,,");
    assert_eq!(contents.lines().count(), 4);
}

#[test]
fn export_allocation_rejects_unknown_format() {
    let fx = fixture();
    let out_path = fx.out("allocation.xml");
    let out_str = out_path.to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "cardclip",
        "--catalog",
        &fx.catalog,
        "--settings",
        &fx.settings,
        "export",
        "allocation",
        "--cards",
        "flat-2",
        "--format",
        "xml",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}
