// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

use crate::models::{OptimizationTarget, Quarter, RotatingMode};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn scoring_args() -> [Arg; 3] {
    [
        Arg::new("sign-on")
            .long("sign-on")
            .action(ArgAction::SetTrue)
            .help("Count sign-on bonuses in first-year value"),
        Arg::new("rotating-mode")
            .long("rotating-mode")
            .value_name("MODE")
            .value_parser(value_parser!(RotatingMode))
            .help("annualized | current_quarter"),
        Arg::new("quarter")
            .long("quarter")
            .value_name("Q")
            .value_parser(value_parser!(Quarter))
            .help("Q1..Q4, or 'now' for today's quarter"),
    ]
}

fn cards_arg() -> Arg {
    Arg::new("cards")
        .long("cards")
        .value_name("IDS")
        .required(true)
        .value_delimiter(',')
        .help("Comma-separated card ids from the catalog")
}

pub fn build_cli() -> Command {
    command!()
        .about("Pick the reward-card wallet that earns the most on your spending")
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("PATH")
                .global(true)
                .help("JSON card catalog"),
        )
        .arg(
            Arg::new("spend")
                .long("spend")
                .value_name("PATH")
                .global(true)
                .help("Monthly spend as a .json map or a category,amount .csv"),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("PATH")
                .global(true)
                .help("Settings file (defaults to the platform config dir)"),
        )
        .subcommand(
            Command::new("categories")
                .about("List the spend category tree")
                .args(json_args()),
        )
        .subcommand(
            Command::new("score")
                .about("Score a hand-picked set of cards")
                .arg(cards_arg())
                .args(scoring_args())
                .args(json_args()),
        )
        .subcommand(
            Command::new("optimize")
                .about("Search the catalog for the best wallet")
                .arg(
                    Arg::new("max-cards")
                        .long("max-cards")
                        .value_name("N")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .value_name("TARGET")
                        .value_parser(value_parser!(OptimizationTarget))
                        .help("monthly_cashback | annual_net_value | first_year_value"),
                )
                .arg(
                    Arg::new("include")
                        .long("include")
                        .value_name("ID")
                        .action(ArgAction::Append)
                        .help("Always hold this card"),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .value_name("ID")
                        .action(ArgAction::Append)
                        .help("Never hold this card"),
                )
                .arg(
                    Arg::new("choose")
                        .long("choose")
                        .value_name("CARD=CATS")
                        .action(ArgAction::Append)
                        .help("Fix a card's choosable categories, e.g. cash-plus=dining,travel"),
                )
                .arg(
                    Arg::new("progress")
                        .long("progress")
                        .action(ArgAction::SetTrue)
                        .help("Report search progress on stderr"),
                )
                .arg(
                    Arg::new("top")
                        .long("top")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .default_value("5"),
                )
                .args(scoring_args())
                .args(json_args()),
        )
        .subcommand(
            Command::new("export")
                .about("Write results to a file")
                .subcommand_required(true)
                .subcommand(
                    Command::new("allocation")
                        .about("Per-category allocation for a card set")
                        .arg(cards_arg())
                        .arg(Arg::new("format").long("format").required(true))
                        .arg(Arg::new("out").long("out").value_name("PATH").required(true))
                        .args(scoring_args()),
                ),
        )
}
