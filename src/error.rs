// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Problems with caller-supplied input. The scoring engine itself never fails;
/// these only surface while reading files and command-line arguments.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Unknown quarter '{0}', expected Q1, Q2, Q3, Q4 or now")]
    UnknownQuarter(String),
    #[error("Unknown rotating mode '{0}', expected annualized or current_quarter")]
    UnknownRotatingMode(String),
    #[error("Unknown optimization target '{0}', expected monthly_cashback, annual_net_value or first_year_value")]
    UnknownTarget(String),
    #[error("Invalid spend amount {amount} for category '{category}'")]
    NegativeSpend { category: String, amount: f64 },
    #[error("Invalid choosable override '{0}', expected card=category[,category...]")]
    InvalidOverride(String),
    #[error("Card '{0}' not found in catalog")]
    UnknownCard(String),
    #[error("Unsupported format '{0}' (use csv|json)")]
    UnsupportedFormat(String),
}
