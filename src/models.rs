// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::InputError;

/// Monthly spend keyed by category id. Parent and child ids may both appear.
pub type SpendProfile = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    #[default]
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendPeriod {
    Month,
    Quarter,
    Year,
}

impl SpendPeriod {
    fn months(self) -> f64 {
        match self {
            SpendPeriod::Month => 1.0,
            SpendPeriod::Quarter => 3.0,
            SpendPeriod::Year => 12.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SpendPeriod::Month => "month",
            SpendPeriod::Quarter => "quarter",
            SpendPeriod::Year => "year",
        }
    }
}

/// A spend cap. Either field missing (or a zero amount) means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpendLimit {
    pub amount: Option<f64>,
    pub period: Option<SpendPeriod>,
}

impl SpendLimit {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn new(amount: f64, period: SpendPeriod) -> Self {
        Self {
            amount: Some(amount),
            period: Some(period),
        }
    }

    /// Ceiling expressed per month, `None` when uncapped.
    pub fn monthly_equivalent(&self) -> Option<f64> {
        match (self.amount, self.period) {
            (Some(amount), Some(period)) if amount != 0.0 => Some(amount / period.months()),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match (self.amount, self.period) {
            (Some(amount), Some(period)) if amount != 0.0 => {
                format!("${}/{}", group_thousands(amount), period.label())
            }
            _ => "Unlimited".to_string(),
        }
    }

    pub fn describe_monthly(&self) -> String {
        match self.monthly_equivalent() {
            Some(monthly) => format!("${:.2}/month", monthly),
            None => "No limit".to_string(),
        }
    }
}

fn group_thousands(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBonus {
    pub category_id: String,
    pub cashback_percent: f64,
    #[serde(default)]
    pub spend_limit: SpendLimit,
    #[serde(default)]
    pub is_user_choosable: bool,
    #[serde(default)]
    pub max_choosable_slots: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_category_ids: Option<Vec<String>>,
    #[serde(default)]
    pub is_rotating: bool,
    #[serde(default)]
    pub rotating_schedule: Option<BTreeMap<Quarter, Vec<String>>>,
    #[serde(default)]
    pub notes: String,
}

impl CategoryBonus {
    /// Uncapped, fixed bonus on one category.
    pub fn fixed(category_id: impl Into<String>, cashback_percent: f64) -> Self {
        Self {
            category_id: category_id.into(),
            cashback_percent,
            spend_limit: SpendLimit::unlimited(),
            is_user_choosable: false,
            max_choosable_slots: None,
            allowed_category_ids: None,
            is_rotating: false,
            rotating_schedule: None,
            notes: String::new(),
        }
    }

    pub fn with_limit(mut self, limit: SpendLimit) -> Self {
        self.spend_limit = limit;
        self
    }

    /// Copy of this bonus pinned to `category_id` with the choice resolved.
    pub fn pinned_to(&self, category_id: &str) -> Self {
        Self {
            category_id: category_id.to_string(),
            is_user_choosable: false,
            max_choosable_slots: None,
            ..self.clone()
        }
    }

    pub fn allowed_categories(&self) -> &[String] {
        self.allowed_category_ids.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsSystem {
    #[serde(default)]
    pub program_name: Option<String>,
    pub default_point_value_cents: f64,
    #[serde(default)]
    pub user_point_value_cents: Option<f64>,
}

impl Default for PointsSystem {
    fn default() -> Self {
        Self {
            program_name: None,
            default_point_value_cents: 1.0,
            user_point_value_cents: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusType {
    Cash,
    Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOnBonus {
    pub bonus_amount: f64,
    pub bonus_type: BonusType,
    #[serde(default)]
    pub spend_requirement: f64,
    #[serde(default)]
    pub timeframe_days: u32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perk {
    pub name: String,
    pub estimated_annual_value: f64,
    #[serde(default)]
    pub user_annual_value: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

impl Perk {
    pub fn value(&self) -> f64 {
        self.user_annual_value.unwrap_or(self.estimated_annual_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusivityKind {
    CannotHoldWith,
    OneOfFamily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusivityRule {
    pub rule_type: ExclusivityKind,
    pub card_ids: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalBonus {
    pub condition_name: String,
    #[serde(default)]
    pub condition_description: String,
    #[serde(default)]
    pub base_cashback_boost: f64,
    #[serde(default = "one")]
    pub category_bonus_multiplier: f64,
    #[serde(default)]
    pub is_active: bool,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    ApplePay,
    GooglePay,
    SamsungPay,
    Contactless,
    TravelPortal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodBonus {
    pub method: PaymentMethod,
    pub bonus_cashback_percent: f64,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    #[serde(default)]
    pub spend_limit: SpendLimit,
    #[serde(default)]
    pub notes: String,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    pub network: Network,
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default)]
    pub annual_fee: f64,
    #[serde(default)]
    pub foreign_transaction_fee_percent: f64,
    #[serde(default = "yes")]
    pub is_active: bool,
    pub base_cashback_percent: f64,
    #[serde(default)]
    pub category_bonuses: Vec<CategoryBonus>,
    #[serde(default)]
    pub points_system: PointsSystem,
    #[serde(default)]
    pub sign_on_bonus: Option<SignOnBonus>,
    #[serde(default)]
    pub perks: Vec<Perk>,
    #[serde(default)]
    pub exclusivity_rules: Vec<ExclusivityRule>,
    #[serde(default)]
    pub conditional_bonuses: Vec<ConditionalBonus>,
    #[serde(default)]
    pub payment_method_bonuses: Vec<PaymentMethodBonus>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Card {
    /// Minimal active Visa credit card with a flat base rate.
    pub fn flat(id: impl Into<String>, name: impl Into<String>, base_cashback_percent: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            issuer: String::new(),
            network: Network::Visa,
            card_type: CardType::Credit,
            annual_fee: 0.0,
            foreign_transaction_fee_percent: 0.0,
            is_active: true,
            base_cashback_percent,
            category_bonuses: Vec::new(),
            points_system: PointsSystem::default(),
            sign_on_bonus: None,
            perks: Vec::new(),
            exclusivity_rules: Vec::new(),
            conditional_bonuses: Vec::new(),
            payment_method_bonuses: Vec::new(),
            notes: String::new(),
            url: None,
        }
    }

    /// Cents per point, floored at 0.01 so a zero valuation cannot erase a card.
    pub fn point_multiplier(&self) -> f64 {
        self.points_system
            .user_point_value_cents
            .unwrap_or(self.points_system.default_point_value_cents)
            .max(0.01)
    }

    pub fn perk_value(&self) -> f64 {
        self.perks.iter().map(Perk::value).sum()
    }

    pub fn sign_on_value(&self) -> f64 {
        match &self.sign_on_bonus {
            None => 0.0,
            Some(bonus) => match bonus.bonus_type {
                BonusType::Cash => bonus.bonus_amount,
                BonusType::Points => bonus.bonus_amount * self.point_multiplier() / 100.0,
            },
        }
    }

    /// The first active conditional bonus; later ones are ignored.
    pub fn active_condition(&self) -> Option<&ConditionalBonus> {
        self.conditional_bonuses.iter().find(|c| c.is_active)
    }

    pub fn first_choosable_bonus(&self) -> Option<&CategoryBonus> {
        self.category_bonuses.iter().find(|b| b.is_user_choosable)
    }
}

/// A card with its bonus list finalized. Choosable slots have been resolved
/// into fixed bonuses, so scoring treats every entry in `bonuses` literally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardVariant {
    pub card: Arc<Card>,
    pub bonuses: Vec<CategoryBonus>,
}

impl CardVariant {
    pub fn unchanged(card: Arc<Card>) -> Self {
        let bonuses = card.category_bonuses.clone();
        Self { card, bonuses }
    }

    /// Categories picked for choosable slots, in slot order.
    pub fn chosen_categories(&self) -> Vec<&str> {
        let fixed = self
            .card
            .category_bonuses
            .iter()
            .filter(|b| !b.is_user_choosable)
            .count();
        self.bonuses
            .iter()
            .skip(fixed)
            .map(|b| b.category_id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Quarter {
    #[default]
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn from_date(date: NaiveDate) -> Self {
        match date.month() {
            1..=3 => Quarter::Q1,
            4..=6 => Quarter::Q2,
            7..=9 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }

    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        f.write_str(s)
    }
}

impl FromStr for Quarter {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            "NOW" => Ok(Quarter::current()),
            _ => Err(InputError::UnknownQuarter(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotatingMode {
    #[default]
    Annualized,
    CurrentQuarter,
}

impl FromStr for RotatingMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "annualized" => Ok(RotatingMode::Annualized),
            "current_quarter" => Ok(RotatingMode::CurrentQuarter),
            _ => Err(InputError::UnknownRotatingMode(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTarget {
    #[default]
    MonthlyCashback,
    AnnualNetValue,
    FirstYearValue,
}

impl FromStr for OptimizationTarget {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "monthly_cashback" => Ok(OptimizationTarget::MonthlyCashback),
            "annual_net_value" => Ok(OptimizationTarget::AnnualNetValue),
            "first_year_value" => Ok(OptimizationTarget::FirstYearValue),
            _ => Err(InputError::UnknownTarget(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InclusionMode {
    Include,
    #[default]
    Neutral,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOptions {
    pub rotating_mode: RotatingMode,
    pub current_quarter: Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioScore {
    pub monthly_cashback: f64,
    pub annual_cashback: f64,
    pub annual_fees: f64,
    pub annual_perks: f64,
    pub sign_on_value: f64,
    pub net_annual_value: f64,
    pub first_year_value: f64,
}

impl PortfolioScore {
    pub fn target_value(&self, target: OptimizationTarget) -> f64 {
        match target {
            OptimizationTarget::MonthlyCashback => self.monthly_cashback,
            OptimizationTarget::AnnualNetValue => self.net_annual_value,
            OptimizationTarget::FirstYearValue => self.first_year_value,
        }
    }
}

pub const UNASSIGNED_CARD_ID: &str = "unassigned";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocation {
    pub category_id: String,
    pub spend: f64,
    pub card_id: String,
    pub card_name: String,
    pub rate_percent: f64,
    pub cashback: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_spend: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_to_card_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_cashback: Option<f64>,
}

impl CategoryAllocation {
    pub fn is_unassigned(&self) -> bool {
        self.card_id == UNASSIGNED_CARD_ID
    }
}

/// Everything the search needs, as handed over by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerInput {
    pub cards: Vec<Card>,
    pub monthly_spend: SpendProfile,
    pub max_cards: usize,
    #[serde(default)]
    pub card_inclusion_mode_by_id: HashMap<String, InclusionMode>,
    #[serde(default)]
    pub choosable_category_overrides: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub target: OptimizationTarget,
    #[serde(default)]
    pub include_sign_on_bonus_in_first_year: bool,
    #[serde(default)]
    pub rotating_mode: RotatingMode,
    #[serde(default)]
    pub current_quarter: Quarter,
}

impl OptimizerInput {
    pub fn new(cards: Vec<Card>, monthly_spend: SpendProfile, max_cards: usize) -> Self {
        Self {
            cards,
            monthly_spend,
            max_cards,
            card_inclusion_mode_by_id: HashMap::new(),
            choosable_category_overrides: HashMap::new(),
            target: OptimizationTarget::default(),
            include_sign_on_bonus_in_first_year: false,
            rotating_mode: RotatingMode::default(),
            current_quarter: Quarter::default(),
        }
    }

    pub fn inclusion_mode(&self, card_id: &str) -> InclusionMode {
        self.card_inclusion_mode_by_id
            .get(card_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn score_options(&self) -> ScoreOptions {
        ScoreOptions {
            rotating_mode: self.rotating_mode,
            current_quarter: self.current_quarter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerResult {
    pub card_ids: Vec<String>,
    pub cards: Vec<CardVariant>,
    pub score: PortfolioScore,
    pub allocation: Vec<CategoryAllocation>,
    pub evaluated_combinations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerProgress {
    pub evaluated: usize,
    pub total_estimate: usize,
    pub current_best: Option<OptimizerResult>,
}
