//! Contractual budget curve.
//!
//! ```text
//! budget(date) = nameplate × (1 − degradation)^years
//! years        = max(0, floor((date − start) / 365 days))
//! ```
//!
//! The decay is stepped: the value only changes every 365 days after `start`,
//! which drifts from the calendar anniversary across leap years.

use chrono::NaiveDate;

use crate::domain::BudgetModel;
use crate::error::AppError;

/// Whole 365-day years elapsed since the budget start (never negative).
pub fn budget_years(model: &BudgetModel, date: NaiveDate) -> i64 {
    (date - model.start).num_days().div_euclid(365).max(0)
}

/// Target PR for `date`.
pub fn budget_pr(model: &BudgetModel, date: NaiveDate) -> f64 {
    budget_for_year(model, budget_years(model, date))
}

fn budget_for_year(model: &BudgetModel, years: i64) -> f64 {
    let years = i32::try_from(years).unwrap_or(i32::MAX);
    model.nameplate * (1.0 - model.annual_degradation).powi(years)
}

/// Legend values for contract years 1, 2 and 3, rounded to one decimal.
pub fn milestones(model: &BudgetModel) -> [f64; 3] {
    [0, 1, 2].map(|years| round1(budget_for_year(model, years)))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Reject parameters that would make the curve meaningless.
pub fn validate_budget(model: &BudgetModel) -> Result<(), AppError> {
    if !(model.nameplate.is_finite() && model.nameplate > 0.0) {
        return Err(AppError::input(format!(
            "Invalid budget base {} (must be finite and > 0).",
            model.nameplate
        )));
    }
    if !(model.annual_degradation.is_finite() && (0.0..1.0).contains(&model.annual_degradation)) {
        return Err(AppError::input(format!(
            "Invalid budget degradation {} (must be in [0, 1)).",
            model.annual_degradation
        )));
    }
    Ok(())
}
