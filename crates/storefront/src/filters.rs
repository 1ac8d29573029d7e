//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a decimal amount as a euro price, e.g. `29.50 €`.
///
/// Usage in templates: `{{ item.price|euros }}`
#[askama::filter_fn]
pub fn euros(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{value} €"))
}

// Dates are rendered in templates with chrono's `format("%d/%m/%Y %H:%M")`.
