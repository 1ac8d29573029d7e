//! Custom Askama template filters.

use std::fmt::Display;

/// Formats a decimal amount as a euro price, e.g. `69.50 €`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn euros(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{value} €"))
}

// Dates are rendered in templates with chrono's `format("%d/%m/%Y %H:%M")`.
