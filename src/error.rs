// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

use crate::form::Field;

/// Banner text when the country directory came back empty
pub const NO_COUNTRIES_MESSAGE: &str = "No countries found!";

/// Every way a conversion can fail. `Display` is the exact text shown to the
/// user; transport details only ever reach the log.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Please enter an amount.")]
    MissingAmount,

    #[error("Please select the first currency.")]
    MissingFromCurrency,

    #[error("Please select the second currency.")]
    MissingToCurrency,

    #[error("Failed to fetch exchange rate data.")]
    RatesUnavailable,

    #[error("Exchange rate not found for selected currency.")]
    RateNotFound,
}

impl ConversionError {
    /// The control that should receive focus after this error
    pub fn focus(&self) -> Option<Field> {
        match self {
            ConversionError::MissingAmount => Some(Field::Amount),
            ConversionError::MissingFromCurrency => Some(Field::From),
            ConversionError::MissingToCurrency => Some(Field::To),
            ConversionError::RatesUnavailable | ConversionError::RateNotFound => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WiringError {
    #[error("converter is missing its {0}")]
    Missing(&'static str),
}
