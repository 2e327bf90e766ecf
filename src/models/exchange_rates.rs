// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Body of a `latest/<base>` response from the exchange rate API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeRateResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub base_code: Option<String>,
    #[serde(default)]
    pub time_last_update_unix: Option<i64>,
    #[serde(default)]
    pub conversion_rates: Option<HashMap<String, f64>>,
}

impl ExchangeRateResponse {
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.time_last_update_unix
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }

    /// Split off the rate table, or `None` when the response carried none
    pub fn into_table(self) -> Option<ExchangeRateTable> {
        let last_updated = self.last_updated();
        self.conversion_rates.map(|rates| ExchangeRateTable {
            base: self.base_code,
            rates,
            last_updated,
        })
    }
}

/// Rates relative to a single base currency, used for one lookup and dropped
#[derive(Debug, Clone, Default)]
pub struct ExchangeRateTable {
    pub base: Option<String>,
    pub rates: HashMap<String, f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ExchangeRateTable {
    /// Rate for `code`. A rate of exactly zero counts as not found.
    pub fn lookup(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied().filter(|rate| *rate != 0.0)
    }
}

/// A completed conversion, rendered as `"<amount> <from> = <converted> <to>"`
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    /// The amount exactly as the user typed it
    pub amount: String,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub converted: f64,
    pub rates_updated: Option<DateTime<Utc>>,
}

impl ConversionResult {
    pub fn compute(amount: &str, from: &str, to: &str, rate: f64) -> Self {
        Self {
            amount: amount.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            rate,
            converted: parse_amount(amount) * rate,
            rates_updated: None,
        }
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            self.amount,
            self.from,
            format_fixed2(self.converted),
            self.to
        )
    }
}

/// Two-decimal rendering in the style of `Number.prototype.toFixed(2)`.
///
/// NaN and infinities keep their textual names, exact half-way values round
/// away from zero and negative zero prints as `0.00`.
pub fn format_fixed2(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    } else if value == f64::INFINITY {
        return "Infinity".to_string();
    } else if value == f64::NEG_INFINITY {
        return "-Infinity".to_string();
    }

    // -0.0 == 0.0, so this also drops the sign of negative zero
    let value = if value == 0.0 { 0.0 } else { value };

    let cents = value * 100.0;
    // The product error is zero only when `cents` is the exact value
    let exact = value.mul_add(100.0, -cents) == 0.0;
    if exact && cents.fract().abs() == 0.5 {
        let rounded = (cents.abs().trunc() + 1.0) as u64;
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}{}.{:02}", sign, rounded / 100, rounded % 100);
    }

    format!("{:.2}", value)
}

/// Lenient float parsing: leading whitespace is skipped and the longest
/// numeric prefix is used, so `"12abc"` is 12. No prefix at all gives NaN.
pub fn parse_amount(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };

    if rest.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let end = numeric_prefix_len(rest);
    if end == 0 {
        return f64::NAN;
    }

    rest[..end]
        .parse::<f64>()
        .map(|value| sign * value)
        .unwrap_or(f64::NAN)
}

fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let count_digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = count_digits(0);
    let mut end = int_digits;

    if bytes.get(end) == Some(&b'.') {
        let frac_digits = count_digits(end + 1);
        if int_digits == 0 && frac_digits == 0 {
            return 0;
        }
        end += 1 + frac_digits;
    } else if int_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(exp.min(bytes.len()));
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    end
}
