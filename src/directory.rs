// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use csv::Writer;
use std::path::Path;
use tokio::sync::Mutex;

use crate::api::CountrySource;
use crate::error::NO_COUNTRIES_MESSAGE;
use crate::form::ConverterForm;
use crate::models::{sorted_options, CurrencyOption};

/// Load the country directory once and fill both currency selects.
///
/// An empty directory leaves the selects untouched and raises the
/// "No countries found!" banner. Returns the number of currencies rendered.
pub async fn populate_currency_selects(
    source: &dyn CountrySource,
    form: &Mutex<ConverterForm>,
) -> usize {
    let records = source.load().await;
    let mut form = form.lock().await;

    if records.is_empty() {
        form.show_error(NO_COUNTRIES_MESSAGE);
        return 0;
    }

    let rendered = form.from.populate(&records);
    form.to.populate(&records);
    log::info!("Rendered {} currencies into both selects", rendered);
    rendered
}

/// The same entries the selects would show, without the placeholder
pub async fn load_options(source: &dyn CountrySource) -> Vec<CurrencyOption> {
    sorted_options(&source.load().await)
}

/// Write the currency options to a CSV file
pub fn export_options_csv(options: &[CurrencyOption], path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["Code", "Country", "Currency", "Symbol"])?;

    for option in options {
        writer.write_record([
            option.code.as_str(),
            option.country.as_str(),
            option.currency.name.as_deref().unwrap_or(""),
            option.currency.symbol.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
