// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::RateSource;
use crate::error::ConversionError;
use crate::form::ConverterForm;
use crate::models::ConversionResult;

/// What a single convert click ended up doing to the form
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Converted(ConversionResult),
    Failed(ConversionError),
    /// A newer click was issued while this one waited on the network
    Stale,
}

/// Check the inputs in form order; the first empty one wins
pub fn validate(amount: &str, from: &str, to: &str) -> Result<(), ConversionError> {
    if amount.is_empty() {
        return Err(ConversionError::MissingAmount);
    }
    if from.is_empty() {
        return Err(ConversionError::MissingFromCurrency);
    }
    if to.is_empty() {
        return Err(ConversionError::MissingToCurrency);
    }
    Ok(())
}

pub struct ConversionHandler {
    rates: Arc<dyn RateSource>,
    latest_request: AtomicU64,
}

impl ConversionHandler {
    pub fn new(rates: Arc<dyn RateSource>) -> Self {
        Self {
            rates,
            latest_request: AtomicU64::new(0),
        }
    }

    /// Validate, fetch a fresh rate table for `from` and convert `amount` into `to`
    pub async fn convert(
        &self,
        amount: &str,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ConversionError> {
        validate(amount, from, to)?;
        self.fetch_and_compute(amount, from, to).await
    }

    async fn fetch_and_compute(
        &self,
        amount: &str,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ConversionError> {
        log::info!("Converting {} from {} to {}", amount, from, to);

        let table = self
            .rates
            .latest(from)
            .await
            .and_then(|response| response.into_table())
            .ok_or(ConversionError::RatesUnavailable)?;

        log::debug!(
            "Got {} rates based on {}",
            table.rates.len(),
            table.base.as_deref().unwrap_or(from)
        );

        let rate = table.lookup(to).ok_or(ConversionError::RateNotFound)?;

        let mut result = ConversionResult::compute(amount, from, to, rate);
        result.rates_updated = table.last_updated;
        Ok(result)
    }

    /// The convert button handler: read the form, run the conversion and
    /// write the outcome back. Only the most recent request may render.
    pub async fn run_on(&self, form: &Mutex<ConverterForm>) -> Outcome {
        let (amount, from, to) = {
            let form = form.lock().await;
            (
                form.amount.value().to_string(),
                form.from.value().to_string(),
                form.to.value().to_string(),
            )
        };

        if let Err(e) = validate(&amount, &from, &to) {
            apply_error(&mut *form.lock().await, e);
            return Outcome::Failed(e);
        }

        let request = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.fetch_and_compute(&amount, &from, &to).await;

        let mut form = form.lock().await;
        if self.latest_request.load(Ordering::SeqCst) != request {
            log::debug!("Discarding conversion #{}, a newer one is in flight", request);
            return Outcome::Stale;
        }

        match result {
            Ok(result) => {
                form.set_output(result.to_string());
                Outcome::Converted(result)
            }
            Err(e) => {
                apply_error(&mut form, e);
                Outcome::Failed(e)
            }
        }
    }
}

fn apply_error(form: &mut ConverterForm, error: ConversionError) {
    form.show_error(error.to_string());
    if let Some(field) = error.focus() {
        form.set_focus(field);
    }
}
