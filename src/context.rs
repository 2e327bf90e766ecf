// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::{CountrySource, RateSource};
use crate::converter::{ConversionHandler, Outcome};
use crate::directory;
use crate::error::WiringError;
use crate::form::ConverterForm;

/// Everything the handlers touch, resolved once at startup and shared by
/// cloning. Clones refer to the same form and the same request counter.
#[derive(Clone)]
pub struct ConverterContext {
    form: Arc<Mutex<ConverterForm>>,
    countries: Arc<dyn CountrySource>,
    converter: Arc<ConversionHandler>,
}

#[derive(Default)]
pub struct ConverterContextBuilder {
    form: Option<ConverterForm>,
    countries: Option<Arc<dyn CountrySource>>,
    rates: Option<Arc<dyn RateSource>>,
}

impl ConverterContextBuilder {
    pub fn form(mut self, form: ConverterForm) -> Self {
        self.form = Some(form);
        self
    }

    pub fn countries(mut self, source: Arc<dyn CountrySource>) -> Self {
        self.countries = Some(source);
        self
    }

    pub fn rates(mut self, source: Arc<dyn RateSource>) -> Self {
        self.rates = Some(source);
        self
    }

    pub fn build(self) -> Result<ConverterContext, WiringError> {
        let form = self.form.ok_or(WiringError::Missing("form"))?;
        let countries = self
            .countries
            .ok_or(WiringError::Missing("country directory"))?;
        let rates = self.rates.ok_or(WiringError::Missing("exchange rate source"))?;

        Ok(ConverterContext {
            form: Arc::new(Mutex::new(form)),
            countries,
            converter: Arc::new(ConversionHandler::new(rates)),
        })
    }
}

impl ConverterContext {
    pub fn builder() -> ConverterContextBuilder {
        ConverterContextBuilder::default()
    }

    pub fn form(&self) -> &Arc<Mutex<ConverterForm>> {
        &self.form
    }

    pub fn converter(&self) -> &ConversionHandler {
        &self.converter
    }

    /// Page-load step: fill the currency selects from the directory
    pub async fn load_directory(&self) -> usize {
        directory::populate_currency_selects(self.countries.as_ref(), &self.form).await
    }

    pub async fn convert_clicked(&self) -> Outcome {
        self.converter.run_on(&self.form).await
    }

    /// Run a click in the background so the caller keeps handling input
    pub fn spawn_convert(&self) -> JoinHandle<Outcome> {
        let ctx = self.clone();
        tokio::spawn(async move { ctx.convert_clicked().await })
    }
}
