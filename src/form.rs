// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory model of the converter form: the amount field, the two
//! currency selects, the output line and the error banner. The terminal UI
//! only draws this state; handlers only mutate it.

use std::time::Duration;
use tokio::time::Instant;

use crate::models::{sorted_options, CountryRecord, CurrencyOption};

pub const DEFAULT_BANNER_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_millis(DEFAULT_BANNER_TIMEOUT_MS);
/// Longest a message may stay up; larger configured delays are capped
pub const MAX_BANNER_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Amount,
    From,
    To,
    Convert,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Amount => Field::From,
            Field::From => Field::To,
            Field::To => Field::Convert,
            Field::Convert => Field::Amount,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::Amount => Field::Convert,
            Field::From => Field::Amount,
            Field::To => Field::From,
            Field::Convert => Field::To,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }
}

/// A currency dropdown. The first option is always the empty placeholder.
#[derive(Debug, Clone)]
pub struct CurrencySelect {
    options: Vec<CurrencyOption>,
    selected: usize,
}

impl Default for CurrencySelect {
    fn default() -> Self {
        Self {
            options: vec![CurrencyOption::placeholder()],
            selected: 0,
        }
    }
}

impl CurrencySelect {
    /// Replace all options with the placeholder plus one entry per usable
    /// record, sorted by country name. Returns the number of real entries.
    pub fn populate(&mut self, records: &[CountryRecord]) -> usize {
        self.options.clear();
        self.options.push(CurrencyOption::placeholder());
        self.options.extend(sorted_options(records));
        self.selected = 0;
        self.options.len() - 1
    }

    pub fn options(&self) -> &[CurrencyOption] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&CurrencyOption> {
        self.options.get(self.selected)
    }

    /// Currency code of the current selection, empty for the placeholder
    pub fn value(&self) -> &str {
        self.selected_option()
            .map(|option| option.code.as_str())
            .unwrap_or("")
    }

    /// Select the first option carrying `code`
    pub fn select_code(&mut self, code: &str) -> bool {
        match self.options.iter().position(|option| option.code == code) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn next(&mut self) {
        self.selected = if self.selected >= self.options.len() - 1 {
            0
        } else {
            self.selected + 1
        };
    }

    pub fn previous(&mut self) {
        self.selected = if self.selected == 0 {
            self.options.len() - 1
        } else {
            self.selected - 1
        };
    }
}

/// Error region that hides itself a fixed delay after the last message.
///
/// There is one deadline per banner; `show` moves it, so an earlier message
/// can never hide a later one.
#[derive(Debug, Clone)]
pub struct ErrorBanner {
    message: String,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl Default for ErrorBanner {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_TIMEOUT)
    }
}

impl ErrorBanner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            message: String::new(),
            deadline: None,
            timeout: timeout.min(MAX_BANNER_TIMEOUT),
        }
    }

    pub fn show(&mut self, message: impl Into<String>, now: Instant) {
        self.message = message.into();
        self.deadline = now.checked_add(self.timeout);
        if self.deadline.is_none() {
            log::warn!("Banner deadline overflowed, hiding: {}", self.message);
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Drop an expired message. Returns true if the banner was just hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.message.clear();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConverterForm {
    pub amount: TextInput,
    pub from: CurrencySelect,
    pub to: CurrencySelect,
    pub banner: ErrorBanner,
    output: String,
    focus: Field,
}

impl ConverterForm {
    pub fn new(banner_timeout: Duration) -> Self {
        Self {
            banner: ErrorBanner::new(banner_timeout),
            ..Self::default()
        }
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn set_focus(&mut self, field: Field) {
        self.focus = field;
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn set_output(&mut self, text: impl Into<String>) {
        self.output = text.into();
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.banner.show(message, Instant::now());
    }

    pub fn error_visible(&self) -> bool {
        self.banner.is_visible(Instant::now())
    }
}
