// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod api;
mod config;
mod context;
mod converter;
mod directory;
mod error;
mod form;
mod models;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ExchangeRateClient, RestCountriesClient};
use crate::config::{Config, API_KEY_ENV};
use crate::context::ConverterContext;
use crate::form::ConverterForm;

#[derive(Parser, Debug)]
#[command(name = "fx-convert", version, about = "Convert amounts between currencies using live rates")]
struct Cli {
    /// Read settings from this TOML file instead of the per-user config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive converter (default)
    Tui {
        /// Pre-fill the amount field
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// Pre-select the source currency once the list has loaded
        #[arg(long)]
        from: Option<String>,
        /// Pre-select the target currency once the list has loaded
        #[arg(long)]
        to: Option<String>,
    },
    /// Convert a single amount and print the result
    Convert {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        from: String,
        to: String,
    },
    /// List the selectable currencies, sorted by country
    Currencies {
        /// Export the list to a CSV file instead of printing it
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Write a config file with the default settings
    InitConfig { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui {
        amount: None,
        from: None,
        to: None,
    });

    init_logging(matches!(command, Commands::Tui { .. }))?;

    let load_config = || config::load_config(cli.config.as_deref());

    match command {
        Commands::InitConfig { path } => init_config(&path)?,
        Commands::Tui { amount, from, to } => {
            let config = load_config()?;
            let prefill = tui::Prefill { amount, from, to };
            tui::start_tui(build_context(&config)?, prefill).await?
        }
        Commands::Convert { amount, from, to } => {
            let config = load_config()?;
            config.require_api_key()?;
            convert_once(&build_context(&config)?, &amount, &from, &to).await?
        }
        Commands::Currencies { csv } => list_currencies(&load_config()?, csv).await?,
    }

    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    config::save_config(&Config::default(), path)?;
    println!("✅ Config written to {}", path.display());
    Ok(())
}

/// Logs go to stderr, except in the TUI where they would corrupt the screen
fn init_logging(to_file: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if to_file {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open("fx-convert.log")
            .context("Failed to open fx-convert.log")?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

fn build_context(config: &Config) -> Result<ConverterContext> {
    if config.api_key.is_none() {
        log::warn!("{} is not set, conversions will fail", API_KEY_ENV);
    }

    let ctx = ConverterContext::builder()
        .form(ConverterForm::new(config.banner_timeout()))
        .countries(Arc::new(RestCountriesClient::new(&config.countries_url)))
        .rates(Arc::new(ExchangeRateClient::new(
            &config.rates_base_url,
            config.api_key.clone(),
        )))
        .build()?;
    Ok(ctx)
}

fn spinner(message: &'static str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        progress.set_style(style);
    }
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

async fn convert_once(ctx: &ConverterContext, amount: &str, from: &str, to: &str) -> Result<()> {
    let from = from.to_ascii_uppercase();
    let to = to.to_ascii_uppercase();

    let progress = spinner("Fetching exchange rates...");
    let result = ctx.converter().convert(amount, &from, &to).await;
    progress.finish_and_clear();

    let result = result?;
    println!("{}", result);
    println!("Rate: 1 {} = {} {}", result.from, result.rate, result.to);
    if let Some(updated) = result.rates_updated {
        println!("Rates updated {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

async fn list_currencies(config: &Config, csv: Option<PathBuf>) -> Result<()> {
    let source = RestCountriesClient::new(&config.countries_url);

    let progress = spinner("Fetching countries...");
    let options = directory::load_options(&source).await;
    progress.finish_and_clear();

    if options.is_empty() {
        anyhow::bail!(error::NO_COUNTRIES_MESSAGE);
    }

    match csv {
        Some(path) => {
            directory::export_options_csv(&options, &path)?;
            println!("📝 {} currencies written to {}", options.len(), path.display());
        }
        None => {
            for option in &options {
                println!("{}", option.label);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_subcommand_parses() {
        let cli = Cli::try_parse_from(["fx-convert", "init-config", "settings.toml"]).unwrap();
        match cli.command {
            Some(Commands::InitConfig { path }) => assert_eq!(path, PathBuf::from("settings.toml")),
            other => panic!("expected init-config, got {:?}", other),
        }
    }

    #[test]
    fn test_init_config_writes_loadable_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fx-convert.toml");

        init_config(&path)?;

        let loaded = config::load_config_file(&path)?;
        assert_eq!(loaded, Config::default());
        Ok(())
    }

    #[test]
    fn test_missing_subcommand_defaults_to_tui() {
        let cli = Cli::try_parse_from(["fx-convert"]).unwrap();
        assert!(cli.command.is_none());
    }
}
