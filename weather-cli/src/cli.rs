use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weather_core::{
    Config, FileHistoryStorage, PageController, PageStatus, SearchHistory, client_from_config,
    config::{SUGGESTED_GEOCODING_BASE, SUGGESTED_WEATHER_BASE},
};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "City weather lookup")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to the interactive search when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure API key, endpoints and default city.
    Configure,

    /// Interactive search with autocomplete and history.
    Search,

    /// Show current weather for a city and record it in history.
    Show {
        /// City name, e.g. "Paris" or "Paris,FR".
        city: String,
    },

    /// List autocomplete candidates for a partial city name.
    Suggest {
        query: String,
    },

    /// Inspect or edit the search history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Print stored searches, newest first.
    List,

    /// Delete one entry by id.
    Delete { id: String },

    /// Search again for the city of an entry.
    Search { id: String },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Search) {
            Command::Configure => configure(),
            Command::Search => interactive::run(controller()?).await,
            Command::Show { city } => {
                let mut page = controller()?;
                page.restore_history();
                page.search(&city).await;
                print_page(&page)
            }
            Command::Suggest { query } => {
                let config = Config::load()?;
                let client = client_from_config(config.client_config()?)?;
                let found = client.fetch_city_suggestions(&query).await;
                if found.is_empty() {
                    println!("No matching cities.");
                }
                for (i, city) in found.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, render::suggestion(city));
                }
                Ok(())
            }
            Command::History { action } => history(action).await,
        }
    }
}

async fn history(action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let storage = history_storage(&Config::load()?)?;
            println!("{}", render::history(&SearchHistory::restore(&storage)));
        }
        HistoryAction::Delete { id } => {
            let storage = history_storage(&Config::load()?)?;
            let mut history = SearchHistory::restore(&storage);
            if history.remove(&id).is_none() {
                bail!("No history entry with id '{id}'.");
            }
            history.persist(&storage)?;
            println!("Deleted {id}.");
        }
        HistoryAction::Search { id } => {
            let mut page = controller()?;
            page.restore_history();
            if page.search_from_history(&id).await.is_none() {
                bail!("No history entry with id '{id}'.");
            }
            print_page(&page)?;
        }
    }
    Ok(())
}

fn print_page(page: &PageController) -> Result<()> {
    if let Some(data) = page.current() {
        println!("{}", render::snapshot(data));
    }
    match (page.status(), page.error()) {
        (PageStatus::Error, Some(msg)) => bail!("{msg}"),
        _ => Ok(()),
    }
}

/// Controller wired to the configured provider and history file.
fn controller() -> Result<PageController> {
    let config = Config::load()?;
    let client = client_from_config(config.client_config()?)?;
    let storage = history_storage(&config)?;

    Ok(PageController::new(client, Box::new(storage)).with_default_city(config.default_city()))
}

fn history_storage(config: &Config) -> Result<FileHistoryStorage> {
    let storage = FileHistoryStorage::new(config.history_file_path()?);
    tracing::debug!(path = %storage.path().display(), "using history file");
    Ok(storage)
}

fn configure() -> Result<()> {
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let api_key = Password::new("API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let weather = cfg.weather_base_endpoint.clone().unwrap_or_else(|| SUGGESTED_WEATHER_BASE.into());
    let weather = Text::new("Weather base endpoint:").with_default(&weather).prompt()?;

    let geocoding =
        cfg.geocoding_base_endpoint.clone().unwrap_or_else(|| SUGGESTED_GEOCODING_BASE.into());
    let geocoding = Text::new("Geocoding base endpoint:").with_default(&geocoding).prompt()?;

    let city = cfg.default_city().to_string();
    let city = Text::new("Default city:").with_default(&city).prompt()?;

    if !api_key.trim().is_empty() {
        cfg.api_key = Some(api_key.trim().to_string());
    }
    cfg.weather_base_endpoint = Some(weather);
    cfg.geocoding_base_endpoint = Some(geocoding);
    cfg.default_city = Some(city);

    cfg.client_config()?;
    cfg.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}
