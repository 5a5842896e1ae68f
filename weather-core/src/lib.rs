//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather/geocoding client and its test seam
//! - Shared domain models (snapshots, suggestions, history entries)
//! - The search input with debounced autocomplete
//! - Bounded search history and its persistence
//! - The page controller tying search, fetch and history together
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod icon;
pub mod model;
pub mod search;

pub use client::{OpenWeatherClient, WeatherClient, client_from_config};
pub use config::{ClientConfig, Config};
pub use controller::{FETCH_ERROR_MESSAGE, PageController, PageStatus, SearchTicket};
pub use error::{FetchError, HistoryError};
pub use history::{FileHistoryStorage, HistoryStorage, MemoryHistoryStorage, SearchHistory};
pub use icon::weather_icon;
pub use model::{CitySuggestion, HistoryEntry, WeatherData};
pub use search::{SearchBar, SearchEvent, SearchPhase, SearchState};
