use crate::{CitySuggestion, WeatherData, config::ClientConfig, error::FetchError};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Queries shorter than this (after trimming) never reach the geocoding endpoint.
pub const MIN_QUERY_LEN: usize = 2;

/// The two calls the app makes against the weather provider.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    /// Current weather for `city`. Any transport, status or decoding failure is an error.
    async fn fetch_weather_by_city(&self, city: &str) -> Result<WeatherData, FetchError>;

    /// Autocomplete candidates for `query`. Failures degrade to an empty list.
    async fn fetch_city_suggestions(&self, query: &str) -> Vec<CitySuggestion>;
}

/// Whether `query` is long enough to be worth a geocoding request.
pub fn is_suggestable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

/// Construct the OpenWeather-backed client from explicit settings.
pub fn client_from_config(config: ClientConfig) -> Result<Arc<dyn WeatherClient>, FetchError> {
    Ok(Arc::new(OpenWeatherClient::new(config)?))
}
