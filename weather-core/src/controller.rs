//! Page-level orchestration: search, fetch, display, remember.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    client::WeatherClient,
    config::FALLBACK_CITY,
    error::FetchError,
    history::{HistoryStorage, SearchHistory},
    model::{HistoryEntry, WeatherData},
};

/// Shown whenever a weather lookup fails, whatever the cause.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch weather data. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Identifies one search. Only the most recently issued ticket may commit a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

#[derive(Debug)]
pub struct PageController {
    client: Arc<dyn WeatherClient>,
    storage: Box<dyn HistoryStorage>,
    history: SearchHistory,
    current: Option<WeatherData>,
    status: PageStatus,
    error: Option<String>,
    latest_ticket: u64,
    default_city: String,
}

impl PageController {
    pub fn new(client: Arc<dyn WeatherClient>, storage: Box<dyn HistoryStorage>) -> Self {
        Self {
            client,
            storage,
            history: SearchHistory::default(),
            current: None,
            status: PageStatus::Idle,
            error: None,
            latest_ticket: 0,
            default_city: FALLBACK_CITY.to_string(),
        }
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    /// First display: bring back stored history, then look up the default city.
    pub async fn mount(&mut self) -> PageStatus {
        self.restore_history();
        let city = self.default_city.clone();
        self.search(&city).await
    }

    /// Replace the in-memory history with whatever storage holds.
    pub fn restore_history(&mut self) {
        self.history = SearchHistory::restore(self.storage.as_ref());
    }

    /// Look up `city` and apply the outcome.
    pub async fn search(&mut self, city: &str) -> PageStatus {
        let ticket = self.begin_search(city);
        let result = self.client.fetch_weather_by_city(city).await;
        self.finish_search(ticket, result);
        self.status
    }

    /// Re-run the search recorded in history entry `id`.
    pub async fn search_from_history(&mut self, id: &str) -> Option<PageStatus> {
        let city = self.history.get(id)?.city.clone();
        Some(self.search(&city).await)
    }

    /// Enter the loading state for a new search and hand out its ticket.
    pub fn begin_search(&mut self, city: &str) -> SearchTicket {
        self.latest_ticket += 1;
        self.status = PageStatus::Loading;
        self.error = None;
        tracing::info!(city, ticket = self.latest_ticket, "searching for city");
        SearchTicket(self.latest_ticket)
    }

    /// Commit a fetch result. Returns `false` when a newer search superseded `ticket`.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<WeatherData, FetchError>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(ticket = ticket.0, latest = self.latest_ticket, "dropping stale result");
            return false;
        }

        match result {
            Ok(data) => {
                tracing::info!(city = %data.name, country = %data.sys.country, "weather loaded");
                let entry = HistoryEntry::from_snapshot(data.clone(), Utc::now());
                self.current = Some(data);
                self.status = PageStatus::Loaded;
                if let Some(evicted) = self.history.push_front(entry) {
                    tracing::debug!(id = %evicted.id, "history full, evicted oldest entry");
                }
                self.persist_history();
            }
            Err(e) => {
                tracing::warn!("Error fetching weather: {e}");
                self.status = PageStatus::Error;
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    /// Remove one history entry. The displayed snapshot is left alone.
    pub fn delete_history_entry(&mut self, id: &str) -> bool {
        if self.history.remove(id).is_none() {
            return false;
        }
        self.persist_history();
        true
    }

    pub fn client(&self) -> Arc<dyn WeatherClient> {
        Arc::clone(&self.client)
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == PageStatus::Loading
    }

    pub fn current(&self) -> Option<&WeatherData> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    fn persist_history(&self) {
        if let Err(e) = self.history.persist(self.storage.as_ref()) {
            tracing::warn!("Failed to save search history: {e}");
        }
    }
}
