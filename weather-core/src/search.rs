//! Search input with debounced city autocomplete.
//!
//! [`SearchBar`] owns the text field state and publishes it through a
//! [`watch`] channel. Every keystroke restarts the debounce timer; only the
//! last timer to survive performs a suggestion lookup. Picking a suggestion
//! or submitting the text is reported as a [`SearchEvent`] on the channel
//! returned by [`SearchBar::new`].
//!
//! Methods that arm the timer spawn onto the ambient Tokio runtime.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    client::{WeatherClient, is_suggestable},
    model::CitySuggestion,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    DebouncePending,
    LoadingSuggestions,
    SuggestionsShown,
}

/// Outcome of a debounce timer firing. `Stale` leaves the state untouched.
#[derive(Debug, PartialEq, Eq)]
enum Claim {
    Stale,
    Closed,
    Lookup(String),
}

/// Observable state of the search input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub text: String,
    pub suggestions: Vec<CitySuggestion>,
    pub show_suggestions: bool,
    pub loading: bool,
    pub phase: SearchPhase,
    generation: u64,
    should_fetch: bool,
}

impl SearchState {
    /// Suggestions to render right now: empty while the list is closed.
    pub fn visible_suggestions(&self) -> &[CitySuggestion] {
        if self.show_suggestions { &self.suggestions } else { &[] }
    }

    fn close_list(&mut self) {
        self.suggestions.clear();
        self.show_suggestions = false;
        self.loading = false;
        self.phase = SearchPhase::Idle;
    }

    /// Decide what the timer armed at `generation` should do, in one step so a
    /// keystroke can't slip in between the check and the update.
    fn claim_lookup(&mut self, generation: u64) -> Claim {
        if self.generation != generation || !self.should_fetch {
            return Claim::Stale;
        }

        let query = self.text.trim().to_string();
        if !is_suggestable(&query) {
            self.close_list();
            return Claim::Closed;
        }

        self.loading = true;
        self.phase = SearchPhase::LoadingSuggestions;
        Claim::Lookup(query)
    }

    /// Invalidate any armed timer or in-flight lookup and suppress the next fetch.
    fn suppress_fetch(&mut self) {
        self.generation += 1;
        self.should_fetch = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// The user asked for the weather of this city.
    SearchRequested(String),
}

#[derive(Debug)]
pub struct SearchBar {
    client: Arc<dyn WeatherClient>,
    state: Arc<watch::Sender<SearchState>>,
    events: mpsc::UnboundedSender<SearchEvent>,
    pending: Option<JoinHandle<()>>,
    debounce: Duration,
}

impl SearchBar {
    pub fn new(client: Arc<dyn WeatherClient>) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(SearchState::default());

        let bar = Self {
            client,
            state: Arc::new(state),
            events,
            pending: None,
            debounce: DEFAULT_DEBOUNCE,
        };
        (bar, rx)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn text(&self) -> String {
        self.state.borrow().text.clone()
    }

    /// A keystroke: replace the text and restart the debounce timer.
    pub fn input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.cancel_pending();

        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.should_fetch = true;
            s.text = text;
            s.loading = false;
            s.phase = SearchPhase::DebouncePending;
        });

        self.pending = Some(tokio::spawn(debounced_lookup(
            Arc::clone(&self.client),
            Arc::clone(&self.state),
            generation,
            self.debounce,
        )));
    }

    /// Pick the suggestion at `index`. Returns the city name handed to the consumer.
    pub fn select(&mut self, index: usize) -> Option<String> {
        let picked = self.state.borrow().suggestions.get(index).cloned()?;
        self.cancel_pending();

        self.state.send_modify(|s| {
            s.suppress_fetch();
            s.text = picked.label();
            s.close_list();
        });

        self.emit(picked.name.clone());
        Some(picked.name)
    }

    /// Submit the typed text. Does nothing when it is blank.
    pub fn submit(&mut self) -> Option<String> {
        let city = self.state.borrow().text.trim().to_string();
        if city.is_empty() {
            return None;
        }
        self.cancel_pending();

        self.state.send_modify(|s| {
            s.suppress_fetch();
            s.close_list();
        });

        self.emit(city.clone());
        Some(city)
    }

    /// Interaction outside the component: hide the list, keep the text.
    pub fn dismiss(&self) {
        self.state.send_modify(|s| {
            s.show_suggestions = false;
            if s.phase == SearchPhase::SuggestionsShown {
                s.phase = SearchPhase::Idle;
            }
        });
    }

    /// The field regained focus: re-open the list if there is anything in it.
    pub fn focus(&self) {
        self.state.send_modify(|s| {
            if !s.suggestions.is_empty() {
                s.show_suggestions = true;
                s.phase = SearchPhase::SuggestionsShown;
            }
        });
    }

    /// Clear text and suggestions and drop any pending lookup.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.state.send_modify(|s| {
            s.suppress_fetch();
            s.text.clear();
            s.close_list();
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn emit(&self, city: String) {
        if self.events.send(SearchEvent::SearchRequested(city)).is_err() {
            tracing::debug!("search event dropped: no consumer attached");
        }
    }
}

impl Drop for SearchBar {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

async fn debounced_lookup(
    client: Arc<dyn WeatherClient>,
    state: Arc<watch::Sender<SearchState>>,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    let mut claim = Claim::Stale;
    state.send_if_modified(|s| {
        claim = s.claim_lookup(generation);
        claim != Claim::Stale
    });
    let Claim::Lookup(query) = claim else {
        return;
    };

    let found = client.fetch_city_suggestions(&query).await;

    state.send_modify(|s| {
        if s.generation != generation {
            tracing::debug!(query = %query, "discarding stale suggestions");
            return;
        }
        s.loading = false;
        s.show_suggestions = !found.is_empty();
        s.phase = if s.show_suggestions { SearchPhase::SuggestionsShown } else { SearchPhase::Idle };
        s.suggestions = found;
    });
}
