//! Interactive page: a search prompt with autocomplete above the current
//! weather and the search history.

use std::fmt;

use anyhow::Result;
use inquire::{Select, Text};
use tokio::sync::mpsc::UnboundedReceiver;
use weather_core::{PageController, SearchBar, SearchEvent, SearchPhase, SearchState};

use crate::render;

enum Pick {
    Typed(String),
    Suggestion(usize, String),
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Typed(text) => write!(f, "Search \"{text}\""),
            Pick::Suggestion(_, label) => f.write_str(label),
        }
    }
}

#[derive(Clone, Copy)]
enum Action {
    NewSearch,
    FromHistory,
    DeleteEntry,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::NewSearch => "Search a city",
            Action::FromHistory => "Search again from history",
            Action::DeleteEntry => "Delete a history entry",
            Action::Quit => "Quit",
        })
    }
}

struct HistoryChoice {
    id: String,
    label: String,
}

impl fmt::Display for HistoryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

pub async fn run(mut page: PageController) -> Result<()> {
    let (mut bar, mut events) = SearchBar::new(page.client());

    page.mount().await;

    loop {
        show(&page);

        let mut actions = vec![Action::NewSearch];
        if !page.history().is_empty() {
            actions.extend([Action::FromHistory, Action::DeleteEntry]);
        }
        actions.push(Action::Quit);

        let Some(action) = Select::new("What next?", actions).prompt_skippable()? else {
            break;
        };

        match action {
            Action::NewSearch => {
                prompt_city(&mut bar).await?;
                while let Ok(SearchEvent::SearchRequested(city)) = events.try_recv() {
                    page.search(&city).await;
                }
            }
            Action::FromHistory => {
                if let Some(id) = pick_history(&page, "Search again:")? {
                    bar.reset();
                    page.search_from_history(&id).await;
                }
            }
            Action::DeleteEntry => {
                if let Some(id) = pick_history(&page, "Delete:")? {
                    page.delete_history_entry(&id);
                }
            }
            Action::Quit => break,
        }
    }

    drain(&mut events);
    Ok(())
}

fn show(page: &PageController) {
    println!();
    if let Some(msg) = page.error() {
        eprintln!("{msg}");
    }
    if let Some(data) = page.current() {
        println!("{}", render::snapshot(data));
    }
    println!("\n{}\n", render::history(page.history()));
}

/// One round of typing: the text goes through the debounced autocomplete, then
/// the user either picks a suggestion or submits what they typed.
async fn prompt_city(bar: &mut SearchBar) -> Result<()> {
    let Some(text) = Text::new("City:").with_initial_value(&bar.text()).prompt_skippable()? else {
        bar.dismiss();
        return Ok(());
    };

    bar.input(text.clone());
    let state = settled(bar).await;

    if state.visible_suggestions().is_empty() {
        bar.submit();
        return Ok(());
    }

    let mut picks = vec![Pick::Typed(text.trim().to_string())];
    picks.extend(
        state
            .visible_suggestions()
            .iter()
            .enumerate()
            .map(|(i, s)| Pick::Suggestion(i, render::suggestion(s))),
    );

    match Select::new("Did you mean:", picks).prompt_skippable()? {
        Some(Pick::Suggestion(i, _)) => {
            bar.select(i);
        }
        Some(Pick::Typed(_)) => {
            bar.submit();
        }
        None => bar.dismiss(),
    }
    Ok(())
}

/// Wait until the debounce timer has fired and any lookup has finished.
async fn settled(bar: &SearchBar) -> SearchState {
    let mut rx = bar.subscribe();
    let done = rx
        .wait_for(|s| !matches!(s.phase, SearchPhase::DebouncePending | SearchPhase::LoadingSuggestions))
        .await
        .map(|s| s.clone());
    done.unwrap_or_else(|_| bar.state())
}

fn pick_history(page: &PageController, prompt: &str) -> Result<Option<String>> {
    let choices: Vec<_> = page
        .history()
        .iter()
        .map(|e| HistoryChoice { id: e.id.clone(), label: render::history_entry(e) })
        .collect();

    Ok(Select::new(prompt, choices).prompt_skippable()?.map(|c| c.id))
}

fn drain(events: &mut UnboundedReceiver<SearchEvent>) {
    while let Ok(event) = events.try_recv() {
        tracing::debug!(?event, "search event left unhandled at exit");
    }
}
