//! Human-friendly text for snapshots, suggestions and history.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use weather_core::{CitySuggestion, HistoryEntry, SearchHistory, WeatherData, weather_icon};

/// `MM-DD-YYYY hh:mmam` in the given zone.
pub fn format_date_time<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%m-%d-%Y %I:%M%P").to_string()
}

fn local(at: Option<DateTime<chrono::Utc>>) -> String {
    at.map(|t| format_date_time(&t.with_timezone(&Local))).unwrap_or_else(|| "-".to_string())
}

/// Rounds half up, like the page did, and never prints `-0`.
fn degrees(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn snapshot(data: &WeatherData) -> String {
    let condition = data.condition_main().unwrap_or("Unknown");
    let icon = weather_icon(data.condition_icon_code().unwrap_or_default());

    [
        "Today's Weather".to_string(),
        format!(
            "  {}°   H: {}° L: {}°",
            degrees(data.main.temp),
            degrees(data.main.temp_max),
            degrees(data.main.temp_min),
        ),
        format!("  {}, {}", data.city_name(), data.country_code()),
        format!(
            "  {condition} | Humidity: {}% | {}",
            data.main.humidity,
            local(data.observed_at()),
        ),
        format!("  icon: {icon}"),
    ]
    .join("\n")
}

pub fn suggestion(s: &CitySuggestion) -> String {
    format!("{} ({:.2}, {:.2})", s.label(), s.lat, s.lon)
}

pub fn history_entry(entry: &HistoryEntry) -> String {
    format!("{}, {}  {}", entry.city, entry.country, local(entry.captured_at()))
}

pub fn history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "No searches yet.".to_string();
    }

    let lines = history
        .iter()
        .map(|entry| format!("  {}  [{}]", history_entry(entry), entry.id));
    std::iter::once("Search History".to_string()).chain(lines).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weather_core::model::{Condition, MainReadings, SysInfo};

    fn data() -> WeatherData {
        WeatherData {
            id: 2562305,
            name: "Valletta".into(),
            sys: SysInfo { country: "MT".into() },
            main: MainReadings { temp: 22.5, temp_min: -0.4, temp_max: 24.49, humidity: 70 },
            weather: vec![Condition {
                id: 500,
                main: "Rain".into(),
                description: "light rain".into(),
                icon: "10d".into(),
            }],
            dt: 1_700_000_000,
        }
    }

    #[test]
    fn formats_date_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 0).single().expect("valid");
        assert_eq!(format_date_time(&at), "03-07-2024 03:04pm");
    }

    #[test]
    fn degrees_round_half_up() {
        assert_eq!(degrees(22.5), 23);
        assert_eq!(degrees(24.49), 24);
        assert_eq!(degrees(-0.4), 0);
        assert_eq!(degrees(-2.5), -2);
    }

    #[test]
    fn snapshot_mentions_location_condition_and_icon() {
        let text = snapshot(&data());
        assert!(text.contains("23°   H: 24° L: 0°"));
        assert!(text.contains("Valletta, MT"));
        assert!(text.contains("Rain | Humidity: 70%"));
        assert!(text.ends_with("icon: rain.png"));
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.lines().next(), Some("Today's Weather"));
    }

    #[test]
    fn snapshot_without_conditions_uses_defaults() {
        let mut d = data();
        d.weather.clear();
        let text = snapshot(&d);
        assert!(text.contains("Unknown | Humidity"));
        assert!(text.ends_with("icon: cloud.png"));
    }

    #[test]
    fn empty_history_has_placeholder() {
        assert_eq!(history(&SearchHistory::new()), "No searches yet.");
    }

    #[test]
    fn history_lists_ids() {
        let mut h = SearchHistory::new();
        let entry = HistoryEntry::from_snapshot(data(), Utc::now());
        let id = entry.id.clone();
        h.push_front(entry);

        let text = history(&h);
        assert!(text.starts_with("Search History"));
        assert!(text.contains("Valletta, MT"));
        assert!(text.contains(&id));
        assert_eq!(text.lines().count(), 2);
    }
}
