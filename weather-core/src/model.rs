use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current weather for a city, kept in the provider's native JSON shape.
///
/// The payload is stored exactly as decoded so it can be written back into
/// the history file unchanged. Fields the provider leaves out decode to their
/// defaults, and nothing guarantees that `weather` has any elements, hence the
/// `Option`-returning accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherData {
    pub id: i64,
    pub name: String,
    pub sys: SysInfo,
    pub main: MainReadings,
    pub weather: Vec<Condition>,
    pub dt: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SysInfo {
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl WeatherData {
    pub fn city_name(&self) -> &str {
        &self.name
    }

    pub fn country_code(&self) -> &str {
        &self.sys.country
    }

    /// First reported condition, if the provider sent any.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn condition_main(&self) -> Option<&str> {
        self.primary_condition().map(|c| c.main.as_str())
    }

    pub fn condition_icon_code(&self) -> Option<&str> {
        self.primary_condition().map(|c| c.icon.as_str())
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }
}

/// One autocomplete candidate returned by the geocoding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl CitySuggestion {
    /// Text shown in the search field once the suggestion is picked.
    pub fn label(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// A persisted record of one successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub city: String,
    pub country: String,
    /// Capture time, epoch milliseconds.
    pub timestamp: i64,
    pub data: WeatherData,
}

impl HistoryEntry {
    pub fn from_snapshot(data: WeatherData, captured_at: DateTime<Utc>) -> Self {
        let timestamp = captured_at.timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}-{}-{}", data.id, timestamp, &suffix[..9]),
            city: data.name.clone(),
            country: data.sys.country.clone(),
            timestamp,
            data,
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}
