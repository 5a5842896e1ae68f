use std::path::PathBuf;

use thiserror::Error;

/// Failure of a provider request. Only weather lookups surface it; suggestion
/// lookups log it and return nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("City name must not be empty")]
    EmptyCity,

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to access history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize search history: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_does_not_assume_weather_endpoint() {
        let err = FetchError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        };
        let msg = err.to_string();
        assert_eq!(msg, "Request failed with status 502 Bad Gateway: upstream down");
        assert!(!msg.to_lowercase().contains("weather"));
    }

    #[test]
    fn decode_message_is_neutral() {
        let err = FetchError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(err.to_string().starts_with("Failed to parse response JSON: "));
    }
}
