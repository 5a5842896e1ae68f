use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::{
    config::ClientConfig,
    error::FetchError,
    model::{CitySuggestion, WeatherData},
};

use super::{WeatherClient, is_suggestable};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    weather_base: Url,
    geocoding_base: Url,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            weather_base: parse_endpoint(&config.weather_base_endpoint)?,
            geocoding_base: parse_endpoint(&config.geocoding_base_endpoint)?,
            api_key: config.api_key,
            http,
        })
    }

    async fn request_suggestions(&self, query: &str) -> Result<Vec<CitySuggestion>, FetchError> {
        let res = self
            .http
            .get(self.geocoding_base.clone())
            .query(&[("appid", self.api_key.as_str()), ("q", query)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_weather_by_city(&self, city: &str) -> Result<WeatherData, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::EmptyCity);
        }

        tracing::debug!(city, "requesting current weather");

        let res = self
            .http
            .get(self.weather_base.clone())
            .query(&[("appid", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .inspect_err(|e| tracing::warn!(city, "weather request failed: {e}"))?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(city, %status, "weather request rejected");
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        let parsed: WeatherData = serde_json::from_str(&body)?;
        Ok(parsed)
    }

    async fn fetch_city_suggestions(&self, query: &str) -> Vec<CitySuggestion> {
        if !is_suggestable(query) {
            return Vec::new();
        }

        match self.request_suggestions(query.trim()).await {
            Ok(found) => {
                tracing::debug!(query, count = found.len(), "city suggestions received");
                found
            }
            Err(e) => {
                tracing::warn!(query, "Error fetching city suggestions: {e}");
                Vec::new()
            }
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw.trim()).map_err(|e| FetchError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(ClientConfig {
            api_key: "KEY".into(),
            weather_base_endpoint: format!("{}/data/2.5/weather?units=metric", server.uri()),
            geocoding_base_endpoint: format!("{}/geo/1.0/direct?limit=5", server.uri()),
        })
        .expect("client")
    }

    #[tokio::test]
    async fn fetches_weather_with_key_and_city() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "KEY"))
            .and(query_param("q", "Paris"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(fixtures::payload(2988507, "Paris", "FR")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let data = client_for(&server).fetch_weather_by_city("Paris").await.expect("weather");

        assert_eq!(data.name, "Paris");
        assert_eq!(data.sys.country, "FR");
        assert_eq!(data.id, 2988507);
    }

    #[tokio::test]
    async fn partial_weather_payload_is_still_a_success() {
        let server = MockServer::start().await;
        let mut body = fixtures::payload(2988507, "Paris", "FR");
        body["sys"].as_object_mut().expect("sys").remove("country");
        body["main"].as_object_mut().expect("main").remove("temp_min");

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let data = client_for(&server).fetch_weather_by_city("Paris").await.expect("weather");

        assert_eq!(data.name, "Paris");
        assert_eq!(data.sys.country, "");
        assert_eq!(data.main.temp_min, 0.0);
    }

    #[tokio::test]
    async fn weather_not_found_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_weather_by_city("Atlantis").await.unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert!(body.contains("city not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_weather_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_weather_by_city("Paris").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn empty_city_is_rejected_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_weather_by_city("   ").await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyCity));
    }

    #[tokio::test]
    async fn short_queries_do_not_hit_geocoding() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        for query in ["", "a", " b ", "\t"] {
            assert!(client.fetch_city_suggestions(query).await.is_empty());
        }
    }

    #[tokio::test]
    async fn suggestions_are_decoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("appid", "KEY"))
            .and(query_param("q", "San Jo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "San Jose", "country": "US", "state": "California", "lat": 37.33, "lon": -121.89,
                 "local_names": {"en": "San Jose"}},
                {"name": "San José", "country": "CR", "lat": 9.93, "lon": -84.08}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let found = client_for(&server).fetch_city_suggestions(" San Jo ").await;

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].state.as_deref(), Some("California"));
        assert_eq!(found[1].state, None);
        assert_eq!(found[1].label(), "San José, CR");
    }

    #[tokio::test]
    async fn suggestion_failures_degrade_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client_for(&server).fetch_city_suggestions("Paris").await.is_empty());
    }

    #[test]
    fn invalid_endpoint_is_reported() {
        let err = OpenWeatherClient::new(ClientConfig {
            api_key: "KEY".into(),
            weather_base_endpoint: "not a url".into(),
            geocoding_base_endpoint: "http://localhost/direct".into(),
        })
        .unwrap_err();

        assert!(err.to_string().contains("Invalid endpoint URL 'not a url'"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
