//! HTTP client for the telemetry remote.
//!
//! One `InsightsClient` serves a single application id. The API key rides
//! on every request as the `X-API-Key` header; the client is never mutated
//! after construction and is safe to share across concurrent callers.

use async_trait::async_trait;
use opshub_core::config::InsightsConfig;
use opshub_core::{Error, Result, TelemetryProvider};
use reqwest::{header, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::query::{compile_shortcut, TelemetryTable};

const DEFAULT_BASE_URL: &str = "https://api.applicationinsights.io";
const API_KEY_HEADER: &str = "X-API-Key";

/// Application Insights API client.
pub struct InsightsClient {
    base_url: String,
    application_id: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl InsightsClient {
    /// Create a client against the public remote.
    pub fn new(application_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, application_id, api_key)
    }

    /// Create a client with an explicit base URL (for testing with httpmock).
    pub fn with_base_url(
        base_url: impl Into<String>,
        application_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            application_id: application_id.into(),
            api_key: api_key.into(),
            api_version: "v1".to_string(),
            client: reqwest::Client::builder()
                .user_agent("opshub")
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(config: &InsightsConfig) -> Result<Self> {
        if config.application_id.is_empty() {
            return Err(Error::Config(
                "insights.application_id is not set".to_string(),
            ));
        }
        let key = config.access_key()?;
        Ok(Self::new(&config.application_id, key))
    }

    /// Resource URL under the application: `{base}/v1/apps/{appId}{suffix}`.
    fn app_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}/apps/{}{}",
            self.base_url, self.api_version, self.application_id, suffix
        )
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(header::ACCEPT, "application/json")
    }

    async fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Result<Value> {
        debug!(url = %url, "Insights request");
        let response = self
            .request(Method::GET, url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!(url = %url, "Insights request");
        let response = self
            .request(Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                message = message,
                "Insights API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }

    /// Run a compiled table shortcut through the query endpoint.
    async fn query_table(
        &self,
        table: TelemetryTable,
        timespan: Option<&str>,
        top: Option<u32>,
    ) -> Result<Value> {
        self.execute_query(&compile_shortcut(table, top), timespan)
            .await
    }
}

#[async_trait]
impl TelemetryProvider for InsightsClient {
    async fn execute_query(&self, query: &str, timespan: Option<&str>) -> Result<Value> {
        debug!(query = query, "Executing telemetry query");

        let body = json!({ "query": query, "timespan": timespan });
        self.post_json(&self.app_url("/query"), &body).await
    }

    async fn get_application_info(&self) -> Result<Value> {
        self.get_json(&self.app_url(""), &[]).await
    }

    async fn get_metric(
        &self,
        name: &str,
        timespan: Option<&str>,
        aggregation: Option<&str>,
    ) -> Result<Value> {
        let mut params = Vec::new();
        if let Some(timespan) = timespan {
            params.push(("timespan", timespan.to_string()));
        }
        if let Some(aggregation) = aggregation {
            params.push(("aggregation", aggregation.to_string()));
        }
        self.get_json(&self.app_url(&format!("/metrics/{}", name)), &params)
            .await
    }

    async fn get_events(
        &self,
        event_type: &str,
        timespan: Option<&str>,
        top: Option<u32>,
    ) -> Result<Value> {
        let mut params = Vec::new();
        if let Some(timespan) = timespan {
            params.push(("timespan", timespan.to_string()));
        }
        if let Some(top) = top {
            params.push(("$top", top.to_string()));
        }
        self.get_json(&self.app_url(&format!("/events/{}", event_type)), &params)
            .await
    }

    async fn get_exceptions(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value> {
        self.query_table(TelemetryTable::Exceptions, timespan, top)
            .await
    }

    async fn get_requests(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value> {
        self.query_table(TelemetryTable::Requests, timespan, top)
            .await
    }

    async fn get_dependencies(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value> {
        self.query_table(TelemetryTable::Dependencies, timespan, top)
            .await
    }

    async fn get_traces(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value> {
        self.query_table(TelemetryTable::Traces, timespan, top)
            .await
    }

    async fn get_performance_counters(
        &self,
        timespan: Option<&str>,
        top: Option<u32>,
    ) -> Result<Value> {
        self.query_table(TelemetryTable::PerformanceCounters, timespan, top)
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_url_shape() {
        let client = InsightsClient::with_base_url("http://localhost:9999/", "app-123", "key");
        assert_eq!(
            client.app_url("/query"),
            "http://localhost:9999/v1/apps/app-123/query"
        );
        assert_eq!(client.app_url(""), "http://localhost:9999/v1/apps/app-123");
    }

    #[test]
    fn test_from_config_requires_application_id() {
        let config = InsightsConfig {
            application_id: String::new(),
            api_key: Some("key".to_string()),
        };
        assert!(matches!(
            InsightsClient::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    mod integration {
        use super::*;
        use httpmock::prelude::*;

        fn client(server: &MockServer) -> InsightsClient {
            InsightsClient::with_base_url(server.base_url(), "app-123", "secret-key")
        }

        fn sample_rows() -> Value {
            json!({
                "tables": [{
                    "name": "PrimaryResult",
                    "columns": [{ "name": "message", "type": "string" }],
                    "rows": [["boom"]]
                }]
            })
        }

        #[tokio::test]
        async fn test_execute_query_posts_verbatim_text_with_api_key() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST)
                    .path("/v1/apps/app-123/query")
                    .header("x-api-key", "secret-key")
                    .json_body(json!({
                        "query": "requests | summarize count() by name",
                        "timespan": "P1D",
                    }));
                then.status(200).json_body(sample_rows());
            });

            let result = client(&server)
                .execute_query("requests | summarize count() by name", Some("P1D"))
                .await
                .unwrap();
            assert_eq!(result["tables"][0]["rows"][0][0], "boom");
        }

        #[tokio::test]
        async fn test_execute_query_without_timespan_sends_null() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST)
                    .path("/v1/apps/app-123/query")
                    .json_body(json!({ "query": "traces", "timespan": null }));
                then.status(200).json_body(sample_rows());
            });

            client(&server).execute_query("traces", None).await.unwrap();
        }

        #[tokio::test]
        async fn test_get_application_info() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET)
                    .path("/v1/apps/app-123")
                    .header("x-api-key", "secret-key");
                then.status(200)
                    .json_body(json!({ "id": "app-123", "name": "prod-app" }));
            });

            let info = client(&server).get_application_info().await.unwrap();
            assert_eq!(info["name"], "prod-app");
        }

        #[tokio::test]
        async fn test_get_metric_passes_optional_params() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET)
                    .path("/v1/apps/app-123/metrics/requests/duration")
                    .query_param("timespan", "PT12H")
                    .query_param("aggregation", "avg");
                then.status(200)
                    .json_body(json!({ "value": { "requests/duration": { "avg": 12.5 } } }));
            });

            let metric = client(&server)
                .get_metric("requests/duration", Some("PT12H"), Some("avg"))
                .await
                .unwrap();
            assert_eq!(metric["value"]["requests/duration"]["avg"], 12.5);
        }

        #[tokio::test]
        async fn test_get_events_passes_top_param() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET)
                    .path("/v1/apps/app-123/events/pageViews")
                    .query_param("timespan", "P1D")
                    .query_param("$top", "10");
                then.status(200).json_body(json!({ "value": [] }));
            });

            let events = client(&server)
                .get_events("pageViews", Some("P1D"), Some(10))
                .await
                .unwrap();
            assert!(events["value"].as_array().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_exceptions_shortcut_compiles_exact_query() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST)
                    .path("/v1/apps/app-123/query")
                    .json_body(json!({
                        "query": "exceptions | limit 50",
                        "timespan": "P1D",
                    }));
                then.status(200).json_body(sample_rows());
            });

            client(&server)
                .get_exceptions(Some("P1D"), Some(50))
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_uncapped_shortcut_sends_bare_table() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST)
                    .path("/v1/apps/app-123/query")
                    .json_body(json!({ "query": "performanceCounters", "timespan": null }));
                then.status(200).json_body(sample_rows());
            });

            client(&server)
                .get_performance_counters(None, None)
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_bad_key_maps_to_auth_error() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/v1/apps/app-123");
                then.status(403).body("invalid api key");
            });

            let err = client(&server).get_application_info().await.unwrap_err();
            assert!(matches!(err, Error::Auth(_)));
        }

        #[tokio::test]
        async fn test_query_rejection_preserves_status_and_body() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST).path("/v1/apps/app-123/query");
                then.status(400).body("syntax error at '|'");
            });

            let err = client(&server)
                .execute_query("requests |||", None)
                .await
                .unwrap_err();
            match err {
                Error::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert!(message.contains("syntax error"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
