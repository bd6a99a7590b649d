//! HTTP client for the work-tracking remote.
//!
//! One `DevOpsClient` is shared by all three provider implementations in
//! this crate. It owns the connection pool and the credential; nothing on
//! it is mutated after construction, so one instance is safe to share
//! across concurrent callers. No retries, no per-call timeouts beyond the
//! transport defaults.

use opshub_core::config::DevOpsConfig;
use opshub_core::{Error, Result};
use reqwest::{header, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::patch::{PatchDocument, PATCH_CONTENT_TYPE};
use crate::url::{ApiVersions, Endpoint};

/// Azure DevOps API client.
pub struct DevOpsClient {
    base_url: String,
    default_project: Option<String>,
    token: String,
    pub(crate) versions: ApiVersions,
    client: reqwest::Client,
}

impl DevOpsClient {
    /// Create a client for an organization on the public remote.
    pub fn new(
        organization: impl AsRef<str>,
        default_project: Option<String>,
        token: impl Into<String>,
    ) -> Self {
        Self::with_base_url(
            format!("https://dev.azure.com/{}", organization.as_ref()),
            default_project,
            token,
        )
    }

    /// Create a client with an explicit base URL (for testing with httpmock).
    pub fn with_base_url(
        base_url: impl Into<String>,
        default_project: Option<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_project,
            token: token.into(),
            versions: ApiVersions::default(),
            client: reqwest::Client::builder()
                .user_agent("opshub")
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(config: &DevOpsConfig) -> Result<Self> {
        if config.organization.is_empty() {
            return Err(Error::Config(
                "devops.organization is not set".to_string(),
            ));
        }
        let token = config.access_token()?;
        Ok(Self::new(
            &config.organization,
            config.project.clone(),
            token,
        ))
    }

    /// Effective project scope: the explicit argument, else the configured
    /// default, else organization scope.
    pub(crate) fn project_scope<'a>(&'a self, project: Option<&'a str>) -> Option<&'a str> {
        project.or(self.default_project.as_deref())
    }

    fn endpoint_url(&self, endpoint: &Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    /// Build a request with authentication attached. The credential is
    /// Basic auth with an empty username and the access token as password.
    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth("", Some(&self.token))
            .header(header::ACCEPT, "application/json")
    }

    /// Send a request, mapping transport failures only. Callers that need
    /// to inspect non-success statuses themselves (suite membership, bulk
    /// delete) use this directly.
    pub(crate) async fn send(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint_url(endpoint);
        debug!(method = %method, url = %url, "DevOps request");

        let mut builder = self.request(method, &url).query(endpoint.params());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| Error::Http(e.to_string()))
    }

    pub(crate) async fn get_json(&self, endpoint: &Endpoint) -> Result<Value> {
        let response = self.send(Method::GET, endpoint, None).await?;
        self.handle_response(response).await
    }

    pub(crate) async fn post_json(&self, endpoint: &Endpoint, body: &Value) -> Result<Value> {
        let response = self.send(Method::POST, endpoint, Some(body)).await?;
        self.handle_response(response).await
    }

    /// POST with an empty body (the legacy suite membership endpoint takes
    /// its arguments in the path).
    pub(crate) async fn post_empty(&self, endpoint: &Endpoint) -> Result<Value> {
        let response = self.send(Method::POST, endpoint, None).await?;
        self.handle_response(response).await
    }

    pub(crate) async fn patch_json(&self, endpoint: &Endpoint, body: &Value) -> Result<Value> {
        let response = self.send(Method::PATCH, endpoint, Some(body)).await?;
        self.handle_response(response).await
    }

    pub(crate) async fn delete_json(&self, endpoint: &Endpoint) -> Result<Value> {
        let response = self.send(Method::DELETE, endpoint, None).await?;
        self.handle_response(response).await
    }

    /// Send a patch document with the dedicated content type.
    pub(crate) async fn send_document(
        &self,
        method: Method,
        endpoint: &Endpoint,
        document: &PatchDocument,
    ) -> Result<Value> {
        let url = self.endpoint_url(endpoint);
        debug!(method = %method, url = %url, ops = document.len(), "DevOps patch document");

        let body = serde_json::to_string(document)?;
        let response = self
            .request(method, &url)
            .query(endpoint.params())
            .header(header::CONTENT_TYPE, PATCH_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Map a response to JSON, or to an error for non-success statuses.
    /// Empty success bodies (204-style deletes) become `null`.
    pub(crate) async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                message = message,
                "DevOps API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }
}
