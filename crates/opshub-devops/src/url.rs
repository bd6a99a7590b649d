//! Resource path composition for the work-tracking remote.
//!
//! Paths are relative to the organization base URL and either
//! project-scoped (`{project}/_apis/...`) or organization-scoped
//! (`_apis/...`). Query parameters are kept as pairs and handed to the
//! HTTP client's query encoder, so caller-supplied values (file paths,
//! branch names) are percent-encoded exactly once. Every endpoint ends
//! with the `api-version` token pinned for its resource family.

/// Pinned API version per resource family.
///
/// The families evolve independently on the remote; keeping one token per
/// family is required, not an optimization. Legacy test suite/case
/// membership endpoints are a generation older than test plan CRUD.
#[derive(Debug, Clone)]
pub struct ApiVersions {
    pub git: String,
    pub pull_requests: String,
    pub work_items: String,
    pub test_plans: String,
    pub test_legacy: String,
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self {
            git: "7.1".to_string(),
            pull_requests: "7.1".to_string(),
            work_items: "7.1-preview.3".to_string(),
            test_plans: "7.1-preview.1".to_string(),
            test_legacy: "5.0".to_string(),
        }
    }
}

/// One composed endpoint: a relative path plus its query pairs.
#[derive(Debug, Clone)]
pub struct Endpoint {
    path: String,
    params: Vec<(&'static str, String)>,
}

impl Endpoint {
    /// Organization-scoped resource: `_apis/{resource}`.
    pub fn org(resource: impl AsRef<str>) -> Self {
        Self {
            path: format!("_apis/{}", resource.as_ref()),
            params: Vec::new(),
        }
    }

    /// Project-scoped when a project is given, organization-scoped
    /// otherwise.
    pub fn scoped(project: Option<&str>, resource: impl AsRef<str>) -> Self {
        let path = match project {
            Some(project) => format!("{}/_apis/{}", project, resource.as_ref()),
            None => format!("_apis/{}", resource.as_ref()),
        };
        Self {
            path,
            params: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Append a query parameter when the value is present.
    pub fn opt_param(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.params.push((key, value.to_string()));
        }
        self
    }

    /// Append the pinned `api-version` token. Kept last by convention.
    pub fn api_version(self, version: &str) -> Self {
        self.param("api-version", version.to_string())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }
}
