//! Provider traits for the remote operation services.
//!
//! Four transport-agnostic service contracts, each implemented once and
//! shared between the MCP and HTTP front-ends. Remote JSON is returned as
//! `serde_json::Value`; the only scalar extraction is the new identifier on
//! work item creation, and bulk test case deletion returns a typed report.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{BulkDeleteReport, FieldMap, FileChange, ParameterSet, TestStep};

/// Work item operations against the work-tracking remote.
#[async_trait]
pub trait WorkItemProvider: Send + Sync {
    /// Create a work item and return its new identifier.
    async fn create_work_item(&self, project: &str, item_type: &str, fields: FieldMap)
        -> Result<i64>;

    /// Fetch a work item by id.
    async fn get_work_item(&self, id: i64) -> Result<Value>;

    /// Partially update a work item's fields.
    async fn update_work_item(&self, id: i64, fields: FieldMap) -> Result<Value>;

    /// Delete a work item by id.
    async fn delete_work_item(&self, id: i64) -> Result<Value>;

    /// Read the work item's tag set as a JSON string array.
    async fn get_work_item_tags(&self, id: i64) -> Result<Value>;

    /// Union the requested tags into the work item's tag set.
    async fn add_work_item_tags(&self, id: i64, tags: Vec<String>) -> Result<Value>;

    /// Remove the requested tags from the work item's tag set.
    async fn remove_work_item_tags(&self, id: i64, tags: Vec<String>) -> Result<Value>;

    /// List the work item's comments.
    async fn get_work_item_comments(&self, id: i64) -> Result<Value>;

    /// Add a comment to the work item.
    async fn add_work_item_comment(&self, id: i64, text: &str) -> Result<Value>;
}

/// Repository, branch, commit, and pull request operations.
///
/// `project` selects project scope; `None` falls back to the organization
/// scope (or the client's configured default, where one exists).
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    async fn list_repositories(&self, project: Option<&str>) -> Result<Value>;

    async fn get_repository(&self, project: Option<&str>, repository: &str) -> Result<Value>;

    /// Fetch a file's content (`includeContent` flag set).
    async fn get_file_content(
        &self,
        project: Option<&str>,
        repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Value>;

    /// Fetch an item's metadata without content.
    async fn get_item_metadata(
        &self,
        project: Option<&str>,
        repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Value>;

    /// List a folder's entries (`scopePath` form of the items endpoint).
    async fn get_folder_contents(
        &self,
        project: Option<&str>,
        repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Value>;

    async fn list_branches(&self, project: Option<&str>, repository: &str) -> Result<Value>;

    /// Create a branch pointing at `source_branch`'s current commit.
    ///
    /// Resolves the source first; an unknown source is a NotFound failure
    /// and no ref update is issued.
    async fn create_branch(
        &self,
        project: Option<&str>,
        repository: &str,
        name: &str,
        source_branch: &str,
    ) -> Result<Value>;

    /// Push one commit with the given changes onto `branch`.
    async fn create_commit(
        &self,
        project: Option<&str>,
        repository: &str,
        branch: &str,
        comment: &str,
        changes: Vec<FileChange>,
    ) -> Result<Value>;

    async fn create_pull_request(
        &self,
        project: Option<&str>,
        repository: &str,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Value>;

    async fn get_pull_request(
        &self,
        project: Option<&str>,
        repository: &str,
        pull_request_id: i64,
    ) -> Result<Value>;

    /// Partially update a pull request (title, description, status, ...).
    async fn update_pull_request(
        &self,
        project: Option<&str>,
        repository: &str,
        pull_request_id: i64,
        updates: FieldMap,
    ) -> Result<Value>;

    /// List pull requests, optionally filtered by status.
    async fn list_pull_requests(
        &self,
        project: Option<&str>,
        repository: &str,
        status: Option<&str>,
    ) -> Result<Value>;
}

/// Test plan, suite membership, and test case operations.
#[async_trait]
pub trait TestPlanProvider: Send + Sync {
    /// Create a test plan, folding formatted steps/parameters into the body
    /// when provided.
    async fn create_test_plan(
        &self,
        project: &str,
        name: &str,
        fields: FieldMap,
        steps: Option<Vec<TestStep>>,
        parameters: Option<Vec<ParameterSet>>,
    ) -> Result<Value>;

    async fn get_test_plan(&self, plan_id: i64) -> Result<Value>;

    async fn update_test_plan(
        &self,
        plan_id: i64,
        fields: FieldMap,
        steps: Option<Vec<TestStep>>,
        parameters: Option<Vec<ParameterSet>>,
    ) -> Result<Value>;

    async fn delete_test_plan(&self, plan_id: i64) -> Result<Value>;

    async fn get_test_plan_tags(&self, plan_id: i64) -> Result<Value>;

    async fn add_test_plan_tags(&self, plan_id: i64, tags: Vec<String>) -> Result<Value>;

    async fn remove_test_plan_tags(&self, plan_id: i64, tags: Vec<String>) -> Result<Value>;

    async fn get_test_plan_comments(&self, plan_id: i64) -> Result<Value>;

    async fn add_test_plan_comment(&self, plan_id: i64, comment: &str) -> Result<Value>;

    async fn get_test_suite(&self, plan_id: i64, suite_id: i64) -> Result<Value>;

    async fn add_test_cases_to_suite(
        &self,
        plan_id: i64,
        suite_id: i64,
        test_case_ids: &[i64],
    ) -> Result<Value>;

    async fn remove_test_cases_from_suite(
        &self,
        plan_id: i64,
        suite_id: i64,
        test_case_ids: &[i64],
    ) -> Result<Value>;

    async fn list_suite_test_cases(&self, plan_id: i64, suite_id: i64) -> Result<Value>;

    /// Delete test cases one by one, collecting per-item outcomes.
    ///
    /// Partial failure is a valid result: the report carries it, the call
    /// still returns `Ok`.
    async fn delete_test_cases(&self, test_case_ids: &[i64]) -> Result<BulkDeleteReport>;
}

/// Telemetry query operations against the log-query remote.
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    /// Run free-form query text, forwarded verbatim.
    async fn execute_query(&self, query: &str, timespan: Option<&str>) -> Result<Value>;

    /// Fetch metadata for the configured application.
    async fn get_application_info(&self) -> Result<Value>;

    /// Fetch a named metric, optionally constrained by timespan/aggregation.
    async fn get_metric(
        &self,
        name: &str,
        timespan: Option<&str>,
        aggregation: Option<&str>,
    ) -> Result<Value>;

    /// Fetch events of a named type, optionally capped.
    async fn get_events(
        &self,
        event_type: &str,
        timespan: Option<&str>,
        top: Option<u32>,
    ) -> Result<Value>;

    async fn get_exceptions(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value>;

    async fn get_requests(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value>;

    async fn get_dependencies(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value>;

    async fn get_traces(&self, timespan: Option<&str>, top: Option<u32>) -> Result<Value>;

    async fn get_performance_counters(
        &self,
        timespan: Option<&str>,
        top: Option<u32>,
    ) -> Result<Value>;
}

/// The four shared provider instances, built once at process start and
/// handed to whichever front-end was selected. Cloning is cheap; the
/// front-ends never see concrete client types.
#[derive(Clone)]
pub struct Services {
    pub work_items: Arc<dyn WorkItemProvider>,
    pub repositories: Arc<dyn RepositoryProvider>,
    pub test_plans: Arc<dyn TestPlanProvider>,
    pub telemetry: Arc<dyn TelemetryProvider>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
