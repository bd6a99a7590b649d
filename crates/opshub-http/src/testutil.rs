//! Canned providers for handler tests.
//!
//! The mock echoes its arguments back in recognizable payloads so each
//! handler test can assert that its extraction reached the provider.
//! `get_work_item(404)` fails with NotFound to exercise error rendering.

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};
use std::sync::Arc;

use opshub_core::types::{
    BulkDeleteReport, FieldMap, FileChange, ParameterSet, TestCaseDeleteOutcome, TestStep,
};
use opshub_core::{
    Error, RepositoryProvider, Result, Services, TelemetryProvider, TestPlanProvider,
    WorkItemProvider,
};

pub(crate) struct MockProvider;

#[async_trait]
impl WorkItemProvider for MockProvider {
    async fn create_work_item(
        &self,
        project: &str,
        item_type: &str,
        _fields: FieldMap,
    ) -> Result<i64> {
        assert!(!project.is_empty());
        assert!(!item_type.is_empty());
        Ok(42)
    }

    async fn get_work_item(&self, id: i64) -> Result<Value> {
        if id == 404 {
            return Err(Error::NotFound(format!("Work item {id}")));
        }
        Ok(json!({ "id": id, "fields": { "System.Title": "Canned" } }))
    }

    async fn update_work_item(&self, id: i64, fields: FieldMap) -> Result<Value> {
        Ok(json!({ "id": id, "fields": fields }))
    }

    async fn delete_work_item(&self, id: i64) -> Result<Value> {
        Ok(json!({ "deleted": id }))
    }

    async fn get_work_item_tags(&self, _id: i64) -> Result<Value> {
        Ok(json!(["alpha", "beta"]))
    }

    async fn add_work_item_tags(&self, _id: i64, tags: Vec<String>) -> Result<Value> {
        Ok(json!({ "success": true, "tags": tags }))
    }

    async fn remove_work_item_tags(&self, _id: i64, tags: Vec<String>) -> Result<Value> {
        Ok(json!({ "success": true, "removed": tags }))
    }

    async fn get_work_item_comments(&self, _id: i64) -> Result<Value> {
        Ok(json!({ "comments": [{ "id": 1, "text": "first" }], "count": 1 }))
    }

    async fn add_work_item_comment(&self, id: i64, text: &str) -> Result<Value> {
        Ok(json!({ "workItemId": id, "text": text }))
    }
}

#[async_trait]
impl RepositoryProvider for MockProvider {
    async fn list_repositories(&self, project: Option<&str>) -> Result<Value> {
        Ok(json!({ "count": 0, "project": project }))
    }

    async fn get_repository(&self, _project: Option<&str>, repository: &str) -> Result<Value> {
        Ok(json!({ "name": repository }))
    }

    async fn get_file_content(
        &self,
        _project: Option<&str>,
        _repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Value> {
        Ok(json!({ "path": path, "branch": branch, "content": "fn main() {}" }))
    }

    async fn get_item_metadata(
        &self,
        _project: Option<&str>,
        _repository: &str,
        path: &str,
        _branch: Option<&str>,
    ) -> Result<Value> {
        Ok(json!({ "path": path, "gitObjectType": "blob" }))
    }

    async fn get_folder_contents(
        &self,
        _project: Option<&str>,
        _repository: &str,
        path: &str,
        _branch: Option<&str>,
    ) -> Result<Value> {
        Ok(json!({ "value": [], "scopePath": path }))
    }

    async fn list_branches(&self, _project: Option<&str>, _repository: &str) -> Result<Value> {
        Ok(json!({ "value": [], "count": 0 }))
    }

    async fn create_branch(
        &self,
        _project: Option<&str>,
        _repository: &str,
        name: &str,
        source_branch: &str,
    ) -> Result<Value> {
        Ok(json!({ "name": name, "source": source_branch }))
    }

    async fn create_commit(
        &self,
        _project: Option<&str>,
        _repository: &str,
        branch: &str,
        _comment: &str,
        changes: Vec<FileChange>,
    ) -> Result<Value> {
        Ok(json!({ "branch": branch, "changeCount": changes.len() }))
    }

    async fn create_pull_request(
        &self,
        _project: Option<&str>,
        _repository: &str,
        _source_branch: &str,
        _target_branch: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Value> {
        Ok(json!({ "pullRequestId": 7, "title": title, "description": description }))
    }

    async fn get_pull_request(
        &self,
        _project: Option<&str>,
        _repository: &str,
        pull_request_id: i64,
    ) -> Result<Value> {
        Ok(json!({ "pullRequestId": pull_request_id }))
    }

    async fn update_pull_request(
        &self,
        _project: Option<&str>,
        _repository: &str,
        pull_request_id: i64,
        updates: FieldMap,
    ) -> Result<Value> {
        Ok(json!({ "pullRequestId": pull_request_id, "updates": updates }))
    }

    async fn list_pull_requests(
        &self,
        _project: Option<&str>,
        _repository: &str,
        status: Option<&str>,
    ) -> Result<Value> {
        Ok(json!({ "value": [], "status": status }))
    }
}

#[async_trait]
impl TestPlanProvider for MockProvider {
    async fn create_test_plan(
        &self,
        _project: &str,
        name: &str,
        _fields: FieldMap,
        steps: Option<Vec<TestStep>>,
        parameters: Option<Vec<ParameterSet>>,
    ) -> Result<Value> {
        Ok(json!({
            "id": 99,
            "name": name,
            "stepCount": steps.map(|s| s.len()),
            "parameterSetCount": parameters.map(|p| p.len()),
        }))
    }

    async fn get_test_plan(&self, plan_id: i64) -> Result<Value> {
        Ok(json!({ "id": plan_id }))
    }

    async fn update_test_plan(
        &self,
        plan_id: i64,
        fields: FieldMap,
        _steps: Option<Vec<TestStep>>,
        _parameters: Option<Vec<ParameterSet>>,
    ) -> Result<Value> {
        Ok(json!({ "id": plan_id, "fields": fields }))
    }

    async fn delete_test_plan(&self, plan_id: i64) -> Result<Value> {
        Ok(json!({ "success": true, "id": plan_id }))
    }

    async fn get_test_plan_tags(&self, _plan_id: i64) -> Result<Value> {
        Ok(json!(["planned"]))
    }

    async fn add_test_plan_tags(&self, _plan_id: i64, tags: Vec<String>) -> Result<Value> {
        Ok(json!({ "success": true, "tags": tags }))
    }

    async fn remove_test_plan_tags(&self, _plan_id: i64, tags: Vec<String>) -> Result<Value> {
        Ok(json!({ "success": true, "removed": tags }))
    }

    async fn get_test_plan_comments(&self, _plan_id: i64) -> Result<Value> {
        Ok(json!({ "comments": [], "count": 0 }))
    }

    async fn add_test_plan_comment(&self, plan_id: i64, comment: &str) -> Result<Value> {
        Ok(json!({ "success": true, "id": plan_id, "text": comment }))
    }

    async fn get_test_suite(&self, plan_id: i64, suite_id: i64) -> Result<Value> {
        Ok(json!({ "id": suite_id, "plan": { "id": plan_id } }))
    }

    async fn add_test_cases_to_suite(
        &self,
        _plan_id: i64,
        _suite_id: i64,
        test_case_ids: &[i64],
    ) -> Result<Value> {
        Ok(json!({ "success": true, "addedCount": test_case_ids.len() }))
    }

    async fn remove_test_cases_from_suite(
        &self,
        _plan_id: i64,
        _suite_id: i64,
        test_case_ids: &[i64],
    ) -> Result<Value> {
        Ok(json!({ "success": true, "removedCount": test_case_ids.len() }))
    }

    async fn list_suite_test_cases(&self, _plan_id: i64, _suite_id: i64) -> Result<Value> {
        Ok(json!({ "value": [], "count": 0 }))
    }

    async fn delete_test_cases(&self, test_case_ids: &[i64]) -> Result<BulkDeleteReport> {
        Ok(BulkDeleteReport {
            success: true,
            total_count: test_case_ids.len(),
            success_count: test_case_ids.len(),
            failure_count: 0,
            test_case_ids: test_case_ids.to_vec(),
            results: test_case_ids
                .iter()
                .copied()
                .map(TestCaseDeleteOutcome::deleted)
                .collect(),
        })
    }
}

#[async_trait]
impl TelemetryProvider for MockProvider {
    async fn execute_query(&self, query: &str, timespan: Option<&str>) -> Result<Value> {
        Ok(json!({ "tables": [], "query": query, "timespan": timespan }))
    }

    async fn get_application_info(&self) -> Result<Value> {
        Ok(json!({ "name": "mock-app" }))
    }

    async fn get_metric(
        &self,
        name: &str,
        _timespan: Option<&str>,
        aggregation: Option<&str>,
    ) -> Result<Value> {
        Ok(json!({ "metric": name, "aggregation": aggregation }))
    }

    async fn get_events(
        &self,
        event_type: &str,
        _timespan: Option<&str>,
        top: Option<u32>,
    ) -> Result<Value> {
        Ok(json!({ "value": [], "eventType": event_type, "top": top }))
    }

    async fn get_exceptions(&self, _timespan: Option<&str>, _top: Option<u32>) -> Result<Value> {
        Ok(json!({ "tables": [], "source": "exceptions" }))
    }

    async fn get_requests(&self, _timespan: Option<&str>, _top: Option<u32>) -> Result<Value> {
        Ok(json!({ "tables": [], "source": "requests" }))
    }

    async fn get_dependencies(&self, _timespan: Option<&str>, _top: Option<u32>) -> Result<Value> {
        Ok(json!({ "tables": [], "source": "dependencies" }))
    }

    async fn get_traces(&self, _timespan: Option<&str>, _top: Option<u32>) -> Result<Value> {
        Ok(json!({ "tables": [], "source": "traces" }))
    }

    async fn get_performance_counters(
        &self,
        _timespan: Option<&str>,
        _top: Option<u32>,
    ) -> Result<Value> {
        Ok(json!({ "tables": [], "source": "performanceCounters" }))
    }
}

pub(crate) fn services() -> Services {
    let mock = Arc::new(MockProvider);
    Services {
        work_items: mock.clone(),
        repositories: mock.clone(),
        test_plans: mock.clone(),
        telemetry: mock,
    }
}

pub(crate) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("collect body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
