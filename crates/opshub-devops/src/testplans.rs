//! Test plan, suite membership, and test case operations.
//!
//! Plan CRUD speaks the `testplan` resource family. Suite membership and
//! test case deletion go through the legacy `test` family, which is a
//! generation older and takes test case ids as one comma-joined path
//! segment. Plan tags are a native JSON property (string or list on read,
//! always written back as a list), unlike the delimited work item field.

use async_trait::async_trait;
use chrono::Utc;
use opshub_core::types::{
    BulkDeleteReport, FieldMap, ParameterSet, TestCaseDeleteOutcome, TestStep,
};
use opshub_core::{Result, TestPlanProvider};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::client::DevOpsClient;
use crate::steps::{format_parameters, format_steps};
use crate::tags;
use crate::url::Endpoint;

/// Plan create/update body: fields plus formatted steps and parameters.
/// Empty step or parameter lists are left out entirely.
fn plan_body(
    name: Option<&str>,
    fields: FieldMap,
    steps: Option<Vec<TestStep>>,
    parameters: Option<Vec<ParameterSet>>,
) -> Value {
    let mut body = Map::new();
    if let Some(name) = name {
        body.insert("name".to_string(), json!(name));
    }
    body.extend(fields);
    if let Some(steps) = steps.filter(|steps| !steps.is_empty()) {
        body.insert("testSteps".to_string(), format_steps(&steps));
    }
    if let Some(sets) = parameters.filter(|sets| !sets.is_empty()) {
        body.insert("parameters".to_string(), format_parameters(&sets));
    }
    Value::Object(body)
}

impl DevOpsClient {
    fn plan_endpoint(&self, plan_id: i64) -> Endpoint {
        Endpoint::org(format!("testplan/plans/{}", plan_id)).api_version(&self.versions.test_plans)
    }

    fn suite_endpoint(&self, plan_id: i64, suite_id: i64, suffix: &str) -> Endpoint {
        Endpoint::org(format!(
            "test/Plans/{}/Suites/{}{}",
            plan_id, suite_id, suffix
        ))
        .api_version(&self.versions.test_legacy)
    }

    async fn test_plan_tags(&self, plan_id: i64) -> Result<Vec<String>> {
        let plan = self.get_test_plan(plan_id).await?;
        Ok(tags::parse(&plan["tags"]))
    }

    /// Write the whole tag set back as a native list.
    async fn write_test_plan_tags(&self, plan_id: i64, all: &[String]) -> Result<()> {
        self.patch_json(&self.plan_endpoint(plan_id), &json!({ "tags": all }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TestPlanProvider for DevOpsClient {
    async fn create_test_plan(
        &self,
        project: &str,
        name: &str,
        fields: FieldMap,
        steps: Option<Vec<TestStep>>,
        parameters: Option<Vec<ParameterSet>>,
    ) -> Result<Value> {
        debug!(project = project, name = name, "Creating test plan");

        let endpoint = Endpoint::scoped(Some(project), "testplan/plans")
            .api_version(&self.versions.test_plans);
        let body = plan_body(Some(name), fields, steps, parameters);
        self.post_json(&endpoint, &body).await
    }

    async fn get_test_plan(&self, plan_id: i64) -> Result<Value> {
        self.get_json(&self.plan_endpoint(plan_id)).await
    }

    async fn update_test_plan(
        &self,
        plan_id: i64,
        fields: FieldMap,
        steps: Option<Vec<TestStep>>,
        parameters: Option<Vec<ParameterSet>>,
    ) -> Result<Value> {
        debug!(plan_id = plan_id, "Updating test plan");

        let body = plan_body(None, fields, steps, parameters);
        self.patch_json(&self.plan_endpoint(plan_id), &body).await
    }

    async fn delete_test_plan(&self, plan_id: i64) -> Result<Value> {
        debug!(plan_id = plan_id, "Deleting test plan");

        self.delete_json(&self.plan_endpoint(plan_id)).await?;
        Ok(json!({ "success": true, "id": plan_id }))
    }

    async fn get_test_plan_tags(&self, plan_id: i64) -> Result<Value> {
        let current = self.test_plan_tags(plan_id).await?;
        Ok(json!(current))
    }

    async fn add_test_plan_tags(&self, plan_id: i64, tags: Vec<String>) -> Result<Value> {
        let existing = self.test_plan_tags(plan_id).await?;
        let merged = tags::union(&existing, &tags);
        self.write_test_plan_tags(plan_id, &merged).await?;
        Ok(json!({ "success": true, "tags": merged }))
    }

    async fn remove_test_plan_tags(&self, plan_id: i64, tags: Vec<String>) -> Result<Value> {
        let existing = self.test_plan_tags(plan_id).await?;
        let remaining = tags::difference(&existing, &tags);
        self.write_test_plan_tags(plan_id, &remaining).await?;
        Ok(json!({ "success": true, "tags": remaining }))
    }

    /// Plans have no comment endpoint on the remote. The plan fetch keeps
    /// the not-found contract; the comment list is always empty.
    async fn get_test_plan_comments(&self, plan_id: i64) -> Result<Value> {
        self.get_test_plan(plan_id).await?;
        Ok(json!({ "comments": [], "count": 0 }))
    }

    /// Placeholder: nothing is persisted on the remote.
    async fn add_test_plan_comment(&self, plan_id: i64, comment: &str) -> Result<Value> {
        Ok(json!({
            "success": true,
            "id": plan_id,
            "text": comment,
            "createdDate": Utc::now().to_rfc3339(),
            "message": "Test plans have no dedicated comment endpoint; nothing was persisted",
        }))
    }

    async fn get_test_suite(&self, plan_id: i64, suite_id: i64) -> Result<Value> {
        self.get_json(&self.suite_endpoint(plan_id, suite_id, ""))
            .await
    }

    async fn add_test_cases_to_suite(
        &self,
        plan_id: i64,
        suite_id: i64,
        test_case_ids: &[i64],
    ) -> Result<Value> {
        debug!(
            plan_id = plan_id,
            suite_id = suite_id,
            count = test_case_ids.len(),
            "Adding test cases to suite"
        );

        // Ids travel in the path; the body stays empty.
        let joined = join_ids(test_case_ids);
        let endpoint = self.suite_endpoint(plan_id, suite_id, &format!("/testcases/{}", joined));
        let details = self.post_empty(&endpoint).await?;

        Ok(json!({
            "success": true,
            "planId": plan_id,
            "suiteId": suite_id,
            "testCaseIds": test_case_ids,
            "addedCount": test_case_ids.len(),
            "details": details,
        }))
    }

    /// A non-success status is reported in the aggregate, not raised.
    async fn remove_test_cases_from_suite(
        &self,
        plan_id: i64,
        suite_id: i64,
        test_case_ids: &[i64],
    ) -> Result<Value> {
        debug!(
            plan_id = plan_id,
            suite_id = suite_id,
            count = test_case_ids.len(),
            "Removing test cases from suite"
        );

        let joined = join_ids(test_case_ids);
        let endpoint = self.suite_endpoint(plan_id, suite_id, &format!("/testcases/{}", joined));
        let response = self.send(Method::DELETE, &endpoint, None).await?;

        if response.status().is_success() {
            let details = self.handle_response(response).await?;
            return Ok(json!({
                "success": true,
                "planId": plan_id,
                "suiteId": suite_id,
                "testCaseIds": test_case_ids,
                "removedCount": test_case_ids.len(),
                "details": details,
            }));
        }

        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            message = message,
            "Suite removal rejected"
        );
        Ok(json!({
            "success": false,
            "planId": plan_id,
            "suiteId": suite_id,
            "testCaseIds": test_case_ids,
            "error": if message.is_empty() { status.to_string() } else { message },
        }))
    }

    async fn list_suite_test_cases(&self, plan_id: i64, suite_id: i64) -> Result<Value> {
        self.get_json(&self.suite_endpoint(plan_id, suite_id, "/testcases"))
            .await
    }

    async fn delete_test_cases(&self, test_case_ids: &[i64]) -> Result<BulkDeleteReport> {
        debug!(count = test_case_ids.len(), "Deleting test cases");

        let mut results = Vec::with_capacity(test_case_ids.len());
        for &test_case_id in test_case_ids {
            let endpoint = Endpoint::org(format!("test/testcases/{}", test_case_id))
                .api_version(&self.versions.test_legacy);

            let outcome = match self.send(Method::DELETE, &endpoint, None).await {
                Ok(response) if response.status().is_success() => {
                    TestCaseDeleteOutcome::deleted(test_case_id)
                }
                Ok(response) => {
                    let status = response.status();
                    let message = response.text().await.unwrap_or_default();
                    TestCaseDeleteOutcome::failed(
                        test_case_id,
                        if message.is_empty() {
                            status.to_string()
                        } else {
                            message
                        },
                    )
                }
                Err(error) => TestCaseDeleteOutcome::failed(test_case_id, error.to_string()),
            };
            results.push(outcome);
        }

        let success_count = results.iter().filter(|outcome| outcome.success).count();
        let failure_count = results.len() - success_count;
        Ok(BulkDeleteReport {
            success: failure_count == 0,
            total_count: test_case_ids.len(),
            success_count,
            failure_count,
            test_case_ids: test_case_ids.to_vec(),
            results,
        })
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Tests
// =============================================================================
