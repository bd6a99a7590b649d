//! Wire types shared by the remote services and both front-ends.
//!
//! Serde forms use camelCase to match the remote payloads and the
//! front-end request bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field-name to value mapping used for work item and test plan payloads.
/// Values pass through opaquely; no coercion happens in this layer.
pub type FieldMap = serde_json::Map<String, Value>;

/// Gherkin step role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StepKind {
    #[default]
    Given,
    When,
    Then,
    And,
    But,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::Given => "Given",
            StepKind::When => "When",
            StepKind::Then => "Then",
            StepKind::And => "And",
            StepKind::But => "But",
        };
        f.write_str(s)
    }
}

/// A single Gherkin-style test step.
///
/// `order` determines the serialized sequence, not insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    #[serde(rename = "type", default)]
    pub kind: StepKind,
    pub action: String,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub order: i32,
    /// Additional context carried through verbatim.
    #[serde(default)]
    pub data: Option<Value>,
}

/// One name/value/type triple inside a parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestParameter {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", default = "default_parameter_type")]
    pub kind: String,
}

fn default_parameter_type() -> String {
    "string".to_string()
}

/// A named row of parameters for data-driven test execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<TestParameter>,
}

/// Kind of file change inside a commit push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Edit,
    Delete,
}

/// How inline file content is encoded in a commit push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    Base64,
    Raw,
}

/// One file change inside a commit push. `content` is omitted for deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    pub change_type: ChangeKind,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: ContentEncoding,
}

/// Outcome of one delete inside a bulk test case delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseDeleteOutcome {
    pub test_case_id: i64,
    pub status: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestCaseDeleteOutcome {
    pub fn deleted(test_case_id: i64) -> Self {
        Self {
            test_case_id,
            status: "deleted".to_string(),
            success: true,
            error: None,
        }
    }

    pub fn failed(test_case_id: i64, error: String) -> Self {
        Self {
            test_case_id,
            status: "failed".to_string(),
            success: false,
            error: Some(error),
        }
    }
}

/// Aggregate result of a bulk test case delete.
///
/// Partial failure is a valid terminal outcome, not an error: `success` is
/// simply `failure_count == 0`, and `results` holds one entry per input id
/// in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteReport {
    pub success: bool,
    pub total_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub test_case_ids: Vec<i64>,
    pub results: Vec<TestCaseDeleteOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_kind_defaults_to_given() {
        let step: TestStep = serde_json::from_value(json!({ "action": "a user exists" })).unwrap();
        assert_eq!(step.kind, StepKind::Given);
        assert_eq!(step.order, 0);
        assert!(step.expected_result.is_none());
    }

    #[test]
    fn test_step_round_trip() {
        let step: TestStep = serde_json::from_value(json!({
            "type": "Then",
            "action": "the page loads",
            "expectedResult": "HTTP 200",
            "order": 3,
            "data": { "browser": "firefox" }
        }))
        .unwrap();
        assert_eq!(step.kind, StepKind::Then);
        assert_eq!(step.kind.to_string(), "Then");
        assert_eq!(step.expected_result.as_deref(), Some("HTTP 200"));

        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["type"], "Then");
        assert_eq!(value["expectedResult"], "HTTP 200");
    }

    #[test]
    fn test_parameter_type_defaults_to_string() {
        let param: TestParameter =
            serde_json::from_value(json!({ "name": "x", "value": "1" })).unwrap();
        assert_eq!(param.kind, "string");
    }

    #[test]
    fn test_file_change_wire_form() {
        let change: FileChange = serde_json::from_value(json!({
            "path": "/src/main.rs",
            "changeType": "edit",
            "content": "Zm4gbWFpbigpIHt9",
        }))
        .unwrap();
        assert_eq!(change.change_type, ChangeKind::Edit);
        assert_eq!(change.encoding, ContentEncoding::Base64);

        let delete: FileChange = serde_json::from_value(json!({
            "path": "/old.txt",
            "changeType": "delete"
        }))
        .unwrap();
        assert_eq!(delete.change_type, ChangeKind::Delete);
        assert!(delete.content.is_none());
    }

    #[test]
    fn test_bulk_report_serialization() {
        let report = BulkDeleteReport {
            success: false,
            total_count: 2,
            success_count: 1,
            failure_count: 1,
            test_case_ids: vec![7, 8],
            results: vec![
                TestCaseDeleteOutcome::deleted(7),
                TestCaseDeleteOutcome::failed(8, "HTTP 500".to_string()),
            ],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["totalCount"], 2);
        assert_eq!(value["results"][0]["status"], "deleted");
        assert_eq!(value["results"][1]["error"], "HTTP 500");
        assert!(value["results"][0].get("error").is_none());
    }
}
