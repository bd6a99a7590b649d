//! Tool call dispatch.
//!
//! Maps tool names to provider calls, extracting arguments from the
//! caller-supplied JSON object. Any failure, argument or remote, becomes
//! an error tool result rather than a protocol error.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use opshub_core::types::FieldMap;
use opshub_core::{Error, Result, Services};

use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::tools;

/// Typed views over a tool call's argument object.
struct Args {
    map: Map<String, Value>,
}

impl Args {
    fn new(arguments: Option<Value>) -> Result<Self> {
        let map = match arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(Error::Validation(
                    "Tool arguments must be an object".to_string(),
                ))
            }
        };
        Ok(Self { map })
    }

    fn str(&self, key: &str) -> Result<&str> {
        self.map
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation(format!("Missing required string argument '{key}'")))
    }

    fn opt_str(&self, key: &str) -> Result<Option<&str>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| Error::Validation(format!("Argument '{key}' must be a string"))),
        }
    }

    fn i64(&self, key: &str) -> Result<i64> {
        self.map
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Validation(format!("Missing required integer argument '{key}'")))
    }

    fn opt_u32(&self, key: &str) -> Result<Option<u32>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    Error::Validation(format!("Argument '{key}' must be a positive integer"))
                }),
        }
    }

    fn fields(&self, key: &str) -> Result<FieldMap> {
        self.map
            .get(key)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| Error::Validation(format!("Missing required object argument '{key}'")))
    }

    fn string_list(&self, key: &str) -> Result<Vec<String>> {
        let items = self.map.get(key).and_then(Value::as_array).ok_or_else(|| {
            Error::Validation(format!("Argument '{key}' must be an array of strings"))
        })?;
        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::Validation(format!("Argument '{key}' must be an array of strings"))
                })
            })
            .collect()
    }

    fn id_list(&self, key: &str) -> Result<Vec<i64>> {
        let items = self.map.get(key).and_then(Value::as_array).ok_or_else(|| {
            Error::Validation(format!("Argument '{key}' must be an array of integers"))
        })?;
        items
            .iter()
            .map(|item| {
                item.as_i64().ok_or_else(|| {
                    Error::Validation(format!("Argument '{key}' must be an array of integers"))
                })
            })
            .collect()
    }

    fn typed<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .map
            .get(key)
            .cloned()
            .ok_or_else(|| Error::Validation(format!("Missing required argument '{key}'")))?;
        serde_json::from_value(value)
            .map_err(|e| Error::Validation(format!("Argument '{key}' is malformed: {e}")))
    }

    fn opt_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| Error::Validation(format!("Argument '{key}' is malformed: {e}"))),
        }
    }
}

/// Executes tool calls against the shared provider set.
pub struct ToolHandler {
    services: Services,
}

impl ToolHandler {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Tool definitions advertised through tools/list.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        tools::all()
    }

    /// Run one tool call, folding any failure into an error result.
    pub async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        debug!("Executing tool '{}'", name);
        match self.dispatch(name, arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolCallResult::text(text),
                Err(e) => ToolCallResult::error(Error::from(e).to_string()),
            },
            Err(e) => {
                warn!("Tool '{}' failed: {}", name, e);
                ToolCallResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Option<Value>) -> Result<Value> {
        let args = Args::new(arguments)?;
        match name {
            // Work items.
            "create_work_item" => {
                let id = self
                    .services
                    .work_items
                    .create_work_item(
                        args.str("project")?,
                        args.str("type")?,
                        args.fields("fields")?,
                    )
                    .await?;
                Ok(json!({ "id": id }))
            }
            "get_work_item" => {
                self.services
                    .work_items
                    .get_work_item(args.i64("id")?)
                    .await
            }
            "update_work_item" => {
                self.services
                    .work_items
                    .update_work_item(args.i64("id")?, args.fields("fields")?)
                    .await
            }
            "delete_work_item" => {
                self.services
                    .work_items
                    .delete_work_item(args.i64("id")?)
                    .await
            }
            "get_work_item_tags" => {
                self.services
                    .work_items
                    .get_work_item_tags(args.i64("id")?)
                    .await
            }
            "add_work_item_tags" => {
                self.services
                    .work_items
                    .add_work_item_tags(args.i64("id")?, args.string_list("tags")?)
                    .await
            }
            "remove_work_item_tags" => {
                self.services
                    .work_items
                    .remove_work_item_tags(args.i64("id")?, args.string_list("tags")?)
                    .await
            }
            "get_work_item_comments" => {
                self.services
                    .work_items
                    .get_work_item_comments(args.i64("id")?)
                    .await
            }
            "add_work_item_comment" => {
                self.services
                    .work_items
                    .add_work_item_comment(args.i64("id")?, args.str("text")?)
                    .await
            }

            // Repositories.
            "list_repositories" => {
                self.services
                    .repositories
                    .list_repositories(args.opt_str("project")?)
                    .await
            }
            "get_repository" => {
                self.services
                    .repositories
                    .get_repository(args.opt_str("project")?, args.str("repository")?)
                    .await
            }
            "get_file_content" => {
                self.services
                    .repositories
                    .get_file_content(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.str("path")?,
                        args.opt_str("branch")?,
                    )
                    .await
            }
            "get_item_metadata" => {
                self.services
                    .repositories
                    .get_item_metadata(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.str("path")?,
                        args.opt_str("branch")?,
                    )
                    .await
            }
            "get_folder_contents" => {
                self.services
                    .repositories
                    .get_folder_contents(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.str("path")?,
                        args.opt_str("branch")?,
                    )
                    .await
            }
            "list_branches" => {
                self.services
                    .repositories
                    .list_branches(args.opt_str("project")?, args.str("repository")?)
                    .await
            }
            "create_branch" => {
                self.services
                    .repositories
                    .create_branch(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.str("name")?,
                        args.str("source_branch")?,
                    )
                    .await
            }
            "create_commit" => {
                self.services
                    .repositories
                    .create_commit(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.str("branch")?,
                        args.str("comment")?,
                        args.typed("changes")?,
                    )
                    .await
            }
            "create_pull_request" => {
                self.services
                    .repositories
                    .create_pull_request(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.str("source_branch")?,
                        args.str("target_branch")?,
                        args.str("title")?,
                        args.opt_str("description")?,
                    )
                    .await
            }
            "get_pull_request" => {
                self.services
                    .repositories
                    .get_pull_request(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.i64("pull_request_id")?,
                    )
                    .await
            }
            "update_pull_request" => {
                self.services
                    .repositories
                    .update_pull_request(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.i64("pull_request_id")?,
                        args.fields("updates")?,
                    )
                    .await
            }
            "list_pull_requests" => {
                self.services
                    .repositories
                    .list_pull_requests(
                        args.opt_str("project")?,
                        args.str("repository")?,
                        args.opt_str("status")?,
                    )
                    .await
            }

            // Test plans.
            "create_test_plan" => {
                self.services
                    .test_plans
                    .create_test_plan(
                        args.str("project")?,
                        args.str("name")?,
                        args.fields("fields")?,
                        args.opt_typed("steps")?,
                        args.opt_typed("parameters")?,
                    )
                    .await
            }
            "get_test_plan" => {
                self.services
                    .test_plans
                    .get_test_plan(args.i64("plan_id")?)
                    .await
            }
            "update_test_plan" => {
                self.services
                    .test_plans
                    .update_test_plan(
                        args.i64("plan_id")?,
                        args.fields("fields")?,
                        args.opt_typed("steps")?,
                        args.opt_typed("parameters")?,
                    )
                    .await
            }
            "delete_test_plan" => {
                self.services
                    .test_plans
                    .delete_test_plan(args.i64("plan_id")?)
                    .await
            }
            "get_test_plan_tags" => {
                self.services
                    .test_plans
                    .get_test_plan_tags(args.i64("plan_id")?)
                    .await
            }
            "add_test_plan_tags" => {
                self.services
                    .test_plans
                    .add_test_plan_tags(args.i64("plan_id")?, args.string_list("tags")?)
                    .await
            }
            "remove_test_plan_tags" => {
                self.services
                    .test_plans
                    .remove_test_plan_tags(args.i64("plan_id")?, args.string_list("tags")?)
                    .await
            }
            "get_test_plan_comments" => {
                self.services
                    .test_plans
                    .get_test_plan_comments(args.i64("plan_id")?)
                    .await
            }
            "add_test_plan_comment" => {
                self.services
                    .test_plans
                    .add_test_plan_comment(args.i64("plan_id")?, args.str("comment")?)
                    .await
            }
            "get_test_suite" => {
                self.services
                    .test_plans
                    .get_test_suite(args.i64("plan_id")?, args.i64("suite_id")?)
                    .await
            }
            "add_test_cases_to_suite" => {
                self.services
                    .test_plans
                    .add_test_cases_to_suite(
                        args.i64("plan_id")?,
                        args.i64("suite_id")?,
                        &args.id_list("test_case_ids")?,
                    )
                    .await
            }
            "remove_test_cases_from_suite" => {
                self.services
                    .test_plans
                    .remove_test_cases_from_suite(
                        args.i64("plan_id")?,
                        args.i64("suite_id")?,
                        &args.id_list("test_case_ids")?,
                    )
                    .await
            }
            "list_suite_test_cases" => {
                self.services
                    .test_plans
                    .list_suite_test_cases(args.i64("plan_id")?, args.i64("suite_id")?)
                    .await
            }
            "delete_test_cases" => {
                let report = self
                    .services
                    .test_plans
                    .delete_test_cases(&args.id_list("test_case_ids")?)
                    .await?;
                Ok(serde_json::to_value(report)?)
            }

            // Telemetry.
            "execute_query" => {
                self.services
                    .telemetry
                    .execute_query(args.str("query")?, args.opt_str("timespan")?)
                    .await
            }
            "get_application_info" => self.services.telemetry.get_application_info().await,
            "get_metric" => {
                self.services
                    .telemetry
                    .get_metric(
                        args.str("name")?,
                        args.opt_str("timespan")?,
                        args.opt_str("aggregation")?,
                    )
                    .await
            }
            "get_events" => {
                self.services
                    .telemetry
                    .get_events(
                        args.str("event_type")?,
                        args.opt_str("timespan")?,
                        args.opt_u32("top")?,
                    )
                    .await
            }
            "get_exceptions" => {
                self.services
                    .telemetry
                    .get_exceptions(args.opt_str("timespan")?, args.opt_u32("top")?)
                    .await
            }
            "get_requests" => {
                self.services
                    .telemetry
                    .get_requests(args.opt_str("timespan")?, args.opt_u32("top")?)
                    .await
            }
            "get_dependencies" => {
                self.services
                    .telemetry
                    .get_dependencies(args.opt_str("timespan")?, args.opt_u32("top")?)
                    .await
            }
            "get_traces" => {
                self.services
                    .telemetry
                    .get_traces(args.opt_str("timespan")?, args.opt_u32("top")?)
                    .await
            }
            "get_performance_counters" => {
                self.services
                    .telemetry
                    .get_performance_counters(args.opt_str("timespan")?, args.opt_u32("top")?)
                    .await
            }

            _ => Err(Error::Validation(format!("Unknown tool: {name}"))),
        }
    }
}
