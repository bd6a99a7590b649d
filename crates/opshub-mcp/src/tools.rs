//! MCP tool definitions.
//!
//! One tool per service operation, split by family. Schemas document the
//! exact argument names the handlers extract; `required` lists the
//! mandatory ones.

use serde_json::{json, Value};

use crate::protocol::ToolDefinition;

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// All available tool definitions, in tools/list order.
pub fn all() -> Vec<ToolDefinition> {
    let mut tools = work_item_tools();
    tools.extend(repository_tools());
    tools.extend(test_plan_tools());
    tools.extend(telemetry_tools());
    tools
}

fn work_item_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "create_work_item",
            "Create a work item and return its new id",
            json!({
                "type": "object",
                "properties": {
                    "project": {
                        "type": "string",
                        "description": "Project to create the work item in"
                    },
                    "type": {
                        "type": "string",
                        "description": "Work item type, e.g. Bug, Task, User Story"
                    },
                    "fields": {
                        "type": "object",
                        "description": "Field reference names to values, e.g. {\"System.Title\": \"...\"}"
                    }
                },
                "required": ["project", "type", "fields"]
            }),
        ),
        tool(
            "get_work_item",
            "Fetch a work item by id",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" }
                },
                "required": ["id"]
            }),
        ),
        tool(
            "update_work_item",
            "Update a work item's fields",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" },
                    "fields": {
                        "type": "object",
                        "description": "Field reference names to new values"
                    }
                },
                "required": ["id", "fields"]
            }),
        ),
        tool(
            "delete_work_item",
            "Delete a work item by id",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" }
                },
                "required": ["id"]
            }),
        ),
        tool(
            "get_work_item_tags",
            "List a work item's tags",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" }
                },
                "required": ["id"]
            }),
        ),
        tool(
            "add_work_item_tags",
            "Add tags to a work item",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags to add"
                    }
                },
                "required": ["id", "tags"]
            }),
        ),
        tool(
            "remove_work_item_tags",
            "Remove tags from a work item",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags to remove"
                    }
                },
                "required": ["id", "tags"]
            }),
        ),
        tool(
            "get_work_item_comments",
            "List a work item's comments",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" }
                },
                "required": ["id"]
            }),
        ),
        tool(
            "add_work_item_comment",
            "Add a comment to a work item",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Work item id" },
                    "text": { "type": "string", "description": "Comment text" }
                },
                "required": ["id", "text"]
            }),
        ),
    ]
}

fn repository_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "list_repositories",
            "List git repositories",
            json!({
                "type": "object",
                "properties": {
                    "project": {
                        "type": "string",
                        "description": "Project scope; defaults to the configured project"
                    }
                }
            }),
        ),
        tool(
            "get_repository",
            "Fetch a repository by name or id",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository"]
            }),
        ),
        tool(
            "get_file_content",
            "Fetch a file's content from a repository",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "path": { "type": "string", "description": "File path, e.g. /src/main.rs" },
                    "branch": { "type": "string", "description": "Branch name; defaults to the default branch" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "path"]
            }),
        ),
        tool(
            "get_item_metadata",
            "Fetch an item's metadata without its content",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "path": { "type": "string", "description": "Item path" },
                    "branch": { "type": "string", "description": "Branch name" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "path"]
            }),
        ),
        tool(
            "get_folder_contents",
            "List a folder's entries in a repository",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "path": { "type": "string", "description": "Folder path, e.g. /src" },
                    "branch": { "type": "string", "description": "Branch name" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "path"]
            }),
        ),
        tool(
            "list_branches",
            "List a repository's branches",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository"]
            }),
        ),
        tool(
            "create_branch",
            "Create a branch from an existing source branch",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "name": { "type": "string", "description": "New branch name, without refs/heads/" },
                    "source_branch": { "type": "string", "description": "Branch to fork from" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "name", "source_branch"]
            }),
        ),
        tool(
            "create_commit",
            "Push one commit with file changes onto a branch",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "branch": { "type": "string", "description": "Branch to commit to" },
                    "comment": { "type": "string", "description": "Commit message" },
                    "changes": {
                        "type": "array",
                        "description": "File changes in the commit",
                        "items": {
                            "type": "object",
                            "properties": {
                                "path": { "type": "string", "description": "File path" },
                                "changeType": {
                                    "type": "string",
                                    "enum": ["add", "edit", "delete"],
                                    "description": "Kind of change"
                                },
                                "content": {
                                    "type": "string",
                                    "description": "New file content; omit for deletes"
                                },
                                "encoding": {
                                    "type": "string",
                                    "enum": ["base64", "raw"],
                                    "description": "Content encoding (default: base64)"
                                }
                            },
                            "required": ["path", "changeType"]
                        }
                    },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "branch", "comment", "changes"]
            }),
        ),
        tool(
            "create_pull_request",
            "Open a pull request between two branches",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "source_branch": { "type": "string", "description": "Branch with the changes" },
                    "target_branch": { "type": "string", "description": "Branch to merge into" },
                    "title": { "type": "string", "description": "Pull request title" },
                    "description": { "type": "string", "description": "Pull request description" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "source_branch", "target_branch", "title"]
            }),
        ),
        tool(
            "get_pull_request",
            "Fetch a pull request by id",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "pull_request_id": { "type": "integer", "description": "Pull request id" },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "pull_request_id"]
            }),
        ),
        tool(
            "update_pull_request",
            "Update a pull request's title, description, or status",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "pull_request_id": { "type": "integer", "description": "Pull request id" },
                    "updates": {
                        "type": "object",
                        "description": "Fields to change, e.g. {\"status\": \"completed\"}"
                    },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository", "pull_request_id", "updates"]
            }),
        ),
        tool(
            "list_pull_requests",
            "List a repository's pull requests",
            json!({
                "type": "object",
                "properties": {
                    "repository": { "type": "string", "description": "Repository name or id" },
                    "status": {
                        "type": "string",
                        "enum": ["active", "abandoned", "completed", "all"],
                        "description": "Filter by status"
                    },
                    "project": { "type": "string", "description": "Project scope" }
                },
                "required": ["repository"]
            }),
        ),
    ]
}

fn test_plan_tools() -> Vec<ToolDefinition> {
    let step_schema = json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ["Given", "When", "Then", "And", "But"],
                "description": "Gherkin step role (default: Given)"
            },
            "action": { "type": "string", "description": "Step action text" },
            "expectedResult": { "type": "string", "description": "Expected outcome" },
            "order": { "type": "integer", "description": "Step position; steps are sorted by this" },
            "data": { "description": "Additional step context, carried through verbatim" }
        },
        "required": ["action"]
    });
    let parameter_set_schema = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": "Parameter set name" },
            "parameters": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "value": { "type": "string" },
                        "type": { "type": "string", "description": "Value type (default: string)" }
                    },
                    "required": ["name", "value"]
                }
            }
        }
    });

    vec![
        tool(
            "create_test_plan",
            "Create a test plan, optionally with Gherkin steps and data-driven parameters",
            json!({
                "type": "object",
                "properties": {
                    "project": { "type": "string", "description": "Project to create the plan in" },
                    "name": { "type": "string", "description": "Test plan name" },
                    "fields": {
                        "type": "object",
                        "description": "Additional plan properties, e.g. areaPath, iteration"
                    },
                    "steps": {
                        "type": "array",
                        "description": "Gherkin test steps",
                        "items": step_schema.clone()
                    },
                    "parameters": {
                        "type": "array",
                        "description": "Parameter sets for data-driven execution",
                        "items": parameter_set_schema.clone()
                    }
                },
                "required": ["project", "name", "fields"]
            }),
        ),
        tool(
            "get_test_plan",
            "Fetch a test plan by id",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" }
                },
                "required": ["plan_id"]
            }),
        ),
        tool(
            "update_test_plan",
            "Update a test plan's fields, steps, or parameters",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "fields": { "type": "object", "description": "Plan properties to change" },
                    "steps": {
                        "type": "array",
                        "description": "Replacement Gherkin test steps",
                        "items": step_schema
                    },
                    "parameters": {
                        "type": "array",
                        "description": "Replacement parameter sets",
                        "items": parameter_set_schema
                    }
                },
                "required": ["plan_id", "fields"]
            }),
        ),
        tool(
            "delete_test_plan",
            "Delete a test plan by id",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" }
                },
                "required": ["plan_id"]
            }),
        ),
        tool(
            "get_test_plan_tags",
            "List a test plan's tags",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" }
                },
                "required": ["plan_id"]
            }),
        ),
        tool(
            "add_test_plan_tags",
            "Add tags to a test plan",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags to add"
                    }
                },
                "required": ["plan_id", "tags"]
            }),
        ),
        tool(
            "remove_test_plan_tags",
            "Remove tags from a test plan",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags to remove"
                    }
                },
                "required": ["plan_id", "tags"]
            }),
        ),
        tool(
            "get_test_plan_comments",
            "List a test plan's comments (always empty; plans have no comment store)",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" }
                },
                "required": ["plan_id"]
            }),
        ),
        tool(
            "add_test_plan_comment",
            "Record a test plan comment (not persisted on the remote)",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "comment": { "type": "string", "description": "Comment text" }
                },
                "required": ["plan_id", "comment"]
            }),
        ),
        tool(
            "get_test_suite",
            "Fetch a test suite within a plan",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "suite_id": { "type": "integer", "description": "Test suite id" }
                },
                "required": ["plan_id", "suite_id"]
            }),
        ),
        tool(
            "add_test_cases_to_suite",
            "Add test cases to a suite",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "suite_id": { "type": "integer", "description": "Test suite id" },
                    "test_case_ids": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "description": "Work item ids of the test cases"
                    }
                },
                "required": ["plan_id", "suite_id", "test_case_ids"]
            }),
        ),
        tool(
            "remove_test_cases_from_suite",
            "Remove test cases from a suite",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "suite_id": { "type": "integer", "description": "Test suite id" },
                    "test_case_ids": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "description": "Work item ids of the test cases"
                    }
                },
                "required": ["plan_id", "suite_id", "test_case_ids"]
            }),
        ),
        tool(
            "list_suite_test_cases",
            "List the test cases in a suite",
            json!({
                "type": "object",
                "properties": {
                    "plan_id": { "type": "integer", "description": "Test plan id" },
                    "suite_id": { "type": "integer", "description": "Test suite id" }
                },
                "required": ["plan_id", "suite_id"]
            }),
        ),
        tool(
            "delete_test_cases",
            "Delete test cases one by one and report per-item outcomes",
            json!({
                "type": "object",
                "properties": {
                    "test_case_ids": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "description": "Work item ids of the test cases to delete"
                    }
                },
                "required": ["test_case_ids"]
            }),
        ),
    ]
}

fn telemetry_tools() -> Vec<ToolDefinition> {
    let timespan = json!({
        "type": "string",
        "description": "ISO 8601 duration or range, e.g. P1D or PT12H"
    });
    let top = json!({
        "type": "integer",
        "description": "Maximum number of rows to return",
        "minimum": 1
    });

    vec![
        tool(
            "execute_query",
            "Run a free-form KQL query against the telemetry store",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Query text, forwarded verbatim" },
                    "timespan": timespan.clone()
                },
                "required": ["query"]
            }),
        ),
        tool(
            "get_application_info",
            "Fetch metadata for the configured application",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
        tool(
            "get_metric",
            "Fetch an aggregated metric value",
            json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Metric name, e.g. requests/duration"
                    },
                    "timespan": timespan.clone(),
                    "aggregation": {
                        "type": "string",
                        "description": "Aggregation to apply, e.g. avg, sum, count"
                    }
                },
                "required": ["name"]
            }),
        ),
        tool(
            "get_events",
            "Fetch events of a given type",
            json!({
                "type": "object",
                "properties": {
                    "event_type": {
                        "type": "string",
                        "description": "Event type, e.g. pageViews, customEvents"
                    },
                    "timespan": timespan.clone(),
                    "top": top.clone()
                },
                "required": ["event_type"]
            }),
        ),
        tool(
            "get_exceptions",
            "Fetch recent exceptions",
            json!({
                "type": "object",
                "properties": { "timespan": timespan.clone(), "top": top.clone() }
            }),
        ),
        tool(
            "get_requests",
            "Fetch recent requests",
            json!({
                "type": "object",
                "properties": { "timespan": timespan.clone(), "top": top.clone() }
            }),
        ),
        tool(
            "get_dependencies",
            "Fetch recent dependency calls",
            json!({
                "type": "object",
                "properties": { "timespan": timespan.clone(), "top": top.clone() }
            }),
        ),
        tool(
            "get_traces",
            "Fetch recent traces",
            json!({
                "type": "object",
                "properties": { "timespan": timespan.clone(), "top": top.clone() }
            }),
        ),
        tool(
            "get_performance_counters",
            "Fetch recent performance counter samples",
            json!({
                "type": "object",
                "properties": { "timespan": timespan, "top": top }
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_inventory_is_complete() {
        let tools = all();
        assert_eq!(tools.len(), 44);
        assert_eq!(work_item_tools().len(), 9);
        assert_eq!(repository_tools().len(), 12);
        assert_eq!(test_plan_tools().len(), 14);
        assert_eq!(telemetry_tools().len(), 9);
    }

    #[test]
    fn test_names_are_unique() {
        let tools = all();
        let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn test_every_schema_is_an_object() {
        for tool in all() {
            assert_eq!(
                tool.input_schema["type"], "object",
                "schema of {} is not an object",
                tool.name
            );
            assert!(
                tool.input_schema.get("properties").is_some(),
                "schema of {} has no properties",
                tool.name
            );
        }
    }

    #[test]
    fn test_required_lists_mandatory_params() {
        let tools = all();
        let by_name = |name: &str| {
            tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool {name}"))
        };

        assert_eq!(
            by_name("create_work_item").input_schema["required"],
            serde_json::json!(["project", "type", "fields"])
        );
        assert_eq!(
            by_name("create_branch").input_schema["required"],
            serde_json::json!(["repository", "name", "source_branch"])
        );
        assert_eq!(
            by_name("delete_test_cases").input_schema["required"],
            serde_json::json!(["test_case_ids"])
        );
        assert_eq!(
            by_name("execute_query").input_schema["required"],
            serde_json::json!(["query"])
        );
        // Optional-only tools carry no required list.
        assert!(by_name("list_repositories")
            .input_schema
            .get("required")
            .is_none());
        assert!(by_name("get_application_info")
            .input_schema
            .get("required")
            .is_none());
    }
}
