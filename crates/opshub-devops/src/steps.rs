//! Gherkin step and parameter set formatting for test plan payloads.

use opshub_core::types::{ParameterSet, TestStep};
use serde_json::{json, Map, Value};

/// Serialize steps for the remote, sorted by `order` ascending.
///
/// The sort is stable, so equal orders keep their input sequence. Each
/// step carries a derived `gherkinFormat` display string and an
/// `expectedResult` that is never null.
pub fn format_steps(steps: &[TestStep]) -> Value {
    let mut ordered: Vec<&TestStep> = steps.iter().collect();
    ordered.sort_by_key(|step| step.order);

    Value::Array(
        ordered
            .into_iter()
            .map(|step| {
                json!({
                    "type": step.kind,
                    "action": step.action,
                    "expectedResult": step.expected_result.clone().unwrap_or_default(),
                    "order": step.order,
                    "gherkinFormat": format!("{} {}", step.kind, step.action),
                    "data": step.data,
                })
            })
            .collect(),
    )
}

/// Serialize parameter sets verbatim plus a derived dense table view.
pub fn format_parameters(sets: &[ParameterSet]) -> Value {
    let parameter_sets: Vec<Value> = sets
        .iter()
        .map(|set| {
            json!({
                "name": set.name,
                "parameters": set
                    .parameters
                    .iter()
                    .map(|p| json!({ "name": p.name, "value": p.value, "type": p.kind }))
                    .collect::<Vec<Value>>(),
            })
        })
        .collect();

    json!({
        "parameterSets": parameter_sets,
        "tableView": table_view(sets),
    })
}

/// Headers are the distinct parameter names across all sets in first-seen
/// order; each row maps every header to that set's value or "".
fn table_view(sets: &[ParameterSet]) -> Value {
    let mut headers: Vec<String> = Vec::new();
    for set in sets {
        for parameter in &set.parameters {
            if !headers.iter().any(|h| h == &parameter.name) {
                headers.push(parameter.name.clone());
            }
        }
    }

    let rows: Vec<Value> = sets
        .iter()
        .map(|set| {
            let mut row = Map::new();
            for header in &headers {
                let value = set
                    .parameters
                    .iter()
                    .find(|p| &p.name == header)
                    .map(|p| p.value.clone())
                    .unwrap_or_default();
                row.insert(header.clone(), Value::String(value));
            }
            Value::Object(row)
        })
        .collect();

    json!({ "headers": headers, "rows": rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use opshub_core::types::{StepKind, TestParameter};

    fn step(kind: StepKind, action: &str, order: i32) -> TestStep {
        TestStep {
            kind,
            action: action.to_string(),
            expected_result: None,
            order,
            data: None,
        }
    }

    fn parameter(name: &str, value: &str) -> TestParameter {
        TestParameter {
            name: name.to_string(),
            value: value.to_string(),
            kind: "string".to_string(),
        }
    }

    #[test]
    fn test_steps_sorted_by_order_not_input() {
        let steps = vec![
            step(StepKind::Then, "the page loads", 3),
            step(StepKind::Given, "a logged-in user", 1),
            step(StepKind::When, "they open the dashboard", 2),
        ];
        let value = format_steps(&steps);
        let orders: Vec<i64> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["order"].as_i64().unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(value[0]["type"], "Given");
        assert_eq!(value[2]["type"], "Then");
    }

    #[test]
    fn test_step_gherkin_format_and_defaults() {
        let mut with_result = step(StepKind::When, "the user clicks save", 1);
        with_result.expected_result = Some("the form submits".to_string());

        let value = format_steps(&[with_result, step(StepKind::And, "nothing else", 2)]);
        assert_eq!(value[0]["gherkinFormat"], "When the user clicks save");
        assert_eq!(value[0]["expectedResult"], "the form submits");
        // Absent expected result serializes as empty string, not null.
        assert_eq!(value[1]["expectedResult"], "");
        assert_eq!(value[1]["data"], Value::Null);
    }

    #[test]
    fn test_equal_orders_keep_input_sequence() {
        let steps = vec![
            step(StepKind::Given, "first", 1),
            step(StepKind::And, "second", 1),
        ];
        let value = format_steps(&steps);
        assert_eq!(value[0]["action"], "first");
        assert_eq!(value[1]["action"], "second");
    }

    #[test]
    fn test_parameters_verbatim_plus_table() {
        let sets = vec![
            ParameterSet {
                name: "A".to_string(),
                parameters: vec![parameter("x", "1")],
            },
            ParameterSet {
                name: "B".to_string(),
                parameters: vec![parameter("y", "2")],
            },
        ];
        let value = format_parameters(&sets);

        assert_eq!(value["parameterSets"][0]["name"], "A");
        assert_eq!(value["parameterSets"][1]["parameters"][0]["name"], "y");

        // headers = first-seen union; missing cells are empty strings.
        assert_eq!(value["tableView"]["headers"], json!(["x", "y"]));
        assert_eq!(
            value["tableView"]["rows"],
            json!([{ "x": "1", "y": "" }, { "x": "", "y": "2" }])
        );
    }

    #[test]
    fn test_header_order_is_first_seen() {
        let sets = vec![
            ParameterSet {
                name: "A".to_string(),
                parameters: vec![parameter("b", "1"), parameter("a", "2")],
            },
            ParameterSet {
                name: "B".to_string(),
                parameters: vec![parameter("a", "3"), parameter("c", "4")],
            },
        ];
        let value = format_parameters(&sets);
        assert_eq!(value["tableView"]["headers"], json!(["b", "a", "c"]));
    }

    #[test]
    fn test_empty_input_is_empty_not_error() {
        let value = format_parameters(&[]);
        assert_eq!(value["parameterSets"], json!([]));
        assert_eq!(value["tableView"]["headers"], json!([]));
        assert_eq!(value["tableView"]["rows"], json!([]));

        assert_eq!(format_steps(&[]), json!([]));
    }
}
