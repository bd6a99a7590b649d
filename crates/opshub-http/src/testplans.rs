//! `/api/test-plans` handlers, including suite membership and the bulk
//! test case delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use opshub_core::types::{FieldMap, ParameterSet, TestStep};
use opshub_core::Services;

use crate::error::ApiResult;

pub(crate) fn router() -> Router<Services> {
    Router::new()
        .route("/", post(create))
        .route("/delete-test-cases", post(delete_test_cases))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .route("/:id/tags", get(get_tags).post(add_tags).delete(remove_tags))
        .route("/:id/comments", get(get_comments).post(add_comment))
        .route("/:id/suites/:suite_id", get(get_suite))
        .route(
            "/:id/suites/:suite_id/test-cases",
            get(list_cases).post(add_cases).delete(remove_cases),
        )
}

#[derive(Deserialize)]
struct CreateTestPlan {
    project: String,
    name: String,
    #[serde(default)]
    fields: FieldMap,
    #[serde(default)]
    steps: Option<Vec<TestStep>>,
    #[serde(default)]
    parameters: Option<Vec<ParameterSet>>,
}

#[derive(Deserialize)]
struct UpdateTestPlan {
    #[serde(default)]
    fields: FieldMap,
    #[serde(default)]
    steps: Option<Vec<TestStep>>,
    #[serde(default)]
    parameters: Option<Vec<ParameterSet>>,
}

#[derive(Deserialize)]
struct Tags {
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct NewComment {
    comment: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestCaseIds {
    test_case_ids: Vec<i64>,
}

async fn create(
    State(services): State<Services>,
    Json(body): Json<CreateTestPlan>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = services
        .test_plans
        .create_test_plan(
            &body.project,
            &body.name,
            body.fields,
            body.steps,
            body.parameters,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(State(services): State<Services>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(Json(services.test_plans.get_test_plan(id).await?))
}

async fn update(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTestPlan>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .test_plans
            .update_test_plan(id, body.fields, body.steps, body.parameters)
            .await?,
    ))
}

async fn remove(State(services): State<Services>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(Json(services.test_plans.delete_test_plan(id).await?))
}

async fn get_tags(State(services): State<Services>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(Json(services.test_plans.get_test_plan_tags(id).await?))
}

async fn add_tags(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(body): Json<Tags>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services.test_plans.add_test_plan_tags(id, body.tags).await?,
    ))
}

async fn remove_tags(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(body): Json<Tags>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .test_plans
            .remove_test_plan_tags(id, body.tags)
            .await?,
    ))
}

async fn get_comments(
    State(services): State<Services>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    Ok(Json(services.test_plans.get_test_plan_comments(id).await?))
}

async fn add_comment(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(body): Json<NewComment>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .test_plans
            .add_test_plan_comment(id, &body.comment)
            .await?,
    ))
}

async fn get_suite(
    State(services): State<Services>,
    Path((id, suite_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    Ok(Json(services.test_plans.get_test_suite(id, suite_id).await?))
}

async fn list_cases(
    State(services): State<Services>,
    Path((id, suite_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .test_plans
            .list_suite_test_cases(id, suite_id)
            .await?,
    ))
}

async fn add_cases(
    State(services): State<Services>,
    Path((id, suite_id)): Path<(i64, i64)>,
    Json(body): Json<TestCaseIds>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .test_plans
            .add_test_cases_to_suite(id, suite_id, &body.test_case_ids)
            .await?,
    ))
}

async fn remove_cases(
    State(services): State<Services>,
    Path((id, suite_id)): Path<(i64, i64)>,
    Json(body): Json<TestCaseIds>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .test_plans
            .remove_test_cases_from_suite(id, suite_id, &body.test_case_ids)
            .await?,
    ))
}

async fn delete_test_cases(
    State(services): State<Services>,
    Json(body): Json<TestCaseIds>,
) -> ApiResult<Json<Value>> {
    let report = services
        .test_plans
        .delete_test_cases(&body.test_case_ids)
        .await?;
    Ok(Json(serde_json::to_value(report).map_err(opshub_core::Error::from)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{body_json, services};
    use axum::response::IntoResponse;
    use opshub_core::types::StepKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_returns_201_and_folds_steps() {
        let response = create(
            State(services()),
            Json(CreateTestPlan {
                project: "Alpha".into(),
                name: "Smoke".into(),
                fields: FieldMap::new(),
                steps: Some(vec![TestStep {
                    kind: StepKind::When,
                    action: "the app starts".into(),
                    expected_result: None,
                    order: 1,
                    data: None,
                }]),
                parameters: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Smoke");
        assert_eq!(body["stepCount"], 1);
    }

    #[tokio::test]
    async fn test_update_passes_fields_through() {
        let mut fields = FieldMap::new();
        fields.insert("areaPath".into(), json!("Alpha\\Web"));

        let response = update(
            State(services()),
            Path(9),
            Json(UpdateTestPlan {
                fields,
                steps: None,
                parameters: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fields"]["areaPath"], "Alpha\\Web");
    }

    #[tokio::test]
    async fn test_delete_returns_confirmation() {
        let response = remove(State(services()), Path(9)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["id"], 9);
    }

    #[tokio::test]
    async fn test_add_cases_forwards_the_id_list() {
        let response = add_cases(
            State(services()),
            Path((9, 21)),
            Json(TestCaseIds {
                test_case_ids: vec![101, 102],
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["addedCount"], 2);
    }

    #[tokio::test]
    async fn test_bulk_delete_serializes_the_report() {
        let response = delete_test_cases(
            State(services()),
            Json(TestCaseIds {
                test_case_ids: vec![101, 102, 103],
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalCount"], 3);
        assert_eq!(body["results"][0]["status"], "deleted");
    }

    #[tokio::test]
    async fn test_tag_mutations_echo_the_tag_list() {
        let response = add_tags(
            State(services()),
            Path(9),
            Json(Tags {
                tags: vec!["nightly".into()],
            }),
        )
        .await
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["tags"][0], "nightly");
    }

    #[tokio::test]
    async fn test_add_comment_sends_the_comment() {
        let response = add_comment(
            State(services()),
            Path(9),
            Json(NewComment {
                comment: "Ready for the next sprint".into(),
            }),
        )
        .await
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["text"], "Ready for the next sprint");
    }
}
