//! `/api/work-items` handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use opshub_core::types::FieldMap;
use opshub_core::Services;

use crate::error::ApiResult;

pub(crate) fn router() -> Router<Services> {
    Router::new()
        .route("/", post(create))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .route("/:id/tags", get(get_tags).post(add_tags).delete(remove_tags))
        .route("/:id/comments", get(get_comments).post(add_comment))
}

#[derive(Deserialize)]
struct CreateWorkItem {
    project: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    fields: FieldMap,
}

#[derive(Deserialize)]
struct Tags {
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct NewComment {
    text: String,
}

async fn create(
    State(services): State<Services>,
    Json(body): Json<CreateWorkItem>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let id = services
        .work_items
        .create_work_item(&body.project, &body.item_type, body.fields)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn get_one(State(services): State<Services>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(Json(services.work_items.get_work_item(id).await?))
}

async fn update(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(fields): Json<FieldMap>,
) -> ApiResult<Json<Value>> {
    Ok(Json(services.work_items.update_work_item(id, fields).await?))
}

async fn remove(State(services): State<Services>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(Json(services.work_items.delete_work_item(id).await?))
}

async fn get_tags(State(services): State<Services>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(Json(services.work_items.get_work_item_tags(id).await?))
}

async fn add_tags(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(body): Json<Tags>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services.work_items.add_work_item_tags(id, body.tags).await?,
    ))
}

async fn remove_tags(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(body): Json<Tags>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .work_items
            .remove_work_item_tags(id, body.tags)
            .await?,
    ))
}

async fn get_comments(
    State(services): State<Services>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    Ok(Json(services.work_items.get_work_item_comments(id).await?))
}

async fn add_comment(
    State(services): State<Services>,
    Path(id): Path<i64>,
    Json(body): Json<NewComment>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .work_items
            .add_work_item_comment(id, &body.text)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{body_json, services};
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_create_returns_201_with_new_id() {
        let response = create(
            State(services()),
            Json(CreateWorkItem {
                project: "Alpha".into(),
                item_type: "Bug".into(),
                fields: FieldMap::new(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], 42);
    }

    #[tokio::test]
    async fn test_get_returns_the_item() {
        let response = get_one(State(services()), Path(7)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 7);
        assert_eq!(body["fields"]["System.Title"], "Canned");
    }

    #[tokio::test]
    async fn test_missing_item_renders_404_error_body() {
        let response = get_one(State(services()), Path(404)).await.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not found: Work item 404");
    }

    #[tokio::test]
    async fn test_update_passes_fields_through() {
        let mut fields = FieldMap::new();
        fields.insert("System.State".into(), json!("Closed"));

        let response = update(State(services()), Path(7), Json(fields))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fields"]["System.State"], "Closed");
    }

    #[tokio::test]
    async fn test_delete_returns_200() {
        let response = remove(State(services()), Path(7)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_tag_mutations_echo_the_tag_list() {
        let response = add_tags(
            State(services()),
            Path(7),
            Json(Tags {
                tags: vec!["regression".into()],
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["tags"][0], "regression");

        let response = remove_tags(
            State(services()),
            Path(7),
            Json(Tags {
                tags: vec!["stale".into()],
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["removed"][0], "stale");
    }

    #[tokio::test]
    async fn test_add_comment_sends_the_text() {
        let response = add_comment(
            State(services()),
            Path(7),
            Json(NewComment {
                text: "Investigated, see PR".into(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["text"], "Investigated, see PR");
        assert_eq!(body["workItemId"], 7);
    }
}
