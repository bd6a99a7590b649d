//! `/api/repositories` handlers.
//!
//! All routes accept an optional `?project=` override; without it the
//! client's configured default project applies.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use opshub_core::types::{FieldMap, FileChange};
use opshub_core::Services;

use crate::error::ApiResult;

pub(crate) fn router() -> Router<Services> {
    Router::new()
        .route("/", get(list))
        .route("/:repo", get(get_one))
        .route("/:repo/file", get(file_content))
        .route("/:repo/item", get(item_metadata))
        .route("/:repo/folder", get(folder_contents))
        .route("/:repo/branches", get(branches).post(create_branch))
        .route("/:repo/commits", post(create_commit))
        .route(
            "/:repo/pull-requests",
            get(pull_requests).post(create_pull_request),
        )
        .route(
            "/:repo/pull-requests/:id",
            get(get_pull_request).patch(update_pull_request),
        )
}

#[derive(Deserialize)]
struct Scope {
    project: Option<String>,
}

#[derive(Deserialize)]
struct ItemQuery {
    path: String,
    branch: Option<String>,
    project: Option<String>,
}

#[derive(Deserialize)]
struct PullRequestFilter {
    status: Option<String>,
    project: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBranch {
    name: String,
    source_branch: String,
}

#[derive(Deserialize)]
struct CreateCommit {
    branch: String,
    comment: String,
    changes: Vec<FileChange>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequest {
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
}

async fn list(
    State(services): State<Services>,
    Query(scope): Query<Scope>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .list_repositories(scope.project.as_deref())
            .await?,
    ))
}

async fn get_one(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(scope): Query<Scope>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .get_repository(scope.project.as_deref(), &repo)
            .await?,
    ))
}

async fn file_content(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .get_file_content(
                query.project.as_deref(),
                &repo,
                &query.path,
                query.branch.as_deref(),
            )
            .await?,
    ))
}

async fn item_metadata(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .get_item_metadata(
                query.project.as_deref(),
                &repo,
                &query.path,
                query.branch.as_deref(),
            )
            .await?,
    ))
}

async fn folder_contents(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .get_folder_contents(
                query.project.as_deref(),
                &repo,
                &query.path,
                query.branch.as_deref(),
            )
            .await?,
    ))
}

async fn branches(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(scope): Query<Scope>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .list_branches(scope.project.as_deref(), &repo)
            .await?,
    ))
}

async fn create_branch(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(scope): Query<Scope>,
    Json(body): Json<CreateBranch>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = services
        .repositories
        .create_branch(
            scope.project.as_deref(),
            &repo,
            &body.name,
            &body.source_branch,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn create_commit(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(scope): Query<Scope>,
    Json(body): Json<CreateCommit>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let pushed = services
        .repositories
        .create_commit(
            scope.project.as_deref(),
            &repo,
            &body.branch,
            &body.comment,
            body.changes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(pushed)))
}

async fn create_pull_request(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(scope): Query<Scope>,
    Json(body): Json<CreatePullRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = services
        .repositories
        .create_pull_request(
            scope.project.as_deref(),
            &repo,
            &body.source_branch,
            &body.target_branch,
            &body.title,
            body.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn pull_requests(
    State(services): State<Services>,
    Path(repo): Path<String>,
    Query(filter): Query<PullRequestFilter>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .list_pull_requests(filter.project.as_deref(), &repo, filter.status.as_deref())
            .await?,
    ))
}

async fn get_pull_request(
    State(services): State<Services>,
    Path((repo, id)): Path<(String, i64)>,
    Query(scope): Query<Scope>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .get_pull_request(scope.project.as_deref(), &repo, id)
            .await?,
    ))
}

async fn update_pull_request(
    State(services): State<Services>,
    Path((repo, id)): Path<(String, i64)>,
    Query(scope): Query<Scope>,
    Json(updates): Json<FieldMap>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .repositories
            .update_pull_request(scope.project.as_deref(), &repo, id, updates)
            .await?,
    ))
}
