//! `/api/telemetry` handlers.
//!
//! The metrics route uses a wildcard because metric names contain slashes
//! (`requests/duration`).

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use opshub_core::Services;

use crate::error::ApiResult;

pub(crate) fn router() -> Router<Services> {
    Router::new()
        .route("/query", post(query))
        .route("/application", get(application))
        .route("/metrics/*name", get(metric))
        .route("/events/:event_type", get(events))
        .route("/exceptions", get(exceptions))
        .route("/requests", get(requests))
        .route("/dependencies", get(dependencies))
        .route("/traces", get(traces))
        .route("/performance-counters", get(performance_counters))
}

#[derive(Deserialize)]
struct QueryBody {
    query: String,
    #[serde(default)]
    timespan: Option<String>,
}

#[derive(Deserialize)]
struct MetricQuery {
    timespan: Option<String>,
    aggregation: Option<String>,
}

#[derive(Deserialize)]
struct WindowQuery {
    timespan: Option<String>,
    top: Option<u32>,
}

async fn query(
    State(services): State<Services>,
    Json(body): Json<QueryBody>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .execute_query(&body.query, body.timespan.as_deref())
            .await?,
    ))
}

async fn application(State(services): State<Services>) -> ApiResult<Json<Value>> {
    Ok(Json(services.telemetry.get_application_info().await?))
}

async fn metric(
    State(services): State<Services>,
    Path(name): Path<String>,
    Query(params): Query<MetricQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .get_metric(
                &name,
                params.timespan.as_deref(),
                params.aggregation.as_deref(),
            )
            .await?,
    ))
}

async fn events(
    State(services): State<Services>,
    Path(event_type): Path<String>,
    Query(params): Query<WindowQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .get_events(&event_type, params.timespan.as_deref(), params.top)
            .await?,
    ))
}

async fn exceptions(
    State(services): State<Services>,
    Query(params): Query<WindowQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .get_exceptions(params.timespan.as_deref(), params.top)
            .await?,
    ))
}

async fn requests(
    State(services): State<Services>,
    Query(params): Query<WindowQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .get_requests(params.timespan.as_deref(), params.top)
            .await?,
    ))
}

async fn dependencies(
    State(services): State<Services>,
    Query(params): Query<WindowQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .get_dependencies(params.timespan.as_deref(), params.top)
            .await?,
    ))
}

async fn traces(
    State(services): State<Services>,
    Query(params): Query<WindowQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .get_traces(params.timespan.as_deref(), params.top)
            .await?,
    ))
}

async fn performance_counters(
    State(services): State<Services>,
    Query(params): Query<WindowQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        services
            .telemetry
            .get_performance_counters(params.timespan.as_deref(), params.top)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{body_json, services};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_query_forwards_text_and_timespan() {
        let response = query(
            State(services()),
            Json(QueryBody {
                query: "exceptions | take 5".into(),
                timespan: Some("P1D".into()),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["query"], "exceptions | take 5");
        assert_eq!(body["timespan"], "P1D");
    }

    #[tokio::test]
    async fn test_application_info() {
        let response = application(State(services())).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "mock-app");
    }

    #[tokio::test]
    async fn test_metric_name_may_contain_a_slash() {
        let response = metric(
            State(services()),
            Path("requests/duration".into()),
            Query(MetricQuery {
                timespan: None,
                aggregation: Some("avg".into()),
            }),
        )
        .await
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["metric"], "requests/duration");
        assert_eq!(body["aggregation"], "avg");
    }

    #[tokio::test]
    async fn test_events_forward_type_and_top() {
        let response = events(
            State(services()),
            Path("pageViews".into()),
            Query(WindowQuery {
                timespan: None,
                top: Some(10),
            }),
        )
        .await
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["eventType"], "pageViews");
        assert_eq!(body["top"], 10);
    }

    #[tokio::test]
    async fn test_shortcut_routes_reach_their_tables() {
        let response = exceptions(
            State(services()),
            Query(WindowQuery {
                timespan: Some("PT12H".into()),
                top: Some(50),
            }),
        )
        .await
        .into_response();
        assert_eq!(body_json(response).await["source"], "exceptions");

        let response = performance_counters(
            State(services()),
            Query(WindowQuery {
                timespan: None,
                top: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(body_json(response).await["source"], "performanceCounters");
    }
}
