use crate::infra::AppState;
use admissions::error::AppError;
use admissions::stats::report::views::DashboardView;
use admissions::stats::{
    AdmissionRecord, Category, Datasets, SortDirection, SortKey, SortOrder, Tab, ViewState,
};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

/// View-state overrides accepted on the query string. Missing values keep the defaults.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<String>,
    #[serde(default)]
    pub(crate) direction: Option<String>,
    #[serde(default)]
    pub(crate) top: Option<String>,
    #[serde(default)]
    pub(crate) tab: Option<String>,
}

impl DashboardQuery {
    pub(crate) fn into_state(self) -> Result<ViewState, AppError> {
        let mut state = ViewState::default();

        if let Some(search) = self.search {
            state = state.with_search(search);
        }
        if let Some(category) = non_empty(self.category) {
            state = state.with_category(Some(parse_param::<Category>(&category)?));
        }

        let key = match non_empty(self.sort) {
            Some(sort) => parse_param::<SortKey>(&sort)?,
            None => state.sort.key,
        };
        let direction = match non_empty(self.direction) {
            Some(direction) => parse_param::<SortDirection>(&direction)?,
            None => state.sort.direction,
        };
        state = state.with_sort(SortOrder { key, direction });

        if let Some(top) = non_empty(self.top) {
            state = state.with_top(parse_top(&top)?);
        }
        if let Some(tab) = non_empty(self.tab) {
            state = state.with_tab(parse_param::<Tab>(&tab)?);
        }

        Ok(state)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_top(value: &str) -> Result<usize, AppError> {
    value.trim().parse().map_err(|_| {
        AppError::InvalidView(format!(
            "top must be a non-negative integer, got '{value}'"
        ))
    })
}

fn parse_param<T: FromStr<Err = String>>(value: &str) -> Result<T, AppError> {
    value.parse().map_err(AppError::InvalidView)
}

/// Dashboard over caller-supplied records instead of the configured endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct InlineDashboardRequest {
    pub(crate) current: Vec<AdmissionRecord>,
    #[serde(default)]
    pub(crate) prior: Option<Vec<AdmissionRecord>>,
    #[serde(default)]
    pub(crate) view: ViewState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DataSource {
    Remote,
    Inline,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) data_source: DataSource,
    #[serde(flatten)]
    pub(crate) dashboard: DashboardView,
}

impl DashboardResponse {
    fn new(data_source: DataSource, dashboard: DashboardView) -> Self {
        Self {
            generated_at: Utc::now(),
            data_source,
            dashboard,
        }
    }
}

pub(crate) fn dashboard_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/admissions/dashboard",
            get(dashboard_endpoint).post(inline_dashboard_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Fetches both configured periods and derives the dashboard for the requested view.
pub(crate) async fn dashboard_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let view = query.into_state()?;
    let datasets = state.stats.load_configured().await?;
    Ok(Json(DashboardResponse::new(
        DataSource::Remote,
        datasets.dashboard(&view),
    )))
}

pub(crate) async fn inline_dashboard_endpoint(
    Json(payload): Json<InlineDashboardRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let InlineDashboardRequest {
        current,
        prior,
        view,
    } = payload;

    let datasets = match prior {
        Some(prior) => Datasets::with_prior(current, prior),
        None => Datasets::current_only(current),
    };

    Ok(Json(DashboardResponse::new(
        DataSource::Inline,
        datasets.dashboard(&view),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admissions::config::SourceConfig;
    use admissions::stats::StatsClient;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use httpmock::prelude::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_for(server: &MockServer, ready: bool) -> Router {
        let stats = StatsClient::new(SourceConfig {
            current_url: server.url("/crawl"),
            prior_url: server.url("/crawl/prior"),
            timeout_secs: 5,
        })
        .expect("client builds");
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            stats: Arc::new(stats),
        };
        dashboard_router().layer(Extension(state))
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let server = MockServer::start_async().await;

        let response = app_for(&server, false)
            .oneshot(get_request("/ready"))
            .await
            .expect("ready responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app_for(&server, true)
            .oneshot(get_request("/ready"))
            .await
            .expect("ready responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_compares_configured_periods() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/crawl");
                then.status(200).json_body(json!({
                    "data": [
                        {"계열": "공학계열", "학과": "기계공학과", "전형명": "일반전형", "모집인원": 40, "지원자수": 1000},
                        {"계열": "예체능계열", "학과": "디자인학과", "전형명": "일반전형", "모집인원": 20, "지원자수": 310}
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/crawl/prior");
                then.status(200).json_body(json!({
                    "data": [
                        {"계열": "공학계열", "학과": "기계공학과", "전형명": "일반고전형", "모집인원": 40, "지원자수": 800}
                    ]
                }));
            })
            .await;

        let response = app_for(&server, true)
            .oneshot(get_request(
                "/api/v1/admissions/dashboard?tab=comparison&category=engineering",
            ))
            .await
            .expect("dashboard responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data_source"], "remote");
        assert_eq!(body["summary"]["total_applicants"], 1000);
        let comparison = &body["comparison"];
        assert_eq!(comparison["matched"], 1);
        assert_eq!(comparison["unmatched"], 0);
        assert_eq!(comparison["rows"][0]["delta"]["applicants"], 25.0);
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/crawl");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/crawl/prior");
                then.status(503);
            })
            .await;

        let response = app_for(&server, true)
            .oneshot(get_request("/api/v1/admissions/dashboard"))
            .await
            .expect("dashboard responds");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = read_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("503"));
    }

    #[tokio::test]
    async fn invalid_view_parameters_are_rejected() {
        let server = MockServer::start_async().await;

        let response = app_for(&server, true)
            .oneshot(get_request("/api/v1/admissions/dashboard?sort=popularity"))
            .await
            .expect("dashboard responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_top_gets_a_json_error() {
        let server = MockServer::start_async().await;

        let response = app_for(&server, true)
            .oneshot(get_request("/api/v1/admissions/dashboard?top=abc"))
            .await
            .expect("dashboard responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("top must be a non-negative integer"));
    }

    #[test]
    fn numeric_top_is_applied() {
        let query = DashboardQuery {
            top: Some(" 3 ".to_string()),
            ..DashboardQuery::default()
        };
        assert_eq!(query.into_state().expect("top parses").top, 3);
    }

    #[tokio::test]
    async fn inline_records_skip_the_upstream() {
        let server = MockServer::start_async().await;
        let payload = json!({
            "current": [
                {"category": "engineering", "department": "A", "trackName": "general", "capacity": 10, "applicants": 25},
                {"category": "other", "department": "B", "trackName": "special", "applicants": 3, "subcategoryA": 4, "subcategoryB": 1}
            ],
            "view": { "tab": "tracks" }
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/admissions/dashboard")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds");

        let response = app_for(&server, true)
            .oneshot(request)
            .await
            .expect("dashboard responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data_source"], "inline");
        assert_eq!(body["tab"], "tracks");
        assert_eq!(body["summary"]["total_applicants"], 33);
        assert!(body["comparison"].is_null());
    }

    #[test]
    fn query_defaults_match_view_defaults() {
        let state = DashboardQuery::default()
            .into_state()
            .expect("defaults parse");
        assert_eq!(state, ViewState::default());
    }
}
