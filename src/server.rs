//! HTTP adapter: turns query strings into selections and views into JSON.

use crate::dashboard::{render, Dataset};
use crate::filters::{FilterOptions, FilterSelection};
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const INDEX_HTML: &str = include_str!("assets/dashboard.html");

/// Shared application state. The dataset is immutable, so no lock.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub province: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub tehsil: Option<String>,
}

impl SelectionQuery {
    fn selection(&self) -> FilterSelection {
        FilterSelection::new(
            self.province.as_deref(),
            self.district.as_deref(),
            self.city.as_deref(),
            self.tehsil.as_deref(),
        )
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    records: usize,
    source_files: usize,
    loaded_at: String,
}

pub fn router(dataset: Arc<Dataset>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/dashboard", get(dashboard))
        .route("/api/options", get(options))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { dataset })
}

pub async fn serve(dataset: Arc<Dataset>, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(dataset)).await
}

/// GET / - dashboard page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/dashboard - all three panels for a selection
async fn dashboard(State(state): State<AppState>, Query(query): Query<SelectionQuery>) -> impl IntoResponse {
    Json(render(&state.dataset, &query.selection()))
}

/// GET /api/options - dropdown contents for a selection
async fn options(State(state): State<AppState>, Query(query): Query<SelectionQuery>) -> impl IntoResponse {
    let records = &state.dataset.records;
    let selection = query.selection().reconcile(records);
    Json(FilterOptions::derive(records, &selection))
}

/// GET /api/health - health check
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        records: state.dataset.records.len(),
        source_files: state.dataset.source_files,
        loaded_at: state.dataset.loaded_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::tests::{record, sample};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(Dataset::new(sample(), 1_000_000.0)))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        get_json_from(app(), uri).await
    }

    async fn get_json_from(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn dashboard_filters_by_query() {
        let (status, body) = get_json("/api/dashboard?province=Punjab&district=Lahore").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selection"]["province"], "PUNJAB");
        assert_eq!(body["selection"]["city"], "All");
        assert_eq!(body["level"], "city");
        assert_eq!(body["total_atms"], 3);
        assert_eq!(body["pie"]["annotation"], "Total 1M");
    }

    #[tokio::test]
    async fn dashboard_without_query_is_unfiltered() {
        let (status, body) = get_json("/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], "participant");
        assert_eq!(body["total_atms"], 6);
        assert_eq!(body["bar"]["bars"][0]["participant"], "ALPHA BANK");
    }

    #[tokio::test]
    async fn options_follow_parent_selection() {
        let (_, body) = get_json("/api/options?province=All").await;
        assert_eq!(body["districts"], serde_json::json!(["All"]));

        let (_, body) = get_json("/api/options?province=punjab").await;
        let districts = body["districts"].as_array().unwrap();
        assert!(districts.contains(&Value::from("LAHORE")));
        assert!(districts.contains(&Value::from("MULTAN")));
        assert!(!districts.contains(&Value::from("KARACHI")));
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], 6);
        assert_eq!(body["source_files"], 0);
    }

    #[tokio::test]
    async fn padded_district_round_trips_through_query() {
        let records = vec![
            record("ALPHA BANK", "PUNJAB", "LAHORE ", "LAHORE", "LAHORE CITY"),
            record("BETA BANK", "PUNJAB", "MULTAN", "MULTAN", "MULTAN CITY"),
        ];
        let app = router(Arc::new(Dataset::new(records, 1000.0)));
        let (_, body) = get_json_from(app, "/api/dashboard?province=PUNJAB&district=LAHORE%20").await;
        assert_eq!(body["selection"]["district"], "LAHORE ");
        assert_eq!(body["level"], "city");
        assert_eq!(body["total_atms"], 1);
    }

    #[tokio::test]
    async fn index_serves_page() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("province_dropdown"));
    }
}
