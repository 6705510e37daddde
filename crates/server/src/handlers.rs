//! Request handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gleaner_core::ProviderKind;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::state::AppState;

/// Query parameters for `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    /// Restricts the search to one engine; unknown names fall back to ordered search.
    pub engine: Option<String>,
    /// Only the literal `true` enables enrichment.
    pub fetch_content: Option<String>,
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn now() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let Some(query) = params.q.filter(|q| !q.trim().is_empty()) else {
        return error(StatusCode::BAD_REQUEST, "缺少查询参数");
    };

    let engine = params.engine.as_deref().and_then(|name| match name.parse::<ProviderKind>() {
        Ok(kind) => Some(kind),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring engine parameter");
            None
        }
    });
    let fetch_content = params.fetch_content.as_deref() == Some("true");

    tracing::info!(query = %query, engine = ?engine, fetch_content, "search request");
    let response = state.search.perform_search(&query, engine, fetch_content).await;

    Json(response).into_response()
}

pub async fn engines(State(state): State<AppState>) -> impl IntoResponse {
    let engines: Vec<&str> = state.search.providers().iter().map(ProviderKind::as_str).collect();
    let default_order: Vec<&str> = ProviderKind::default_order().iter().map(ProviderKind::as_str).collect();

    Json(json!({ "engines": engines, "default_order": default_order }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let engines: Vec<&str> = state.search.providers().iter().map(ProviderKind::as_str).collect();

    Json(json!({ "status": "ok", "engines": engines, "time": now() }))
}

pub async fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "未找到请求的资源")
}
