//! Route definitions for the web server.

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(handlers::search))
        .route("/api/engines", get(handlers::engines))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use gleaner_core::{
        Enricher, FetchOutcome, GleanerConfig, GleanerError, ProviderKind, Result, SearchOrchestrator,
        SearchProvider, SearchResult, SearchService,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    struct CannedProvider {
        kind: ProviderKind,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchProvider for CannedProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn search(&self, query: &str, _num_results: usize) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SearchResult::new(
                format!("{} result", self.kind),
                format!("https://{}.example.com/?q={}", self.kind, query.len()),
                "snippet",
            )])
        }
    }

    struct ArticleEnricher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Enricher for ArticleEnricher {
        async fn enrich(&self, url: &str) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcome = FetchOutcome::failure(url, &GleanerError::NoContent);
            outcome.success = true;
            outcome.content = "full article text that is far longer than the snippet".to_string();
            outcome
        }
    }

    struct Counters {
        serper: Arc<AtomicUsize>,
        serpapi: Arc<AtomicUsize>,
        enrich: Arc<AtomicUsize>,
    }

    fn canned_app() -> (Router, Counters) {
        let counters = Counters {
            serper: Arc::new(AtomicUsize::new(0)),
            serpapi: Arc::new(AtomicUsize::new(0)),
            enrich: Arc::new(AtomicUsize::new(0)),
        };
        let providers: Vec<Arc<dyn SearchProvider>> = vec![
            Arc::new(CannedProvider { kind: ProviderKind::Serper, calls: counters.serper.clone() }),
            Arc::new(CannedProvider { kind: ProviderKind::SerpApi, calls: counters.serpapi.clone() }),
        ];
        let enricher = Arc::new(ArticleEnricher { calls: counters.enrich.clone() });
        let service = SearchService::new(SearchOrchestrator::new(providers, enricher), 10);

        (create_router(AppState::new(service)), counters)
    }

    fn keyless_app() -> Router {
        let state = AppState::from_config(&GleanerConfig::default()).unwrap();
        create_router(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = get_json(keyless_app(), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["engines"], serde_json::json!(["serper", "serpapi"]));
        assert!(json["time"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_engines() {
        let (status, json) = get_json(keyless_app(), "/api/engines").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["engines"], serde_json::json!(["serper", "serpapi"]));
        assert_eq!(json["default_order"], serde_json::json!(["serper", "serpapi"]));
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
            let (status, json) = get_json(keyless_app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json["error"], "缺少查询参数");
        }
    }

    #[tokio::test]
    async fn test_search_without_keys_returns_placeholder() {
        let (status, json) = get_json(keyless_app(), "/api/search?q=%E5%A4%A9%E6%B0%94").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["query"], "天气");
        assert_eq!(json["meta"]["engine"], "gleaner");
        assert_eq!(json["meta"]["totalResults"], 1);
        assert_eq!(json["meta"]["isNewsSearch"], false);
        assert_eq!(json["results"][0]["title"], "关于\"天气\"的搜索");
    }

    #[tokio::test]
    async fn test_search_uses_first_provider() {
        let (app, counters) = canned_app();
        let (status, json) = get_json(app, "/api/search?q=rust").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"][0]["title"], "serper result");
        assert_eq!(json["results"][0]["fullContent"], false);
        assert_eq!(counters.serper.load(Ordering::SeqCst), 1);
        assert_eq!(counters.serpapi.load(Ordering::SeqCst), 0);
        assert_eq!(counters.enrich.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_explicit_engine_any_case() {
        let (app, counters) = canned_app();
        let (_, json) = get_json(app, "/api/search?q=rust&engine=SerpApi").await;

        assert_eq!(json["results"][0]["title"], "serpapi result");
        assert_eq!(counters.serper.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_unknown_engine_falls_back_to_order() {
        let (app, counters) = canned_app();
        let (status, json) = get_json(app, "/api/search?q=rust&engine=bing").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"][0]["title"], "serper result");
        assert_eq!(counters.serper.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_fetch_content_only_when_true() {
        let (app, counters) = canned_app();
        let (_, json) = get_json(app, "/api/search?q=rust&fetch_content=1").await;
        assert_eq!(json["results"][0]["fullContent"], false);
        assert_eq!(counters.enrich.load(Ordering::SeqCst), 0);

        let (app, counters) = canned_app();
        let (_, json) = get_json(app, "/api/search?q=rust&fetch_content=true").await;
        assert_eq!(json["results"][0]["fullContent"], true);
        assert_eq!(
            json["results"][0]["content"],
            "full article text that is far longer than the snippet"
        );
        assert_eq!(counters.enrich.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, json) = get_json(keyless_app(), "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "未找到请求的资源");
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let resp = keyless_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://app.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }
}
