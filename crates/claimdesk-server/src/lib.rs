//! REST backend for claimdesk: the article and claim endpoints consumed by
//! `claimdesk_core::HttpGateway`, served from an in-memory [`DocumentStore`].

pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

pub use store::{DocumentStore, Seed, StoreError};

pub fn router(store: Arc<DocumentStore>) -> Router {
    Router::new()
        .route("/api/article/", post(handlers::fetch_article))
        .route("/api/article/update", post(handlers::update_article))
        .route("/api/claim/list", post(handlers::list_claims))
        .route("/api/claim/search/{text}", get(handlers::search_claims))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use claimdesk_core::{Article, Claim};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(DocumentStore::new(Seed {
            articles: vec![Article {
                id: "a1".into(),
                title: "Boiling points".into(),
                claims: Some(vec!["c1".into()]),
                ..Default::default()
            }],
            claims: vec![
                Claim::new("c1", "Smoking causes cancer"),
                Claim::new("c2", "Water boils at 100C"),
            ],
        })))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn article_lookup_returns_array() {
        let resp = app()
            .oneshot(post_json("/api/article/", r#"{"_id":"a1"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["_id"], "a1");
    }

    #[tokio::test]
    async fn unknown_article_is_empty_array() {
        let resp = app()
            .oneshot(post_json("/api/article/", r#"{"_id":"zz"}"#))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn search_decodes_path_segment() {
        let req = Request::builder()
            .uri("/api/claim/search/water%20boils")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json[0]["_id"], "c2");
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_article_reports_error() {
        let resp = app()
            .oneshot(post_json(
                "/api/article/update",
                r#"{"id":"zz","claims":["c1"]}"#,
            ))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("zz"));
    }

    #[tokio::test]
    async fn successful_update_returns_null_error() {
        let resp = app()
            .oneshot(post_json(
                "/api/article/update",
                r#"{"id":"a1","is_analysed":true,"analysed_at":1700000000000}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({ "error": null }));
    }
}
