//! Drives the real `HttpGateway` and `AnalysisView` against a live server.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use claimdesk_core::{
    AnalysisView, ApiConfig, ArticleGateway, ArticleUpdate, GatewayError, HttpGateway,
};
use claimdesk_server::{DocumentStore, router};

async fn spawn_server() -> String {
    let seed = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/seed.json");
    let store = DocumentStore::from_seed_file(&seed).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(Arc::new(store))).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(ApiConfig::new(base_url)).unwrap()
}

#[tokio::test]
async fn fetch_article_decodes_mixed_timestamps() {
    let url = spawn_server().await;
    let article = gateway(&url).fetch_article("a1").await.unwrap();

    assert_eq!(article.title, "On the Boiling of Water at Altitude");
    assert!(article.approved_at.is_some());
    assert!(article.quality_checked_at.is_some());
    assert!(!article.is_analysis_complete());
}

#[tokio::test]
async fn unknown_article_is_not_found() {
    let url = spawn_server().await;
    let err = gateway(&url).fetch_article("nope").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { ref id } if id == "nope"));
}

#[tokio::test]
async fn search_text_is_url_encoded() {
    let url = spawn_server().await;
    let claims = gateway(&url).search_claims("water boils").await.unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].id, "c2");
}

#[tokio::test]
async fn legacy_article_with_both_analysed_keys_loads() {
    let url = spawn_server().await;
    let gw: Arc<dyn ArticleGateway> = Arc::new(gateway(&url));
    let (mut view, _rx) = AnalysisView::new(gw, Some("a3".into()), Duration::from_millis(20));

    view.load().await.unwrap();

    assert!(!view.is_loading());
    assert!(!view.can_mark_complete());
    assert_eq!(view.claims().len(), 1);
}

#[tokio::test]
async fn dot_only_search_is_empty_not_an_error() {
    let url = spawn_server().await;
    let gw = gateway(&url);
    for text in [".", ".."] {
        assert!(gw.search_claims(text).await.unwrap().is_empty());
    }
    assert!(gw.search_claims("100C.").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_of_unknown_article_is_rejected() {
    let url = spawn_server().await;
    let err = gateway(&url)
        .update_article(&ArticleUpdate::set_claims("ghost", vec!["c1".into()]))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Rejected(ref msg) if msg.contains("ghost")));
}

#[tokio::test]
async fn wrong_path_maps_to_status_error() {
    let url = spawn_server().await;
    let err = gateway(&format!("{url}/missing-prefix"))
        .fetch_article("a1")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 404, .. }));
}

#[tokio::test]
async fn view_attach_and_complete_round_trip() {
    let url = spawn_server().await;
    let gw: Arc<dyn ArticleGateway> = Arc::new(gateway(&url));
    let (mut view, mut rx) =
        AnalysisView::new(gw.clone(), Some("a1".into()), Duration::from_millis(20));

    view.load().await.unwrap();
    assert_eq!(view.claims().len(), 1);

    view.on_search_text_changed("boil");
    let outcome = rx.recv().await.unwrap();
    view.apply_search_outcome(outcome);
    let hit = view.search_results()[0].id.clone();

    view.attach_claim(&hit).await.unwrap();
    let ids: Vec<&str> = view.claims().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c1", "c2"]);

    view.mark_complete().await.unwrap();
    assert!(!view.can_mark_complete());

    // A second client sees the same persisted document.
    let stored = gw.fetch_article("a1").await.unwrap();
    assert_eq!(stored.claim_ids(), ["c1", "c2"]);
    assert!(stored.is_analysis_complete());
}
