use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use claimdesk_core::model::ArticleLookup;
use claimdesk_core::{Article, ArticleUpdate, Claim, UpdateResponse};

use crate::store::DocumentStore;

pub async fn fetch_article(
    State(store): State<Arc<DocumentStore>>,
    Json(req): Json<ArticleLookup>,
) -> Json<Vec<Article>> {
    let articles = store.find_articles(&req.id);
    tracing::debug!(id = %req.id, matches = articles.len(), "article lookup");
    Json(articles)
}

pub async fn list_claims(
    State(store): State<Arc<DocumentStore>>,
    Json(ids): Json<Vec<String>>,
) -> Json<Vec<Claim>> {
    Json(store.list_claims(&ids))
}

pub async fn search_claims(
    State(store): State<Arc<DocumentStore>>,
    Path(text): Path<String>,
) -> Json<Vec<Claim>> {
    let claims = store.search_claims(&text);
    tracing::debug!(query = %text, matches = claims.len(), "claim search");
    Json(claims)
}

/// Application-level failures still answer 200 with `{"error": "..."}`.
pub async fn update_article(
    State(store): State<Arc<DocumentStore>>,
    Json(update): Json<ArticleUpdate>,
) -> Json<UpdateResponse> {
    match store.apply_update(&update) {
        Ok(()) => {
            tracing::info!(
                id = %update.id,
                claims = ?update.claims,
                analysed = ?update.is_analysed,
                "article updated"
            );
            Json(UpdateResponse { error: None })
        }
        Err(e) => {
            tracing::warn!(id = %update.id, error = %e, "article update refused");
            Json(UpdateResponse {
                error: Some(e.to_string()),
            })
        }
    }
}
