//! Remote data gateway: the trait the analysis view talks to, plus the HTTP
//! and in-memory implementations.

pub mod http;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::model::{Article, ArticleUpdate, Claim};

pub use http::HttpGateway;
pub use mock::MockGateway;

/// Boxed future returned by every gateway operation.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("article id is missing")]
    MissingId,
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error("no data returned from {endpoint}")]
    EmptyResponse { endpoint: String },
    #[error("article {id} not found")]
    NotFound { id: String },
    #[error("server rejected update: {0}")]
    Rejected(String),
}

/// The four REST operations the analysis screen needs.
pub trait ArticleGateway: Send + Sync {
    /// Fetch one article by id. Blank ids fail with [`GatewayError::MissingId`]
    /// before any I/O happens.
    fn fetch_article<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Article>;

    /// Fetch the claims with the given ids in a single request.
    fn fetch_claims<'a>(&'a self, ids: &'a [String]) -> GatewayFuture<'a, Vec<Claim>>;

    /// Keyword search over claim names.
    fn search_claims<'a>(&'a self, text: &'a str) -> GatewayFuture<'a, Vec<Claim>>;

    /// Apply a partial update. The updated article is not returned; callers
    /// refetch.
    fn update_article<'a>(&'a self, update: &'a ArticleUpdate) -> GatewayFuture<'a, ()>;
}

/// Reduce an id lookup to one article. Extra records are logged and the first
/// one wins.
pub(crate) fn select_single(id: &str, articles: Vec<Article>) -> Result<Article, GatewayError> {
    let count = articles.len();
    let mut iter = articles.into_iter();
    let first = iter.next().ok_or_else(|| GatewayError::NotFound { id: id.to_string() })?;
    if count > 1 {
        tracing::warn!(id, count, "more than one article returned, using the first");
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn select_single_empty_is_not_found() {
        let err = select_single("a1", vec![]).unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { ref id } if id == "a1"));
    }

    #[test]
    fn select_single_prefers_first_record() {
        let picked = select_single("a1", vec![article("a1", "first"), article("a1", "second")])
            .unwrap();
        assert_eq!(picked.title, "first");
    }
}
