use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use claimdesk_core::{Article, ArticleUpdate, Claim};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("id is required")]
    MissingId,
    #[error("article {0} does not exist")]
    UnknownArticle(String),
}

/// Seed file layout: `{ "articles": [...], "claims": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

/// In-memory article and claim collections.
#[derive(Debug, Default)]
pub struct DocumentStore {
    articles: RwLock<Vec<Article>>,
    claims: RwLock<Vec<Claim>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl DocumentStore {
    pub fn new(seed: Seed) -> Self {
        Self {
            articles: RwLock::new(seed.articles),
            claims: RwLock::new(seed.claims),
        }
    }

    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let seed: Seed = serde_json::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            articles = seed.articles.len(),
            claims = seed.claims.len(),
            "loaded seed data"
        );
        Ok(Self::new(seed))
    }

    /// Every article with this id (normally zero or one).
    pub fn find_articles(&self, id: &str) -> Vec<Article> {
        read(&self.articles)
            .iter()
            .filter(|a| a.id == id)
            .cloned()
            .collect()
    }

    /// Claims whose id is in `ids`, in store order.
    pub fn list_claims(&self, ids: &[String]) -> Vec<Claim> {
        read(&self.claims)
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect()
    }

    pub fn search_claims(&self, text: &str) -> Vec<Claim> {
        read(&self.claims)
            .iter()
            .filter(|c| c.matches_query(text))
            .cloned()
            .collect()
    }

    pub fn apply_update(&self, update: &ArticleUpdate) -> Result<(), StoreError> {
        if update.id.trim().is_empty() {
            return Err(StoreError::MissingId);
        }
        let mut articles = write(&self.articles);
        let article = articles
            .iter_mut()
            .find(|a| a.id == update.id)
            .ok_or_else(|| StoreError::UnknownArticle(update.id.clone()))?;
        article.apply(update);
        Ok(())
    }
}
