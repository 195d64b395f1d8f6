//! State of the article analysis screen.
//!
//! The view never edits its cached article or claim list in place. Every
//! mutation goes to the server and is followed by a full [`AnalysisView::load`],
//! so what is displayed is always the latest server copy.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::debounce::{SearchApplied, SearchDebouncer, SearchOutcome, TextChange};
use crate::gateway::{ArticleGateway, GatewayError};
use crate::model::{Article, ArticleUpdate, Claim};

/// How many notices are kept before the oldest is dropped.
pub const MAX_NOTICES: usize = 32;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("article id parameter is missing")]
    MissingArticleId,
    #[error("article is not loaded")]
    NotLoaded,
    #[error("article {0} does not contain a claims list")]
    MissingClaims(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ViewError {
    /// Precondition violations are programming errors rather than I/O trouble.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ViewError::MissingArticleId | ViewError::NotLoaded | ViewError::MissingClaims(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message about the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Article plus its attached claims, as returned by one load.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub article: Article,
    /// Claims in the article's attach order.
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready(Snapshot),
}

pub struct AnalysisView {
    gateway: Arc<dyn ArticleGateway>,
    article_id: Option<String>,
    state: ViewState,
    search: SearchDebouncer,
    notices: VecDeque<Notice>,
}

impl AnalysisView {
    /// Build a view for `article_id`. Search outcomes arrive on the returned
    /// receiver and must be handed back through
    /// [`apply_search_outcome`](Self::apply_search_outcome).
    pub fn new(
        gateway: Arc<dyn ArticleGateway>,
        article_id: Option<String>,
        search_window: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (search, outcomes) = SearchDebouncer::new(Arc::clone(&gateway), search_window);
        let view = Self {
            gateway,
            article_id,
            state: ViewState::Loading,
            search,
            notices: VecDeque::new(),
        };
        (view, outcomes)
    }

    /// Fetch the article and its claims and switch to `Ready`.
    ///
    /// On failure the previous state is kept and an error notice recorded.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                tracing::debug!(
                    id = %snapshot.article.id,
                    claims = snapshot.claims.len(),
                    "article loaded"
                );
                self.state = ViewState::Ready(snapshot);
                Ok(())
            }
            Err(e) => {
                self.report("Failed to load article", &e);
                Err(e)
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, ViewError> {
        let id = self
            .article_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ViewError::MissingArticleId)?;

        let article = self.gateway.fetch_article(id).await?;
        let fetched = self.gateway.fetch_claims(article.claim_ids()).await?;
        let claims = order_claims(article.claim_ids(), fetched);
        Ok(Snapshot { article, claims })
    }

    /// Append `claim_id` to the article's claims, then reload.
    ///
    /// Duplicates are not filtered: attaching an id twice lists it twice.
    pub async fn attach_claim(&mut self, claim_id: &str) -> Result<(), ViewError> {
        let already_attached = self
            .article()
            .is_some_and(|a| a.claim_ids().iter().any(|id| id == claim_id));
        if let Err(e) = self.send_attach(claim_id).await {
            self.report("Failed to attach claim", &e);
            return Err(e);
        }

        let label = self
            .search
            .results()
            .iter()
            .find(|c| c.id == claim_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| claim_id.to_string());
        self.search.clear();
        if already_attached {
            tracing::warn!(claim = claim_id, "claim attached more than once");
            self.push_notice(
                NoticeLevel::Warning,
                format!("Claim \"{label}\" was already attached and is now listed twice"),
            );
        } else {
            self.push_notice(NoticeLevel::Info, format!("Attached claim \"{label}\""));
        }
        self.load().await
    }

    async fn send_attach(&self, claim_id: &str) -> Result<(), ViewError> {
        let article = self.article().ok_or(ViewError::NotLoaded)?;
        let current = article
            .claims
            .as_ref()
            .ok_or_else(|| ViewError::MissingClaims(article.id.clone()))?;

        let mut claims = current.clone();
        claims.push(claim_id.to_string());
        let update = ArticleUpdate::set_claims(article.id.clone(), claims);
        self.gateway.update_article(&update).await?;
        Ok(())
    }

    /// Flag the article as analysed now, then reload.
    pub async fn mark_complete(&mut self) -> Result<(), ViewError> {
        self.mark_complete_at(Utc::now()).await
    }

    /// [`mark_complete`](Self::mark_complete) with an explicit timestamp.
    pub async fn mark_complete_at(&mut self, at: DateTime<Utc>) -> Result<(), ViewError> {
        if let Err(e) = self.send_mark_complete(at).await {
            self.report("Failed to mark analysis complete", &e);
            return Err(e);
        }
        self.push_notice(NoticeLevel::Info, "Analysis marked as completed".to_string());
        self.load().await
    }

    async fn send_mark_complete(&self, at: DateTime<Utc>) -> Result<(), ViewError> {
        let article = self.article().ok_or(ViewError::NotLoaded)?;
        let update = ArticleUpdate::mark_analysed(article.id.clone(), at);
        self.gateway.update_article(&update).await?;
        Ok(())
    }

    /// Forward an edit of the search box to the debouncer.
    pub fn on_search_text_changed(&mut self, text: impl Into<String>) -> TextChange {
        self.search.on_text_changed(text)
    }

    /// Fold a search outcome from the receiver returned by [`new`](Self::new).
    pub fn apply_search_outcome(&mut self, outcome: SearchOutcome) {
        let query = outcome.query.clone();
        match self.search.apply(outcome) {
            SearchApplied::Updated { count } => {
                tracing::debug!(query = %query, count, "search results updated");
            }
            SearchApplied::Stale => {}
            SearchApplied::Failed(e) => {
                self.report("Claim search failed", &ViewError::Gateway(e));
            }
        }
    }

    /// Clear the search box and results.
    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    fn report(&mut self, context: &str, err: &ViewError) {
        if err.is_precondition() {
            tracing::error!(error = %err, "{context}: precondition violated");
        } else {
            tracing::error!(error = %err, "{context}");
        }
        self.push_notice(NoticeLevel::Error, format!("{context}: {err}"));
    }

    fn push_notice(&mut self, level: NoticeLevel, message: String) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice { level, message });
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    pub fn article_id(&self) -> Option<&str> {
        self.article_id.as_deref()
    }

    pub fn article(&self) -> Option<&Article> {
        match &self.state {
            ViewState::Ready(snapshot) => Some(&snapshot.article),
            ViewState::Loading => None,
        }
    }

    /// Attached claims; empty while loading.
    pub fn claims(&self) -> &[Claim] {
        match &self.state {
            ViewState::Ready(snapshot) => &snapshot.claims,
            ViewState::Loading => &[],
        }
    }

    /// The completion action is offered only for loaded, unanalysed articles.
    pub fn can_mark_complete(&self) -> bool {
        self.article().is_some_and(|a| !a.is_analysis_complete())
    }

    pub fn search_text(&self) -> &str {
        self.search.text()
    }

    pub fn search_results(&self) -> &[Claim] {
        self.search.results()
    }

    pub fn search_pending(&self) -> bool {
        self.search.has_pending()
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.back()
    }
}

/// Arrange fetched claims in the article's id order. Repeated ids repeat;
/// ids the server did not return are skipped.
pub fn order_claims(ids: &[String], fetched: Vec<Claim>) -> Vec<Claim> {
    let by_id: HashMap<String, Claim> = fetched.into_iter().map(|c| (c.id.clone(), c)).collect();
    ids.iter()
        .filter_map(|id| {
            let claim = by_id.get(id).cloned();
            if claim.is_none() {
                tracing::debug!(id = %id, "attached claim missing from claim list");
            }
            claim
        })
        .collect()
}
