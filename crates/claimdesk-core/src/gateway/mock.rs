//! In-memory gateway for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{ArticleGateway, GatewayError, GatewayFuture, select_single};
use crate::model::{Article, ArticleUpdate, Claim};

/// Which gateway operation a failure or counter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    FetchArticle,
    FetchClaims,
    SearchClaims,
    UpdateArticle,
}

/// A scripted failure for [`MockGateway::fail_next`].
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Simulate a dropped connection.
    Transport(String),
    /// Simulate a non-2xx response.
    Status(u16),
    /// Simulate `{"error": "..."}` from the update endpoint.
    Rejected(String),
    /// Simulate a `null` body.
    Empty,
}

impl MockFailure {
    fn into_error(self, op: MockOp) -> GatewayError {
        match self {
            MockFailure::Transport(msg) => GatewayError::Transport(msg),
            MockFailure::Status(status) => GatewayError::Status {
                status,
                endpoint: format!("{:?}", op),
            },
            MockFailure::Rejected(msg) => GatewayError::Rejected(msg),
            MockFailure::Empty => GatewayError::EmptyResponse {
                endpoint: format!("{:?}", op),
            },
        }
    }
}

#[derive(Default)]
struct Store {
    articles: Vec<Article>,
    claims: Vec<Claim>,
}

/// A hand-rolled [`ArticleGateway`] backed by vectors.
///
/// Supports:
/// - Updates that mutate the stored article, so refetches observe them.
/// - Scripted failures per operation (consumed in order).
/// - Optional latency, globally or per search query.
/// - Call counting and a log of search queries and update payloads.
pub struct MockGateway {
    store: Mutex<Store>,
    failures: Mutex<HashMap<MockOp, VecDeque<MockFailure>>>,
    delay: Option<Duration>,
    search_delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<MockOp, usize>>,
    search_log: Mutex<Vec<String>>,
    update_log: Mutex<Vec<ArticleUpdate>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockGateway {
    pub fn new(articles: Vec<Article>, claims: Vec<Claim>) -> Self {
        Self {
            store: Mutex::new(Store { articles, claims }),
            failures: Mutex::new(HashMap::new()),
            delay: None,
            search_delays: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
            search_log: Mutex::new(Vec::new()),
            update_log: Mutex::new(Vec::new()),
        }
    }

    /// Set simulated network latency for every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set latency for searches of exactly `query`, overriding the global delay.
    pub fn with_search_delay(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.search_delays.insert(query.into(), delay);
        self
    }

    /// Make the next call of `op` fail. Multiple failures queue up.
    pub fn fail_next(&self, op: MockOp, failure: MockFailure) {
        lock(&self.failures).entry(op).or_default().push_back(failure);
    }

    /// How many times `op` has been invoked.
    pub fn call_count(&self, op: MockOp) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    /// Every search query received, in call order.
    pub fn search_queries(&self) -> Vec<String> {
        lock(&self.search_log).clone()
    }

    /// Every update payload received, in call order.
    pub fn updates(&self) -> Vec<ArticleUpdate> {
        lock(&self.update_log).clone()
    }

    /// Current stored copy of an article.
    pub fn article(&self, id: &str) -> Option<Article> {
        lock(&self.store).articles.iter().find(|a| a.id == id).cloned()
    }

    fn begin(&self, op: MockOp) -> Result<(), GatewayError> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;
        match lock(&self.failures).get_mut(&op).and_then(|q| q.pop_front()) {
            Some(failure) => Err(failure.into_error(op)),
            None => Ok(()),
        }
    }

    async fn finish<T>(&self, delay: Option<Duration>, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        result
    }
}

impl ArticleGateway for MockGateway {
    fn fetch_article<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Article> {
        let result = if id.trim().is_empty() {
            Err(GatewayError::MissingId)
        } else {
            self.begin(MockOp::FetchArticle).and_then(|()| {
                let matching: Vec<Article> = lock(&self.store)
                    .articles
                    .iter()
                    .filter(|a| a.id == id)
                    .cloned()
                    .collect();
                select_single(id, matching)
            })
        };
        Box::pin(self.finish(self.delay, result))
    }

    fn fetch_claims<'a>(&'a self, ids: &'a [String]) -> GatewayFuture<'a, Vec<Claim>> {
        let result = if ids.is_empty() {
            Ok(Vec::new())
        } else {
            self.begin(MockOp::FetchClaims).map(|()| {
                lock(&self.store)
                    .claims
                    .iter()
                    .filter(|c| ids.contains(&c.id))
                    .cloned()
                    .collect()
            })
        };
        Box::pin(self.finish(self.delay, result))
    }

    fn search_claims<'a>(&'a self, text: &'a str) -> GatewayFuture<'a, Vec<Claim>> {
        lock(&self.search_log).push(text.to_string());
        let result = self.begin(MockOp::SearchClaims).map(|()| {
            lock(&self.store)
                .claims
                .iter()
                .filter(|c| c.matches_query(text))
                .cloned()
                .collect()
        });
        let delay = self.search_delays.get(text).copied().or(self.delay);
        Box::pin(self.finish(delay, result))
    }

    fn update_article<'a>(&'a self, update: &'a ArticleUpdate) -> GatewayFuture<'a, ()> {
        lock(&self.update_log).push(update.clone());
        let result = self.begin(MockOp::UpdateArticle).and_then(|()| {
            let mut store = lock(&self.store);
            match store.articles.iter_mut().find(|a| a.id == update.id) {
                Some(article) => {
                    article.apply(update);
                    Ok(())
                }
                None => Err(GatewayError::Rejected(format!(
                    "article {} does not exist",
                    update.id
                ))),
            }
        });
        Box::pin(self.finish(self.delay, result))
    }
}
