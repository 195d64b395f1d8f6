//! Debounced claim search.
//!
//! Keystrokes go through [`SearchDebouncer::on_text_changed`]. Each change
//! replaces the single pending search; the search only fires once the input
//! has been quiet for the configured window. Completed searches come back
//! over a channel tagged with a sequence number, and [`SearchDebouncer::apply`]
//! drops any outcome that is not the latest one issued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::gateway::{ArticleGateway, GatewayError};
use crate::model::Claim;

/// A finished search, delivered over the outcome channel.
#[derive(Debug)]
pub struct SearchOutcome {
    pub seq: u64,
    pub query: String,
    pub result: Result<Vec<Claim>, GatewayError>,
}

/// What [`SearchDebouncer::on_text_changed`] did with the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChange {
    /// Text became empty: results were cleared and nothing was scheduled.
    Cleared,
    /// A search was scheduled under this sequence number.
    Scheduled { seq: u64 },
}

/// What [`SearchDebouncer::apply`] did with an outcome.
#[derive(Debug)]
pub enum SearchApplied {
    Updated { count: usize },
    /// A newer search was issued after this one; the outcome was dropped.
    Stale,
    Failed(GatewayError),
}

/// The one scheduled search. Dropping it cancels the timer and, if the
/// request was already sent, the request too.
struct PendingSearch {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Drop for PendingSearch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub struct SearchDebouncer {
    gateway: Arc<dyn ArticleGateway>,
    window: Duration,
    text: String,
    results: Vec<Claim>,
    pending: Option<PendingSearch>,
    latest_seq: u64,
    outcome_tx: mpsc::UnboundedSender<SearchOutcome>,
}

impl SearchDebouncer {
    /// Create a debouncer and the receiver its outcomes arrive on.
    pub fn new(
        gateway: Arc<dyn ArticleGateway>,
        window: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            gateway,
            window,
            text: String::new(),
            results: Vec::new(),
            pending: None,
            latest_seq: 0,
            outcome_tx,
        };
        (debouncer, outcome_rx)
    }

    /// Record new input text and (re)schedule the search.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_text_changed(&mut self, text: impl Into<String>) -> TextChange {
        self.text = text.into();
        self.pending = None;
        self.latest_seq += 1;

        if self.text.is_empty() {
            self.results.clear();
            return TextChange::Cleared;
        }

        let seq = self.latest_seq;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let gateway = Arc::clone(&self.gateway);
        let tx = self.outcome_tx.clone();
        let window = self.window;
        let query = self.text.clone();

        let handle = tokio::spawn(async move {
            let search = async move {
                tokio::time::sleep(window).await;
                tracing::debug!(seq, query = %query, "dispatching claim search");
                let result = gateway.search_claims(&query).await;
                SearchOutcome { seq, query, result }
            };

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::trace!(seq, "claim search superseded");
                }
                outcome = search => {
                    // Receiver gone means the view was torn down.
                    let _ = tx.send(outcome);
                }
            }
        });

        self.pending = Some(PendingSearch { cancel, handle });
        TextChange::Scheduled { seq }
    }

    /// Fold a finished search into the result set unless it is stale.
    pub fn apply(&mut self, outcome: SearchOutcome) -> SearchApplied {
        if !self.is_current(outcome.seq) {
            tracing::debug!(
                seq = outcome.seq,
                latest = self.latest_seq,
                query = %outcome.query,
                "dropping stale search result"
            );
            return SearchApplied::Stale;
        }

        self.pending = None;
        match outcome.result {
            Ok(claims) => {
                let count = claims.len();
                self.results = claims;
                SearchApplied::Updated { count }
            }
            Err(e) => SearchApplied::Failed(e),
        }
    }

    /// Reset text and results and cancel anything scheduled or in flight.
    pub fn clear(&mut self) {
        self.pending = None;
        self.latest_seq += 1;
        self.text.clear();
        self.results.clear();
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    /// Whether a search is scheduled or in flight.
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn results(&self) -> &[Claim] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::gateway::mock::{MockFailure, MockOp};
    use tokio::time::{Instant, sleep};

    const WINDOW: Duration = Duration::from_millis(1000);

    fn claims() -> Vec<Claim> {
        vec![
            Claim::new("c1", "Smoking causes cancer"),
            Claim::new("c2", "Water boils at 100C"),
        ]
    }

    fn setup(
        gateway: MockGateway,
    ) -> (
        Arc<MockGateway>,
        SearchDebouncer,
        mpsc::UnboundedReceiver<SearchOutcome>,
    ) {
        let gateway = Arc::new(gateway);
        let (debouncer, rx) = SearchDebouncer::new(gateway.clone(), WINDOW);
        (gateway, debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_dispatches_one_search() {
        let (gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));

        for text in ["b", "bo", "boi", "boil"] {
            debouncer.on_text_changed(text);
            sleep(Duration::from_millis(200)).await;
        }

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.query, "boil");
        assert_eq!(gateway.search_queries(), vec!["boil".to_string()]);

        let applied = debouncer.apply(outcome);
        assert!(matches!(applied, SearchApplied::Updated { count: 1 }));
        assert_eq!(debouncer.results(), &[Claim::new("c2", "Water boils at 100C")]);
    }

    #[tokio::test(start_paused = true)]
    async fn search_waits_for_full_window() {
        let (gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));
        let start = Instant::now();

        debouncer.on_text_changed("water");
        assert_eq!(debouncer.text(), "water");
        assert!(debouncer.has_pending());

        sleep(Duration::from_millis(999)).await;
        assert!(gateway.search_queries().is_empty());

        let outcome = rx.recv().await.unwrap();
        assert!(start.elapsed() >= WINDOW);
        assert_eq!(outcome.query, "water");
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_text_empties_results_immediately() {
        let (gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));

        debouncer.on_text_changed("water");
        let outcome = rx.recv().await.unwrap();
        debouncer.apply(outcome);
        assert_eq!(debouncer.results().len(), 1);

        assert_eq!(debouncer.on_text_changed(""), TextChange::Cleared);
        assert!(debouncer.results().is_empty());
        assert!(!debouncer.has_pending());

        sleep(WINDOW * 3).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(gateway.search_queries(), vec!["water".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_during_window_cancels_search() {
        let (gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));

        debouncer.on_text_changed("water");
        sleep(Duration::from_millis(500)).await;
        debouncer.on_text_changed("");

        sleep(WINDOW * 2).await;
        assert!(gateway.search_queries().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_outcome_is_discarded() {
        let (_gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));

        debouncer.on_text_changed("smoking");
        let old = rx.recv().await.unwrap();

        debouncer.on_text_changed("boil");
        assert!(matches!(debouncer.apply(old), SearchApplied::Stale));
        assert!(debouncer.results().is_empty());

        let fresh = rx.recv().await.unwrap();
        assert!(matches!(debouncer.apply(fresh), SearchApplied::Updated { count: 1 }));
        assert_eq!(debouncer.results()[0].id, "c2");
    }

    #[tokio::test(start_paused = true)]
    async fn superseding_aborts_in_flight_request() {
        let gateway =
            MockGateway::new(vec![], claims()).with_search_delay("smoking", Duration::from_secs(5));
        let (gateway, mut debouncer, mut rx) = setup(gateway);

        debouncer.on_text_changed("smoking");
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(gateway.search_queries(), vec!["smoking".to_string()]);

        debouncer.on_text_changed("boil");
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.query, "boil");

        sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_search_keeps_previous_results() {
        let (gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));

        debouncer.on_text_changed("water");
        let ok = rx.recv().await.unwrap();
        debouncer.apply(ok);

        gateway.fail_next(MockOp::SearchClaims, MockFailure::Transport("reset".into()));
        debouncer.on_text_changed("smoking");
        let failed = rx.recv().await.unwrap();
        assert!(matches!(debouncer.apply(failed), SearchApplied::Failed(_)));
        assert_eq!(debouncer.results()[0].id, "c2");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_debouncer_cancels_pending_search() {
        let (gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));

        debouncer.on_text_changed("water");
        drop(debouncer);

        assert!(rx.recv().await.is_none());
        assert!(gateway.search_queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_resets_text_and_invalidates_outcomes() {
        let (_gateway, mut debouncer, mut rx) = setup(MockGateway::new(vec![], claims()));

        debouncer.on_text_changed("water");
        let outcome = rx.recv().await.unwrap();
        debouncer.clear();

        assert_eq!(debouncer.text(), "");
        assert!(matches!(debouncer.apply(outcome), SearchApplied::Stale));
        assert!(debouncer.results().is_empty());
    }
}
