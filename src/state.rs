//! Load state exposed to whatever displays the feed.
//!
//! The state is a single value held in a `watch` channel: every transition
//! replaces it wholesale and wakes subscribers, who only ever see the latest
//! snapshot. Overlapping loads are not serialized; whichever finishes last
//! writes the final state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::article::Article;
use crate::error::LoadError;
use crate::repository::FeedRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    /// No load has been attempted yet.
    Initial,
    Loading,
    Success(Arc<[Article]>),
    Error(String),
}

impl FeedState {
    /// Whether a load has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self, FeedState::Success(_) | FeedState::Error(_))
    }

    pub fn articles(&self) -> Option<&[Article]> {
        match self {
            FeedState::Success(articles) => Some(articles.as_ref()),
            _ => None,
        }
    }
}

pub struct FeedController {
    repository: FeedRepository,
    state: watch::Sender<FeedState>,
}

impl FeedController {
    pub fn new(repository: FeedRepository) -> Self {
        let (state, _) = watch::channel(FeedState::Initial);
        Self { repository, state }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Starts a (re)load.
    ///
    /// The state is `Loading` by the time this returns. The fetch runs on a
    /// spawned task, which must be inside a Tokio runtime; the returned handle
    /// may be awaited or dropped without affecting the load.
    pub fn load_feed(&self) -> JoinHandle<()> {
        self.state.send_replace(FeedState::Loading);
        debug!("Feed state -> Loading");

        let repository = self.repository.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            // The load runs on its own task so a panic in the source still
            // settles the state.
            let load = tokio::spawn(async move { repository.load_articles().await });
            let next = match load.await {
                Ok(Ok(articles)) => {
                    info!(count = articles.len(), "Feed state -> Success");
                    FeedState::Success(articles.into())
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Feed state -> Error");
                    FeedState::Error(e.into_message())
                }
                Err(e) => {
                    error!(error = %e, "Feed load task failed");
                    FeedState::Error(LoadError::unknown().into_message())
                }
            };
            state.send_replace(next);
        })
    }
}

/// Waits until `receiver` observes a settled state and returns it.
///
/// Returns the last seen state if the controller is dropped first.
pub async fn wait_settled(receiver: &mut watch::Receiver<FeedState>) -> FeedState {
    loop {
        {
            let current = receiver.borrow_and_update();
            if current.is_settled() {
                return current.clone();
            }
        }
        if receiver.changed().await.is_err() {
            return receiver.borrow().clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FeedSource, FetchError};
    use crate::schema::{RawChannel, RawFeed, RawItem};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn feed_with_titles(titles: &[&str]) -> RawFeed {
        RawFeed {
            channel: Some(RawChannel {
                items: titles
                    .iter()
                    .map(|t| RawItem {
                        title: Some(t.to_string()),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }),
        }
    }

    /// Returns queued results in order, one per call.
    struct ScriptedSource {
        results: Mutex<Vec<Result<RawFeed, FetchError>>>,
    }

    impl ScriptedSource {
        fn new(mut results: Vec<Result<RawFeed, FetchError>>) -> Self {
            results.reverse();
            Self {
                results: Mutex::new(results),
            }
        }
    }

    #[async_trait]
    impl FeedSource for ScriptedSource {
        async fn fetch_feed(&self) -> Result<RawFeed, FetchError> {
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(FetchError::Other("no more results".to_string())))
        }
    }

    /// Each call waits for its own gate to be released.
    struct GatedSource {
        gates: Mutex<Vec<oneshot::Receiver<RawFeed>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedSource for GatedSource {
        async fn fetch_feed(&self) -> Result<RawFeed, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(0);
            gate.await
                .map_err(|_| FetchError::Other(format!("gate {} dropped", call)))
        }
    }

    impl GatedSource {
        fn new(gates: Vec<oneshot::Receiver<RawFeed>>) -> Self {
            Self {
                gates: Mutex::new(gates),
                calls: AtomicUsize::new(0),
            }
        }

        async fn wait_for_calls(&self, n: usize) {
            while self.calls.load(Ordering::SeqCst) < n {
                tokio::task::yield_now().await;
            }
        }
    }

    fn controller(source: impl FeedSource + 'static) -> FeedController {
        FeedController::new(FeedRepository::new(Arc::new(source)))
    }

    #[tokio::test]
    async fn test_starts_initial() {
        let controller = controller(ScriptedSource::new(vec![]));
        assert_eq!(controller.state(), FeedState::Initial);
    }

    #[tokio::test]
    async fn test_load_is_loading_synchronously() {
        let (tx, rx) = oneshot::channel();
        let controller = controller(GatedSource::new(vec![rx]));

        let handle = controller.load_feed();
        assert_eq!(controller.state(), FeedState::Loading);

        tx.send(feed_with_titles(&["A"])).unwrap();
        handle.await.unwrap();

        let articles = controller.state().articles().map(|a| a.len());
        assert_eq!(articles, Some(1));
    }

    #[tokio::test]
    async fn test_failure_then_retry_succeeds() {
        let controller = controller(ScriptedSource::new(vec![
            Err(FetchError::Other("timeout".to_string())),
            Ok(feed_with_titles(&["A", "B"])),
        ]));

        controller.load_feed().await.unwrap();
        assert_eq!(controller.state(), FeedState::Error("timeout".to_string()));

        controller.load_feed().await.unwrap();
        let state = controller.state();
        let titles: Vec<&str> = state
            .articles()
            .unwrap()
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_empty_feed_is_success() {
        let controller = controller(ScriptedSource::new(vec![Ok(feed_with_titles(&[]))]));

        controller.load_feed().await.unwrap();

        assert_eq!(controller.state(), FeedState::Success(Arc::from(Vec::<Article>::new())));
    }

    #[tokio::test]
    async fn test_reload_from_success_passes_through_loading() {
        let controller = controller(ScriptedSource::new(vec![
            Ok(feed_with_titles(&["old"])),
            Ok(feed_with_titles(&["new"])),
        ]));
        controller.load_feed().await.unwrap();
        assert!(controller.state().is_settled());

        let mut receiver = controller.subscribe();
        let handle = controller.load_feed();
        assert_eq!(controller.state(), FeedState::Loading);

        handle.await.unwrap();
        let state = wait_settled(&mut receiver).await;
        assert_eq!(state.articles().unwrap()[0].title, "new");
    }

    #[tokio::test]
    async fn test_last_completion_wins() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let source = Arc::new(GatedSource::new(vec![first_rx, second_rx]));
        let controller = FeedController::new(FeedRepository::new(source.clone()));

        let first = controller.load_feed();
        source.wait_for_calls(1).await;
        let second = controller.load_feed();
        source.wait_for_calls(2).await;

        // The second request finishes first; the stale first response
        // then overwrites it.
        second_tx.send(feed_with_titles(&["second"])).unwrap();
        second.await.unwrap();
        first_tx.send(feed_with_titles(&["first"])).unwrap();
        first.await.unwrap();

        assert_eq!(controller.state().articles().unwrap()[0].title, "first");
    }

    struct PanickingSource;

    #[async_trait]
    impl FeedSource for PanickingSource {
        async fn fetch_feed(&self) -> Result<RawFeed, FetchError> {
            panic!("source blew up")
        }
    }

    #[tokio::test]
    async fn test_panicking_source_settles_as_error() {
        let controller = controller(PanickingSource);
        let mut receiver = controller.subscribe();

        controller.load_feed().await.unwrap();

        let expected = FeedState::Error(crate::error::UNKNOWN_ERROR.to_string());
        assert_eq!(controller.state(), expected);
        assert_eq!(wait_settled(&mut receiver).await, expected);
    }

    #[tokio::test]
    async fn test_subscriber_sees_settled_state() {
        let controller = controller(ScriptedSource::new(vec![Err(FetchError::Other(
            "boom".to_string(),
        ))]));
        let mut receiver = controller.subscribe();

        controller.load_feed();
        let state = wait_settled(&mut receiver).await;

        assert_eq!(state, FeedState::Error("boom".to_string()));
    }
}
