use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::db::SearchCounter;
use crate::search::{load_trending, Debouncer, FetchOutcome, MovieFetchController};
use crate::view::{reduce, Action, ViewState};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub debounce: Duration,
    pub trending_limit: i64,
}

enum SessionEvent {
    Trending(Vec<SearchCounter>),
    Fetched { seq: u64, outcome: FetchOutcome },
}

/// Handle to a running page session. Dropping it ends the session.
pub struct SessionHandle {
    keystrokes: mpsc::UnboundedSender<String>,
    state: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Report the current contents of the search box.
    pub fn input(&self, raw: impl Into<String>) -> Result<(), SessionError> {
        self.keystrokes
            .send(raw.into())
            .map_err(|_| SessionError::Closed)
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Wait until `done` holds for the published state.
    pub async fn wait_until<F>(&self, done: F) -> Result<ViewState, SessionError>
    where
        F: FnMut(&ViewState) -> bool,
    {
        let mut rx = self.state.clone();
        let state = rx.wait_for(done).await.map_err(|_| SessionError::Closed)?;
        Ok(state.clone())
    }

    /// Wait until `last_input` has gone through the debouncer and its fetch
    /// has finished.
    pub async fn settle(&self, last_input: &str) -> Result<ViewState, SessionError> {
        self.wait_until(|s| s.debounced_query == last_input && !s.is_loading)
            .await
    }

    pub async fn close(self) {
        drop(self.keystrokes);
        let _ = self.task.await;
    }
}

/// Mount a page: load trending, fetch the unfiltered list, then follow
/// debounced input until the handle goes away.
pub fn start(controller: Arc<MovieFetchController>, options: SessionOptions) -> SessionHandle {
    let (keystrokes_tx, keystrokes_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ViewState::default());

    let task = tokio::spawn(session_loop(controller, options, keystrokes_rx, state_tx));

    SessionHandle {
        keystrokes: keystrokes_tx,
        state: state_rx,
        task,
    }
}

async fn session_loop(
    controller: Arc<MovieFetchController>,
    options: SessionOptions,
    mut keystrokes: mpsc::UnboundedReceiver<String>,
    state_tx: watch::Sender<ViewState>,
) {
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (debouncer, mut stabilized) = Debouncer::spawn(options.debounce, String::new());
    let mut state = ViewState::default();

    {
        let counters = controller.counters();
        let events_tx = events_tx.clone();
        let limit = options.trending_limit;
        tokio::spawn(async move {
            let trending = load_trending(counters.as_ref(), limit).await;
            let _ = events_tx.send(SessionEvent::Trending(trending));
        });
    }

    state = start_fetch(state, String::new(), &controller, &events_tx);
    state_tx.send_replace(state.clone());

    loop {
        tokio::select! {
            raw = keystrokes.recv() => match raw {
                Some(raw) => {
                    state = reduce(state, Action::InputChanged(raw.clone()));
                    debouncer.push(raw);
                }
                None => break,
            },
            Some(query) = stabilized.recv() => {
                state = start_fetch(state, query, &controller, &events_tx);
            }
            Some(event) = events.recv() => {
                state = match event {
                    SessionEvent::Trending(trending) => reduce(state, Action::TrendingLoaded(trending)),
                    SessionEvent::Fetched { seq, outcome } => reduce(state, Action::FetchFinished { seq, outcome }),
                };
            }
        }
        state_tx.send_replace(state.clone());
    }

    debouncer.abort();
    info!("Session closed");
}

fn start_fetch(
    state: ViewState,
    query: String,
    controller: &Arc<MovieFetchController>,
    events_tx: &mpsc::UnboundedSender<SessionEvent>,
) -> ViewState {
    let state = reduce(state, Action::FetchStarted(query.clone()));
    let seq = state.latest_request();
    debug!("Fetch {} for {:?}", seq, query);

    let controller = controller.clone();
    let events_tx = events_tx.clone();
    tokio::spawn(async move {
        let outcome = controller.fetch(&query).await;
        let _ = events_tx.send(SessionEvent::Fetched { seq, outcome });
    });

    state
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogClient;
    use crate::config::CatalogConfig;
    use crate::db::{CounterRepo, MemoryRepository};
    use crate::search::GENERIC_FETCH_ERROR;
    use crate::testutil::{movie, results_body, MockCatalog, MockReply};

    const WAIT: Duration = Duration::from_secs(5);

    fn start_session(base_url: &str, repo: Arc<MemoryRepository>) -> SessionHandle {
        let config = CatalogConfig {
            baseurl: base_url.to_string(),
            token: Some("test-token".to_string()),
            ..CatalogConfig::default()
        };
        let controller = MovieFetchController::new(
            CatalogClient::new(&config).unwrap(),
            repo,
            "https://img".to_string(),
        );
        start(
            Arc::new(controller),
            SessionOptions {
                debounce: Duration::from_millis(50),
                trending_limit: 5,
            },
        )
    }

    fn title_responder(path: &str) -> MockReply {
        let title = path.rsplit("query=").next().unwrap_or("popular");
        let title = if path.contains("/discover/") { "popular" } else { title };
        MockReply::ok(&results_body(&[movie(1, title, Some("/p.jpg"))]))
    }

    async fn wait(session: &SessionHandle, done: impl FnMut(&ViewState) -> bool) -> ViewState {
        tokio::time::timeout(WAIT, session.wait_until(done))
            .await
            .expect("state not reached in time")
            .unwrap()
    }

    #[tokio::test]
    async fn test_mount_loads_popular_and_trending() {
        let mock = MockCatalog::with_responder(title_responder).await;
        let repo = Arc::new(MemoryRepository::new());
        repo.create_counter(&SearchCounter::new("alien", String::new(), None))
            .await
            .unwrap();

        let session = start_session(&mock.base_url, repo);
        let state = wait(&session, |s| !s.is_loading && !s.movies.is_empty() && !s.trending.is_empty()).await;

        assert_eq!(state.movies[0].title, "popular");
        assert_eq!(state.trending[0].searchterm, "alien");
        assert!(mock.requests()[0].path_and_query.starts_with("/3/discover/movie"));
        session.close().await;
    }

    #[tokio::test]
    async fn test_typing_searches_last_value_only() {
        let mock = MockCatalog::with_responder(title_responder).await;
        let repo = Arc::new(MemoryRepository::new());
        let session = start_session(&mock.base_url, repo.clone());
        wait(&session, |s| !s.is_loading && s.latest_request() == 1).await;

        for partial in ["b", "ba", "bat", "batman"] {
            session.input(partial).unwrap();
        }
        let state = wait(&session, |s| !s.is_loading && s.debounced_query == "batman").await;

        assert_eq!(state.query, "batman");
        assert_eq!(state.movies[0].title, "batman");
        let searches: Vec<String> = mock
            .requests()
            .into_iter()
            .map(|r| r.path_and_query)
            .filter(|p| p.contains("/search/"))
            .collect();
        assert_eq!(searches, vec!["/3/search/movie?query=batman".to_string()]);
        session.close().await;
    }

    #[tokio::test]
    async fn test_stale_response_never_wins() {
        let mock = MockCatalog::with_responder(|path: &str| {
            let reply = title_responder(path);
            if path.ends_with("query=slow") {
                reply.delayed(Duration::from_millis(400))
            } else {
                reply
            }
        })
        .await;
        let session = start_session(&mock.base_url, Arc::new(MemoryRepository::new()));
        wait(&session, |s| !s.is_loading && s.latest_request() == 1).await;

        session.input("slow").unwrap();
        wait(&session, |s| s.debounced_query == "slow").await;
        session.input("fast").unwrap();
        let state = wait(&session, |s| !s.is_loading && s.debounced_query == "fast").await;
        assert_eq!(state.movies[0].title, "fast");

        // Give the slow response time to land; it must be ignored.
        tokio::time::sleep(Duration::from_millis(600)).await;
        let state = session.state();
        assert_eq!(state.movies[0].title, "fast");
        assert_eq!(mock.requests().len(), 3);
        session.close().await;
    }

    #[tokio::test]
    async fn test_failed_search_shows_error() {
        let mock = MockCatalog::with_responder(|path: &str| {
            if path.contains("/search/") {
                MockReply::status(503, "{}")
            } else {
                title_responder(path)
            }
        })
        .await;
        let session = start_session(&mock.base_url, Arc::new(MemoryRepository::new()));
        wait(&session, |s| !s.is_loading && !s.movies.is_empty()).await;

        session.input("batman").unwrap();
        let state = wait(&session, |s| !s.is_loading && s.error_message.is_some()).await;
        assert_eq!(state.error_message.as_deref(), Some(GENERIC_FETCH_ERROR));
        assert!(state.movies.is_empty());
        session.close().await;
    }

    #[tokio::test]
    async fn test_settle_waits_for_last_input() {
        let mock = MockCatalog::with_responder(|path: &str| {
            let reply = title_responder(path);
            if path.contains("/search/") {
                reply.delayed(Duration::from_millis(200))
            } else {
                reply
            }
        })
        .await;
        let session = start_session(&mock.base_url, Arc::new(MemoryRepository::new()));

        for partial in ["a", "al", "alien"] {
            session.input(partial).unwrap();
        }
        let state = tokio::time::timeout(WAIT, session.settle("alien"))
            .await
            .expect("session did not settle")
            .unwrap();

        assert_eq!(state.debounced_query, "alien");
        assert!(!state.is_loading);
        assert_eq!(state.movies[0].title, "alien");
        session.close().await;
    }

    #[tokio::test]
    async fn test_settle_on_closed_session() {
        let mock = MockCatalog::with_responder(title_responder).await;
        let session = start_session(&mock.base_url, Arc::new(MemoryRepository::new()));
        let mut rx = session.subscribe();
        session.task.abort();
        while rx.changed().await.is_ok() {}

        let result = session.settle("never").await;
        assert!(matches!(result, Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn test_close_ends_state_stream() {
        let mock = MockCatalog::with_responder(title_responder).await;
        let session = start_session(&mock.base_url, Arc::new(MemoryRepository::new()));
        let mut rx = session.subscribe();
        session.close().await;

        let drained = tokio::time::timeout(WAIT, async { while rx.changed().await.is_ok() {} }).await;
        assert!(drained.is_ok());
    }
}
