use serde::Serialize;
use tracing::debug;

use crate::catalog::Movie;
use crate::db::SearchCounter;
use crate::search::FetchOutcome;

/// Everything the page shows, for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub query: String,
    pub debounced_query: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub movies: Vec<Movie>,
    pub trending: Vec<SearchCounter>,
    #[serde(skip)]
    latest_request: u64,
}

impl ViewState {
    /// Sequence number of the most recently started fetch.
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    InputChanged(String),
    FetchStarted(String),
    FetchFinished { seq: u64, outcome: FetchOutcome },
    TrendingLoaded(Vec<SearchCounter>),
}

pub fn reduce(mut state: ViewState, action: Action) -> ViewState {
    match action {
        Action::InputChanged(query) => {
            state.query = query;
        }
        Action::FetchStarted(query) => {
            state.debounced_query = query;
            state.is_loading = true;
            state.error_message = None;
            state.latest_request += 1;
        }
        Action::FetchFinished { seq, outcome } => {
            if seq != state.latest_request {
                debug!(
                    "Discarding stale response {} (latest is {})",
                    seq, state.latest_request
                );
                return state;
            }
            state.is_loading = false;
            match outcome {
                FetchOutcome::Loaded(movies) => {
                    state.movies = movies;
                    state.error_message = None;
                }
                FetchOutcome::Failed(message) => {
                    state.movies.clear();
                    state.error_message = Some(message);
                }
            }
        }
        Action::TrendingLoaded(trending) => {
            state.trending = trending;
        }
    }
    state
}
