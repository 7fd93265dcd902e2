use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};

use super::types::*;
use crate::search::{load_trending, FetchOutcome};
use crate::server::AppState;
use crate::view::{reduce, render_html, Action, ViewState};

/// Server-rendered page for one stabilized query.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let query = params.query;
    let counters = state.controller.counters();

    let (trending, outcome) = tokio::join!(
        load_trending(counters.as_ref(), state.config.search.trending_limit),
        state.controller.fetch(&query),
    );

    let mut view = reduce(ViewState::default(), Action::TrendingLoaded(trending));
    view = reduce(view, Action::InputChanged(query.clone()));
    view = reduce(view, Action::FetchStarted(query));
    let seq = view.latest_request();
    view = reduce(view, Action::FetchFinished { seq, outcome });

    Html(render_html(&view, state.controller.image_base()))
}

pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<MoviesResponse> {
    let query = params.query;

    let response = match state.controller.fetch(&query).await {
        FetchOutcome::Loaded(results) => MoviesResponse {
            query,
            results,
            error: None,
        },
        FetchOutcome::Failed(message) => MoviesResponse {
            query,
            results: Vec::new(),
            error: Some(message),
        },
    };

    Json(response)
}

pub async fn trending(State(state): State<AppState>) -> Json<Vec<TrendingEntry>> {
    let counters = state.controller.counters();
    let top = load_trending(counters.as_ref(), state.config.search.trending_limit).await;

    let entries = top
        .into_iter()
        .enumerate()
        .map(|(i, counter)| TrendingEntry::from_counter(i + 1, counter))
        .collect();

    Json(entries)
}
