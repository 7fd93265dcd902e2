use serde::{Deserialize, Serialize};

use crate::catalog::Movie;
use crate::db::SearchCounter;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoviesResponse {
    pub query: String,
    pub results: Vec<Movie>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingEntry {
    pub rank: usize,
    pub searchterm: String,
    pub count: i64,
    pub poster_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<i64>,
}

impl TrendingEntry {
    pub fn from_counter(rank: usize, counter: SearchCounter) -> Self {
        Self {
            rank,
            searchterm: counter.searchterm,
            count: counter.count,
            poster_url: counter.poster_url,
            movie_id: counter.movie_id,
        }
    }
}
