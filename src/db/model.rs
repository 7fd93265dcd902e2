use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Popularity record for one exact search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCounter {
    pub id: String,
    pub searchterm: String,
    pub count: i64,
    pub poster_url: String,
    pub movie_id: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl SearchCounter {
    pub fn new(searchterm: &str, poster_url: String, movie_id: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            searchterm: searchterm.to_string(),
            count: 1,
            poster_url,
            movie_id,
            created: Some(now),
            updated: Some(now),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

pub type DbResult<T> = Result<T, DbError>;
