use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::catalog::Movie;
use crate::db::{CounterRepo, DbError, DbResult, SearchCounter};

/// Bump the counter for `searchterm`, creating it on first use with the
/// poster of `movie`.
pub async fn update_search_count(
    repo: &dyn CounterRepo,
    searchterm: &str,
    movie: &Movie,
    image_base: &str,
) -> DbResult<()> {
    match repo.get_counter(searchterm).await {
        Ok(counter) => repo.increment_counter(&counter.id).await,
        Err(DbError::NotFound(_)) => {
            let poster_url = movie.poster_url(image_base).unwrap_or_default();
            let counter = SearchCounter::new(searchterm, poster_url, Some(movie.id));
            match repo.create_counter(&counter).await {
                // Someone else created it between our lookup and insert.
                Err(DbError::AlreadyExists(_)) => {
                    let existing = repo.get_counter(searchterm).await?;
                    repo.increment_counter(&existing.id).await
                }
                other => other,
            }
        }
        Err(e) => Err(e),
    }
}

/// Run the counter update on its own task. The outcome only reaches the log.
pub fn spawn_update(
    repo: Arc<dyn CounterRepo>,
    searchterm: String,
    movie: Movie,
    image_base: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match update_search_count(repo.as_ref(), &searchterm, &movie, &image_base).await {
            Ok(()) => debug!("Updated search count for {:?}", searchterm),
            Err(e) => error!("Failed to update search count for {:?}: {}", searchterm, e),
        }
    })
}
