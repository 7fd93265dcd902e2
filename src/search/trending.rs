use tracing::error;

use crate::db::{CounterRepo, SearchCounter};

pub const TRENDING_LIMIT: i64 = 5;

/// Most searched terms, highest count first. Store errors are logged and
/// yield an empty list.
pub async fn load_trending(repo: &dyn CounterRepo, limit: i64) -> Vec<SearchCounter> {
    match repo.top_counters(limit).await {
        Ok(counters) => counters,
        Err(e) => {
            error!("Failed to load trending searches: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbError, DbResult, MemoryRepository};
    use async_trait::async_trait;

    struct BrokenRepo;

    #[async_trait]
    impl CounterRepo for BrokenRepo {
        async fn top_counters(&self, _limit: i64) -> DbResult<Vec<SearchCounter>> {
            Err(DbError::Sqlx(sqlx::Error::PoolClosed))
        }
        async fn get_counter(&self, searchterm: &str) -> DbResult<SearchCounter> {
            Err(DbError::NotFound(searchterm.to_string()))
        }
        async fn create_counter(&self, _counter: &SearchCounter) -> DbResult<()> {
            Err(DbError::Sqlx(sqlx::Error::PoolClosed))
        }
        async fn increment_counter(&self, _id: &str) -> DbResult<()> {
            Err(DbError::Sqlx(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_top_five_by_count() {
        let repo = MemoryRepository::new();
        for (i, term) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            let mut counter = SearchCounter::new(term, String::new(), None);
            counter.count = i as i64 + 1;
            repo.create_counter(&counter).await.unwrap();
        }

        let trending = load_trending(&repo, TRENDING_LIMIT).await;
        let counts: Vec<i64> = trending.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![7, 6, 5, 4, 3]);
    }

    #[tokio::test]
    async fn test_empty_store() {
        assert!(load_trending(&MemoryRepository::new(), TRENDING_LIMIT).await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        assert!(load_trending(&BrokenRepo, TRENDING_LIMIT).await.is_empty());
    }
}
