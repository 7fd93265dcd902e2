use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait CounterRepo: Send + Sync {
    /// Counters with the highest count first, ties broken by search term.
    async fn top_counters(&self, limit: i64) -> DbResult<Vec<SearchCounter>>;
    async fn get_counter(&self, searchterm: &str) -> DbResult<SearchCounter>;
    async fn create_counter(&self, counter: &SearchCounter) -> DbResult<()>;
    async fn increment_counter(&self, id: &str) -> DbResult<()>;
}
