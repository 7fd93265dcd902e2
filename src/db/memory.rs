use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::model::*;
use super::repo::*;

/// Counter store that lives for the lifetime of the process. Used when no
/// database is configured.
#[derive(Default)]
pub struct MemoryRepository {
    counters: RwLock<HashMap<String, SearchCounter>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterRepo for MemoryRepository {
    async fn top_counters(&self, limit: i64) -> DbResult<Vec<SearchCounter>> {
        let counters = self.counters.read().await;
        let mut top: Vec<SearchCounter> = counters.values().cloned().collect();
        top.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.searchterm.cmp(&b.searchterm))
        });
        top.truncate(limit.max(0) as usize);
        Ok(top)
    }

    async fn get_counter(&self, searchterm: &str) -> DbResult<SearchCounter> {
        let counters = self.counters.read().await;
        counters
            .get(searchterm)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Counter not found: {}", searchterm)))
    }

    async fn create_counter(&self, counter: &SearchCounter) -> DbResult<()> {
        let mut counters = self.counters.write().await;
        if counters.contains_key(&counter.searchterm) {
            return Err(DbError::AlreadyExists(format!(
                "Counter already exists: {}",
                counter.searchterm
            )));
        }
        counters.insert(counter.searchterm.clone(), counter.clone());
        Ok(())
    }

    async fn increment_counter(&self, id: &str) -> DbResult<()> {
        let mut counters = self.counters.write().await;
        let counter = counters
            .values_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DbError::NotFound(format!("Counter not found: {}", id)))?;
        counter.count += 1;
        counter.updated = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_repository() {
        let repo = MemoryRepository::new();
        let counter = SearchCounter::new("duna", String::new(), Some(438631));
        repo.create_counter(&counter).await.unwrap();
        assert!(matches!(
            repo.create_counter(&counter).await,
            Err(DbError::AlreadyExists(_))
        ));

        repo.increment_counter(&counter.id).await.unwrap();
        assert_eq!(repo.get_counter("duna").await.unwrap().count, 2);

        let mut other = SearchCounter::new("alien", String::new(), None);
        other.count = 2;
        repo.create_counter(&other).await.unwrap();

        let top = repo.top_counters(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].searchterm, "alien");
        assert!(repo.top_counters(0).await.unwrap().is_empty());
    }
}
