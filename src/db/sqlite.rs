use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::model::*;
use super::repo::*;

type CounterRow = (String, String, i64, String, Option<i64>, Option<String>, Option<String>);

const COUNTER_COLUMNS: &str = "id, searchterm, count, poster_url, movie_id, created, updated";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(db_path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty
        // database, so those get exactly one connection that never expires.
        let pool = if db_path.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let repo = Self { pool };

        repo.init_schema().await?;

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::raw_sql(schema).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn counter_from_row(r: CounterRow) -> SearchCounter {
    SearchCounter {
        id: r.0,
        searchterm: r.1,
        count: r.2,
        poster_url: r.3,
        movie_id: r.4,
        created: parse_timestamp(r.5),
        updated: parse_timestamp(r.6),
    }
}

#[async_trait]
impl CounterRepo for SqliteRepository {
    async fn top_counters(&self, limit: i64) -> DbResult<Vec<SearchCounter>> {
        let rows = sqlx::query_as::<_, CounterRow>(&format!(
            "SELECT {} FROM searches ORDER BY count DESC, searchterm ASC LIMIT ?",
            COUNTER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(counter_from_row).collect())
    }

    async fn get_counter(&self, searchterm: &str) -> DbResult<SearchCounter> {
        sqlx::query_as::<_, CounterRow>(&format!(
            "SELECT {} FROM searches WHERE searchterm = ?",
            COUNTER_COLUMNS
        ))
        .bind(searchterm)
        .fetch_one(&self.pool)
        .await
        .map(counter_from_row)
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DbError::NotFound(format!("Counter not found: {}", searchterm))
            }
            _ => DbError::Sqlx(e),
        })
    }

    async fn create_counter(&self, counter: &SearchCounter) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO searches (id, searchterm, count, poster_url, movie_id, created, updated)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&counter.id)
        .bind(&counter.searchterm)
        .bind(counter.count)
        .bind(&counter.poster_url)
        .bind(counter.movie_id)
        .bind(counter.created.as_ref().map(|dt| dt.to_rfc3339()))
        .bind(counter.updated.as_ref().map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DbError::AlreadyExists(format!("Counter already exists: {}", counter.searchterm))
            }
            _ => DbError::Sqlx(e),
        })?;
        Ok(())
    }

    async fn increment_counter(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE searches SET count = count + 1, updated = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Counter not found: {}", id)));
        }
        Ok(())
    }
}
