use std::sync::Arc;

use tracing::{error, info, warn};

use super::popularity::spawn_update;
use crate::catalog::{CatalogClient, CatalogError, CatalogRequest, Movie};
use crate::db::CounterRepo;

pub const GENERIC_FETCH_ERROR: &str = "Erro ao buscar filmes. Tente novamente mais tarde.";
pub const FALLBACK_FETCH_ERROR: &str = "Falha ao buscar filmes.";

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Vec<Movie>),
    Failed(String),
}

/// Runs one catalog request per query and turns every failure into a
/// user-facing message.
pub struct MovieFetchController {
    catalog: CatalogClient,
    counters: Arc<dyn CounterRepo>,
    image_base: String,
}

impl MovieFetchController {
    pub fn new(catalog: CatalogClient, counters: Arc<dyn CounterRepo>, image_base: String) -> Self {
        Self {
            catalog,
            counters,
            image_base,
        }
    }

    pub fn counters(&self) -> Arc<dyn CounterRepo> {
        self.counters.clone()
    }

    pub fn image_base(&self) -> &str {
        &self.image_base
    }

    pub async fn fetch(&self, query: &str) -> FetchOutcome {
        let request = CatalogRequest::for_query(query);

        let movies = match self.catalog.fetch_movies(&request).await {
            Ok(movies) => movies,
            Err(CatalogError::Api(message)) => {
                warn!("Catalog rejected query {:?}: {:?}", query, message);
                return FetchOutcome::Failed(
                    message.unwrap_or_else(|| FALLBACK_FETCH_ERROR.to_string()),
                );
            }
            Err(e) => {
                error!("Error fetching movies for {:?}: {}", query, e);
                return FetchOutcome::Failed(GENERIC_FETCH_ERROR.to_string());
            }
        };

        info!("Query {:?} returned {} movies", query, movies.len());

        if let (false, Some(top)) = (query.is_empty(), movies.first()) {
            spawn_update(
                self.counters.clone(),
                query.to_string(),
                top.clone(),
                self.image_base.clone(),
            );
        }

        FetchOutcome::Loaded(movies)
    }
}
