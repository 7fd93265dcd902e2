use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::types::{CatalogResponse, Movie};
use crate::config::CatalogConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    Search { query: String },
    Discover,
}

impl CatalogRequest {
    pub fn for_query(query: &str) -> Self {
        if query.is_empty() {
            CatalogRequest::Discover
        } else {
            CatalogRequest::Search {
                query: query.to_string(),
            }
        }
    }

    pub fn path_and_query(&self, language: &str) -> String {
        match self {
            CatalogRequest::Search { query } => {
                format!("/search/movie?query={}", urlencoding::encode(query))
            }
            CatalogRequest::Discover => format!(
                "/discover/movie?sort_by=popularity.desc&language={}",
                urlencoding::encode(language)
            ),
        }
    }
}

pub struct CatalogClient {
    client: Client,
    baseurl: String,
    language: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let token = config.token.as_deref().unwrap_or_default();

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| CatalogError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            baseurl: config.baseurl.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }

    pub fn url_for(&self, request: &CatalogRequest) -> String {
        format!("{}{}", self.baseurl, request.path_and_query(&self.language))
    }

    pub async fn fetch_movies(&self, request: &CatalogRequest) -> Result<Vec<Movie>, CatalogError> {
        let url = self.url_for(request);
        debug!("Fetching movies from {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        let body = response.bytes().await?;
        let data: CatalogResponse = serde_json::from_slice(&body)?;

        if data.is_failure() {
            return Err(CatalogError::Api(data.error));
        }

        Ok(data.results.unwrap_or_default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Bearer token contains invalid header characters")]
    InvalidToken,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Catalog returned status {0}")]
    Status(StatusCode),
    #[error("Failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Catalog reported failure: {}", .0.as_deref().unwrap_or("no details"))]
    Api(Option<String>),
}
