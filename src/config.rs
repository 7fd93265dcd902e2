use serde::{Deserialize, Serialize};

pub const TOKEN_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_baseurl")]
    pub baseurl: String,
    #[serde(alias = "imageBase", default = "default_imagebase")]
    pub imagebase: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Request timeout in seconds. Unset means the HTTP client default.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            baseurl: default_baseurl(),
            imagebase: default_imagebase(),
            token: None,
            language: default_language(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(alias = "debounceMs", default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(alias = "trendingLimit", default = "default_trending_limit")]
    pub trending_limit: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            trending_limit: default_trending_limit(),
        }
    }
}

fn default_port() -> String {
    "8080".to_string()
}

fn default_baseurl() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_imagebase() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_language() -> String {
    "pt-BR".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_trending_limit() -> i64 {
    5
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    pub fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        config.apply_env(std::env::var(TOKEN_ENV).ok());

        Ok(config)
    }

    /// Fill in the bearer token from the environment when the file has none.
    pub fn apply_env(&mut self, env_token: Option<String>) {
        let has_token = self
            .catalog
            .token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);

        if !has_token {
            self.catalog.token = env_token.filter(|t| !t.trim().is_empty());
        }
    }

    pub fn get_database_path(&self) -> Option<String> {
        self.database.sqlite.as_ref().map(|s| s.filename.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let mut config: Config = serde_yaml::from_str("{}").unwrap();
        config.apply_env(None);
        assert_eq!(config.listen.port, "8080");
        assert_eq!(config.catalog.baseurl, "https://api.themoviedb.org/3");
        assert_eq!(config.catalog.language, "pt-BR");
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.trending_limit, 5);
        assert!(config.catalog.token.is_none());
        assert!(config.get_database_path().is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
listen:
  address: 127.0.0.1
  port: "9000"
catalog:
  baseurl: http://localhost:1234/3
  token: secret
  language: en-US
  timeout: 10
database:
  sqlite:
    filename: /tmp/cinebusca.db
search:
  debounceMs: 250
  trending_limit: 3
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listen.address.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.listen.port, "9000");
        assert_eq!(config.catalog.token.as_deref(), Some("secret"));
        assert_eq!(config.catalog.timeout, Some(10));
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.search.trending_limit, 3);
        assert_eq!(config.get_database_path().as_deref(), Some("/tmp/cinebusca.db"));
    }

    #[test]
    fn test_env_token_only_fills_missing() {
        let mut config = Config::default();
        config.apply_env(Some("from-env".to_string()));
        assert_eq!(config.catalog.token.as_deref(), Some("from-env"));

        config.catalog.token = Some("from-file".to_string());
        config.apply_env(Some("from-env".to_string()));
        assert_eq!(config.catalog.token.as_deref(), Some("from-file"));

        let mut blank = Config::default();
        blank.apply_env(Some("  ".to_string()));
        assert!(blank.catalog.token.is_none());
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = Config::from_yaml("broken.yaml", "listen: [").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}
