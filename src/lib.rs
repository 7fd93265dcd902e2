pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod middleware;
pub mod search;
pub mod server;
pub mod session;
pub mod view;

#[cfg(test)]
mod testutil;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

use db::CounterRepo;
use search::MovieFetchController;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    #[error("Server error: {0}")]
    Server(String),
}

fn load_config(config_path: &str, debug_logs: bool) -> Result<config::Config, ServerError> {
    let mut config = config::Config::from_file(config_path)?;
    config.debug_logs = debug_logs;

    info!("Using config file: {}", config_path);
    if debug_logs {
        info!("Debug logging enabled");
    }
    if config.catalog.token.is_none() {
        warn!(
            "No catalog token configured (set catalog.token or {}); catalog requests will be rejected",
            config::TOKEN_ENV
        );
    }

    Ok(config)
}

async fn build_controller(config: &config::Config) -> Result<Arc<MovieFetchController>, ServerError> {
    let counters: Arc<dyn CounterRepo> = match config.get_database_path() {
        Some(db_path) => {
            info!("Opening database at {}", db_path);
            Arc::new(db::SqliteRepository::new(&db_path).await?)
        }
        None => {
            info!("No database configured, keeping search counts in memory");
            Arc::new(db::MemoryRepository::new())
        }
    };

    let catalog = catalog::CatalogClient::new(&config.catalog)?;
    info!("Catalog at {}", config.catalog.baseurl);

    Ok(Arc::new(MovieFetchController::new(
        catalog,
        counters,
        config.catalog.imagebase.clone(),
    )))
}

pub async fn run(config_path: &str, debug_logs: bool) -> Result<(), ServerError> {
    let config = load_config(config_path, debug_logs)?;
    let controller = build_controller(&config).await?;

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let tls = match (&config.listen.tlscert, &config.listen.tlskey) {
        (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
        _ => None,
    };

    let state = server::AppState::new(config, controller);
    let app = server::build_router(state);

    if let Some((cert_path, key_path)) = tls {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}

/// Terminal front end: every stdin line is the new contents of the search
/// box, and the page is printed again whenever it changes.
pub async fn run_interactive(config_path: &str, debug_logs: bool) -> Result<(), ServerError> {
    let config = load_config(config_path, debug_logs)?;
    let controller = build_controller(&config).await?;

    let debounce = Duration::from_millis(config.search.debounce_ms);
    let handle = session::start(
        controller,
        session::SessionOptions {
            debounce,
            trending_limit: config.search.trending_limit,
        },
    );

    let mut updates = handle.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let text = view::render_text(&updates.borrow_and_update());
            println!("{}", text);
        }
    });

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut last_input = String::new();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| ServerError::Server(format!("Failed to read stdin: {}", e)))?
    {
        if handle.input(line.clone()).is_err() {
            break;
        }
        last_input = line;
    }

    // Leave only once the last line has been searched and shown.
    if let Err(e) = handle.settle(&last_input).await {
        warn!("Session ended before {:?} was searched: {}", last_input, e);
    }

    handle.close().await;
    let _ = printer.await;

    Ok(())
}
