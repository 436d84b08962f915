//! HTTP server binary for the company atlas.
//!
//! Reads its dataset from the file named by `ATLAS_DATA` (a JSON array of
//! company records) and listens on `PORT` (default 3000).

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use atlas_engine::{CacheConfig, EngineConfig, MemoryStore};

mod handlers;

use handlers::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "atlas_server=info,tower_http=info".to_string()),
        )
        .init();

    let store = match std::env::var("ATLAS_DATA") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read dataset file {path}"))?;
            let store = MemoryStore::from_json(&json)
                .with_context(|| format!("failed to parse dataset file {path}"))?;
            info!(path = %path, companies = store.len(), "loaded dataset");
            store
        }
        Err(_) => {
            warn!("ATLAS_DATA not set; starting with an empty dataset");
            MemoryStore::new(Vec::new())
        }
    };

    let config = EngineConfig::builder()
        .with_cache(CacheConfig::default())
        .build();
    let state = AppState::new(Arc::new(store), config);

    let app = handlers::router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");
    info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
