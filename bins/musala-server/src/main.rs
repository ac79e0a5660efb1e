//! musala-server: HTTP API for finding mosques near a point.

mod api;
mod backend;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use musala_core::config::{Config, StoreBackend};
use musala_core::health::HealthChecker;
use musala_mosques::NearbySearchEngine;
use musala_telemetry::{Event, TelemetryConfig};
use serde_json::json;

use crate::api::{build_app, AppState};
use crate::backend::{Backend, StoreHealth};

#[derive(Parser)]
#[command(name = "musala-server")]
#[command(about = "Nearby mosque lookup API")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to musala.toml, .musala.toml or config/musala.toml)
    #[arg(short, long, env = "MUSALA_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Document store backend: firestore or memory
    #[arg(long)]
    store: Option<StoreBackend>,

    /// JSON seed file for the memory backend
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?.schema;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind.to_string();
    }
    if let Some(store) = cli.store {
        config.store.backend = store;
    }
    if let Some(seed) = cli.seed {
        config.store.seed_path = Some(seed);
    }
    if let Some(level) = cli.log_level {
        config.telemetry.log_level = level;
    }
    config.telemetry.json |= cli.json_logs;
    config.validate()?;

    musala_telemetry::init_with_config(TelemetryConfig::new(
        config.telemetry.log_level.clone(),
        config.telemetry.json,
    ))?;

    let collection = config.search.collection_name.clone();
    let backend = Backend::from_config(&config.store, &collection)?;
    let health = HealthChecker::new().add_check(StoreHealth::new(backend.clone(), collection.as_str()));
    let engine = NearbySearchEngine::new(backend, config.search.clone());

    let app = build_app(AppState {
        engine: Arc::new(engine),
        health: Arc::new(health),
    });

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    Event::new(
        "server.started",
        json!({
            "addr": addr.to_string(),
            "store": config.store.backend.as_str(),
            "collection": collection,
            "default_radius_km": config.search.default_radius_km,
            "max_radius_km": config.search.max_radius_km,
        }),
    )
    .log();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
