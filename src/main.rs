// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RaceTrack API Server
//!
//! Serves a personal race journal: password sessions, race records with
//! aggregate statistics, and page views, backed by a hosted identity +
//! row storage platform.

use racetrack::{
    backend::{RaceBackend, SupabaseBackend},
    config::Config,
    stores::SessionRegistry,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting RaceTrack API");

    // Hosted backend client
    let backend: Arc<dyn RaceBackend> = Arc::new(SupabaseBackend::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    tracing::info!(url = %config.supabase_url, "Hosted backend client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        backend,
        sessions: SessionRegistry::new(),
    });

    // Build router
    let app = racetrack::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("racetrack=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
