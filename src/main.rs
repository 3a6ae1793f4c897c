// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Amigo-Session edge server
//!
//! Gates page navigation for the Financial Amigo frontend and starts the
//! Google OAuth flow.

use amigo_session::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        production = config.production,
        backend_configured = config.backend_url.is_some(),
        "Starting Amigo-Session edge server"
    );

    if config.backend_url.is_none() {
        tracing::warn!("BACKEND_URL not set, sign-in will fail until configured");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
    });

    // Build router
    let app = amigo_session::routes::create_router(state);

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

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("amigo_session=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
