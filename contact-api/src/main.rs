//! contact-api entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use contact_api::config::Args;
use contact_api::{router, AdminAuth, AppState, InMemoryStore, RateLimiter};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let auth = AdminAuth::new(args.admin_tokens.iter().cloned());
    if auth.token_count() == 0 {
        tracing::warn!("no admin tokens configured; /api/messages will reject every request");
    }

    let state = AppState::new(
        Arc::new(InMemoryStore::with_capacity(args.max_messages)),
        RateLimiter::new(args.rate_limit()),
        auth,
    );

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "contact-api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("contact-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
