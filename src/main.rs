//! Saarthi · Therapy Backend
//!
//! - Axum HTTP + WebSocket API (AAC boards, i18n, therapy store, mini-game)
//! - Optional upstream language provider (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   SAARTHI_PROVIDER_URL : enables translation/TTS/STT proxying if present
//!   SAARTHI_PROVIDER_KEY : bearer token for the provider (optional)
//!   SAARTHI_CONFIG_PATH  : path to TOML config (board pool + datasets)
//!   SAARTHI_STORE_PATH   : therapy store snapshot file (default: data dir)
//!   SAARTHI_DATASETS     : comma-separated dataset names (fallback when
//!                          the TOML config lists none)
//!   SAARTHI_DATA_REFRESH_MINUTES : dataset refresh interval (default 60)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod game;
mod store;
mod i18n;
mod aac;
mod datasets;
mod suggest;
mod provider;
mod speech;
mod state;
mod protocol;
mod ops;
mod report;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (store, board pool, provider client).
  let state = Arc::new(AppState::new());
  state.log_inventory().await;

  // Refresh dataset samples now and on an interval (first tick fires
  // immediately).
  let refresh_state = state.clone();
  tokio::spawn(async move {
    let minutes = std::env::var("SAARTHI_DATA_REFRESH_MINUTES")
      .ok()
      .and_then(|m| m.parse::<u64>().ok())
      .filter(|m| *m > 0)
      .unwrap_or(60);
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(minutes * 60));
    loop {
      tick.tick().await;
      refresh_state.datasets.refresh_all().await;
    }
  });

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "saarthi_backend", %addr, "HTTP server listening");

  let shutdown_state = state.clone();
  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "saarthi_backend", error = %e, "Failed to listen for shutdown signal");
        return;
      }
      info!(target: "saarthi_backend", "Shutdown signal received; persisting store");
      shutdown_state.store.persist().await;
    })
    .await?;
  Ok(())
}
