//! Impactboard · Impact Report Authoring Backend
//!
//! - Axum HTTP + WebSocket API around the report wizard engine
//! - Optional remote report API integration (via environment variables)
//! - Local draft mirror on disk (durability within a session)
//! - Static dashboard SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   REPORT_API_BASE_URL : enables remote report API integration if present
//!   REPORT_API_TOKEN    : bearer token attached to remote calls
//!   REPORT_CACHE_DIR    : local draft mirror directory (default ./report_cache)
//!   REPORT_CONFIG_PATH  : path to TOML config (validation limits)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod validators;
mod wizard;
mod cache;
mod api;
mod state;
mod hydrate;
mod packager;
mod protocol;
mod logic;
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

  // Build shared application state (session store, API client, mirror, limits).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "impactboard_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
