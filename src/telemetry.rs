//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL sets the filter — a bare level like "debug" or full directives
//! like "info,report=debug,impactboard_backend=debug,tower_http=info".
//! LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//! Targets, files, and line numbers are included so the report engine's
//! "report" target is easy to separate from HTTP noise.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
        EnvFilter::new("info,report=debug,impactboard_backend=debug,tower_http=info,axum=info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // JSON and pretty builders are different types; branch at the end.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
