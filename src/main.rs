//! SoftSell landing page server
//!
//! Entry point: loads configuration, initializes logging and serves the page.

use std::sync::Arc;

use dotenvy::dotenv;
use mimalloc::MiMalloc;
use softsell::config::AppConfig;
use softsell::{server, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Configuration error: {msg}");
            std::process::exit(1);
        }
    };

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(config.telemetry.log_format);

    server::start_server(Arc::new(config)).await
}
