//! Logging initialization
//!
//! Console output through `tracing-subscriber` with an `EnvFilter` built
//! from the config level (RUST_LOG wins when set), plus an optional
//! non-blocking daily-rotated file appender.

use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::infrastructure::config::LoggingConfig;

// Keeps file writers alive for the process lifetime.
static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer().with_target(false);

    if config.file_logging {
        std::fs::create_dir_all(Path::new(&config.log_dir))?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, "crawler.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        if let Ok(mut guards) = LOG_GUARDS.lock() {
            guards.push(guard);
        }

        let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .init();
    }

    Ok(())
}
