//! Logging initialization: stderr by default, a plain-text file when `LOG_FILE` is set.
//!
//! stdout is reserved for the article (or its JSON), so logs never go there.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Default filter when `RUST_LOG` is unset: `warn`, `-v` → `quill=info`, `-vv` → `quill=debug`.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,quill=info",
        _ => "info,quill=debug",
    }
}

/// Installs the global subscriber.
///
/// - **RUST_LOG**: filter, overrides the `-v` default.
/// - **LOG_FILE**: when set, logs are appended to that file without ANSI colours.
pub fn init(verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_filter(filter);
        tracing_subscriber::registry().with(file_layer).try_init()?;
        tracing::info!(path = %path, "quill logging to file");
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter);
        tracing_subscriber::registry().with(stderr_layer).try_init()?;
    }
    Ok(())
}
