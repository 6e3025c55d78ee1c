//! File-backed logging initialization.
//!
//! Stdout carries the rendered statusline and stderr must stay clean for the
//! host, so log output goes to a JSON file under the gauge directory. Nothing
//! is installed unless `GAUGE_LOG` is set or the caller asks for verbose; the
//! variable's value doubles as the filter (`1`/`true` mean `info`).

use std::fs;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use gauge_paths::GaugePaths;

/// Install the JSON file subscriber. Call once per process, before any
/// tracing output. Failures are swallowed; a broken log sink must never
/// take the statusline down.
pub fn init_logging(paths: &GaugePaths, verbose: bool) {
    let setting = std::env::var("GAUGE_LOG").ok().filter(|v| !v.is_empty());
    let filter = match setting.as_deref() {
        Some("1") | Some("true") => "info".to_string(),
        Some(other) => other.to_string(),
        None if verbose => "debug".to_string(),
        None => return,
    };

    let log_path = paths.log_file();
    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        return;
    };

    let layer = fmt::layer()
        .json()
        .with_writer(Mutex::new(file))
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(layer)
        .try_init();
}
