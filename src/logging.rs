//! Log setup: stdout, `<log_dir>/<job>.log`, and `<log_dir>/<job>.errors.log`.

use crate::store;
use anyhow::Context;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the error log path so an empty one can be removed at exit.
pub struct LogGuard {
    errors_path: PathBuf,
}

impl LogGuard {
    pub fn finish(self) -> anyhow::Result<()> {
        store::rm_if_empty(&self.errors_path)?;
        Ok(())
    }
}

pub fn init(log_dir: &Path, job: &str) -> anyhow::Result<LogGuard> {
    store::ensure_directory(log_dir)?;

    let log_path = log_dir.join(format!("{}.log", job));
    let errors_path = log_dir.join(format!("{}.errors.log", job));
    let log_file =
        File::create(&log_path).with_context(|| format!("create {}", log_path.display()))?;
    let errors_file =
        File::create(&errors_path).with_context(|| format!("create {}", errors_path.display()))?;

    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_filter(env_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .with_filter(env_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(errors_file))
                .with_filter(LevelFilter::ERROR),
        )
        .try_init()?;

    tracing::info!(log = %log_path.display(), "logging to file");
    Ok(LogGuard { errors_path })
}
