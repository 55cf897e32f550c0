//! Common helpers shared across CLI commands.

use std::path::{Path, PathBuf};

use console::style;
use karl::config::PreloaderConfig;
use karl::telemetry::MetricsSnapshot;

use crate::error::CliError;

/// Loads the config from `explicit`, or from the default location.
///
/// An explicit path must exist. The default path may be absent, in which
/// case defaults are used. Returns the path that applies, if any.
pub fn load_config(
    explicit: Option<&Path>,
) -> Result<(PreloaderConfig, Option<PathBuf>), CliError> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::MissingConfig(path.to_path_buf()));
            }
            Ok((PreloaderConfig::load_from(path)?, Some(path.to_path_buf())))
        }
        None => Ok((PreloaderConfig::load()?, PreloaderConfig::default_path())),
    }
}

/// Outcome of one key, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReport {
    pub key: String,
    pub outcome: Result<String, String>,
}

impl KeyReport {
    pub fn ok(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            outcome: Ok(detail.into()),
        }
    }

    pub fn failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            outcome: Err(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Prints per-key reports followed by the metrics summary, then turns any
/// failure into [`CliError::LoadsFailed`].
pub fn finish(reports: &[KeyReport], metrics: MetricsSnapshot) -> Result<(), CliError> {
    for report in reports {
        match &report.outcome {
            Ok(detail) => println!("  {} {}  {}", style("ok").green(), report.key, detail),
            Err(reason) => println!("  {} {}  {}", style("failed").red(), report.key, reason),
        }
    }
    println!();
    println!("{}", style(metrics).dim());

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        return Err(CliError::LoadsFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}
