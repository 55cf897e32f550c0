//! Shared setup for commands that run preloads.
//!
//! Loads configuration, installs logging, builds the Tokio runtime and the
//! preloader, in that order.

use std::future::Future;
use std::path::Path;

use karl::config::PreloaderConfig;
use karl::logging::{init_logging, LoggingGuard};
use karl::Preloader;
use tokio::runtime::Runtime;
use tracing::info;

use crate::commands::common::load_config;
use crate::error::CliError;

/// Everything a preload command needs.
pub struct CliRunner {
    config: PreloaderConfig,
    preloader: Preloader,
    runtime: Runtime,
    _logging: Option<LoggingGuard>,
}

impl CliRunner {
    /// Builds the runner from an optional explicit config file.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let (mut config, _) = load_config(config_path)?;
        if verbose {
            config.logging.level = "debug".to_string();
        }

        let logging = init_logging(&config.logging);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("karl-worker")
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        let preloader = Preloader::from_config(&config);
        info!(
            version = karl::VERSION,
            environment = ?preloader.environment(),
            "Preloader ready"
        );

        Ok(Self {
            config,
            preloader,
            runtime,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &PreloaderConfig {
        &self.config
    }

    pub fn preloader(&self) -> &Preloader {
        &self.preloader
    }

    /// Runs `future` to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
