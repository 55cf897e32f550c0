//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use karl::config::ConfigError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or was invalid.
    Config(String),
    /// The async runtime could not be started.
    Runtime(String),
    /// No config directory could be determined for this platform.
    NoConfigDir,
    /// Some preloads failed; carries the number of failures.
    LoadsFailed { failed: usize, total: usize },
    /// An explicitly named config file does not exist.
    MissingConfig(PathBuf),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::LoadsFailed { .. } => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to start runtime: {}", msg),
            CliError::NoConfigDir => write!(f, "Could not determine a config directory"),
            CliError::LoadsFailed { failed, total } => {
                write!(f, "{} of {} preloads failed", failed, total)
            }
            CliError::MissingConfig(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::LoadsFailed { failed: 1, total: 2 }.exit_code(), 1);
        assert_eq!(CliError::NoConfigDir.exit_code(), 2);
    }

    #[test]
    fn test_display_loads_failed() {
        let err = CliError::LoadsFailed { failed: 2, total: 5 };
        assert_eq!(err.to_string(), "2 of 5 preloads failed");
    }
}
