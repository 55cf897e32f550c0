//! Preloader configuration.
//!
//! Settings are read from an INI file, by default
//! `~/.config/karl/config.ini`. A missing file yields the defaults; every key
//! is optional.
//!
//! ```ini
//! [icons]
//! class = material-icons
//! marker_prefix = karl
//! extra_classes = bg-transparent
//!
//! [http]
//! user_agent = karl/0.1.0
//! timeout_secs = 30
//!
//! [backend]
//! kind = bounded
//! max_entries = 512
//!
//! [logging]
//! level = info
//! directory = /var/log/karl
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::backend::{BoundedBackend, MemoryBackend, PreloadBackend, DEFAULT_MAX_ENTRIES};
use crate::environment::{IconStyle, DEFAULT_USER_AGENT};

/// Default log filter when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read config file {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// The file is not valid INI.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A key holds a value of the wrong shape.
    #[error("Invalid value for {section}.{key}: {value}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

/// Which backend a configured preloader uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Unbounded [`MemoryBackend`].
    Memory,
    /// Capacity-limited [`BoundedBackend`].
    Bounded,
}

/// Backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Backend implementation.
    pub kind: BackendKind,
    /// Entry ceiling for the bounded backend.
    pub max_entries: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            kind: BackendKind::Memory,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// HTTP settings for the image surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive.
    pub level: String,
    /// Directory for a rolling log file; console only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// Complete preloader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloaderConfig {
    /// Icon warm-up element classes.
    pub icons: IconStyle,
    /// Image fetching.
    pub http: HttpSettings,
    /// Storage backend.
    pub backend: BackendSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

impl PreloaderConfig {
    /// Default config file location, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("karl").join("config.ini"))
    }

    /// Loads the default config file, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini_str(&contents)
    }

    /// Parses configuration from INI text.
    pub fn from_ini_str(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(class) = ini.get_from(Some("icons"), "class") {
            config.icons.icon_class = class.to_string();
        }
        if let Some(prefix) = ini.get_from(Some("icons"), "marker_prefix") {
            config.icons.marker_prefix = prefix.to_string();
        }
        if let Some(extra) = ini.get_from(Some("icons"), "extra_classes") {
            config.icons.extra_classes = extra.to_string();
        }

        if let Some(agent) = ini.get_from(Some("http"), "user_agent") {
            config.http.user_agent = agent.to_string();
        }
        if let Some(secs) = ini.get_from(Some("http"), "timeout_secs") {
            let secs: u64 = parse_value("http", "timeout_secs", secs)?;
            config.http.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(kind) = ini.get_from(Some("backend"), "kind") {
            config.backend.kind = match kind.to_lowercase().as_str() {
                "memory" => BackendKind::Memory,
                "bounded" => BackendKind::Bounded,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        section: "backend",
                        key: "kind",
                        value: kind.to_string(),
                    })
                }
            };
        }
        if let Some(max) = ini.get_from(Some("backend"), "max_entries") {
            config.backend.max_entries = parse_value("backend", "max_entries", max)?;
        }

        if let Some(level) = ini.get_from(Some("logging"), "level") {
            config.logging.level = level.to_string();
        }
        if let Some(dir) = ini.get_from(Some("logging"), "directory") {
            if !dir.is_empty() {
                config.logging.directory = Some(PathBuf::from(dir));
            }
        }

        Ok(config)
    }

    /// Renders the configuration back to INI text.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        ini.with_section(Some("icons"))
            .set("class", self.icons.icon_class.as_str())
            .set("marker_prefix", self.icons.marker_prefix.as_str())
            .set("extra_classes", self.icons.extra_classes.as_str());

        let timeout = self.http.timeout.map(|t| t.as_secs()).unwrap_or(0);
        ini.with_section(Some("http"))
            .set("user_agent", self.http.user_agent.as_str())
            .set("timeout_secs", timeout.to_string());

        let kind = match self.backend.kind {
            BackendKind::Memory => "memory",
            BackendKind::Bounded => "bounded",
        };
        ini.with_section(Some("backend"))
            .set("kind", kind)
            .set("max_entries", self.backend.max_entries.to_string());

        let directory = self
            .logging
            .directory
            .as_ref()
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_default();
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set("directory", directory);

        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = ini.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Creates the configured backend.
    pub fn build_backend(&self) -> Arc<dyn PreloadBackend> {
        match self.backend.kind {
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
            BackendKind::Bounded => Arc::new(BoundedBackend::new(self.backend.max_entries)),
        }
    }
}

fn parse_value<T: std::str::FromStr>(
    section: &'static str,
    key: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PreloaderConfig::default();
        assert_eq!(config.icons.icon_class, "material-icons");
        assert_eq!(config.backend.kind, BackendKind::Memory);
        assert!(config.http.timeout.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_file() {
        let config = PreloaderConfig::from_ini_str(
            "[icons]\nclass = material-icons-round\nmarker_prefix = app\nextra_classes =\n\
             [http]\nuser_agent = test-agent\ntimeout_secs = 15\n\
             [backend]\nkind = Bounded\nmax_entries = 32\n\
             [logging]\nlevel = debug\ndirectory = /tmp/karl-logs\n",
        )
        .unwrap();

        assert_eq!(config.icons.icon_class, "material-icons-round");
        assert_eq!(config.icons.marker_prefix, "app");
        assert_eq!(config.icons.extra_classes, "");
        assert_eq!(config.http.user_agent, "test-agent");
        assert_eq!(config.http.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.backend.kind, BackendKind::Bounded);
        assert_eq!(config.backend.max_entries, 32);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, Some(PathBuf::from("/tmp/karl-logs")));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = PreloaderConfig::from_ini_str("[http]\ntimeout_secs = 0\n").unwrap();
        assert!(config.http.timeout.is_none());
    }

    #[test]
    fn test_invalid_backend_kind() {
        let err = PreloaderConfig::from_ini_str("[backend]\nkind = redis\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "kind", .. }));
    }

    #[test]
    fn test_invalid_number() {
        let err = PreloaderConfig::from_ini_str("[backend]\nmax_entries = lots\n").unwrap_err();
        assert!(err.to_string().contains("backend.max_entries"));
    }

    #[test]
    fn test_round_trip_through_ini_text() {
        let mut config = PreloaderConfig::default();
        config.backend.kind = BackendKind::Bounded;
        config.http.timeout = Some(Duration::from_secs(5));

        let parsed = PreloaderConfig::from_ini_str(&config.to_ini_string()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[icons]\nclass = custom-icons").unwrap();

        let config = PreloaderConfig::load_from(file.path()).unwrap();
        assert_eq!(config.icons.icon_class, "custom-icons");
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = PreloaderConfig::load_from(Path::new("/nonexistent/karl.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_build_backend() {
        let mut config = PreloaderConfig::default();
        config.backend.kind = BackendKind::Bounded;
        let backend = config.build_backend();
        assert!(!backend.contains("anything"));
    }
}
