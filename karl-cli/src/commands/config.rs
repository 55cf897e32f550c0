//! Config command - show the effective configuration.

use std::path::PathBuf;

use super::common::load_config;
use crate::error::CliError;

/// Arguments for the config command.
pub struct ConfigArgs {
    pub config_path: Option<PathBuf>,
    pub path_only: bool,
}

/// Run the config command.
///
/// Prints the config file path, then the effective settings as INI. A
/// missing default file is reported rather than treated as an error.
pub fn run(args: ConfigArgs) -> Result<(), CliError> {
    if args.path_only {
        let path = match args.config_path {
            Some(path) => path,
            None => karl::PreloaderConfig::default_path().ok_or(CliError::NoConfigDir)?,
        };
        println!("{}", path.display());
        return Ok(());
    }

    let (config, path) = load_config(args.config_path.as_deref())?;
    match path {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not found, using defaults)", path.display()),
        None => println!("# (no config directory, using defaults)"),
    }
    print!("{}", config.to_ini_string());
    Ok(())
}
