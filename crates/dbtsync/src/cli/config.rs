//! Configuration for dbtsync
//!
//! Everything lives under the dbtsync home (`DBTSYNC_HOME`, default
//! `~/.dbtsync/`). An optional `config.toml` there supplies defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use dbtsync_logging::{dbtsync_home, ensure_logs_dir, logs_dir, DEFAULT_LOG_FILTER};

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Tracing filter used when RUST_LOG is unset (e.g. "dbtsync=debug")
    #[serde(default)]
    pub log_filter: Option<String>,
}

/// Get the default config file: <home>/config.toml
pub fn default_config_path() -> PathBuf {
    dbtsync_home().join("config.toml")
}

/// Read a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read config file: {}", path.display()))
        }
    };
    toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved settings in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command - shows resolved paths and settings
pub fn run(args: ConfigArgs, config_path: &Path, config: &FileConfig) -> Result<()> {
    let home = dbtsync_home();
    let logs = logs_dir();
    let filter = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    let rust_log = std::env::var("RUST_LOG").ok();

    if args.json {
        let payload = serde_json::json!({
            "home": home.to_string_lossy(),
            "config": {
                "path": config_path.to_string_lossy(),
                "exists": config_path.exists(),
            },
            "logs": logs.to_string_lossy(),
            "log_filter": filter,
            "rust_log": rust_log,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("dbtsync configuration");
    println!();
    println!("  Home:        {}", home.display());
    println!(
        "  Config:      {}{}",
        config_path.display(),
        if config_path.exists() { "" } else { " (not found, using defaults)" }
    );
    println!("  Logs:        {}", logs.display());
    println!("  Log filter:  {}", filter);
    if let Some(rust_log) = rust_log {
        println!("  RUST_LOG:    {} (overrides log filter)", rust_log);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_load_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_filter = \"dbtsync=debug\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("dbtsync=debug"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
