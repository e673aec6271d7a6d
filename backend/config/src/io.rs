//! Config file location and loading.

use crate::schema::ScanConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the rxscan config directory.
/// Priority: `RXSCAN_CONFIG_DIR` env > `~/.rxscan/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("RXSCAN_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".rxscan"),
        None => PathBuf::from(".rxscan"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<ScanConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ScanConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file is a valid "all defaults" config.
    if raw.trim().is_empty() {
        return Ok(ScanConfig::default());
    }

    let config: ScanConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert_eq!(cfg, ScanConfig::default());
    }

    #[tokio::test]
    async fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(
            &path,
            "ocr:\n  language: deu\n  modes: [6]\ncascade:\n  parallelVariants: true\n",
        )
        .unwrap();
        let cfg = load_config(&path).await.unwrap();
        assert_eq!(cfg.ocr.language, "deu");
        assert_eq!(cfg.ocr.modes, vec![6]);
        assert!(cfg.cascade.parallel_variants);
        assert_eq!(cfg.server.port, 5000);
    }

    #[tokio::test]
    async fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(load_config(&path).await.unwrap(), ScanConfig::default());
    }

    #[tokio::test]
    async fn malformed_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server: [unclosed").unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));
    }

    #[test]
    fn config_file_lives_in_dir() {
        assert_eq!(
            config_file_path(Path::new("/etc/rxscan")),
            PathBuf::from("/etc/rxscan/config.yaml")
        );
    }
}
