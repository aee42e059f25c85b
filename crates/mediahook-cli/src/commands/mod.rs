pub mod ask;
pub mod config;
pub mod libraries;
pub mod parse;
pub mod plugins;
pub mod run;

use color_eyre::Result;
use mediahook_config::{default_config, Config, ConfigStore, LoggingConfig, PathManager};
use std::path::{Path, PathBuf};

pub fn config_path(override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(|| PathManager::default().config_file())
}

/// Load the store, falling back to defaults when the file does not exist yet.
pub fn load_store(path: &Path) -> Result<ConfigStore> {
    ConfigStore::load(path.to_path_buf())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", path.display(), e))
}

/// In-memory defaults, used when the file on disk cannot be parsed.
pub fn default_store() -> ConfigStore {
    ConfigStore::in_memory(default_config())
}

pub fn snapshot(store: &ConfigStore) -> Result<Config> {
    store
        .snapshot()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read configuration: {}", e))
}

/// Validated configuration for commands that talk to media servers.
pub fn validated(store: &ConfigStore) -> Result<Config> {
    let config = snapshot(store)?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    Ok(config)
}

/// `--log-file PATH` wins, a bare `--log-file` uses the default log location,
/// otherwise the `[logging] file` setting applies.
pub fn resolve_log_file(flag: Option<Option<PathBuf>>, settings: Option<&LoggingConfig>) -> Option<PathBuf> {
    match flag {
        Some(Some(path)) => Some(path),
        Some(None) => Some(PathManager::default().daemon_log_file()),
        None => settings.and_then(|s| s.file.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_resolution() {
        let settings = LoggingConfig {
            level: "info".to_string(),
            json: None,
            file: Some(PathBuf::from("/var/log/mediahook/host.log")),
        };

        let explicit = resolve_log_file(Some(Some(PathBuf::from("/tmp/x.log"))), Some(&settings));
        assert_eq!(explicit, Some(PathBuf::from("/tmp/x.log")));

        let bare = resolve_log_file(Some(None), Some(&settings)).unwrap();
        assert!(bare.ends_with("mediahook.log"));

        let configured = resolve_log_file(None, Some(&settings));
        assert_eq!(configured, Some(PathBuf::from("/var/log/mediahook/host.log")));

        assert!(resolve_log_file(None, None).is_none());
    }

    #[test]
    fn test_missing_config_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = load_store(&dir.path().join("config.toml")).unwrap();
        let config = snapshot(&store).unwrap();
        assert_eq!(config.host_version, "v2");
        assert!(validated(&store).is_ok());
    }
}
