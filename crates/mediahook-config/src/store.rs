use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared, persistable view of the configuration file.
///
/// Plugins read a snapshot at initialization and write back through
/// [`ConfigStore::update`], e.g. to clear a one-shot flag. A store without a
/// path keeps changes in memory only.
#[derive(Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    config: Arc<Mutex<Config>>,
}

impl ConfigStore {
    pub fn new(path: PathBuf, config: Config) -> Self {
        Self {
            path: Some(path),
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn in_memory(config: Config) -> Self {
        Self {
            path: None,
            config: Arc::new(Mutex::new(config)),
        }
    }

    /// Load from disk, falling back to defaults when the file does not exist yet
    pub fn load(path: PathBuf) -> Result<Self> {
        let config = if path.exists() {
            Config::load_from_file(&path)?
        } else {
            Config::default()
        };
        Ok(Self::new(path, config))
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn snapshot(&self) -> Result<Config> {
        let guard = self
            .config
            .lock()
            .map_err(|_| anyhow::anyhow!("config store lock poisoned"))?;
        Ok(guard.clone())
    }

    /// Apply `f` and persist. The in-memory copy only changes once the save succeeded.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut guard = self
            .config
            .lock()
            .map_err(|_| anyhow::anyhow!("config store lock poisoned"))?;
        let mut next = guard.clone();
        f(&mut next);
        if let Some(ref path) = self.path {
            next.save_to_file(path)?;
            debug!(path = %path.display(), "Configuration saved");
        }
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_config, EmbyLibraryInfoConfig};
    use tempfile::TempDir;

    #[test]
    fn test_update_persists_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let store = ConfigStore::new(path.clone(), default_config());

        store
            .update(|cfg| {
                cfg.plugins.embylibraryinfo = Some(EmbyLibraryInfoConfig {
                    enabled: true,
                    onlyonce: true,
                    ..EmbyLibraryInfoConfig::default()
                });
            })
            .unwrap();

        let reloaded = ConfigStore::load(path).unwrap().snapshot().unwrap();
        let emby = reloaded.plugins.embylibraryinfo.unwrap();
        assert!(emby.enabled);
        assert!(emby.onlyonce);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::load(dir.path().join("absent.toml")).unwrap();
        let config = store.snapshot().unwrap();
        assert!(config.media_servers.is_empty());
        assert!(config.plugins.mediainfo.is_none());
    }

    #[test]
    fn test_in_memory_store_does_not_write() {
        let store = ConfigStore::in_memory(default_config());
        store.update(|cfg| cfg.host_version = "v1".to_string()).unwrap();
        assert!(store.path().is_none());
        assert_eq!(store.snapshot().unwrap().host_version, "v1");
    }

    #[test]
    fn test_failed_save_keeps_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = ConfigStore::new(blocker.join("config.toml"), default_config());

        let result = store.update(|cfg| cfg.host_version = "v1".to_string());
        assert!(result.is_err());
        assert_eq!(store.snapshot().unwrap().host_version, "v2");
    }
}
