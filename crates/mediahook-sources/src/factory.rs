//! Media server registry built from configuration
//!
//! Plugins look servers up by the name given in `[[media_servers]]`.

use crate::emby::EmbyClient;
use crate::traits::MediaServer;
use mediahook_config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Clone, Default)]
pub struct MediaServerRegistry {
    servers: HashMap<String, Arc<dyn MediaServer>>,
}

impl MediaServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client for every configured server of a supported type.
    /// Entries that fail to build are logged and left out.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        for server in &config.media_servers {
            match server.type_.as_str() {
                "emby" => match EmbyClient::from_config(server) {
                    Ok(client) => registry.register(Arc::new(client)),
                    Err(e) => {
                        error!(server = %server.name, error = %e, "Failed to create media server client");
                    }
                },
                other => {
                    warn!(server = %server.name, server_type = other, "Unsupported media server type, skipping");
                }
            }
        }

        registry
    }

    pub fn register(&mut self, server: Arc<dyn MediaServer>) {
        debug!(server = server.server_name(), server_type = server.server_type(), "Registered media server");
        self.servers.insert(server.server_name().to_string(), server);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MediaServer>> {
        self.servers.get(name).cloned()
    }

    /// Registered server names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.servers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahook_config::MediaServerConfig;

    fn server(name: &str, type_: &str, host: &str) -> MediaServerConfig {
        MediaServerConfig {
            name: name.to_string(),
            type_: type_.to_string(),
            host: host.to_string(),
            api_key: "key".to_string(),
            user_id: "user".to_string(),
        }
    }

    #[test]
    fn test_from_config_skips_unsupported_and_invalid() {
        let config = Config {
            media_servers: vec![
                server("emby", "emby", "localhost:8096"),
                server("plex", "plex", "localhost:32400"),
                server("broken", "emby", ""),
            ],
            ..Config::default()
        };

        let registry = MediaServerRegistry::from_config(&config);
        assert_eq!(registry.names(), vec!["emby"]);
        assert!(registry.is_registered("emby"));
        assert!(registry.get("plex").is_none());
        assert!(registry.get("broken").is_none());
    }
}
