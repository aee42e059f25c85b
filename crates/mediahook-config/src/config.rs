use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Plugin interface version this build understands. Plugins stay inert when
/// the host reports anything else.
pub const SUPPORTED_HOST_VERSION: &str = "v2";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host_version")]
    pub host_version: String,
    #[serde(default)]
    pub media_servers: Vec<MediaServerConfig>,
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Connection details for one media server, referenced by name from plugin settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaServerConfig {
    pub name: String,
    #[serde(rename = "type", default = "default_server_type")]
    pub type_: String,
    pub host: String,
    pub api_key: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginsConfig {
    #[serde(default)]
    pub airecognition: Option<AiRecognitionConfig>,
    #[serde(default)]
    pub autosubscribe: Option<AutoSubscribeConfig>,
    #[serde(default)]
    pub embylibraryinfo: Option<EmbyLibraryInfoConfig>,
    #[serde(default)]
    pub mediainfo: Option<MediaInfoConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AiRecognitionConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub debug: bool,
    /// Template applied to the cleaned name, `{name}` is the placeholder
    #[serde(default)]
    pub name_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoSubscribeConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub openai_key: String,
    #[serde(default)]
    pub proxy: String,
    #[serde(default)]
    pub auto_subscribe: bool,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for AutoSubscribeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            openai_key: String::new(),
            proxy: String::new(),
            auto_subscribe: false,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbyLibraryInfoConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Run the report once shortly after initialization, then clear itself
    #[serde(default)]
    pub onlyonce: bool,
    /// Five-field cron expression, empty disables the recurring job
    #[serde(default)]
    pub cron: String,
    #[serde(default = "default_true")]
    pub notify: bool,
    /// Names of `[[media_servers]]` entries to report on
    #[serde(default)]
    pub mediaservers: Vec<String>,
}

impl Default for EmbyLibraryInfoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            onlyonce: false,
            cron: String::new(),
            notify: default_true(),
            mediaservers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MediaInfoConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: Option<bool>,
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_host_version() -> String {
    SUPPORTED_HOST_VERSION.to_string()
}

fn default_server_type() -> String {
    "emby".to_string()
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration written by `mediahook config init`: every plugin present, all disabled.
pub fn default_config() -> Config {
    Config {
        host_version: default_host_version(),
        media_servers: Vec::new(),
        plugins: PluginsConfig {
            airecognition: Some(AiRecognitionConfig::default()),
            autosubscribe: Some(AutoSubscribeConfig::default()),
            embylibraryinfo: Some(EmbyLibraryInfoConfig::default()),
            mediainfo: Some(MediaInfoConfig::default()),
        },
        logging: None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_version: default_host_version(),
            media_servers: Vec::new(),
            plugins: PluginsConfig::default(),
            logging: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut names = HashSet::new();
        for server in &self.media_servers {
            if server.name.is_empty() {
                return Err(anyhow::anyhow!("media server entry is missing a name"));
            }
            if !names.insert(server.name.as_str()) {
                return Err(anyhow::anyhow!("Duplicate media server name: {}", server.name));
            }
            if server.host.trim().is_empty() {
                return Err(anyhow::anyhow!("Media server '{}' has no host configured", server.name));
            }
        }

        if let Some(ref emby) = self.plugins.embylibraryinfo {
            for selected in &emby.mediaservers {
                if !names.contains(selected.as_str()) {
                    return Err(anyhow::anyhow!(
                        "embylibraryinfo selects media server '{}' which is not configured",
                        selected
                    ));
                }
            }
        }

        Ok(())
    }

    /// Names of plugins whose section exists and is switched on
    pub fn enabled_plugins(&self) -> Vec<&'static str> {
        let mut enabled = Vec::new();
        if self.plugins.airecognition.as_ref().is_some_and(|c| c.enabled) {
            enabled.push("airecognition");
        }
        if self.plugins.autosubscribe.as_ref().is_some_and(|c| c.enabled) {
            enabled.push("autosubscribe");
        }
        if self.plugins.embylibraryinfo.as_ref().is_some_and(|c| c.enabled) {
            enabled.push("embylibraryinfo");
        }
        if self.plugins.mediainfo.as_ref().is_some_and(|c| c.enabled) {
            enabled.push("mediainfo");
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn emby_server(name: &str) -> MediaServerConfig {
        MediaServerConfig {
            name: name.to_string(),
            type_: "emby".to_string(),
            host: "192.168.1.10:8096".to_string(),
            api_key: "key".to_string(),
            user_id: "user".to_string(),
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = default_config();
        config.media_servers.push(emby_server("living-room"));
        if let Some(ref mut emby) = config.plugins.embylibraryinfo {
            emby.enabled = true;
            emby.cron = "0 3 * * *".to_string();
            emby.mediaservers = vec!["living-room".to_string()];
        }

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.host_version, "v2");
        assert_eq!(loaded.media_servers.len(), 1);
        assert_eq!(loaded.media_servers[0].type_, "emby");
        let emby = loaded.plugins.embylibraryinfo.unwrap();
        assert!(emby.enabled);
        assert_eq!(emby.cron, "0 3 * * *");
        assert_eq!(emby.mediaservers, vec!["living-room".to_string()]);
        assert_eq!(loaded.plugins.autosubscribe.unwrap().model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config: Config = toml::from_str("[plugins.autosubscribe]\nenabled = true\n").unwrap();
        assert_eq!(config.host_version, SUPPORTED_HOST_VERSION);
        let auto = config.plugins.autosubscribe.unwrap();
        assert!(auto.enabled);
        assert_eq!(auto.base_url, DEFAULT_OPENAI_BASE_URL);
        assert!((auto.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.plugins.airecognition.is_none());
    }

    #[test]
    fn test_config_validate() {
        let mut config = default_config();
        assert!(config.validate().is_ok());

        config.plugins.embylibraryinfo = Some(EmbyLibraryInfoConfig {
            mediaservers: vec!["missing".to_string()],
            ..EmbyLibraryInfoConfig::default()
        });
        assert!(config.validate().is_err());

        config.media_servers.push(emby_server("missing"));
        assert!(config.validate().is_ok());

        config.media_servers.push(emby_server("missing"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_plugins() {
        let mut config = default_config();
        assert!(config.enabled_plugins().is_empty());
        config.plugins.mediainfo = Some(MediaInfoConfig { enabled: true });
        assert_eq!(config.enabled_plugins(), vec!["mediainfo"]);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "this is = = broken").unwrap();

        let err = Config::load_from_file(&file.path().to_path_buf()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to parse config file"));
        assert!(message.contains(&file.path().display().to_string()));
    }
}
