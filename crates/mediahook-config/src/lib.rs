pub mod config;
pub mod paths;
pub mod store;

pub use config::{
    AiRecognitionConfig, AutoSubscribeConfig, Config, EmbyLibraryInfoConfig, LoggingConfig, MediaInfoConfig,
    MediaServerConfig, PluginsConfig, default_config, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
    SUPPORTED_HOST_VERSION,
};
pub use paths::{PathManager, container_base_path};
pub use store::ConfigStore;
