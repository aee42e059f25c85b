use crate::emby::api::EmbyHttpClient;
use crate::error::SourceError;
use crate::traits::MediaServer;
use async_trait::async_trait;
use mediahook_config::MediaServerConfig;
use mediahook_models::{LibraryItem, MediaDetail, MediaLibrary};
use tracing::{debug, error};

pub struct EmbyClient {
    name: String,
    api: EmbyHttpClient,
}

impl EmbyClient {
    pub fn new(name: impl Into<String>, host: &str, api_key: impl Into<String>, user_id: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            name: name.into(),
            api: EmbyHttpClient::new(host, api_key.into(), user_id.into())?,
        })
    }

    pub fn from_config(config: &MediaServerConfig) -> Result<Self, SourceError> {
        Self::new(
            config.name.clone(),
            &config.host,
            config.api_key.clone(),
            config.user_id.clone(),
        )
    }
}

#[async_trait]
impl MediaServer for EmbyClient {
    fn server_name(&self) -> &str {
        &self.name
    }

    fn server_type(&self) -> &str {
        "emby"
    }

    async fn get_libraries(&self) -> Option<Vec<LibraryItem>> {
        match self.api.get_views().await {
            Ok(libraries) => {
                debug!(server = %self.name, count = libraries.len(), "Emby: fetched libraries");
                Some(libraries)
            }
            Err(e) => {
                error!(server = %self.name, error = %e, "Emby: failed to fetch libraries");
                None
            }
        }
    }

    async fn get_library_items(&self, library_id: &str) -> Option<MediaLibrary> {
        match self.api.get_items_by_parent(library_id).await {
            Ok(library) => Some(library),
            Err(e) => {
                error!(
                    server = %self.name,
                    library_id = library_id,
                    error = %e,
                    "Emby: failed to fetch library items"
                );
                None
            }
        }
    }

    async fn get_media_detail(&self, item_id: &str) -> Option<MediaDetail> {
        match self.api.get_item(item_id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                error!(server = %self.name, item_id = item_id, error = %e, "Emby: failed to fetch item detail");
                None
            }
        }
    }
}
