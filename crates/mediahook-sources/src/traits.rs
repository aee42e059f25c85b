use async_trait::async_trait;
use mediahook_models::{LibraryItem, MediaDetail, MediaLibrary};

/// Read-only view of a media server used by the plugins.
///
/// Every call follows the same policy: failures are logged by the
/// implementation and surface as `None`, so callers can simply skip.
#[async_trait]
pub trait MediaServer: Send + Sync {
    fn server_name(&self) -> &str;

    fn server_type(&self) -> &str;

    /// Top-level libraries (views) visible to the configured user
    async fn get_libraries(&self) -> Option<Vec<LibraryItem>>;

    /// Items whose parent is `library_id`
    async fn get_library_items(&self, library_id: &str) -> Option<MediaLibrary>;

    async fn get_media_detail(&self, item_id: &str) -> Option<MediaDetail>;
}
