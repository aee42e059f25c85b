pub mod emby;
pub mod error;
pub mod factory;
pub mod openai;
pub mod traits;

pub use emby::{normalize_host, EmbyClient};
pub use error::SourceError;
pub use factory::MediaServerRegistry;
pub use openai::OpenAiClient;
pub use traits::MediaServer;
