pub mod library;
pub mod media;
pub mod subscribe;
pub mod title;

pub use library::{LibraryItem, LibrarySummary, MediaLibrary};
pub use media::{MediaDetail, MediaKind};
pub use subscribe::SubscribeRequest;
pub use title::ParsedTitle;
