use serde::{Deserialize, Serialize};

/// One entry of a media server listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryItem {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
}

/// Items found under a single library (parent id) of a media server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaLibrary {
    pub library_id: String,
    pub item_count: u64,
    pub items: Vec<LibraryItem>,
}

/// Row of the library report: which server, which library, how big.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrarySummary {
    pub server: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub library_id: String,
    pub item_count: u64,
}

impl LibrarySummary {
    pub fn from_library(server: &str, library: &LibraryItem, listing: &MediaLibrary) -> Self {
        Self {
            server: server.to_string(),
            name: library.name.clone(),
            type_: library.type_.clone(),
            library_id: listing.library_id.clone(),
            item_count: listing.item_count,
        }
    }
}
