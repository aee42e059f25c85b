use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

/// Item detail as reported by a media server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDetail {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub year: Option<u32>,
    pub overview: Option<String>,
    #[serde(default)]
    pub provider_ids: HashMap<String, String>,
}
