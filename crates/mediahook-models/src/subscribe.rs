use crate::media::MediaKind;
use serde::{Deserialize, Serialize};

/// Subscription extracted from a free-text media analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub title: String,
    pub name: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<MediaKind>,
}
