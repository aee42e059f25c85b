use serde::{Deserialize, Serialize};

/// Best-effort structure guessed from a raw release title.
///
/// Every field except `title` is optional; an "empty" result carries only the
/// original title and is what callers receive when nothing could be parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParsedTitle {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl ParsedTitle {
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_serializes_title_only() {
        let parsed = ParsedTitle::empty("Unknown.Release");
        assert_eq!(parsed.name, None);
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Unknown.Release" }));
    }

    #[test]
    fn test_populated_result_keeps_fields() {
        let parsed = ParsedTitle {
            title: "Show.S01E02".to_string(),
            name: Some("Show.".to_string()),
            year: None,
            season: Some(1),
            episode: Some(2),
        };
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["season"], 1);
        assert_eq!(json["episode"], 2);
        assert!(json.get("year").is_none());
    }
}
