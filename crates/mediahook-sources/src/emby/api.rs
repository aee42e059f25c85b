use crate::error::SourceError;
use mediahook_models::{LibraryItem, MediaDetail, MediaLibrary};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Normalize a user-entered server address into a base URL.
///
/// Guarantees a trailing slash and an `http://` or `https://` scheme,
/// prepending `http://` when neither is present. Returns `None` for an empty
/// host.
pub fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim();
    if host.is_empty() {
        return None;
    }

    let mut url = host.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        url = format!("http://{}", url);
    }
    Some(url)
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(rename = "Items", default)]
    items: Vec<EmbyItem>,
    #[serde(rename = "TotalRecordCount")]
    total_record_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EmbyItem {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Id", default)]
    id: String,
    #[serde(rename = "Type", default)]
    type_: String,
    #[serde(rename = "CollectionType")]
    collection_type: Option<String>,
    #[serde(rename = "ProductionYear")]
    production_year: Option<u32>,
    #[serde(rename = "Overview")]
    overview: Option<String>,
    #[serde(rename = "ProviderIds", default)]
    provider_ids: HashMap<String, String>,
}

/// Raw Emby REST calls. Every method returns the typed error; the
/// log-and-skip policy lives in [`super::EmbyClient`].
pub struct EmbyHttpClient {
    client: Client,
    base_url: String,
    api_key: String,
    user_id: String,
}

impl EmbyHttpClient {
    pub fn new(host: &str, api_key: String, user_id: String) -> Result<Self, SourceError> {
        let base_url = normalize_host(host)
            .ok_or_else(|| SourceError::Config("media server host is empty".to_string()))?;

        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            user_id,
        })
    }

    async fn get_items(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Emby: GET {}", url);

        let mut params: Vec<(&str, &str)> = query.to_vec();
        params.push(("api_key", self.api_key.as_str()));

        let response = self.client.get(&url).query(&params).send().await?;
        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                service: "emby",
                status,
                body,
            });
        }
        Ok(response)
    }

    pub async fn get_views(&self) -> Result<Vec<LibraryItem>, SourceError> {
        let path = format!("emby/Users/{}/Views", self.user_id);
        let response: ItemsResponse = self.get_items(&path, &[]).await?.json().await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| LibraryItem {
                name: item.name,
                type_: item.collection_type.unwrap_or_else(|| "mixed".to_string()),
                id: item.id,
            })
            .collect())
    }

    pub async fn get_items_by_parent(&self, library_id: &str) -> Result<MediaLibrary, SourceError> {
        let path = format!("emby/Users/{}/Items", self.user_id);
        let response: ItemsResponse = self
            .get_items(&path, &[("ParentId", library_id)])
            .await?
            .json()
            .await?;

        let items: Vec<LibraryItem> = response
            .items
            .into_iter()
            .map(|item| LibraryItem {
                name: item.name,
                type_: item.type_,
                id: item.id,
            })
            .collect();

        Ok(MediaLibrary {
            library_id: library_id.to_string(),
            item_count: response.total_record_count.unwrap_or(items.len() as u64),
            items,
        })
    }

    pub async fn get_item(&self, item_id: &str) -> Result<MediaDetail, SourceError> {
        let path = format!("emby/Users/{}/Items/{}", self.user_id, item_id);
        let item: EmbyItem = self.get_items(&path, &[]).await?.json().await?;

        if item.id.is_empty() {
            return Err(SourceError::UnexpectedResponse(format!(
                "item {} returned without an Id",
                item_id
            )));
        }

        Ok(MediaDetail {
            id: item.id,
            name: item.name,
            type_: item.type_,
            year: item.production_year,
            overview: item.overview,
            provider_ids: item.provider_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host_adds_scheme_and_slash() {
        assert_eq!(normalize_host("192.168.1.5:8096"), Some("http://192.168.1.5:8096/".to_string()));
        assert_eq!(normalize_host("https://emby.example.com"), Some("https://emby.example.com/".to_string()));
        assert_eq!(normalize_host("http://emby.local/"), Some("http://emby.local/".to_string()));
    }

    #[test]
    fn test_normalize_host_keeps_uppercase_scheme() {
        assert_eq!(normalize_host("HTTPS://Emby.Example.com/"), Some("HTTPS://Emby.Example.com/".to_string()));
    }

    #[test]
    fn test_normalize_host_empty() {
        assert_eq!(normalize_host(""), None);
        assert_eq!(normalize_host("   "), None);
    }

    #[test]
    fn test_new_rejects_empty_host() {
        let result = EmbyHttpClient::new("", "key".to_string(), "user".to_string());
        assert!(matches!(result, Err(SourceError::Config(_))));
    }
}
