use crate::events::{Event, EventType};
use crate::form;
use crate::host::HostContext;
use crate::plugin::{Plugin, PluginError, PluginForm, PluginMetadata};
use async_trait::async_trait;
use mediahook_config::Config;
use mediahook_models::MediaDetail;
use serde_json::json;
use tracing::{error, info};

static METADATA: PluginMetadata = PluginMetadata {
    id: "mediainfo",
    name: "Media Info",
    description: "Resolve server:id media ids into item details",
    version: "1.0",
    author: "heruntime01",
    author_url: "https://github.com/heruntime01",
    config_prefix: "mediainfo_",
    order: 20,
    auth_level: 1,
};

/// Split `<server>:<id>`. Anything but exactly two non-empty parts is rejected.
pub fn parse_media_id(mediaid: &str) -> Result<(&str, &str), PluginError> {
    let mut parts = mediaid.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(server), Some(id), None) if !server.is_empty() && !id.is_empty() => Ok((server, id)),
        _ => Err(PluginError::InvalidMediaId(mediaid.to_string())),
    }
}

#[derive(Default)]
pub struct MediaInfo {
    enabled: bool,
}

impl MediaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    async fn convert(event: &Event, ctx: &HostContext) -> Result<MediaDetail, PluginError> {
        let mediaid = event.get_str("mediaid").ok_or(PluginError::MissingField("mediaid"))?;
        event
            .get_str("convert_type")
            .ok_or(PluginError::MissingField("convert_type"))?;

        let (server_name, item_id) = parse_media_id(mediaid)?;
        let server = ctx
            .media_server(server_name)
            .ok_or_else(|| PluginError::UnknownServer(server_name.to_string()))?;

        server
            .get_media_detail(item_id)
            .await
            .ok_or_else(|| PluginError::NotFound {
                server: server_name.to_string(),
                id: item_id.to_string(),
            })
    }
}

#[async_trait]
impl Plugin for MediaInfo {
    fn metadata(&self) -> &'static PluginMetadata {
        &METADATA
    }

    async fn initialize(&mut self, config: &Config, _ctx: &HostContext) {
        self.enabled = config.plugins.mediainfo.as_ref().is_some_and(|c| c.enabled);
        info!(plugin = METADATA.id, enabled = self.enabled, "Media info service started");
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn subscriptions(&self) -> &'static [EventType] {
        &[EventType::MediaRecognizeConvert]
    }

    async fn handle_event(&self, event: &Event, ctx: &HostContext) {
        // Our own answers travel on the same event type
        if event.get("media_dict").is_some() {
            return;
        }

        match Self::convert(event, ctx).await {
            Ok(detail) => match serde_json::to_value(&detail) {
                Ok(media_dict) => ctx.send_event(
                    Event::new(EventType::MediaRecognizeConvert).with("media_dict", media_dict),
                ),
                Err(e) => error!(plugin = METADATA.id, error = %e, "Failed to encode media detail"),
            },
            Err(e) => error!(plugin = METADATA.id, error = %e, "Media info lookup failed"),
        }
    }

    fn form(&self, _ctx: &HostContext) -> PluginForm {
        PluginForm {
            components: vec![form::form(vec![form::row(vec![form::col(
                12,
                form::switch("enabled", "Enable plugin"),
            )])])],
            defaults: json!({ "enabled": false }),
        }
    }
}
