use crate::events::{Event, EventType};
use crate::form;
use crate::host::HostContext;
use crate::plugin::{Plugin, PluginForm, PluginMetadata};
use crate::title::TitleParser;
use async_trait::async_trait;
use mediahook_config::Config;
use mediahook_models::ParsedTitle;
use serde_json::{json, Value};
use tracing::{error, info};

static METADATA: PluginMetadata = PluginMetadata {
    id: "airecognition",
    name: "AI Recognition",
    description: "Recognize name, year, season and episode from media titles",
    version: "1.0",
    author: "heruntime01",
    author_url: "https://github.com/heruntime01",
    config_prefix: "airecognition_",
    order: 18,
    auth_level: 1,
};

/// Answers `NameRecognize` events with the regex title parser.
#[derive(Default)]
pub struct AiRecognition {
    enabled: bool,
    debug: bool,
    parser: TitleParser,
}

impl AiRecognition {
    pub fn new() -> Self {
        Self::default()
    }

    fn send_result(ctx: &HostContext, parsed: &ParsedTitle) {
        let data = match serde_json::to_value(parsed) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "Failed to serialize recognition result");
                json!({ "title": parsed.title })
            }
        };
        ctx.send_event(Event::with_data(EventType::NameRecognizeResult, data));
    }
}

#[async_trait]
impl Plugin for AiRecognition {
    fn metadata(&self) -> &'static PluginMetadata {
        &METADATA
    }

    async fn initialize(&mut self, config: &Config, _ctx: &HostContext) {
        if let Some(ref cfg) = config.plugins.airecognition {
            self.enabled = cfg.enabled;
            self.debug = cfg.debug;
            self.parser = TitleParser::new().with_name_format(cfg.name_format.clone());
        }

        info!(plugin = METADATA.id, debug = self.debug, "AI recognition service started");
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn subscriptions(&self) -> &'static [EventType] {
        &[EventType::NameRecognize]
    }

    async fn handle_event(&self, event: &Event, ctx: &HostContext) {
        if !self.enabled {
            return;
        }

        let Some(title) = event.get_str("title") else {
            Self::send_result(ctx, &ParsedTitle::empty(""));
            return;
        };

        if self.debug {
            info!(plugin = METADATA.id, title = title, "Recognizing title");
        }

        let parsed = self.parser.parse(title);

        if self.debug {
            info!(
                plugin = METADATA.id,
                name = ?parsed.name,
                year = ?parsed.year,
                season = ?parsed.season,
                episode = ?parsed.episode,
                "Recognition result"
            );
        }

        Self::send_result(ctx, &parsed);
    }

    fn form(&self, _ctx: &HostContext) -> PluginForm {
        let components: Vec<Value> = vec![form::form(vec![
            form::row(vec![
                form::col(6, form::switch("enabled", "Enable plugin")),
                form::col(6, form::switch("debug", "Debug logging")),
            ]),
            form::row(vec![form::col(
                12,
                form::text_field(
                    "name_format",
                    "Name format",
                    "Use {name} as the title placeholder, e.g. [AI]{name}",
                ),
            )]),
            form::row(vec![form::col(
                12,
                form::alert(
                    "Recognizes year, season and episode from titles with regular expressions. \
                     Enable debug logging to see each recognition step.",
                ),
            )]),
        ])];

        PluginForm {
            components,
            defaults: json!({
                "enabled": false,
                "debug": false,
                "name_format": ""
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahook_config::{default_config, AiRecognitionConfig, ConfigStore};

    async fn plugin_with(cfg: AiRecognitionConfig) -> (AiRecognition, HostContext) {
        let mut config = default_config();
        config.plugins.airecognition = Some(cfg);
        let ctx = HostContext::from_store(ConfigStore::in_memory(config.clone())).unwrap();
        let mut plugin = AiRecognition::new();
        plugin.initialize(&config, &ctx).await;
        (plugin, ctx)
    }

    #[tokio::test]
    async fn test_emits_parsed_result() {
        let (plugin, ctx) = plugin_with(AiRecognitionConfig {
            enabled: true,
            debug: true,
            name_format: "[AI]{name}".to_string(),
        })
        .await;
        let mut rx = ctx.bus().subscribe();

        plugin
            .handle_event(
                &Event::new(EventType::NameRecognize).with("title", "Show.Name.S02E05.2021.1080p"),
                &ctx,
            )
            .await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::NameRecognizeResult);
        assert_eq!(event.get_str("name"), Some("[AI]Show.Name."));
        assert_eq!(event.get_str("year"), Some("2021"));
        assert_eq!(event.get("season"), Some(&json!(2)));
        assert_eq!(event.get("episode"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn test_missing_title_emits_empty_result() {
        let (plugin, ctx) = plugin_with(AiRecognitionConfig {
            enabled: true,
            ..AiRecognitionConfig::default()
        })
        .await;
        let mut rx = ctx.bus().subscribe();

        plugin.handle_event(&Event::new(EventType::NameRecognize), &ctx).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::NameRecognizeResult);
        assert_eq!(event.data.len(), 1);
        assert_eq!(event.get("title"), Some(&json!("")));
    }

    #[tokio::test]
    async fn test_bad_template_never_raises() {
        let (plugin, ctx) = plugin_with(AiRecognitionConfig {
            enabled: true,
            debug: false,
            name_format: "{0}".to_string(),
        })
        .await;
        let mut rx = ctx.bus().subscribe();

        plugin
            .handle_event(&Event::new(EventType::NameRecognize).with("title", "Movie (1999)"), &ctx)
            .await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.get_str("name"), Some("Movie"));
        assert_eq!(event.get_str("year"), Some("1999"));
    }

    #[tokio::test]
    async fn test_disabled_plugin_is_silent() {
        let (plugin, ctx) = plugin_with(AiRecognitionConfig::default()).await;
        let mut rx = ctx.bus().subscribe();

        plugin
            .handle_event(&Event::new(EventType::NameRecognize).with("title", "Show S01"), &ctx)
            .await;

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_form_defaults_match_models() {
        let ctx = HostContext::from_store(ConfigStore::in_memory(default_config())).unwrap();
        let form = AiRecognition::new().form(&ctx);
        assert_eq!(form.defaults["name_format"], "");
        assert_eq!(form.components[0]["component"], "VForm");
    }
}
