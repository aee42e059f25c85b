use crate::events::{Event, EventType};
use crate::form;
use crate::host::HostContext;
use crate::plugin::{Plugin, PluginForm, PluginMetadata};
use async_trait::async_trait;
use mediahook_config::{AutoSubscribeConfig, Config};
use mediahook_models::{MediaKind, SubscribeRequest};
use mediahook_sources::OpenAiClient;
use serde_json::json;
use tracing::{debug, error, info};

static METADATA: PluginMetadata = PluginMetadata {
    id: "autosubscribe",
    name: "Smart Subscribe Assistant",
    description: "Ask an LLM about a title, report cast and synopsis, optionally subscribe",
    version: "1.0",
    author: "heruntime01",
    author_url: "https://github.com/heruntime01",
    config_prefix: "autosubscribe_",
    order: 19,
    auth_level: 1,
};

/// Sentence the model is told to answer with for anything that is not a movie or show.
pub const NOT_MEDIA_REPLY: &str = "This is not a movie or TV show.";

const NOTICE_TITLE: &str = "Media analysis";

pub fn build_prompt(message: &str) -> String {
    format!(
        "Analyze whether this title is a movie or a TV show: {message}\n\
         If it is, answer with one item per line:\n\
         Type: movie or TV show\n\
         Name: the canonical name\n\
         Year: the release year\n\
         Cast: at least three main actors\n\
         Synopsis: a short plot summary\n\
         \n\
         If it is not a movie or TV show, reply exactly: {NOT_MEDIA_REPLY}"
    )
}

/// Text following `marker` anywhere in `line`, without markdown emphasis.
fn after_marker(line: &str, marker: &str) -> Option<String> {
    line.find(marker)
        .map(|at| &line[at + marker.len()..])
        .map(|rest| rest.trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace()))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}

/// Pull type, name and year out of a model answer, one marker per line.
/// Markers may sit behind list numbering or bold markup.
///
/// Returns `None` unless a name was found.
pub fn parse_media_analysis(title: &str, answer: &str) -> Option<SubscribeRequest> {
    let mut request = SubscribeRequest {
        title: title.to_string(),
        name: None,
        year: None,
        kind: None,
    };

    for line in answer.lines() {
        if let Some(kind) = after_marker(line, "Type:") {
            let lower = kind.to_lowercase();
            request.kind = Some(if lower.contains("movie") || lower.contains("film") {
                MediaKind::Movie
            } else {
                MediaKind::Tv
            });
        } else if line.contains("Name:") {
            request.name = after_marker(line, "Name:");
        } else if line.contains("Year:") {
            request.year = after_marker(line, "Year:");
        }
    }

    request.name.is_some().then_some(request)
}

/// Listens to user messages and asks a chat completion endpoint about them.
#[derive(Default)]
pub struct AutoSubscribe {
    config: AutoSubscribeConfig,
    client: Option<OpenAiClient>,
}

impl AutoSubscribe {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_client(cfg: &AutoSubscribeConfig) -> Option<OpenAiClient> {
        if !cfg.enabled || cfg.openai_key.trim().is_empty() {
            return None;
        }
        let proxy = Some(cfg.proxy.as_str()).filter(|p| !p.trim().is_empty());
        match OpenAiClient::new(cfg.openai_key.trim(), proxy) {
            Ok(client) => Some(
                client
                    .with_base_url(cfg.base_url.clone())
                    .with_model(cfg.model.clone())
                    .with_temperature(cfg.temperature),
            ),
            Err(e) => {
                error!(plugin = METADATA.id, error = %e, "Failed to build chat client");
                None
            }
        }
    }

    fn trigger_subscribe(&self, message: &str, answer: &str, ctx: &HostContext) {
        let Some(request) = parse_media_analysis(message, answer) else {
            debug!(plugin = METADATA.id, "No media name in analysis, skipping subscribe");
            return;
        };

        match serde_json::to_value(&request) {
            Ok(data) => {
                info!(
                    plugin = METADATA.id,
                    name = ?request.name,
                    year = ?request.year,
                    "Requesting subscription"
                );
                ctx.send_event(Event::with_data(EventType::Subscribe, data));
            }
            Err(e) => error!(plugin = METADATA.id, error = %e, "Failed to build subscribe event"),
        }
    }
}

#[async_trait]
impl Plugin for AutoSubscribe {
    fn metadata(&self) -> &'static PluginMetadata {
        &METADATA
    }

    async fn initialize(&mut self, config: &Config, _ctx: &HostContext) {
        let Some(ref cfg) = config.plugins.autosubscribe else {
            return;
        };
        self.config = cfg.clone();
        self.client = Self::build_client(cfg);
        debug!(
            plugin = METADATA.id,
            enabled = self.config.enabled,
            client = self.client.is_some(),
            "Subscribe assistant configured"
        );
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn subscriptions(&self) -> &'static [EventType] {
        &[EventType::UserMessage]
    }

    async fn handle_event(&self, event: &Event, ctx: &HostContext) {
        let Some(ref client) = self.client else {
            return;
        };
        let Some(message) = event.get_str("text") else {
            return;
        };

        let Some(answer) = client.chat_completion(&build_prompt(message)).await else {
            return;
        };

        ctx.post_message(NOTICE_TITLE, &answer);

        if self.config.auto_subscribe && !answer.contains(NOT_MEDIA_REPLY) {
            self.trigger_subscribe(message, &answer, ctx);
        }
    }

    fn form(&self, _ctx: &HostContext) -> PluginForm {
        let components = vec![form::form(vec![
            form::row(vec![
                form::col(6, form::switch("enabled", "Enable plugin")),
                form::col(6, form::switch("auto_subscribe", "Subscribe automatically")),
            ]),
            form::row(vec![
                form::col(6, form::text_field("openai_key", "OpenAI API key", "sk-...")),
                form::col(
                    6,
                    form::text_field("proxy", "Proxy", "http://127.0.0.1:7890, empty for none"),
                ),
            ]),
            form::row(vec![
                form::col(6, form::text_field("base_url", "API base URL", mediahook_config::DEFAULT_OPENAI_BASE_URL)),
                form::col(6, form::text_field("model", "Model", mediahook_config::DEFAULT_OPENAI_MODEL)),
            ]),
            form::row(vec![form::col(
                12,
                form::alert(
                    "Send a title as a message to get its type, year, cast and synopsis. \
                     With automatic subscribe on, recognized titles are subscribed.",
                ),
            )]),
        ])];

        PluginForm {
            components,
            defaults: json!({
                "enabled": false,
                "openai_key": "",
                "proxy": "",
                "auto_subscribe": false,
                "base_url": mediahook_config::DEFAULT_OPENAI_BASE_URL,
                "model": mediahook_config::DEFAULT_OPENAI_MODEL
            }),
        }
    }
}
