use crate::events::{Event, EventType};
use crate::host::HostContext;
use async_trait::async_trait;
use mediahook_config::Config;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failures inside a plugin handler. Handlers log these, they never reach the host.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("missing event field '{0}'")]
    MissingField(&'static str),
    #[error("invalid media id '{0}', expected <server>:<id>")]
    InvalidMediaId(String),
    #[error("media server '{0}' is not configured")]
    UnknownServer(String),
    #[error("media server '{server}' returned nothing for '{id}'")]
    NotFound { server: String, id: String },
}

/// Static description every plugin carries.
#[derive(Debug, Clone, Serialize)]
pub struct PluginMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub author_url: &'static str,
    pub config_prefix: &'static str,
    /// Lower loads first
    pub order: i32,
    /// Minimum user level allowed to use the plugin
    pub auth_level: u8,
}

/// A command string the host can invoke, mapped to an event and static payload.
#[derive(Debug, Clone, Serialize)]
pub struct PluginCommand {
    pub cmd: String,
    pub event: EventType,
    pub desc: String,
    pub data: Value,
}

impl PluginCommand {
    pub fn to_event(&self) -> Event {
        Event::with_data(self.event, self.data.clone())
    }
}

/// Configuration form: component tree plus the model defaults it edits.
#[derive(Debug, Clone, Serialize)]
pub struct PluginForm {
    pub components: Vec<Value>,
    pub defaults: Value,
}

#[async_trait]
pub trait Plugin: Send + Sync {
    fn metadata(&self) -> &'static PluginMetadata;

    /// (Re-)apply configuration. Must be safe to call repeatedly.
    async fn initialize(&mut self, config: &Config, ctx: &HostContext);

    fn enabled(&self) -> bool;

    /// Event types routed to [`Plugin::handle_event`]
    fn subscriptions(&self) -> &'static [EventType] {
        &[]
    }

    /// Handlers log their own failures; nothing propagates to the host.
    async fn handle_event(&self, _event: &Event, _ctx: &HostContext) {}

    fn commands(&self) -> Vec<PluginCommand> {
        Vec::new()
    }

    fn form(&self, ctx: &HostContext) -> PluginForm;

    fn page(&self) -> Option<Vec<Value>> {
        None
    }

    /// Whether a background scheduler is currently running for this plugin
    fn has_background_jobs(&self) -> bool {
        false
    }

    async fn shutdown(&mut self) {}
}
