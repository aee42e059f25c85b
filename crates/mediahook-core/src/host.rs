use crate::events::{Event, EventBus};
use crate::plugin::{Plugin, PluginCommand, PluginMetadata};
use mediahook_config::{Config, ConfigStore, SUPPORTED_HOST_VERSION};
use mediahook_sources::{MediaServer, MediaServerRegistry};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Services the host hands to plugins: the event bus, the persisted
/// configuration and the configured media servers.
#[derive(Clone)]
pub struct HostContext {
    bus: EventBus,
    store: ConfigStore,
    servers: MediaServerRegistry,
    host_version: String,
}

impl HostContext {
    pub fn new(bus: EventBus, store: ConfigStore, servers: MediaServerRegistry, host_version: impl Into<String>) -> Self {
        Self {
            bus,
            store,
            servers,
            host_version: host_version.into(),
        }
    }

    /// Build everything from the store's current configuration.
    pub fn from_store(store: ConfigStore) -> anyhow::Result<Self> {
        let config = store.snapshot()?;
        let servers = MediaServerRegistry::from_config(&config);
        Ok(Self::new(EventBus::default(), store, servers, config.host_version))
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn servers(&self) -> &MediaServerRegistry {
        &self.servers
    }

    pub fn host_version(&self) -> &str {
        &self.host_version
    }

    pub fn send_event(&self, event: Event) {
        self.bus.send(event);
    }

    /// User-facing notification
    pub fn post_message(&self, title: &str, text: &str) {
        self.bus.send(Event::notice(title, text));
    }

    pub fn media_server(&self, name: &str) -> Option<Arc<dyn MediaServer>> {
        self.servers.get(name)
    }

    pub fn update_config<F>(&self, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Config),
    {
        self.store.update(f)
    }
}

/// Owns the plugins, routes events to them and drives their lifecycle.
pub struct PluginHost {
    ctx: HostContext,
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginHost {
    pub fn new(ctx: HostContext) -> Self {
        Self {
            ctx,
            plugins: Vec::new(),
        }
    }

    pub fn with_builtin_plugins(ctx: HostContext) -> Self {
        let mut host = Self::new(ctx);
        for plugin in crate::plugins::builtin_plugins() {
            host.register(plugin);
        }
        host
    }

    /// Plugins are kept sorted by their declared load order.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
        self.plugins.sort_by_key(|p| p.metadata().order);
    }

    pub fn context(&self) -> &HostContext {
        &self.ctx
    }

    pub fn version_supported(&self) -> bool {
        self.ctx.host_version() == SUPPORTED_HOST_VERSION
    }

    /// Initialize every plugin from the current configuration. When the host
    /// version is not supported the plugins are left untouched and inert.
    pub async fn initialize_all(&mut self) -> anyhow::Result<()> {
        if !self.version_supported() {
            debug!(
                host_version = self.ctx.host_version(),
                expected = SUPPORTED_HOST_VERSION,
                "Host version mismatch, plugins stay inactive"
            );
            return Ok(());
        }

        let config = self.ctx.store().snapshot()?;
        for plugin in &mut self.plugins {
            plugin.initialize(&config, &self.ctx).await;
            info!(
                operation = "plugin_initialized",
                plugin = plugin.metadata().id,
                enabled = plugin.enabled(),
                "Plugin initialized"
            );
        }
        Ok(())
    }

    /// Deliver `event` to every enabled plugin subscribed to its type.
    pub async fn dispatch(&self, event: &Event) {
        for plugin in &self.plugins {
            if !plugin.enabled() || !plugin.subscriptions().contains(&event.event_type) {
                continue;
            }
            debug!(plugin = plugin.metadata().id, event_type = %event.event_type, "Dispatching event");
            plugin.handle_event(event, &self.ctx).await;
        }
    }

    pub fn commands(&self) -> Vec<PluginCommand> {
        self.plugins
            .iter()
            .filter(|p| p.enabled())
            .flat_map(|p| p.commands())
            .collect()
    }

    /// Event for a command string such as `/emby_library_info`
    pub fn command_event(&self, cmd: &str) -> Option<Event> {
        let cmd = cmd.trim();
        self.commands()
            .into_iter()
            .find(|c| c.cmd == cmd)
            .map(|c| c.to_event())
    }

    pub fn metadata(&self) -> Vec<(&'static PluginMetadata, bool)> {
        self.plugins.iter().map(|p| (p.metadata(), p.enabled())).collect()
    }

    pub fn plugin(&self, id: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.metadata().id == id)
            .map(|p| &**p)
    }

    pub fn has_background_jobs(&self) -> bool {
        self.plugins.iter().any(|p| p.has_background_jobs())
    }

    pub async fn shutdown_all(&mut self) {
        for plugin in &mut self.plugins {
            plugin.shutdown().await;
            debug!(operation = "plugin_stopped", plugin = plugin.metadata().id, "Plugin stopped");
        }
    }

    /// Persist a plugin section change and re-initialize that plugin.
    pub async fn reload_plugin<F>(&mut self, id: &str, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Config),
    {
        self.ctx.update_config(f)?;
        let config = self.ctx.store().snapshot()?;
        match self.plugins.iter_mut().find(|p| p.metadata().id == id) {
            Some(plugin) => {
                plugin.initialize(&config, &self.ctx).await;
                Ok(())
            }
            None => {
                error!(plugin = id, "Reload requested for unknown plugin");
                Err(anyhow::anyhow!("Unknown plugin: {}", id))
            }
        }
    }
}
