use crate::events::{Event, EventType};
use crate::form;
use crate::host::HostContext;
use crate::plugin::{Plugin, PluginCommand, PluginForm, PluginMetadata};
use crate::scheduler::{JobFn, PluginScheduler};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::FutureExt;
use mediahook_config::{Config, EmbyLibraryInfoConfig};
use mediahook_models::LibrarySummary;
use mediahook_sources::MediaServerRegistry;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

static METADATA: PluginMetadata = PluginMetadata {
    id: "embylibraryinfo",
    name: "Emby Library Info",
    description: "Collect basic information about Emby libraries and report it",
    version: "1.0",
    author: "thsrite",
    author_url: "https://github.com/thsrite",
    config_prefix: "embylibraryinfo_",
    order: 15,
    auth_level: 1,
};

pub const ACTION: &str = "emby_library_info";

const ONE_SHOT_DELAY: Duration = Duration::from_secs(3);

const NOTICE_TITLE: &str = "Emby library info";

#[derive(Debug, Clone)]
struct Report {
    generated_at: DateTime<Utc>,
    rows: Vec<LibrarySummary>,
}

type Snapshot = Arc<Mutex<Option<Report>>>;

/// The report job: walks the selected servers and their libraries.
pub struct LibraryReporter {
    ctx: HostContext,
    servers: Vec<String>,
    notify: bool,
    snapshot: Snapshot,
}

/// Walk every library of the named servers. Servers or libraries that fail
/// are logged and skipped.
pub async fn collect_library_summaries(servers: &MediaServerRegistry, names: &[String]) -> Vec<LibrarySummary> {
    let mut rows = Vec::new();
    for name in names {
        let Some(server) = servers.get(name) else {
            warn!(server = %name, "Media server not configured, skipping");
            continue;
        };

        let Some(libraries) = server.get_libraries().await else {
            warn!(server = %name, "Could not list libraries, skipping server");
            continue;
        };

        for library in &libraries {
            match server.get_library_items(&library.id).await {
                Some(listing) => {
                    info!(
                        server = %name,
                        library = %library.name,
                        library_type = %library.type_,
                        items = listing.item_count,
                        "Library summary"
                    );
                    rows.push(LibrarySummary::from_library(name, library, &listing));
                }
                None => warn!(server = %name, library = %library.name, "Could not fetch library items"),
            }
        }
    }
    rows
}

impl LibraryReporter {
    /// Runs the report, stores it for the status page and returns its rows.
    pub async fn run(&self) -> Vec<LibrarySummary> {
        info!(operation = "library_report", plugin = METADATA.id, servers = self.servers.len(), "Collecting library info");

        let rows = collect_library_summaries(self.ctx.servers(), &self.servers).await;

        match self.snapshot.lock() {
            Ok(mut snapshot) => {
                *snapshot = Some(Report {
                    generated_at: Utc::now(),
                    rows: rows.clone(),
                })
            }
            Err(e) => error!(plugin = METADATA.id, error = %e, "Snapshot lock poisoned"),
        }

        if self.notify {
            self.ctx.post_message(NOTICE_TITLE, &report_text(&rows));
        }

        rows
    }
}

pub fn report_text(rows: &[LibrarySummary]) -> String {
    if rows.is_empty() {
        return "No library information available".to_string();
    }
    rows.iter()
        .map(|r| format!("{} / {} ({}): {} items", r.server, r.name, r.type_, r.item_count))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct EmbyLibraryInfo {
    config: EmbyLibraryInfoConfig,
    scheduler: PluginScheduler,
    reporter: Option<Arc<LibraryReporter>>,
    snapshot: Snapshot,
}

impl Default for EmbyLibraryInfo {
    fn default() -> Self {
        Self {
            config: EmbyLibraryInfoConfig::default(),
            scheduler: PluginScheduler::new(METADATA.id),
            reporter: None,
            snapshot: Arc::new(Mutex::new(None)),
        }
    }
}

impl EmbyLibraryInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled_jobs(&self) -> usize {
        self.scheduler.job_count()
    }

    /// Selected servers, or every registered one when none are selected.
    fn resolve_servers(&self, ctx: &HostContext) -> Vec<String> {
        if self.config.mediaservers.is_empty() {
            return ctx.servers().names().into_iter().map(String::from).collect();
        }
        self.config
            .mediaservers
            .iter()
            .filter(|name| {
                let known = ctx.servers().is_registered(name);
                if !known {
                    warn!(plugin = METADATA.id, server = %name, "Selected media server is not registered");
                }
                known
            })
            .cloned()
            .collect()
    }

    fn job(reporter: &Arc<LibraryReporter>) -> JobFn {
        let reporter = reporter.clone();
        Arc::new(move || {
            let reporter = reporter.clone();
            async move {
                reporter.run().await;
            }
            .boxed()
        })
    }

    fn last_report(&self) -> Option<Report> {
        match self.snapshot.lock() {
            Ok(snapshot) => snapshot.clone(),
            Err(e) => {
                error!(plugin = METADATA.id, error = %e, "Snapshot lock poisoned");
                None
            }
        }
    }
}

#[async_trait]
impl Plugin for EmbyLibraryInfo {
    fn metadata(&self) -> &'static PluginMetadata {
        &METADATA
    }

    async fn initialize(&mut self, config: &Config, ctx: &HostContext) {
        self.scheduler.shutdown().await;

        self.config = config.plugins.embylibraryinfo.clone().unwrap_or_default();

        let reporter = Arc::new(LibraryReporter {
            ctx: ctx.clone(),
            servers: self.resolve_servers(ctx),
            notify: self.config.notify,
            snapshot: self.snapshot.clone(),
        });
        self.reporter = Some(reporter.clone());

        if self.config.onlyonce {
            match self.scheduler.add_one_shot(ONE_SHOT_DELAY, Self::job(&reporter)).await {
                Ok(_) => info!(plugin = METADATA.id, "Library report will run once shortly"),
                Err(e) => error!(plugin = METADATA.id, error = %e, "Failed to schedule one-shot report"),
            }

            self.config.onlyonce = false;
            let persisted = ctx.update_config(|cfg| {
                if let Some(ref mut section) = cfg.plugins.embylibraryinfo {
                    section.onlyonce = false;
                }
            });
            if let Err(e) = persisted {
                error!(plugin = METADATA.id, error = %e, "Failed to clear one-shot flag");
            }
        }

        let cron = self.config.cron.trim();
        if self.config.enabled && !cron.is_empty() {
            if let Err(e) = self.scheduler.add_cron(cron, Self::job(&reporter)).await {
                error!(plugin = METADATA.id, cron = cron, error = %e, "Invalid schedule");
                ctx.post_message(NOTICE_TITLE, &format!("Invalid schedule '{}': {}", cron, e));
            }
        }

        if let Err(e) = self.scheduler.start_if_jobs().await {
            error!(plugin = METADATA.id, error = %e, "Failed to start scheduler");
        }
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn subscriptions(&self) -> &'static [EventType] {
        &[EventType::PluginAction]
    }

    async fn handle_event(&self, event: &Event, _ctx: &HostContext) {
        if event.get_str("action") != Some(ACTION) {
            return;
        }
        let Some(ref reporter) = self.reporter else {
            return;
        };
        info!(plugin = METADATA.id, "Library report requested");
        reporter.run().await;
    }

    fn commands(&self) -> Vec<PluginCommand> {
        vec![PluginCommand {
            cmd: format!("/{}", ACTION),
            event: EventType::PluginAction,
            desc: "Emby library info".to_string(),
            data: json!({ "action": ACTION }),
        }]
    }

    fn form(&self, ctx: &HostContext) -> PluginForm {
        let servers = ctx.servers().names();
        let components = vec![form::form(vec![
            form::row(vec![
                form::col(4, form::switch("enabled", "Enable plugin")),
                form::col(4, form::switch("notify", "Send notification")),
                form::col(4, form::switch("onlyonce", "Run once now")),
            ]),
            form::row(vec![
                form::col(6, form::text_field("cron", "Schedule", "5-field cron, e.g. 0 3 * * *")),
                form::col(6, form::select("mediaservers", "Media servers", &servers, true)),
            ]),
            form::row(vec![form::col(
                12,
                form::alert("Reports every library of the selected Emby servers with its item count."),
            )]),
        ])];

        PluginForm {
            components,
            defaults: json!({
                "enabled": false,
                "onlyonce": false,
                "cron": "",
                "notify": true,
                "mediaservers": []
            }),
        }
    }

    fn page(&self) -> Option<Vec<Value>> {
        let Some(report) = self.last_report() else {
            return Some(vec![form::text("No library information yet")]);
        };
        let generated = report.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let cells = report
            .rows
            .into_iter()
            .map(|r| vec![r.server, r.name, r.type_, r.item_count.to_string()])
            .collect();
        Some(vec![
            form::text(&format!("Last report {}", generated)),
            form::table(&["Server", "Library", "Type", "Items"], cells),
        ])
    }

    fn has_background_jobs(&self) -> bool {
        self.scheduler.is_active()
    }

    async fn shutdown(&mut self) {
        self.scheduler.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahook_config::{default_config, ConfigStore};
    use tempfile::TempDir;

    fn config_with(section: EmbyLibraryInfoConfig) -> Config {
        let mut config = default_config();
        config.plugins.embylibraryinfo = Some(section);
        config
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_onlyonce_cleared_in_persisted_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = config_with(EmbyLibraryInfoConfig {
            onlyonce: true,
            notify: false,
            ..EmbyLibraryInfoConfig::default()
        });
        config.save_to_file(&path).unwrap();

        let ctx = HostContext::from_store(ConfigStore::load(path.clone()).unwrap()).unwrap();
        let mut plugin = EmbyLibraryInfo::new();
        plugin.initialize(&config, &ctx).await;

        assert_eq!(plugin.scheduled_jobs(), 1);
        assert!(plugin.has_background_jobs());

        let saved = Config::load_from_file(&path).unwrap();
        assert!(!saved.plugins.embylibraryinfo.unwrap().onlyonce);

        plugin.shutdown().await;
        assert!(!plugin.has_background_jobs());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_one_shot_only_goes_idle_after_running() {
        let config = config_with(EmbyLibraryInfoConfig {
            onlyonce: true,
            notify: false,
            ..EmbyLibraryInfoConfig::default()
        });
        let ctx = HostContext::from_store(ConfigStore::in_memory(config.clone())).unwrap();
        let mut plugin = EmbyLibraryInfo::new();
        plugin.initialize(&config, &ctx).await;
        assert!(plugin.has_background_jobs());

        tokio::time::sleep(ONE_SHOT_DELAY + Duration::from_secs(3)).await;
        assert!(plugin.page().unwrap()[0]["text"].as_str().unwrap().starts_with("Last report "));
        assert!(!plugin.has_background_jobs());
        plugin.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reinitialize_twice_keeps_one_job() {
        let config = config_with(EmbyLibraryInfoConfig {
            enabled: true,
            cron: "0 3 * * *".to_string(),
            ..EmbyLibraryInfoConfig::default()
        });
        let ctx = HostContext::from_store(ConfigStore::in_memory(config.clone())).unwrap();
        let mut plugin = EmbyLibraryInfo::new();

        plugin.initialize(&config, &ctx).await;
        plugin.initialize(&config, &ctx).await;

        assert_eq!(plugin.scheduled_jobs(), 1);
        assert!(plugin.has_background_jobs());
        plugin.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bad_cron_posts_notice_and_continues() {
        let config = config_with(EmbyLibraryInfoConfig {
            enabled: true,
            cron: "61 25 * * *".to_string(),
            ..EmbyLibraryInfoConfig::default()
        });
        let ctx = HostContext::from_store(ConfigStore::in_memory(config.clone())).unwrap();
        let mut rx = ctx.bus().subscribe();
        let mut plugin = EmbyLibraryInfo::new();

        plugin.initialize(&config, &ctx).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::NoticeMessage);
        assert!(event.get_str("text").unwrap().contains("61 25 * * *"));
        assert_eq!(plugin.scheduled_jobs(), 0);
        assert!(!plugin.has_background_jobs());
        assert!(plugin.enabled());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cron_ignored_when_disabled() {
        let config = config_with(EmbyLibraryInfoConfig {
            enabled: false,
            cron: "0 3 * * *".to_string(),
            ..EmbyLibraryInfoConfig::default()
        });
        let ctx = HostContext::from_store(ConfigStore::in_memory(config.clone())).unwrap();
        let mut plugin = EmbyLibraryInfo::new();
        plugin.initialize(&config, &ctx).await;
        assert_eq!(plugin.scheduled_jobs(), 0);
    }

    #[test]
    fn test_command_maps_to_plugin_action() {
        let commands = EmbyLibraryInfo::new().commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].cmd, "/emby_library_info");
        let event = commands[0].to_event();
        assert_eq!(event.event_type, EventType::PluginAction);
        assert_eq!(event.get_str("action"), Some(ACTION));
    }

    #[test]
    fn test_page_before_first_report() {
        let page = EmbyLibraryInfo::new().page().unwrap();
        assert_eq!(page[0]["component"], "div");
    }

    #[test]
    fn test_report_text() {
        let rows = vec![LibrarySummary {
            server: "home".to_string(),
            name: "Movies".to_string(),
            type_: "movies".to_string(),
            library_id: "1".to_string(),
            item_count: 42,
        }];
        assert_eq!(report_text(&rows), "home / Movies (movies): 42 items");
        assert_eq!(report_text(&[]), "No library information available");
    }
}
