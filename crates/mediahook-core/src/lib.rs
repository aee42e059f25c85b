pub mod events;
pub mod form;
pub mod format;
pub mod host;
pub mod plugin;
pub mod plugins;
pub mod scheduler;
pub mod title;

pub use events::{Event, EventBus, EventType};
pub use format::{NameTemplate, TemplateError};
pub use host::{HostContext, PluginHost};
pub use plugin::{Plugin, PluginCommand, PluginError, PluginForm, PluginMetadata};
pub use scheduler::{normalize_cron, JobFn, PluginScheduler, SchedulerError};
pub use title::{clean_name, parse_title, TitleError, TitleParser};
