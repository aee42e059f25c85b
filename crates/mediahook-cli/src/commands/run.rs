use crate::output::Output;
use color_eyre::Result;
use mediahook_config::ConfigStore;
use mediahook_core::{Event, EventType, HostContext, PluginHost};
use owo_colors::OwoColorize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// What a line typed on stdin asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum LineInput<'a> {
    Empty,
    Command(&'a str),
    Title(&'a str),
    Message(&'a str),
}

pub fn classify_line(line: &str) -> LineInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineInput::Empty;
    }
    if line.starts_with('/') {
        return LineInput::Command(line);
    }
    if let Some(title) = line.strip_prefix("title:") {
        let title = title.trim();
        return if title.is_empty() { LineInput::Empty } else { LineInput::Title(title) };
    }
    LineInput::Message(line)
}

fn line_to_event(host: &PluginHost, line: &str) -> Option<Event> {
    match classify_line(line) {
        LineInput::Empty => None,
        LineInput::Command(cmd) => {
            let event = host.command_event(cmd);
            if event.is_none() {
                warn!(command = cmd, "Unknown or disabled plugin command");
            }
            event
        }
        LineInput::Title(title) => Some(Event::new(EventType::NameRecognize).with("title", title)),
        LineInput::Message(text) => Some(Event::new(EventType::UserMessage).with("text", text)),
    }
}

fn print_event(event: &Event, output: &Output) {
    if !output.is_human() {
        match serde_json::to_value(event) {
            Ok(value) => output.json(&value),
            Err(e) => error!(error = %e, "Failed to encode event"),
        }
        return;
    }

    if event.event_type == EventType::NoticeMessage {
        output.info(format!(
            "{} {}\n{}",
            "●".cyan(),
            event.get_str("title").unwrap_or_default().bold(),
            event.get_str("text").unwrap_or_default()
        ));
        return;
    }

    let fields = serde_json::to_string(&event.data).unwrap_or_default();
    output.info(format!("{} {}", event.event_type.to_string().cyan(), fields));
}

pub async fn run_host(store: ConfigStore, output: &Output) -> Result<()> {
    super::validated(&store)?;

    let ctx = HostContext::from_store(store)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to build plugin host: {}", e))?;
    let mut host = PluginHost::with_builtin_plugins(ctx);

    // Subscribe first so notices raised during initialization are printed
    let mut events = host.context().bus().subscribe();

    host.initialize_all()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to initialize plugins: {}", e))?;

    info!(
        operation = "host_started",
        plugins = host.metadata().iter().filter(|(_, on)| *on).count(),
        background_jobs = host.has_background_jobs(),
        "Plugin host running"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    // After EOF, leave once every scheduled job has finished
    let mut idle_check = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => {
                info!(operation = "host_interrupted", "Interrupted, shutting down");
                break;
            }

            received = events.recv() => match received {
                Ok(event) => {
                    print_event(&event, output);
                    host.dispatch(&event).await;
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event printer fell behind"),
                Err(RecvError::Closed) => break,
            },

            _ = idle_check.tick(), if !stdin_open => {
                if !host.has_background_jobs() {
                    info!("Scheduled jobs finished");
                    break;
                }
            }

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if let Some(event) = line_to_event(&host, &line) {
                        host.context().send_event(event);
                    }
                }
                Ok(None) => {
                    stdin_open = false;
                    if !host.has_background_jobs() {
                        break;
                    }
                    info!("Input closed, waiting for scheduled jobs (Ctrl-C to stop)");
                }
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                    if !host.has_background_jobs() {
                        break;
                    }
                }
            },
        }
    }

    host.shutdown_all().await;
    info!(operation = "host_stopped", "Plugin host stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("   "), LineInput::Empty);
        assert_eq!(classify_line("/emby_library_info"), LineInput::Command("/emby_library_info"));
        assert_eq!(classify_line("title: Show.S01E02 "), LineInput::Title("Show.S01E02"));
        assert_eq!(classify_line("title:"), LineInput::Empty);
        assert_eq!(classify_line(" Arrival 2016 "), LineInput::Message("Arrival 2016"));
    }
}
