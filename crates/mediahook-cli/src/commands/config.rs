use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::Result;
use mediahook_config::{default_config, Config, ConfigStore};
use std::path::PathBuf;

pub fn run_config(cmd: ConfigCommands, store: &ConfigStore, path: &PathBuf, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(store, path, full, output),
        ConfigCommands::Path => {
            output.info(path.display().to_string());
            Ok(())
        }
        ConfigCommands::Init { force } => init_config(path, force, output),
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Copy of `config` with API keys masked.
fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    for server in &mut config.media_servers {
        server.api_key = mask_string(&server.api_key);
    }
    if let Some(ref mut section) = config.plugins.autosubscribe {
        section.openai_key = mask_string(&section.openai_key);
    }
    config
}

fn show_config(store: &ConfigStore, path: &PathBuf, full: bool, output: &Output) -> Result<()> {
    if !path.exists() {
        output.warn(format!("Configuration file not found at: {}", path.display()));
        output.info("Showing defaults. Run 'mediahook config init' to write them.");
    }

    let config = super::snapshot(store)?;
    let config = if full { config } else { masked(&config) };

    if !output.is_human() {
        output.json(&serde_json::to_value(&config)?);
        return Ok(());
    }

    output.table(
        &["Config File", "Host Version"],
        vec![vec![path.display().to_string(), config.host_version.clone()]],
    );

    if config.media_servers.is_empty() {
        output.info("Media servers: none configured");
    } else {
        output.table(
            &["Server", "Type", "Host", "API Key", "User"],
            config
                .media_servers
                .iter()
                .map(|s| {
                    vec![
                        s.name.clone(),
                        s.type_.clone(),
                        s.host.clone(),
                        s.api_key.clone(),
                        s.user_id.clone(),
                    ]
                })
                .collect(),
        );
    }

    let enabled = config.enabled_plugins();
    let mut rows = Vec::new();
    if let Some(ref c) = config.plugins.airecognition {
        rows.push(vec![
            "airecognition".to_string(),
            format!("debug={} name_format={:?}", c.debug, c.name_format),
        ]);
    }
    if let Some(ref c) = config.plugins.autosubscribe {
        rows.push(vec![
            "autosubscribe".to_string(),
            format!(
                "openai_key={} proxy={:?} auto_subscribe={} model={}",
                c.openai_key, c.proxy, c.auto_subscribe, c.model
            ),
        ]);
    }
    if let Some(ref c) = config.plugins.embylibraryinfo {
        rows.push(vec![
            "embylibraryinfo".to_string(),
            format!(
                "cron={:?} notify={} onlyonce={} mediaservers={:?}",
                c.cron, c.notify, c.onlyonce, c.mediaservers
            ),
        ]);
    }
    if config.plugins.mediainfo.is_some() {
        rows.push(vec!["mediainfo".to_string(), String::new()]);
    }

    output.table(
        &["Plugin", "Enabled", "Settings"],
        rows.into_iter()
            .map(|mut row| {
                let on = enabled.contains(&row[0].as_str());
                row.insert(1, if on { "yes" } else { "no" }.to_string());
                row
            })
            .collect(),
    );
    Ok(())
}

fn init_config(path: &PathBuf, force: bool, output: &Output) -> Result<()> {
    if path.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {}. Use --force to overwrite.",
            path.display()
        ));
        return Ok(());
    }

    default_config()
        .save_to_file(path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", path.display(), e))?;
    output.success(format!("Wrote default configuration to {}", path.display()));
    Ok(())
}
