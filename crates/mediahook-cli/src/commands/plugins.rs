use crate::output::Output;
use color_eyre::Result;
use mediahook_config::ConfigStore;
use mediahook_core::{HostContext, PluginHost};
use serde_json::json;

/// Host with every builtin plugin registered but not initialized, so listing
/// does not start schedulers or consume one-shot flags.
fn idle_host(store: &ConfigStore) -> Result<PluginHost> {
    let ctx = HostContext::from_store(store.clone())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to build plugin host: {}", e))?;
    Ok(PluginHost::with_builtin_plugins(ctx))
}

pub fn run_plugins(store: &ConfigStore, output: &Output) -> Result<()> {
    let config = super::snapshot(store)?;
    let enabled = config.enabled_plugins();
    let host = idle_host(store)?;

    let plugins: Vec<_> = host
        .metadata()
        .into_iter()
        .map(|(meta, _)| (meta, enabled.contains(&meta.id)))
        .collect();

    if !output.is_human() {
        let list: Vec<_> = plugins
            .iter()
            .map(|(meta, on)| json!({ "metadata": meta, "enabled": on }))
            .collect();
        output.json(&json!(list));
        return Ok(());
    }

    output.table(
        &["Id", "Name", "Version", "Order", "Enabled", "Description"],
        plugins
            .into_iter()
            .map(|(meta, on)| {
                vec![
                    meta.id.to_string(),
                    meta.name.to_string(),
                    meta.version.to_string(),
                    meta.order.to_string(),
                    if on { "yes" } else { "no" }.to_string(),
                    meta.description.to_string(),
                ]
            })
            .collect(),
    );
    Ok(())
}

pub fn run_form(store: &ConfigStore, id: &str, output: &Output) -> Result<()> {
    let host = idle_host(store)?;
    let plugin = host
        .plugin(id)
        .ok_or_else(|| color_eyre::eyre::eyre!("Unknown plugin: {}", id))?;

    let form = plugin.form(host.context());
    output.json(&serde_json::to_value(&form)?);
    Ok(())
}

pub fn run_page(store: &ConfigStore, id: &str, output: &Output) -> Result<()> {
    let host = idle_host(store)?;
    let plugin = host
        .plugin(id)
        .ok_or_else(|| color_eyre::eyre::eyre!("Unknown plugin: {}", id))?;

    match plugin.page() {
        Some(page) => output.json(&json!(page)),
        None => output.warn(format!("Plugin '{}' has no status page", id)),
    }
    Ok(())
}
