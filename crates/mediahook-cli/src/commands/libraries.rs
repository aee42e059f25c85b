use crate::output::Output;
use color_eyre::Result;
use mediahook_config::ConfigStore;
use mediahook_core::plugins::embylibraryinfo::collect_library_summaries;
use mediahook_core::plugins::mediainfo::parse_media_id;
use mediahook_sources::MediaServerRegistry;

fn registry(store: &ConfigStore) -> Result<MediaServerRegistry> {
    let config = super::validated(store)?;
    let registry = MediaServerRegistry::from_config(&config);
    if registry.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "No media servers configured. Add a [[media_servers]] entry to the configuration"
        ));
    }
    Ok(registry)
}

pub async fn run_libraries(store: &ConfigStore, server: Option<String>, output: &Output) -> Result<()> {
    let registry = registry(store)?;

    let names: Vec<String> = match server {
        Some(name) if !registry.is_registered(&name) => {
            return Err(color_eyre::eyre::eyre!("Unknown media server: {}", name));
        }
        Some(name) => vec![name],
        None => registry.names().into_iter().map(String::from).collect(),
    };

    let rows = collect_library_summaries(&registry, &names).await;

    if !output.is_human() {
        output.json(&serde_json::to_value(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        output.warn("No library information available");
        return Ok(());
    }

    output.table(
        &["Server", "Library", "Type", "Items"],
        rows.into_iter()
            .map(|r| vec![r.server, r.name, r.type_, r.item_count.to_string()])
            .collect(),
    );
    Ok(())
}

pub async fn run_detail(store: &ConfigStore, mediaid: &str, output: &Output) -> Result<()> {
    let (server_name, item_id) = parse_media_id(mediaid).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let registry = registry(store)?;
    let server = registry
        .get(server_name)
        .ok_or_else(|| color_eyre::eyre::eyre!("Unknown media server: {}", server_name))?;

    let detail = server
        .get_media_detail(item_id)
        .await
        .ok_or_else(|| color_eyre::eyre::eyre!("No details for {} on {}", item_id, server_name))?;

    if !output.is_human() {
        output.json(&serde_json::to_value(&detail)?);
        return Ok(());
    }

    let mut rows = vec![
        vec!["Id".to_string(), detail.id],
        vec!["Name".to_string(), detail.name],
        vec!["Type".to_string(), detail.type_],
        vec![
            "Year".to_string(),
            detail.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
        ],
    ];
    let mut providers: Vec<_> = detail.provider_ids.into_iter().collect();
    providers.sort();
    rows.extend(providers.into_iter().map(|(k, v)| vec![k, v]));
    if let Some(overview) = detail.overview {
        rows.push(vec!["Overview".to_string(), overview]);
    }

    output.table(&["Field", "Value"], rows);
    Ok(())
}
