use crate::output::Output;
use color_eyre::Result;
use mediahook_config::ConfigStore;
use mediahook_core::TitleParser;

pub fn run_parse(store: &ConfigStore, title: &str, format: Option<String>, output: &Output) -> Result<()> {
    let template = match format {
        Some(template) => template,
        None => super::snapshot(store)?
            .plugins
            .airecognition
            .map(|c| c.name_format)
            .unwrap_or_default(),
    };

    let parsed = TitleParser::new().with_name_format(template).parse(title);

    if !output.is_human() {
        output.json(&serde_json::to_value(&parsed)?);
        return Ok(());
    }

    let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    output.table(
        &["Field", "Value"],
        vec![
            vec!["Title".to_string(), parsed.title.clone()],
            vec!["Name".to_string(), show(parsed.name.clone())],
            vec!["Year".to_string(), show(parsed.year.clone())],
            vec!["Season".to_string(), show(parsed.season.map(|s| s.to_string()))],
            vec!["Episode".to_string(), show(parsed.episode.map(|e| e.to_string()))],
        ],
    );
    Ok(())
}
