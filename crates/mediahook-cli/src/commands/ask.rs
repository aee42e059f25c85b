use crate::output::Output;
use color_eyre::Result;
use mediahook_config::ConfigStore;
use mediahook_core::plugins::autosubscribe::{build_prompt, parse_media_analysis};
use mediahook_sources::OpenAiClient;
use serde_json::json;

pub async fn run_ask(store: &ConfigStore, message: &str, output: &Output) -> Result<()> {
    let config = super::snapshot(store)?;
    let settings = config.plugins.autosubscribe.unwrap_or_default();

    if settings.openai_key.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "No OpenAI key configured. Set openai_key under [plugins.autosubscribe]"
        ));
    }

    let proxy = Some(settings.proxy.as_str()).filter(|p| !p.trim().is_empty());
    let client = OpenAiClient::new(settings.openai_key.trim(), proxy)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create chat client: {}", e))?
        .with_base_url(settings.base_url.clone())
        .with_model(settings.model.clone())
        .with_temperature(settings.temperature);

    tracing::debug!(model = client.model(), "Asking chat model");

    let answer = client
        .try_chat_completion(&build_prompt(message))
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Chat completion failed: {}", e))?;

    let request = parse_media_analysis(message, &answer);

    if output.is_human() {
        output.info(&answer);
        match request {
            Some(request) => output.success(format!(
                "Would subscribe: {} ({})",
                request.name.unwrap_or_default(),
                request.year.unwrap_or_else(|| "unknown year".to_string())
            )),
            None => output.warn("No subscribable media found in the answer"),
        }
    } else {
        output.json(&json!({ "answer": answer, "subscribe": request }));
    }

    Ok(())
}
