//! `stacky providers` subcommands.

use anyhow::{Result, anyhow};
use stacky_llms::OpenAIProvider;

use super::connect::{OPENAI, build_registry, runtime_config};
use crate::cli::ProvidersAction;
use crate::output;

pub async fn handle(action: ProvidersAction) -> Result<()> {
    match action {
        ProvidersAction::Info => info(),
        ProvidersAction::Models => models().await,
    }
}

fn info() -> Result<()> {
    let config = runtime_config(None, None)?;
    let registry = build_registry(&config);
    let status = if registry.list_providers().iter().any(|id| id == OPENAI) {
        "configured"
    } else {
        "missing API key"
    };

    output::header(&format!("Provider: {}", OPENAI));
    output::kv("status", status);
    output::kv("api key", OpenAIProvider::API_KEY_ENV);
    output::kv("base url", &config.base_url);
    output::kv("model", &config.model);
    if let Some(tokens) = config.max_input_tokens {
        output::kv("max input tokens", &tokens.to_string());
    }
    Ok(())
}

async fn models() -> Result<()> {
    let config = runtime_config(None, None)?;
    let provider = build_registry(&config).get_provider(OPENAI).map_err(|_| {
        anyhow!(
            "No API key configured. Set {} to list models.",
            OpenAIProvider::API_KEY_ENV
        )
    })?;

    let spinner = output::spinner(&format!("Fetching models from {}...", config.base_url));
    match provider.list_models().await {
        Ok(models) => {
            spinner.finish_and_clear();
            output::header(&format!("Models for {}", OPENAI));
            if models.is_empty() {
                output::dim("No models returned (endpoint may not support listing)");
                return Ok(());
            }
            output::list("Model", &models);
            Ok(())
        }
        Err(e) => {
            output::spinner_error(&spinner, "Failed to fetch models");
            Err(anyhow!("Failed to list models: {}", e))
        }
    }
}
