//! `diagram-engine`: HTTP service that turns algorithm descriptions into
//! flowchart images.

use std::sync::Arc;

use anyhow::Context;
use engine::{AppState, EngineConfig};
use llm::{ChatCompletionsClient, LlmConfig};
use renderer::GraphvizRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let telemetry = cli::telemetry::init("diagram-engine")?;

    let config = EngineConfig::from_lookup(cli::env_var).context("invalid service configuration")?;
    let llm_config = LlmConfig::from_lookup(cli::env_var).context("invalid LLM configuration")?;
    tracing::info!(
        bind = %config.bind,
        model = %llm_config.model,
        dot = %config.dot_binary.display(),
        "starting diagram engine"
    );

    let generator = Arc::new(ChatCompletionsClient::new(llm_config));
    let renderer = Arc::new(GraphvizRenderer::new(
        config.dot_binary.clone(),
        config.output_stem.clone(),
    ));
    let state = AppState::new(generator, renderer);

    let result = engine::serve(config.bind, state, cli::shutdown_signal()).await;
    telemetry.shutdown();
    result.context("diagram engine stopped with an error")
}
