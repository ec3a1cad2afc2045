use anyhow::{Context, Result};
use mock_interview::{Config, GeminiClient, QuestionProvisioner};
use std::sync::Arc;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/mock-interview")?;

    info!("Mock Interview v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!(
        "Generation service: {} ({})",
        cfg.generation.base_url, cfg.generation.model
    );

    let client = GeminiClient::new(&cfg.generation).context("Failed to build HTTP client")?;
    if !client.has_credential() {
        info!(
            "Set {} to generate questions; the built-in set will be used",
            cfg.generation.credential_env
        );
    }

    let provisioner = QuestionProvisioner::new(Arc::new(client), cfg.generation.question_count);
    let provisioned = provisioner.provision().await;

    if let Some(reason) = &provisioned.fallback_reason {
        info!("Using built-in questions: {}", reason);
    }
    for (index, question) in provisioned.questions.iter().enumerate() {
        info!("Question {}: {}", index + 1, question);
    }

    Ok(())
}
