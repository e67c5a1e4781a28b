use std::env;
use std::sync::Arc;

use symcheck_bedrock::converse::BedrockGenerator;
use symcheck_bedrock::orchestrate::Orchestrator;
use symcheck_lambda::config::Config;
use symcheck_lambda::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        region = %config.region,
        models = ?config.candidate_models,
        temperature = config.sampling.temperature,
        max_output_tokens = config.sampling.max_output_tokens,
        timeout_secs = config.candidate_timeout.as_secs(),
        "configuration loaded"
    );

    let generator = BedrockGenerator::from_region(&config.region).await;
    let orchestrator = Orchestrator::new(Arc::new(generator), config.candidate_models.clone())?
        .with_sampling(config.sampling)
        .with_candidate_timeout(config.candidate_timeout);

    let app = symcheck_lambda::app(AppState::new(orchestrator));

    if env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        return lambda_http::run(app).await.map_err(|e| eyre::eyre!(e));
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
