use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use symcheck_bedrock::orchestrate::DEFAULT_CANDIDATE_TIMEOUT;
use symcheck_bedrock::provider::SamplingParams;

pub const REGION_VAR: &str = "AWS_REGION";
pub const MODELS_VAR: &str = "SYMCHECK_MODELS";
pub const TEMPERATURE_VAR: &str = "SYMCHECK_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "SYMCHECK_MAX_TOKENS";
pub const TIMEOUT_VAR: &str = "SYMCHECK_CANDIDATE_TIMEOUT_SECS";
pub const LISTEN_ADDR_VAR: &str = "SYMCHECK_LISTEN_ADDR";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Candidate models, cheapest first.
pub const DEFAULT_MODELS: &[&str] = &[
    "us.anthropic.claude-3-5-haiku-20241022-v1:0",
    "us.anthropic.claude-sonnet-4-20250514-v1:0",
];

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    /// Ordered fallback list; never empty.
    pub candidate_models: Vec<String>,
    pub sampling: SamplingParams,
    pub candidate_timeout: Duration,
    /// Only used when not running under Lambda.
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let region = get(REGION_VAR).unwrap_or_else(|| DEFAULT_REGION.to_string());

        let candidate_models = match get(MODELS_VAR) {
            Some(raw) => parse_models(&raw)?,
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        let defaults = SamplingParams::default();
        let temperature: f32 = parse_or(get(TEMPERATURE_VAR), TEMPERATURE_VAR, defaults.temperature)?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(eyre::eyre!(
                "{TEMPERATURE_VAR} must be between 0 and 1, got {temperature}"
            ));
        }

        let max_output_tokens: u32 =
            parse_or(get(MAX_TOKENS_VAR), MAX_TOKENS_VAR, defaults.max_output_tokens)?;
        if max_output_tokens == 0 {
            return Err(eyre::eyre!("{MAX_TOKENS_VAR} must be greater than 0"));
        }

        let timeout_secs: u64 =
            parse_or(get(TIMEOUT_VAR), TIMEOUT_VAR, DEFAULT_CANDIDATE_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(eyre::eyre!("{TIMEOUT_VAR} must be greater than 0"));
        }

        let listen_addr = get(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr
            .parse()
            .map_err(|e| eyre::eyre!("invalid {LISTEN_ADDR_VAR} '{listen_addr}': {e}"))?;

        Ok(Self {
            region,
            candidate_models,
            sampling: SamplingParams {
                temperature,
                max_output_tokens,
            },
            candidate_timeout: Duration::from_secs(timeout_secs),
            listen_addr,
        })
    }
}

/// Split a comma-separated model list, dropping blank entries.
fn parse_models(raw: &str) -> eyre::Result<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        return Err(eyre::eyre!("{MODELS_VAR} must list at least one model id"));
    }
    Ok(models)
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| eyre::eyre!("invalid {key} '{value}': {e}")),
        None => Ok(default),
    }
}
