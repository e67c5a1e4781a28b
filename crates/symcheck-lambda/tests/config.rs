use std::collections::HashMap;
use std::time::Duration;

use symcheck_lambda::config::{Config, DEFAULT_MODELS};

fn config_from(vars: &[(&str, &str)]) -> eyre::Result<Config> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.region, "us-east-1");
    assert_eq!(config.candidate_models, DEFAULT_MODELS);
    assert_eq!(config.sampling.temperature, 0.25);
    assert_eq!(config.sampling.max_output_tokens, 900);
    assert_eq!(config.candidate_timeout, Duration::from_secs(30));
    assert_eq!(config.listen_addr.to_string(), "127.0.0.1:3000");
}

#[test]
fn model_list_keeps_order_and_drops_blanks() {
    let config = config_from(&[("SYMCHECK_MODELS", " model-a, ,model-b ,")]).unwrap();
    assert_eq!(config.candidate_models, vec!["model-a", "model-b"]);
}

#[test]
fn model_list_without_ids_is_rejected() {
    assert!(config_from(&[("SYMCHECK_MODELS", " , ,")]).is_err());
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let config = config_from(&[("AWS_REGION", "  "), ("SYMCHECK_MAX_TOKENS", "")]).unwrap();
    assert_eq!(config.region, "us-east-1");
    assert_eq!(config.sampling.max_output_tokens, 900);
}

#[test]
fn overrides_are_parsed() {
    let config = config_from(&[
        ("AWS_REGION", "eu-west-1"),
        ("SYMCHECK_TEMPERATURE", "0.1"),
        ("SYMCHECK_MAX_TOKENS", "1500"),
        ("SYMCHECK_CANDIDATE_TIMEOUT_SECS", "12"),
        ("SYMCHECK_LISTEN_ADDR", "0.0.0.0:8080"),
    ])
    .unwrap();

    assert_eq!(config.region, "eu-west-1");
    assert_eq!(config.sampling.temperature, 0.1);
    assert_eq!(config.sampling.max_output_tokens, 1500);
    assert_eq!(config.candidate_timeout, Duration::from_secs(12));
    assert_eq!(config.listen_addr.port(), 8080);
}

#[test]
fn invalid_values_are_startup_errors() {
    for (key, value) in [
        ("SYMCHECK_TEMPERATURE", "warm"),
        ("SYMCHECK_TEMPERATURE", "1.5"),
        ("SYMCHECK_MAX_TOKENS", "0"),
        ("SYMCHECK_MAX_TOKENS", "-3"),
        ("SYMCHECK_CANDIDATE_TIMEOUT_SECS", "0"),
        ("SYMCHECK_LISTEN_ADDR", "localhost"),
    ] {
        let err = config_from(&[(key, value)]).unwrap_err();
        assert!(err.to_string().contains(key), "{key}={value}: {err}");
    }
}
