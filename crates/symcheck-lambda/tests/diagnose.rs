use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use symcheck_bedrock::error::{BedrockError, CandidateError};
use symcheck_bedrock::orchestrate::Orchestrator;
use symcheck_bedrock::provider::{GenerationRequest, RawGeneration, StructuredGenerator};
use symcheck_core::models::token_count::TokenUsage;
use symcheck_lambda::state::AppState;

/// Replies per model id with either raw output text or an invocation error,
/// recording every model it is asked for.
#[derive(Default)]
struct StubProvider {
    replies: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<String>>,
    user_prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    fn ok(mut self, model_id: &str, text: String) -> Self {
        self.replies.insert(model_id.to_string(), Ok(text));
        self
    }

    fn fail(mut self, model_id: &str, message: &str) -> Self {
        self.replies
            .insert(model_id.to_string(), Err(message.to_string()));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredGenerator for StubProvider {
    async fn generate(
        &self,
        model_id: &str,
        request: &GenerationRequest<'_>,
    ) -> Result<RawGeneration, BedrockError> {
        self.calls.lock().unwrap().push(model_id.to_string());
        self.user_prompts
            .lock()
            .unwrap()
            .push(request.user.to_string());
        match self.replies.get(model_id) {
            Some(Ok(text)) => Ok(RawGeneration {
                text: text.clone(),
                usage: TokenUsage::default(),
            }),
            Some(Err(message)) => Err(BedrockError::Invocation(message.clone())),
            None => Err(BedrockError::Invocation(format!("no reply for {model_id}"))),
        }
    }
}

fn diagnoses(conditions: &[&str]) -> String {
    let entries: Vec<Value> = conditions
        .iter()
        .map(|c| {
            json!({
                "condition": c,
                "severity": "mild",
                "confidence": "moderate",
                "recommendations": ["Rest", "Drink plenty of fluids"],
                "precautions": "Seek care if symptoms worsen.",
                "medications": [
                    { "name": "Acetaminophen", "dosage": "As directed on the label", "duration": "Up to 3 days" }
                ],
                "estimated_recovery_days": 3
            })
        })
        .collect();
    json!({ "diagnoses": entries }).to_string()
}

fn headache_body() -> Value {
    json!({
        "symptoms": "headache, mild fever, feeling tired",
        "age": "adult",
        "severity": "mild",
        "duration": "2-3 days",
        "medicalHistory": "none"
    })
}

fn app_with(provider: &Arc<StubProvider>, models: &[&str]) -> axum::Router {
    let orchestrator = Orchestrator::new(
        provider.clone(),
        models.iter().map(|m| m.to_string()).collect(),
    )
    .unwrap();
    symcheck_lambda::app(AppState::new(orchestrator))
}

async fn post_diagnose(app: axum::Router, body: String) -> (StatusCode, Option<String>, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/diagnose")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, content_type, json)
}

#[tokio::test]
async fn headache_scenario_returns_three_diagnoses() {
    let provider = Arc::new(StubProvider::default().ok(
        "primary",
        diagnoses(&["Viral upper respiratory infection", "Tension headache", "Dehydration"]),
    ));

    let (status, content_type, body) =
        post_diagnose(app_with(&provider, &["primary"]), headache_body().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let entries = body["diagnoses"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    for entry in entries {
        for key in ["condition", "severity", "confidence"] {
            assert!(!entry[key].as_str().unwrap().is_empty(), "{key} is empty");
        }
    }
    assert_eq!(provider.calls(), vec!["primary"]);
}

#[tokio::test]
async fn fallback_success_hides_the_earlier_failure() {
    let provider = Arc::new(
        StubProvider::default()
            .fail("a", "service unavailable")
            .ok("b", diagnoses(&["Cold", "Flu", "Allergic rhinitis"])),
    );

    let (status, _, body) =
        post_diagnose(app_with(&provider, &["a", "b"]), headache_body().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnoses"][0]["condition"], "Cold");
    assert!(body.get("error").is_none());
    assert!(!body.to_string().contains("service unavailable"));
    assert_eq!(provider.calls(), vec!["a", "b"]);
}

#[tokio::test]
async fn exhausted_candidates_report_the_last_reason() {
    let provider = Arc::new(
        StubProvider::default()
            .fail("a", "first outage")
            .fail("b", "second outage"),
    );

    let (status, _, body) =
        post_diagnose(app_with(&provider, &["a", "b"]), headache_body().to_string()).await;

    let expected =
        CandidateError::from(BedrockError::Invocation("second outage".to_string())).to_string();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Model did not return valid JSON");
    assert_eq!(body["detail"], expected.as_str());
}

#[tokio::test]
async fn too_few_diagnoses_from_every_candidate_is_a_bad_gateway() {
    let two = diagnoses(&["Cold", "Flu"]);
    let provider = Arc::new(
        StubProvider::default()
            .ok("a", two.clone())
            .ok("b", two),
    );

    let (status, _, body) =
        post_diagnose(app_with(&provider, &["a", "b"]), headache_body().to_string()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Model did not return valid JSON");
    assert!(body["detail"].as_str().unwrap().contains("$.diagnoses"));
    assert_eq!(provider.calls(), vec!["a", "b"]);
}

#[tokio::test]
async fn empty_body_is_rejected_before_any_model_call() {
    let provider = Arc::new(StubProvider::default().ok("a", diagnoses(&["A", "B", "C"])));

    let (status, _, body) = post_diagnose(app_with(&provider, &["a"]), "{}".to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Bad request or server error");
    assert_eq!(body["detail"], "symptoms: required");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn blank_symptoms_are_rejected_before_any_model_call() {
    let provider = Arc::new(StubProvider::default().ok("a", diagnoses(&["A", "B", "C"])));
    let mut body = headache_body();
    body["symptoms"] = json!("   ");

    let (status, _, _) = post_diagnose(app_with(&provider, &["a"]), body.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn malformed_json_body_is_an_internal_error() {
    let provider = Arc::new(StubProvider::default());

    let (status, _, body) =
        post_diagnose(app_with(&provider, &["a"]), "{\"symptoms\": ".to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Bad request or server error");
    assert!(!body["detail"].as_str().unwrap().is_empty());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn oversized_body_is_an_internal_error() {
    let provider = Arc::new(StubProvider::default().ok("a", diagnoses(&["A", "B", "C"])));
    let mut body = headache_body();
    body["symptoms"] = json!("x".repeat(3 * 1024 * 1024));

    let (status, content_type, body) =
        post_diagnose(app_with(&provider, &["a"]), body.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body["error"], "Bad request or server error");
    assert!(!body["detail"].as_str().unwrap().is_empty());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn patient_fields_reach_the_model_prompt() {
    let provider = Arc::new(StubProvider::default().ok("a", diagnoses(&["A", "B", "C"])));

    post_diagnose(app_with(&provider, &["a"]), headache_body().to_string()).await;

    let prompts = provider.user_prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("\"AGE_GROUP\":\"adult\""));
    assert!(prompts[0].contains("\"HISTORY_ALLERGIES\":\"none\""));
}

#[tokio::test]
async fn health_check_responds() {
    let provider = Arc::new(StubProvider::default());
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app_with(&provider, &["a"]).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(provider.calls().is_empty());
}
