// Integration tests for the HTTP generation client against a mock server

use mock_interview::config::GenerationConfig;
use mock_interview::service::{
    GeminiClient, GenerativeService, QuestionProvisioner, ScoringClient, ServiceError,
    FALLBACK_QUESTIONS,
};
use mock_interview::session::AnswerRecord;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/models/test-model:generateContent";

fn generation_config(server: &MockServer) -> GenerationConfig {
    GenerationConfig {
        base_url: format!("{}/", server.uri()),
        model: "test-model".to_string(),
        credential_env: "MOCK_INTERVIEW_TEST_UNSET_KEY".to_string(),
        ..GenerationConfig::default()
    }
}

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&generation_config(server))
        .unwrap()
        .with_credential(Some("test-key".to_string()))
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test]
async fn test_generate_returns_first_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(query_param_is_missing("key"))
        .and(body_json(json!({
            "contents": [{ "parts": [{ "text": "Say hello" }] }]
        })))
        .respond_with(text_response("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server).generate("Say hello").await.unwrap();

    assert_eq!(text, "hello");
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = client(&server).generate("anything").await.unwrap_err();

    match err {
        ServiceError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_response_without_candidates_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client(&server).generate("anything").await.unwrap_err();

    assert!(matches!(err, ServiceError::MalformedResponse(_)));
    assert!(err.to_string().starts_with("Invalid response format from API"));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).generate("anything").await.unwrap_err();

    assert!(matches!(err, ServiceError::MalformedResponse(_)));
    assert!(!err.to_string().contains(&server.uri()));
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&generation_config(&server)).unwrap();
    assert!(!client.has_credential());

    let err = client.generate("anything").await.unwrap_err();
    assert!(matches!(err, ServiceError::MissingCredential));
}

#[tokio::test]
async fn test_provisioning_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(text_response("What is Rust?\n\n  What is ownership?  \n"))
        .mount(&server)
        .await;

    let provisioner = QuestionProvisioner::new(Arc::new(client(&server)), 2);
    let provisioned = provisioner.provision().await;

    assert!(!provisioned.is_fallback());
    assert_eq!(provisioned.questions, vec!["What is Rust?", "What is ownership?"]);
}

#[tokio::test]
async fn test_provisioning_falls_back_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provisioner = QuestionProvisioner::new(Arc::new(client(&server)), 5);
    let provisioned = provisioner.provision().await;

    assert!(provisioned.is_fallback());
    assert_eq!(provisioned.questions, FALLBACK_QUESTIONS);
}

#[tokio::test]
async fn test_scoring_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(text_response("Solid answers overall. Score: 81/100"))
        .mount(&server)
        .await;

    let answers = vec![AnswerRecord {
        question_index: 0,
        question_text: "What is Rust?".to_string(),
        transcript_text: "A systems language".to_string(),
        elapsed_secs: 12,
        committed_at: chrono::Utc::now(),
    }];

    let evaluation = ScoringClient::new(Arc::new(client(&server)))
        .evaluate(&answers)
        .await;

    assert!(evaluation.error.is_none());
    assert_eq!(evaluation.result.score, Some(81));
    assert_eq!(
        evaluation.result.feedback,
        "Solid answers overall. Score: 81/100"
    );
}
