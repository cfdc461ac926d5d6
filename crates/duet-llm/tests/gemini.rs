use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
};
use serde_json::{Value, json};

use duet_llm::{GeminiClient, GenerateError, LlmConfig};
use duet_types::models::Tone;

/// (model path segment, query string, request body) per call.
#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<(String, HashMap<String, String>, Value)>>>);

/// Stand-in provider on an ephemeral port that answers every call with
/// `status` and `reply`.
async fn spawn_provider(status: StatusCode, reply: String) -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route(
            "/v1beta/models/{model}",
            post(
                move |State(rec): State<Recorded>,
                      Path(model): Path<String>,
                      Query(query): Query<HashMap<String, String>>,
                      Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        rec.0.lock().unwrap().push((model, query, body));
                        (status, reply)
                    }
                },
            ),
        )
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorded)
}

fn candidate(text: &str) -> String {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
}

fn client(base_url: String) -> GeminiClient {
    GeminiClient::new(LlmConfig {
        api_key: Some("test-key".into()),
        base_url,
        ..LlmConfig::default()
    })
}

#[tokio::test]
async fn prose_wrapped_output_yields_trimmed_prompt() {
    let (url, recorded) = spawn_provider(
        StatusCode::OK,
        candidate("Sure! {\"prompt\": \"  Which song is secretly about us?  \"} enjoy"),
    )
    .await;

    let prompt = client(url).generate_prompt("goofy", true).await.unwrap();
    assert_eq!(prompt, "Which song is secretly about us?");

    let calls = recorded.0.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (model, query, body) = &calls[0];
    assert_eq!(model, "gemini-2.0-flash:generateContent");
    assert_eq!(query.get("key").map(String::as_str), Some("test-key"));

    let config = &body["generationConfig"];
    assert_eq!(config["temperature"].as_f64(), Some(0.7));
    assert_eq!(config["topP"].as_f64(), Some(0.9));
    assert_eq!(config["maxOutputTokens"].as_u64(), Some(200));

    let instruction = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.contains("Tone: goofy."));
    assert!(instruction.contains("therapy language"));
}

#[tokio::test]
async fn every_tone_produces_a_prompt() {
    let (url, _) = spawn_provider(StatusCode::OK, candidate("```json\n{\"prompt\":\"hi\"}\n```")).await;
    let client = client(url);

    for tone in Tone::ALL {
        for less_therapy in [false, true] {
            let prompt = client.generate_prompt(tone.as_str(), less_therapy).await.unwrap();
            assert_eq!(prompt, "hi");
        }
    }
}

#[tokio::test]
async fn free_form_tone_reaches_the_instruction() {
    let (url, recorded) = spawn_provider(StatusCode::OK, candidate("{\"prompt\":\"hi\"}")).await;

    let prompt = client(url).generate_prompt("romantic", false).await.unwrap();
    assert_eq!(prompt, "hi");

    let calls = recorded.0.lock().unwrap();
    let instruction = calls[0].2["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.contains("Tone: romantic."));
}

#[tokio::test]
async fn upstream_status_and_body_are_surfaced() {
    let (url, _) = spawn_provider(StatusCode::TOO_MANY_REQUESTS, "quota exhausted".into()).await;

    match client(url).generate_prompt("cute", false).await {
        Err(GenerateError::Upstream { status, detail }) => {
            assert_eq!(status, 429);
            assert_eq!(detail, "quota exhausted");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_candidates_report_placeholder_raw_text() {
    let (url, _) = spawn_provider(StatusCode::OK, json!({ "candidates": [] }).to_string()).await;

    let err = client(url).generate_prompt("deep", false).await.unwrap_err();
    assert!(matches!(err, GenerateError::Parse { .. }));
    assert_eq!(err.raw(), Some("No content returned."));
}

#[tokio::test]
async fn output_without_prompt_field_is_reported() {
    let (url, _) = spawn_provider(StatusCode::OK, candidate("{\"question\": \"hi\"}")).await;

    let err = client(url).generate_prompt("cute", false).await.unwrap_err();
    assert!(matches!(err, GenerateError::MissingPrompt { .. }));
    assert_eq!(err.raw(), Some("{\"question\": \"hi\"}"));
}

#[tokio::test]
async fn missing_key_never_calls_provider() {
    let (url, recorded) = spawn_provider(StatusCode::OK, candidate("{\"prompt\":\"hi\"}")).await;
    let client = GeminiClient::new(LlmConfig {
        api_key: None,
        base_url: url,
        ..LlmConfig::default()
    });

    let err = client.generate_prompt("cute", false).await.unwrap_err();
    assert!(matches!(err, GenerateError::MissingCredential));
    assert!(recorded.0.lock().unwrap().is_empty());
}
