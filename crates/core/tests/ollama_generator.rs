//! Suggestion generator integration tests against an imitation Ollama server.

use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use tuneforge_core::{
    testing::fixtures, GeneratorConfig, LlmSuggestionGenerator, PreferencesConfig,
    SuggestionGenerator, SuggestionRequest,
};

/// Start a server answering `/api/generate` with `status` and `body`,
/// recording every request body.
async fn spawn_ollama(status: StatusCode, body: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let requests: Arc<Mutex<Vec<Value>>> = Arc::default();
    let log = requests.clone();

    let router = Router::new().route(
        "/api/generate",
        post(move |Json(request): Json<Value>| {
            let log = log.clone();
            let body = body.clone();
            async move {
                log.lock().unwrap().push(request);
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake Ollama");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    (format!("http://{addr}/"), requests)
}

fn generator(url: &str) -> LlmSuggestionGenerator {
    let mut config = GeneratorConfig::new(url, "llama3");
    config.temperature = 0.4;
    config.context_window = 8192;
    let preferences = PreferencesConfig {
        likes: "synths".to_string(),
        dislikes: "country".to_string(),
        favorite_artists: "Depeche Mode".to_string(),
    };
    LlmSuggestionGenerator::ollama(&config, preferences)
}

#[tokio::test]
async fn test_generate_parses_model_output() {
    let (url, requests) = spawn_ollama(
        StatusCode::OK,
        json!({
            "model": "llama3",
            "response": "Enjoy the Silence - Depeche Mode - Violator\n\
                         Tainted Love - Soft Cell\n\
                         Here are your songs!\n",
            "prompt_eval_count": 120,
            "eval_count": 40
        }),
    )
    .await;

    let tracks = generator(&url)
        .generate(SuggestionRequest {
            prompt: "dark synth pop",
            desired_count: 8,
            attempt_index: 0,
            prior_suggestions: &[],
        })
        .await;

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, "Enjoy the Silence");
    assert_eq!(tracks[0].album, "Violator");
    assert_eq!(tracks[1].artist, "Soft Cell");
    assert!(tracks[1].has_unknown_album());

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let body = &requests[0];
    assert_eq!(body["model"], "llama3");
    assert_eq!(body["stream"], false);
    assert_eq!(body["options"]["num_ctx"], 8192);
    let prompt = body["prompt"].as_str().unwrap();
    assert!(prompt.contains("exactly 8 unique songs"));
    assert!(prompt.contains("'dark synth pop'"));
    assert!(prompt.contains("User Favorite Artists: Depeche Mode"));
    assert!(!prompt.contains("DO NOT suggest"));
}

#[tokio::test]
async fn test_retry_prompt_lists_prior_suggestions() {
    let (url, requests) = spawn_ollama(
        StatusCode::OK,
        json!({"model": "llama3", "response": "Blue Monday - New Order - Power, Corruption & Lies"}),
    )
    .await;

    let prior = vec![
        fixtures::suggestion("Tainted Love", "Soft Cell"),
        fixtures::suggestion("Enjoy the Silence", "Depeche Mode"),
    ];
    let tracks = generator(&url)
        .generate(SuggestionRequest {
            prompt: "dark synth pop",
            desired_count: 10,
            attempt_index: 1,
            prior_suggestions: &prior,
        })
        .await;
    assert_eq!(tracks.len(), 1);

    let requests = requests.lock().unwrap();
    let prompt = requests[0]["prompt"].as_str().unwrap();
    assert!(prompt.contains("DO NOT suggest"));
    assert!(prompt.contains("Tainted Love"));
    assert!(prompt.contains("Enjoy the Silence"));
    assert!(prompt.contains("COMPLETELY DIFFERENT"));
}

#[tokio::test]
async fn test_server_error_yields_empty_batch() {
    let (url, _) = spawn_ollama(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "model 'llama3' not found"}),
    )
    .await;

    let tracks = generator(&url)
        .generate(SuggestionRequest {
            prompt: "anything",
            desired_count: 5,
            attempt_index: 0,
            prior_suggestions: &[],
        })
        .await;
    assert!(tracks.is_empty());
}

#[tokio::test]
async fn test_unreachable_server_yields_empty_batch() {
    let tracks = generator("http://127.0.0.1:1")
        .generate(SuggestionRequest {
            prompt: "anything",
            desired_count: 5,
            attempt_index: 0,
            prior_suggestions: &[],
        })
        .await;
    assert!(tracks.is_empty());
}
