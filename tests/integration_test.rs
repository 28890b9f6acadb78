use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use readme_game::api;
use readme_game::config::SessionConfig;
use readme_game::llm::{
    GenerateRequest, GenerateResponse, LlmConfig, LlmError, LlmManager, LlmProvider, LlmResult,
    ResponseMetadata,
};
use readme_game::state::AppState;
use readme_game::types::Prompt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Stands in for a vendor provider and replies with canned text
struct CannedProvider {
    name: &'static str,
    reply: Option<String>,
}

#[async_trait]
impl LlmProvider for CannedProvider {
    async fn generate(&self, _request: GenerateRequest) -> LlmResult<GenerateResponse> {
        match &self.reply {
            Some(text) => Ok(GenerateResponse {
                text: text.clone(),
                metadata: ResponseMetadata {
                    provider: self.name.to_string(),
                    model: "canned".to_string(),
                    tokens_used: Some(42),
                    latency_ms: 3,
                },
            }),
            None => Err(LlmError::RateLimit),
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

fn app(reply: Option<&str>) -> Router {
    app_with_provider("google", reply)
}

fn app_with_provider(name: &'static str, reply: Option<&str>) -> Router {
    let provider: Arc<dyn LlmProvider> = Arc::new(CannedProvider {
        name,
        reply: reply.map(str::to_string),
    });
    let state = AppState::new(
        LlmManager::new(vec![provider]),
        LlmConfig::default(),
        SessionConfig::default(),
    );
    api::router(Arc::new(state))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn dog_round(description: &str) -> Value {
    json!({
        "prompt": {
            "word": "Dog",
            "forbiddenWords": ["bark", "pet", "puppy", "canine", "woof"],
            "difficulty": "easy"
        },
        "description": description
    })
}

#[tokio::test]
async fn test_health() {
    let response = app(None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guess_pads_partial_reply() {
    let (status, body) = send(
        app(Some("**GUESS 1:** \"Wolf\" - wild cousin\nI am out of ideas.")),
        "POST",
        "/api/guess",
        Some(json!({ "description": "a loyal friend" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let guesses = body["guesses"].as_array().unwrap();
    assert_eq!(guesses.len(), 3);
    assert_eq!(guesses[0]["word"], "Wolf");
    assert_eq!(guesses[0]["reasoning"], "wild cousin");
    assert_eq!(guesses[1]["word"], "[No guess]");
    assert_eq!(guesses[2]["reasoning"], "Could not parse response");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_guess_requires_description() {
    let (status, body) = send(
        app(Some("GUESS 1: Dog - loyal")),
        "POST",
        "/api/guess",
        Some(json!({ "description": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(body["guesses"], json!([]));
}

#[tokio::test]
async fn test_guess_provider_failure_is_500() {
    let (status, body) = send(
        app(None),
        "POST",
        "/api/guess",
        Some(json!({ "description": "a loyal friend" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["guesses"], json!([]));
    assert!(body["error"].as_str().unwrap().starts_with("AI error: "));
}

#[tokio::test]
async fn test_guess_unconfigured_provider_without_key() {
    let (status, body) = send(
        app(Some("GUESS 1: Dog - loyal")),
        "POST",
        "/api/guess",
        Some(json!({ "description": "a loyal friend", "provider": "openai" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_guess_uses_only_server_provider() {
    let (status, body) = send(
        app_with_provider("openai", Some("GUESS 1: Dog - loyal")),
        "POST",
        "/api/guess",
        Some(json!({ "description": "a loyal friend" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guesses"][0]["word"], "Dog");
}

#[tokio::test]
async fn test_round_uses_only_server_provider() {
    let reply = "GUESS 1: Dog - loyal\nGUESS 2: Wolf - wild\nGUESS 3: Fox - sly";
    let (status, body) = send(
        app_with_provider("openai", Some(reply)),
        "POST",
        "/api/round",
        Some(dog_round("man's best friend")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedIndex"], 0);
    assert_eq!(body["points"], 100);
}

#[tokio::test]
async fn test_round_scores_second_guess() {
    let reply = "GUESS 1: Cat - independent\nGUESS 2: Dog - loyal companion\nGUESS 3: Horse - rideable";
    let (status, body) = send(
        app(Some(reply)),
        "POST",
        "/api/round",
        Some(dog_round("man's best friend, wags its tail")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedIndex"], 1);
    assert_eq!(body["points"], 75);
    assert_eq!(body["guesses"].as_array().unwrap().len(), 3);
    assert!(!body["roundId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_round_miss_scores_zero() {
    let (status, body) = send(
        app(Some("Honestly I have no idea.")),
        "POST",
        "/api/round",
        Some(dog_round("man's best friend")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedIndex"], Value::Null);
    assert_eq!(body["points"], 0);
}

#[tokio::test]
async fn test_round_rejects_forbidden_words() {
    let (status, body) = send(
        app(Some("GUESS 1: Dog - loyal")),
        "POST",
        "/api/round",
        Some(dog_round("it goes WOOF at the mailman")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["violations"], json!(["woof"]));
}

#[tokio::test]
async fn test_round_rejects_secret_word() {
    let (status, body) = send(
        app(Some("GUESS 1: Dog - loyal")),
        "POST",
        "/api/round",
        Some(dog_round("a dog")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["violations"], json!(["Dog"]));
}

#[tokio::test]
async fn test_prompts_listing() {
    let (status, body) = send(app(None), "GET", "/api/prompts", None).await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<Prompt> = serde_json::from_value(body).unwrap();
    assert_eq!(all.len(), 60);

    let (status, body) = send(app(None), "GET", "/api/prompts?difficulty=hard", None).await;
    assert_eq!(status, StatusCode::OK);
    let hard: Vec<Prompt> = serde_json::from_value(body).unwrap();
    assert_eq!(hard.len(), 20);
    assert!(hard.iter().all(|p| p.forbidden_words.len() == 5));
}
