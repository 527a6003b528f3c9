mod common;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::context;
use ragchat_core::config::GenerationSettings;
use ragchat_llm::{GenerateOptions, GenerationError, Generator, OllamaClient, PromptDispatcher};

#[derive(Clone, Default)]
struct Stub {
    last_body: Arc<Mutex<Option<Value>>>,
    hits: Arc<AtomicUsize>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

fn client(url: &str, retries: u32) -> OllamaClient {
    OllamaClient::new(url, "mistral:7b-instruct-v0.3-q4_1", Duration::from_secs(5), retries).unwrap()
}

async fn ok_generate(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    *stub.last_body.lock().unwrap() = Some(body);
    Json(json!({ "response": "generated text", "done": true }))
}

async fn failing_generate(State(stub): State<Stub>) -> (StatusCode, &'static str) {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "model crashed")
}

async fn flaky_generate(State(stub): State<Stub>) -> (StatusCode, Json<Value>) {
    if stub.hits.fetch_add(1, Ordering::SeqCst) == 0 {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "loading" })))
    } else {
        (StatusCode::OK, Json(json!({ "response": "second try" })))
    }
}

async fn tags() -> Json<Value> {
    Json(json!({ "models": [{ "name": "mistral:7b-instruct-v0.3-q4_1" }, { "name": "llama3:8b" }] }))
}

#[tokio::test]
async fn generate_sends_non_streaming_request() {
    let stub = Stub::default();
    let url = serve(Router::new().route("/api/generate", post(ok_generate)).with_state(stub.clone())).await;
    let c = client(&url, 0);

    let out = c.generate("prompt text", Some("be brief"), GenerateOptions::unload_after()).await.unwrap();
    assert_eq!(out, "generated text");

    let body = stub.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "mistral:7b-instruct-v0.3-q4_1");
    assert_eq!(body["prompt"], "prompt text");
    assert_eq!(body["stream"], false);
    assert_eq!(body["system"], "be brief");
    assert_eq!(body["keep_alive"], 0);
    assert!(body.get("options").is_none());
}

#[tokio::test]
async fn http_500_surfaces_as_markdown_answer() {
    let stub = Stub::default();
    let url = serve(Router::new().route("/api/generate", post(failing_generate)).with_state(stub.clone())).await;
    let c = Arc::new(client(&url, 0));

    let err = c.generate("p", None, GenerateOptions::default()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Status { status: 500, .. }));

    let d = PromptDispatcher::new(c, &GenerationSettings::default());
    let answer = d.respond("What is CI?", &context()).await;
    assert!(answer.starts_with("# Error"));
    assert!(answer.contains("model crashed"));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let stub = Stub::default();
    let url = serve(Router::new().route("/api/generate", post(flaky_generate)).with_state(stub.clone())).await;

    let out = client(&url, 1).generate("p", None, GenerateOptions::default()).await.unwrap();
    assert_eq!(out, "second try");
    assert_eq!(stub.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreachable_service_is_a_connection_error() {
    let c = client("http://127.0.0.1:9", 0);
    let err = c.generate("p", None, GenerateOptions::default()).await.unwrap_err();
    assert!(err.is_connection());
    assert!(err.to_markdown().starts_with("# Connection Error"));
    assert!(!c.health_check().await);
    assert!(!c.check_availability().await);
}

#[tokio::test]
async fn models_are_listed_and_checked() {
    let url = serve(Router::new().route("/api/tags", get(tags))).await;
    let c = client(&url, 0);
    assert!(c.health_check().await);
    assert_eq!(c.list_models().await.unwrap(), vec!["mistral:7b-instruct-v0.3-q4_1", "llama3:8b"]);
    assert!(c.check_availability().await);

    c.set_model("phi3:mini");
    assert_eq!(c.model(), "phi3:mini");
    assert!(!c.check_availability().await);
}
