//! Shared fixtures for server tests.

use axum::{
    Json, Router,
    body::Body,
    extract::Path,
    http::{Method, Request, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use voxbridge_conversation::InMemoryConversationStore;
use voxbridge_messaging::TelegramClient;
use voxbridge_relay::testing::{FakeSpeech, RecordingDelivery, ScriptedCompletion};
use voxbridge_relay::{DispatchConfig, Dispatcher, Orchestrator};
use voxbridge_server::{AppState, create_router};

pub const TOKEN: &str = "123456:test-token";
pub const WEBHOOK_BASE: &str = "https://bot.example";

/// A router wired to recording doubles.
pub struct TestApp {
    pub router: Router,
    pub dispatcher: Dispatcher,
    pub store: Arc<InMemoryConversationStore>,
    pub completion: ScriptedCompletion,
    pub delivery: RecordingDelivery,
}

impl TestApp {
    /// Drops the router and waits for every accepted update to finish.
    pub async fn drain(self) -> (Arc<InMemoryConversationStore>, ScriptedCompletion, RecordingDelivery) {
        let Self {
            router,
            dispatcher,
            store,
            completion,
            delivery,
        } = self;
        drop(router);
        dispatcher.shutdown().await;
        (store, completion, delivery)
    }
}

/// Builds the app. `api_base` is where webhook registration is sent.
pub fn test_app(api_base: &str) -> TestApp {
    let store = Arc::new(InMemoryConversationStore::new());
    let completion = ScriptedCompletion::echo();
    let delivery = RecordingDelivery::new();

    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        Arc::new(completion.clone()),
        Arc::new(delivery.clone()),
        Arc::new(FakeSpeech::new()),
    ));
    let dispatcher = Dispatcher::start(orchestrator, TOKEN, &DispatchConfig::default());

    let telegram = Arc::new(TelegramClient::new(api_base, TOKEN).unwrap());
    let state = AppState::new(
        dispatcher.handle(),
        telegram,
        format!("{WEBHOOK_BASE}/webhook/{TOKEN}"),
    );

    TestApp {
        router: create_router(state),
        dispatcher,
        store,
        completion,
        delivery,
    }
}

/// Builds a JSON request.
pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Starts a Bot API stand-in that answers `setWebhook` with `status` and
/// records the registered URLs.
pub async fn fake_bot_api(status: StatusCode) -> (String, Arc<Mutex<Vec<String>>>) {
    let urls: Arc<Mutex<Vec<String>>> = Arc::default();
    let recorded = Arc::clone(&urls);

    let router = Router::new().route(
        "/{bot}/setWebhook",
        post(move |Path(_bot): Path<String>, Json(body): Json<Value>| {
            let recorded = Arc::clone(&recorded);
            async move {
                if let Some(url) = body["url"].as_str() {
                    recorded.lock().unwrap().push(url.to_string());
                }
                (status, Json(json!({ "ok": status.is_success() })))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), urls)
}

/// A Bot API root nothing listens on.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:1";
