//! HTTP routes with a scripted model and a fixed encyclopedia

use async_trait::async_trait;
use futures::stream;
use medassist::chat::Assistant;
use medassist::fallback::FallbackSource;
use medassist::llm::{
    ContentDelta, EventStream, FinishReason, GenerateRequest, GenerationConfig, LlmError,
    LlmProvider, StreamEvent, UsageMetadata,
};
use medassist::models::ThreadResponse;
use medassist::render::Branding;
use medassist::routes::configure_routes;
use medassist::state::AppState;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Filter;

/// Answers with fixed chunks, or fails when `chunks` is `None`
struct ScriptedProvider {
    chunks: Option<Vec<&'static str>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    fn new(chunks: Option<Vec<&'static str>>) -> Arc<Self> {
        Arc::new(Self {
            chunks,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.requests.lock().unwrap().push(request);

        let chunks = self.chunks.clone().ok_or_else(|| LlmError::ProviderError {
            code: "UNAVAILABLE".to_string(),
            message: "model overloaded".to_string(),
        })?;

        let mut events: Vec<Result<StreamEvent, LlmError>> = chunks
            .into_iter()
            .map(|text| {
                Ok(StreamEvent::ContentDelta {
                    index: 0,
                    delta: ContentDelta::TextDelta {
                        text: text.to_string(),
                    },
                })
            })
            .collect();
        events.push(Ok(StreamEvent::MessageEnd {
            finish_reason: FinishReason::Stop,
            usage: UsageMetadata::default(),
        }));

        Ok(Box::pin(stream::iter(events)))
    }
}

struct FixedSummary;

#[async_trait]
impl FallbackSource for FixedSummary {
    async fn summary(&self, condition: &str) -> String {
        format!("{} is a condition described by the encyclopedia....", condition)
    }
}

fn routes_with(
    provider: Arc<ScriptedProvider>,
) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
    let assistant = Assistant::new(provider, Arc::new(FixedSummary), GenerationConfig::default());
    configure_routes(AppState::new(assistant, Branding::default()))
}

fn thread_path(id: Uuid) -> String {
    format!("/api/v1/threads/{}", id)
}

async fn post_message<F>(routes: &F, id: Uuid, text: &str) -> warp::http::Response<bytes::Bytes>
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    warp::test::request()
        .method("POST")
        .path(&thread_path(id))
        .json(&serde_json::json!({ "text": text }))
        .reply(routes)
        .await
}

#[tokio::test]
async fn test_index_serves_widget_page() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["ok"])));

    let res = warp::test::request().method("GET").path("/").reply(&routes).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(res.body().to_vec()).unwrap();
    assert!(body.contains("AI Medical Assistant"));
    assert!(body.contains("Type your medical condition here..."));
}

#[tokio::test]
async fn test_healthz() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["ok"])));

    let res = warp::test::request().method("GET").path("/healthz").reply(&routes).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body().as_ref(), b"ok");
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let provider = ScriptedProvider::new(Some(vec!["ok"]));
    let routes = routes_with(provider.clone());

    let res = post_message(&routes, Uuid::new_v4(), "   ").await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["error"], "message text must not be empty");
    assert!(provider.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["ok"])));

    let res = warp::test::request()
        .method("POST")
        .path(&thread_path(Uuid::new_v4()))
        .header("content-type", "application/json")
        .body("{\"message\": 1}")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["ok"])));

    let res = warp::test::request().method("GET").path("/api/v1/nope").reply(&routes).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_model_reply_streams_and_is_stored() {
    let provider = ScriptedProvider::new(Some(vec!["**Asthma** narrows ", "the airways."]));
    let routes = routes_with(provider.clone());
    let id = Uuid::new_v4();

    let res = post_message(&routes, id, "asthma").await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(res.body().to_vec()).unwrap();
    let user_at = body.find("user_message").unwrap();
    let text_at = body.find("agent_text").unwrap();
    let final_at = body.find("agent_message").unwrap();
    let done_at = body.find("done").unwrap();
    assert!(user_at < text_at && text_at < final_at && final_at < done_at);
    assert!(body.contains("highlighted-term"));
    assert!(!body.contains("notice"));

    let res = warp::test::request().method("GET").path(&thread_path(id)).reply(&routes).await;
    assert_eq!(res.status(), StatusCode::OK);
    let thread: ThreadResponse = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(thread.thread_id, id);
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[0].text, "asthma");
    assert_eq!(thread.messages[1].text, "**Asthma** narrows the airways.");
    assert!(thread.messages[1].html.contains("<strong>"));
}

#[tokio::test]
async fn test_history_is_replayed_on_next_turn() {
    let provider = ScriptedProvider::new(Some(vec!["Diabetes affects blood sugar."]));
    let routes = routes_with(provider.clone());
    let id = Uuid::new_v4();

    post_message(&routes, id, "diabetes").await;
    post_message(&routes, id, "what about treatment?").await;

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[1].messages[1].content, "Diabetes affects blood sugar.");
}

#[tokio::test]
async fn test_provider_failure_falls_back_to_encyclopedia() {
    let routes = routes_with(ScriptedProvider::new(None));
    let id = Uuid::new_v4();

    let res = post_message(&routes, id, "Hypertension").await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(res.body().to_vec()).unwrap();
    assert!(body.contains("notice"));
    assert!(body.contains("Gemini failed"));
    assert!(body.contains(r#""source":"encyclopedia""#));

    let res = warp::test::request().method("GET").path(&thread_path(id)).reply(&routes).await;
    let thread: ThreadResponse = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(
        thread.messages[1].text,
        "Hypertension is a condition described by the encyclopedia...."
    );
}

#[tokio::test]
async fn test_blank_reply_falls_back_with_warning() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["  ", "\n"])));

    let res = post_message(&routes, Uuid::new_v4(), "asthma").await;

    let body = String::from_utf8(res.body().to_vec()).unwrap();
    assert!(body.contains(r#""level":"warning""#));
    assert!(body.contains("Gemini gave no response"));
}

#[tokio::test]
async fn test_delete_clears_thread() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["ok"])));
    let id = Uuid::new_v4();
    post_message(&routes, id, "asthma").await;

    let res = warp::test::request().method("DELETE").path(&thread_path(id)).reply(&routes).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = warp::test::request().method("GET").path(&thread_path(id)).reply(&routes).await;
    let thread: ThreadResponse = serde_json::from_slice(res.body()).unwrap();
    assert!(thread.messages.is_empty());
}

#[tokio::test]
async fn test_concurrent_threads_each_get_their_reply() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["Cancer ", "overview."])));
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let (res_a, res_b) = tokio::join!(
        post_message(&routes, a, "cancer"),
        post_message(&routes, b, "cancer")
    );

    for res in [res_a, res_b] {
        assert_eq!(res.status(), StatusCode::OK);
        let body = String::from_utf8(res.body().to_vec()).unwrap();
        assert!(body.contains("agent_message"));
        assert!(body.contains("done"));
    }
    for id in [a, b] {
        let res = warp::test::request().method("GET").path(&thread_path(id)).reply(&routes).await;
        let thread: ThreadResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(thread.messages.len(), 2);
    }
}

#[tokio::test]
async fn test_non_json_body_is_unsupported_media_type() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["ok"])));

    let res = warp::test::request()
        .method("POST")
        .path(&thread_path(Uuid::new_v4()))
        .header("content-type", "text/plain")
        .body("{\"text\": \"asthma\"}")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["error"], "unsupported media type");
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large() {
    let routes = routes_with(ScriptedProvider::new(Some(vec!["ok"])));
    let text = "a".repeat(20 * 1024);

    let res = warp::test::request()
        .method("POST")
        .path(&thread_path(Uuid::new_v4()))
        .json(&serde_json::json!({ "text": text }))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
