//! Gemini client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::llm::auth::AuthenticationManager;
use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::GenerateRequest,
};

use super::mapper::{create_message_start, from_gemini_response, to_gemini_request, SystemPlacement};
use super::sse::parse_sse_stream;
use super::types::ErrorResponse;

const DEVELOPER_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini model identifiers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeminiModel {
    /// Gemini 2.0 Flash, pinned revision 001
    #[default]
    Gemini20Flash001,
    Gemini25Flash,
    Gemini25Pro,
    Gemini25FlashLite,
    /// Any other model id the endpoint accepts
    Custom(String),
}

impl GeminiModel {
    pub fn as_str(&self) -> &str {
        match self {
            GeminiModel::Gemini20Flash001 => "gemini-2.0-flash-001",
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
            GeminiModel::Gemini25Pro => "gemini-2.5-pro",
            GeminiModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
            GeminiModel::Custom(id) => id,
        }
    }
}

impl FromStr for GeminiModel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "gemini-2.0-flash-001" => GeminiModel::Gemini20Flash001,
            "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
            "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
            "gemini-2.5-flash-lite" => GeminiModel::Gemini25FlashLite,
            other => GeminiModel::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which Google endpoint serves the model
#[derive(Clone, PartialEq, Eq)]
pub enum GeminiBackend {
    /// Gemini Developer API, authenticated with an API key
    DeveloperApi { api_key: String },
    /// Vertex AI, authenticated with Application Default Credentials
    VertexAi { project_id: String, location: String },
}

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiBackend::DeveloperApi { .. } => f
                .debug_struct("DeveloperApi")
                .field("api_key", &"<redacted>")
                .finish(),
            GeminiBackend::VertexAi {
                project_id,
                location,
            } => f
                .debug_struct("VertexAi")
                .field("project_id", project_id)
                .field("location", location)
                .finish(),
        }
    }
}

/// Everything needed to build a [`GeminiClient`]
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub model: GeminiModel,
    pub backend: GeminiBackend,
    /// Replaces the scheme and host of the endpoint
    pub base_url: Option<String>,
    pub system_placement: SystemPlacement,
    pub request_timeout: Duration,
}

impl GeminiSettings {
    pub fn new(model: GeminiModel, backend: GeminiBackend) -> Self {
        Self {
            model,
            backend,
            base_url: None,
            system_placement: SystemPlacement::default(),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_system_placement(mut self, placement: SystemPlacement) -> Self {
        self.system_placement = placement;
        self
    }

    /// Streaming endpoint URL for these settings
    pub fn endpoint_url(&self) -> String {
        let model = self.model.as_str();
        match &self.backend {
            GeminiBackend::DeveloperApi { .. } => {
                let base = self.base_url.as_deref().unwrap_or(DEVELOPER_API_BASE);
                format!(
                    "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
                    base.trim_end_matches('/'),
                    model
                )
            }
            GeminiBackend::VertexAi {
                project_id,
                location,
            } => {
                let base = self
                    .base_url
                    .clone()
                    .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", location));
                format!(
                    "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:streamGenerateContent?alt=sse",
                    base.trim_end_matches('/'),
                    project_id,
                    location,
                    model
                )
            }
        }
    }
}

enum Credentials {
    ApiKey(String),
    Adc(AuthenticationManager),
}

/// Streaming client for Gemini models
pub struct GeminiClient {
    http_client: Client,
    credentials: Credentials,
    endpoint: String,
    placement: SystemPlacement,
}

impl GeminiClient {
    /// Create a client for the given settings
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built or, for Vertex AI, if no
    /// Application Default Credentials are available.
    pub async fn new(settings: GeminiSettings) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        let credentials = match &settings.backend {
            GeminiBackend::DeveloperApi { api_key } => Credentials::ApiKey(api_key.clone()),
            GeminiBackend::VertexAi { .. } => Credentials::Adc(AuthenticationManager::new().await?),
        };

        Ok(Self {
            http_client,
            credentials,
            endpoint: settings.endpoint_url(),
            placement: settings.system_placement,
        })
    }

    async fn make_streaming_request(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::InvalidRequest(
                "at least one message is required".to_string(),
            ));
        }

        let gemini_request = to_gemini_request(request, self.placement);
        debug!(
            endpoint = %self.endpoint,
            turns = gemini_request.contents.len(),
            "sending Gemini request"
        );

        let builder = self.http_client.post(&self.endpoint).json(&gemini_request);
        let builder = match &self.credentials {
            Credentials::ApiKey(key) => builder.header("x-goog-api-key", key),
            Credentials::Adc(auth) => builder.bearer_auth(auth.bearer_token().await?),
        };

        let response = builder.send().await?;
        let response = check_status(response).await?;

        let sse_stream = parse_sse_stream(Box::pin(response.bytes_stream()));

        let message_id = Uuid::new_v4().to_string();
        let mut emitted_start = false;

        let event_stream = sse_stream.flat_map(move |result| {
            let items = match result {
                Ok(chunk) => {
                    let mut events = Vec::new();
                    if !emitted_start {
                        events.push(create_message_start(message_id.clone()));
                        emitted_start = true;
                    }
                    events.extend(from_gemini_response(chunk));
                    events.into_iter().map(Ok).collect::<Vec<_>>()
                }
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(items)
        });

        Ok(Box::pin(event_stream))
    }
}

/// Turn a non-success response into the matching error
async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(LlmError::RateLimitExceeded { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(envelope) if !envelope.error.message.is_empty() => Err(LlmError::ProviderError {
            code: if envelope.error.status.is_empty() {
                status.as_u16().to_string()
            } else {
                envelope.error.status
            },
            message: envelope.error.message,
        }),
        _ => Err(LlmError::HttpError {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.make_streaming_request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn developer() -> GeminiBackend {
        GeminiBackend::DeveloperApi {
            api_key: "secret-key".to_string(),
        }
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::default().as_str(), "gemini-2.0-flash-001");
        assert_eq!(GeminiModel::Gemini25Pro.as_str(), "gemini-2.5-pro");
        assert_eq!(
            GeminiModel::Custom("gemini-exp".to_string()).as_str(),
            "gemini-exp"
        );
    }

    #[test]
    fn test_gemini_model_from_str() {
        assert_eq!(
            "gemini-2.5-flash".parse::<GeminiModel>().unwrap(),
            GeminiModel::Gemini25Flash
        );
        assert_eq!(
            "gemini-1.5-pro".parse::<GeminiModel>().unwrap(),
            GeminiModel::Custom("gemini-1.5-pro".to_string())
        );
    }

    #[test]
    fn test_developer_api_endpoint() {
        let settings = GeminiSettings::new(GeminiModel::default(), developer());
        assert_eq!(
            settings.endpoint_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-001:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_base_url_override() {
        let settings = GeminiSettings::new(GeminiModel::Gemini25Flash, developer())
            .with_base_url("http://127.0.0.1:9000/");
        assert_eq!(
            settings.endpoint_url(),
            "http://127.0.0.1:9000/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_vertex_endpoint() {
        let settings = GeminiSettings::new(
            GeminiModel::Gemini25Flash,
            GeminiBackend::VertexAi {
                project_id: "my-project".to_string(),
                location: "europe-west4".to_string(),
            },
        );
        let url = settings.endpoint_url();
        assert!(url.starts_with("https://europe-west4-aiplatform.googleapis.com/v1/projects/my-project/"));
        assert!(url.ends_with("models/gemini-2.5-flash:streamGenerateContent?alt=sse"));
    }

    #[test]
    fn test_backend_debug_redacts_key() {
        let rendered = format!("{:?}", developer());
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("redacted"));
    }
}
