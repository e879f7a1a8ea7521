//! HTTP client for the completion endpoint (Ollama-style `/api/chat` and friends)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::ports::{ChatMessage, CompletionPort, CompletionRequest, LlmError};

/// Default completion endpoint.
pub const DEFAULT_COMPLETION_URL: &str = "http://localhost:11434/api/chat";

/// Default model name sent with each request.
pub const DEFAULT_COMPLETION_MODEL: &str = "qwen3";

/// How long the start-up connectivity check waits for a TCP connection.
pub const CONNECT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-attempt JSON client. Retries are deliberately absent.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    url: String,
    model: String,
}

impl HttpCompletionClient {
    pub fn new(url: &str, model: &str, connect_timeout: Duration, timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            &config.url,
            &config.model,
            config.connect_timeout,
            config.request_timeout,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[async_trait]
impl CompletionPort for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            tracing::warn!(status = %status, url = %self.url, "Completion endpoint returned an error status");
            // Error bodies often carry an `error` field worth showing.
            if text.trim().is_empty() {
                return Err(LlmError::RequestFailed(format!("status {status}")));
            }
        }

        Ok(text)
    }
}

fn map_transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout
    } else if error.is_connect() {
        LlmError::Unreachable(error.to_string())
    } else {
        LlmError::RequestFailed(error.to_string())
    }
}

/// Open and drop a TCP connection to the endpoint's host.
pub async fn check_endpoint(url: &str, timeout: Duration) -> Result<(), LlmError> {
    let parsed =
        reqwest::Url::parse(url).map_err(|e| LlmError::RequestFailed(format!("bad url: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| LlmError::RequestFailed("url has no host".to_string()))?
        .to_string();
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| LlmError::RequestFailed("url has no port".to_string()))?;

    match tokio::time::timeout(timeout, tokio::net::TcpStream::connect((host.as_str(), port))).await
    {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(LlmError::Unreachable(e.to_string())),
        Err(_) => Err(LlmError::Timeout),
    }
}
