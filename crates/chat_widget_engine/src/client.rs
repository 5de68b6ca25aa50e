use std::time::Duration;

use reqwest::StatusCode;
use url::Url;
use widget_logging::{widget_debug, widget_info, widget_warn};

use crate::{ChatError, CompletionRequest, CompletionResponse, FailureKind, RequestId};

pub const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Scheme, host and optional prefix of the chat service.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Deadline for the whole exchange, response body included.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_millis(60_000),
        }
    }
}

#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        request_id: RequestId,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ChatError>;

    /// Base URL reported to users when the service cannot be reached.
    fn base_url(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct ReqwestChatClient {
    settings: ClientSettings,
    endpoint: Url,
    client: reqwest::Client,
}

impl ReqwestChatClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ChatError> {
        let endpoint = completions_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ChatError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn exchange(&self, request: &CompletionRequest) -> Result<CompletionResponse, ChatError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ChatError::new(FailureKind::RateLimited, status.to_string()));
        }
        if !status.is_success() {
            return Err(ChatError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        response
            .json::<CompletionResponse>()
            .await
            .map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl ChatClient for ReqwestChatClient {
    async fn complete(
        &self,
        request_id: RequestId,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ChatError> {
        widget_info!(
            "chat request id={} chars={} with_selection={}",
            request_id,
            request.message.chars().count(),
            request.selected_text.is_some()
        );
        let deadline = self.settings.request_timeout;
        let result = match tokio::time::timeout(deadline, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::new(
                FailureKind::Timeout,
                format!("no response within {} ms", deadline.as_millis()),
            )),
        };
        match &result {
            Ok(_) => widget_debug!("chat request id={} completed", request_id),
            Err(err) => widget_warn!("chat request id={} failed: {}", request_id, err),
        }
        result
    }

    fn base_url(&self) -> &str {
        &self.settings.base_url
    }
}

fn completions_url(base_url: &str) -> Result<Url, ChatError> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH);
    let url = Url::parse(&joined)
        .map_err(|err| ChatError::new(FailureKind::InvalidUrl, format!("{joined}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChatError::new(
            FailureKind::InvalidUrl,
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

fn map_reqwest_error(err: reqwest::Error) -> ChatError {
    if err.is_timeout() {
        return ChatError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_connect() {
        return ChatError::new(FailureKind::Unreachable, err.to_string());
    }
    if err.is_decode() {
        return ChatError::new(FailureKind::InvalidResponse, err.to_string());
    }
    ChatError::new(FailureKind::Network, err.to_string())
}
