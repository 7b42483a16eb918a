use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ServerConfig;
use crate::error::{AgencyError, AgencyResult};
use crate::models::{
    ChatReply, ChatRequest, ConversationId, ConversationSummary, ErrorBody, PostMessageRequest,
    StoredMessage,
};

use super::traits::ChatTransport;

const WALLET_MARKER: &str = "metamask";

/// reqwest-backed [`ChatTransport`] for the agency REST API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> AgencyResult<Self> {
        Self::from_config(&ServerConfig {
            base_url: base_url.into(),
            ..ServerConfig::default()
        })
    }

    pub fn from_config(config: &ServerConfig) -> AgencyResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| AgencyError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> AgencyResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| AgencyError::InvalidConfigValue {
            key: "server.base_url".to_string(),
            message: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| AgencyError::InvalidConfigValue {
                key: "server.base_url".to_string(),
                message: format!("'{}' cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn conversation_endpoint(&self, id: &ConversationId, tail: &[&str]) -> AgencyResult<Url> {
        // Dot segments are dropped by the URL setter and would address the collection.
        if matches!(id.as_str().trim(), "" | "." | "..") {
            return Err(AgencyError::InvalidConversationId(id.to_string()));
        }
        let mut segments = vec!["api", "conversations", id.as_str()];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    async fn get_json<R: DeserializeOwned>(&self, url: Url) -> AgencyResult<R> {
        debug!(path = url.path(), "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    async fn post_json<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> AgencyResult<R> {
        debug!(path = url.path(), "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    async fn delete(&self, url: Url) -> AgencyResult<()> {
        debug!(path = url.path(), "DELETE");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

fn network_error(err: reqwest::Error) -> AgencyError {
    warn!(error = %err, "Request did not reach the agency backend");
    AgencyError::NetworkError(err.to_string())
}

async fn decode<R: DeserializeOwned>(response: Response) -> AgencyResult<R> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_failure(status, &body));
    }

    let bytes = response.bytes().await.map_err(network_error)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        warn!(status = status.as_u16(), error = %e, "Undecodable response body");
        AgencyError::ResponseDecode(e.to_string())
    })
}

/// Map a non-2xx response onto the error taxonomy.
///
/// A 403 is `AuthRequired` when the body carries `require_metamask: true` or
/// mentions MetaMask; everything else is `HttpError` with the backend's
/// `error` field as detail.
pub fn classify_failure(status: StatusCode, body: &str) -> AgencyError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let detail = parsed
        .error
        .clone()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() || trimmed.starts_with('<') {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });

    let marked = parsed.require_metamask || body.to_lowercase().contains(WALLET_MARKER);

    if status == StatusCode::FORBIDDEN && marked {
        warn!("Backend requires wallet authentication");
        AgencyError::AuthRequired(detail)
    } else {
        warn!(status = status.as_u16(), detail = %detail, "Backend returned an error");
        AgencyError::HttpError {
            status: status.as_u16(),
            message: detail,
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn start_chat(&self, address: Option<&str>) -> AgencyResult<ChatReply> {
        self.post_json(self.endpoint(&["api", "chat"])?, &ChatRequest::greeting(address))
            .await
    }

    async fn send_chat(&self, text: &str, address: Option<&str>) -> AgencyResult<ChatReply> {
        self.post_json(
            self.endpoint(&["api", "chat"])?,
            &ChatRequest::message(text, address),
        )
        .await
    }

    async fn create_conversation(&self) -> AgencyResult<ConversationSummary> {
        self.post_json(
            self.endpoint(&["api", "conversations"])?,
            &serde_json::json!({}),
        )
        .await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> AgencyResult<()> {
        self.delete(self.conversation_endpoint(id, &[])?).await
    }

    async fn post_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> AgencyResult<StoredMessage> {
        let body = PostMessageRequest {
            content: content.to_string(),
        };
        self.post_json(self.conversation_endpoint(id, &["messages"])?, &body)
            .await
    }

    async fn list_conversations(&self) -> AgencyResult<Vec<ConversationSummary>> {
        self.get_json(self.endpoint(&["api", "conversations"])?)
            .await
    }

    async fn list_messages(&self, id: &ConversationId) -> AgencyResult<Vec<StoredMessage>> {
        self.get_json(self.conversation_endpoint(id, &["messages"])?)
            .await
    }
}
