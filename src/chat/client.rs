use async_trait::async_trait;

use crate::{
    chat::OFFLINE_REPLY,
    errors::AppError,
    models::chat::{ChatTurn, CompletionRequest, CompletionResponse},
};

/// External chat completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String, AppError>;
}

/// Posts `{messages}` to a hosted completion endpoint and reads `{content}`.
pub struct HostedCompletionClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HostedCompletionClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for HostedCompletionClient {
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String, AppError> {
        let mut request = self.http.post(&self.url).json(&CompletionRequest { messages });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            tracing::error!("Chat completion returned {}", status);
            return Err(AppError::Upstream(format!(
                "chat completion failed with {status}"
            )));
        }

        let body: CompletionResponse = res.json().await.map_err(|e| {
            tracing::error!("Invalid completion response: {}", e);
            AppError::Deserialization(e.to_string())
        })?;
        Ok(body.content)
    }
}

/// Stand-in used when no completion endpoint is configured.
pub struct OfflineCompletionClient;

#[async_trait]
impl CompletionClient for OfflineCompletionClient {
    async fn complete(&self, _messages: &[ChatTurn]) -> Result<String, AppError> {
        Ok(OFFLINE_REPLY.to_string())
    }
}
