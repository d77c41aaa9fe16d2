use crate::ai_sdk::{
    ChatCompletionRequest, ChatCompletionResponse, ImageGenerationRequest,
    ImageGenerationResponse,
};
use crate::catalog::{self, ModelCatalogs};
use crate::error::ChatError;
use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use std::fmt;
use std::future::Future;

const MODELS_PATH: &str = "/models";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const IMAGE_GENERATIONS_PATH: &str = "/images/generations";

/// Endpoint and bearer key. Held in memory only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// `https://` scheme and a trailing `/v1`, nothing more.
pub fn is_valid_base_url(base_url: &str) -> bool {
    base_url.starts_with("https://") && base_url.ends_with("/v1")
}

/// The remote side of a session: model listing, chat, and image generation.
pub trait Gateway: Send + Sync {
    fn list_models(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<ModelCatalogs, ChatError>> + Send;

    /// Returns the reply text of the first choice.
    fn chat_completion(
        &self,
        credentials: &Credentials,
        request: ChatCompletionRequest,
    ) -> impl Future<Output = Result<String, ChatError>> + Send;

    /// Returns the URL of the generated image.
    fn generate_image(
        &self,
        credentials: &Credentials,
        request: ImageGenerationRequest,
    ) -> impl Future<Output = Result<String, ChatError>> + Send;
}

#[derive(Clone, Default)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
        }
    }
}

impl Gateway for ApiClient {
    async fn list_models(&self, credentials: &Credentials) -> Result<ModelCatalogs, ChatError> {
        let url = endpoint(&credentials.base_url, MODELS_PATH);
        tracing::debug!(%url, "listing models");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&credentials.api_key)
            .send()
            .await
            .map_err(ChatError::transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ChatError::Authentication);
        }
        let body = response.text().await.map_err(ChatError::transport)?;
        if !status.is_success() {
            return Err(ChatError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(catalog::partition(&value)),
            Err(err) => {
                tracing::warn!(error = %err, "model listing is not JSON; treating as empty");
                Ok(ModelCatalogs::default())
            }
        }
    }

    async fn chat_completion(
        &self,
        credentials: &Credentials,
        request: ChatCompletionRequest,
    ) -> Result<String, ChatError> {
        let url = endpoint(&credentials.base_url, CHAT_COMPLETIONS_PATH);
        tracing::debug!(
            %url,
            model = %request.model,
            messages = request.messages.len(),
            "requesting chat completion"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&credentials.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::from_gateway_failure(format!("{} - {}", status, body)));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;
        body.into_reply()
            .ok_or_else(|| ChatError::MalformedResponse("no choices returned".to_string()))
    }

    async fn generate_image(
        &self,
        credentials: &Credentials,
        request: ImageGenerationRequest,
    ) -> Result<String, ChatError> {
        let url = endpoint(&credentials.base_url, IMAGE_GENERATIONS_PATH);
        tracing::debug!(%url, model = %request.model, "requesting image generation");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&credentials.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::from_gateway_failure(format!("{} - {}", status, body)));
        }

        let body: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;
        body.into_url()
            .ok_or_else(|| ChatError::MalformedResponse("no image URL returned".to_string()))
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", normalize_base_url(base_url), path)
}

fn normalize_base_url(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}
