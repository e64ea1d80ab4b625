//! Chat-completions client for OpenAI and compatible endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response};
use reqwest_eventsource::EventSource;
use reqwest_eventsource::retry::Never;

use super::convert::{from_openai_response, to_openai_request};
use super::stream::create_stream;
use super::types::{OpenAIConfig, OpenAIModelList, OpenAIResponse};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::{GenerateRequest, GenerateResponse, GenerateStream, Headers};

const PROVIDER_ID: &str = "openai";

pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub const API_KEY_ENV: &'static str = "OPENAI_API_KEY";

    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey(PROVIDER_ID.to_string()));
        }
        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::new(api_key_from_env()?))
    }

    /// Provider for an OpenAI-compatible endpoint, key taken from the environment.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(OpenAIConfig::new(api_key_from_env()?).with_base_url(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }
}

fn api_key_from_env() -> Result<String> {
    std::env::var(OpenAIProvider::API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::MissingApiKey(PROVIDER_ID.to_string()))
}

/// Non-2xx responses become [`Error::Provider`] carrying the body text,
/// so error codes such as `off_topic` stay visible to callers.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::provider_error(format!("OpenAI API error {}: {}", status, body)))
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Authorization", format!("Bearer {}", self.config.api_key));
        headers.insert("Content-Type", "application/json");
        if let Some(org_id) = &self.config.organization_id {
            headers.insert("OpenAI-Organization", org_id);
        }
        if let Some(custom) = custom_headers {
            headers.merge_with(custom);
        }
        headers
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .headers(self.build_headers(None).to_reqwest_headers())
            .send()
            .await?;

        let list: OpenAIModelList = ensure_success(response).await?.json().await?;
        let mut models: Vec<String> = list.data.into_iter().map(|m| m.id).collect();
        models.sort();
        Ok(models)
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let body = to_openai_request(&request, false);
        let headers = self.build_headers(request.options.headers.as_ref());

        #[cfg(feature = "tracing")]
        tracing::debug!(model = %request.model, messages = request.messages.len(), "openai generate");

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .headers(headers.to_reqwest_headers())
            .json(&body)
            .send()
            .await?;

        let completion: OpenAIResponse = ensure_success(response).await?.json().await?;
        from_openai_response(completion)
    }

    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream> {
        let body = to_openai_request(&request, true);
        let headers = self.build_headers(request.options.headers.as_ref());

        #[cfg(feature = "tracing")]
        tracing::debug!(model = %request.model, messages = request.messages.len(), "openai stream");

        let builder = self
            .client
            .post(self.endpoint("chat/completions"))
            .headers(headers.to_reqwest_headers())
            .json(&body);

        let mut source = EventSource::new(builder)
            .map_err(|e| Error::stream_error(format!("Failed to create event source: {}", e)))?;
        // A failed turn is reported, never replayed.
        source.set_retry_policy(Box::new(Never));

        create_stream(source).await
    }
}
