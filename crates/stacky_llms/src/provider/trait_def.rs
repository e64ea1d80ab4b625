use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    GenerateRequest, GenerateResponse, GenerateStream, Headers, ModelInfo, known_model,
};

/// A chat-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    fn provider_id(&self) -> &str;

    /// Headers sent with every request, with `custom_headers` merged on top.
    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers;

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Limits of `model`. The default consults the table of well-known models.
    async fn model_info(&self, model: &str) -> Result<ModelInfo> {
        Ok(known_model(model))
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream>;
}
