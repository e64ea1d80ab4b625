//! Error types for the LLM SDK

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing API key for provider '{0}'")]
    MissingApiKey(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Non-success answer from the provider. Keeps the response body text.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn provider_error(message: impl Into<String>) -> Self {
        Error::Provider(message.into())
    }

    pub fn stream_error(message: impl Into<String>) -> Self {
        Error::Stream(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_keeps_body() {
        let err = Error::provider_error(r#"OpenAI API error 400: {"error":{"code":"off_topic"}}"#);
        assert!(err.to_string().contains("off_topic"));
    }

    #[test]
    fn test_missing_api_key_display() {
        let err = Error::MissingApiKey("openai".to_string());
        assert_eq!(err.to_string(), "Missing API key for provider 'openai'");
    }
}
