//! Runtime error types

use stacky_dap::DapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Debug adapter error: {0}")]
    Dap(#[from] DapError),

    #[error("LLM error: {0}")]
    Llm(#[from] stacky_llms::Error),

    #[error("Cannot read source '{path}': {reason}")]
    SourceUnreadable { path: String, reason: String },

    #[error("No language model configured")]
    ModelUnavailable,

    #[error("Model request failed: {0}")]
    ModelRequest(String),

    #[error("Context overflow - prompt does not fit in {budget} tokens")]
    ContextOverflow { budget: u32 },

    #[error("Cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Content-filter rejections surface as an apology, not a failure.
    pub fn is_off_topic(&self) -> bool {
        match self {
            RuntimeError::ModelRequest(message) => message.contains("off_topic"),
            RuntimeError::Llm(e) => e.to_string().contains("off_topic"),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_topic_detection() {
        let err = RuntimeError::ModelRequest(
            r#"Provider error: OpenAI API error 400: {"error":{"code":"off_topic"}}"#.to_string(),
        );
        assert!(err.is_off_topic());

        let err = RuntimeError::Llm(stacky_llms::Error::provider_error("off_topic"));
        assert!(err.is_off_topic());

        assert!(!RuntimeError::ModelRequest("rate limited".to_string()).is_off_topic());
        assert!(!RuntimeError::Cancelled.is_off_topic());
    }
}
