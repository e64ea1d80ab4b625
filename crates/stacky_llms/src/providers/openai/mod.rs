//! OpenAI-compatible provider
//!
//! Works against any endpoint implementing `POST {base}/chat/completions`
//! and `GET {base}/models`.

mod convert;
mod provider;
mod stream;
mod types;

pub use provider::OpenAIProvider;
pub use types::{OpenAIConfig, OpenAIRequest, OpenAIResponse};
