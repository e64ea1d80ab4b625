//! stacky_llms: provider-agnostic chat completions with streaming support.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │              ProviderRegistry             │
//! │   HashMap<String, Arc<dyn Provider>>      │
//! │                    │                      │
//! │          ┌─────────┴─────────┐            │
//! │          ▼                   ▼            │
//! │   ┌──────────────┐    ┌──────────────┐    │
//! │   │ OpenAI-compat│    │  (test/mock) │    │
//! │   │   Provider   │    │   Provider   │    │
//! │   └──────────────┘    └──────────────┘    │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stacky_llms::{OpenAIProvider, ProviderRegistry};
//!
//! let provider = OpenAIProvider::from_env().unwrap();
//! let registry = ProviderRegistry::new().register("openai", provider);
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;


pub use error::{Error, Result};
pub use provider::{Provider, ProviderRegistry};

pub use providers::OpenAIProvider;

pub use types::{
    FinishReason, GenerateOptions, GenerateRequest, GenerateResponse, GenerateStream, Headers,
    Message, ModelInfo, Role, StreamEvent, Usage,
};
