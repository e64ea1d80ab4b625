//! Unified request, response and streaming types shared by all providers.

mod headers;
mod message;
mod model;
mod request;
mod response;
mod stream;

pub use headers::Headers;
pub use message::{Message, Role};
pub use model::{ModelInfo, known_model};
pub use request::{GenerateOptions, GenerateRequest};
pub use response::{FinishReason, GenerateResponse, Usage};
pub use stream::{GenerateStream, StreamEvent};
