//! stacky runtime: debug context assembly, prompt composition and turn handling.
//!
//! ```text
//! DebugGateway ─┬─> variables::resolve_variables ─┐
//!               └─> code_window (per frame) ──────┴─> assembler ─> prompt::composer ─> Provider
//! ```

pub mod assistant;
pub mod config;
pub mod context;
pub mod error;
pub mod prompt;
pub mod stream;

pub use assistant::{Assistant, TurnRequest};
pub use config::RuntimeConfig;
pub use context::{
    AssembleOptions, FsSourceReader, ScopeKind, SourceReader, assemble_debug_context,
    build_debug_context, context_size, extract_code_window, render_debug_context,
};
pub use error::{Result, RuntimeError};
pub use prompt::{CharEstimate, RenderedPrompt, TokenCounter, compose_blocks, export_history, render_prompt};
pub use stream::ResponseStream;
