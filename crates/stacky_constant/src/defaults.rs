//! Defaults for debug context assembly and model calls.
//!
//! These are tunables, not guarantees. `AVERAGE_TOKENS_PER_LINE` in particular
//! is an uncalibrated approximation (a source line is ~90 chars, ~30 tokens).

/// Maximum number of stack frames rendered into the debug context.
pub const MAX_STACKS: usize = 5;

/// Maximum number of `name = value` lines in the active frame's listing.
pub const MAX_VARS: usize = 10;

/// Input budget used when the model does not report one.
pub const DEFAULT_MAX_INPUT_TOKENS: u32 = 4096;

/// Rough token cost of one rendered source line.
pub const AVERAGE_TOKENS_PER_LINE: u32 = 30;

/// Model family used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Response token cap.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Seconds to wait for a DAP response before giving up.
pub const DAP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Seconds to wait for the debuggee to stop after `configurationDone`.
pub const DAP_STOP_TIMEOUT_SECS: u64 = 60;

/// OpenAI-compatible endpoint used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Leading bytes inspected for a NUL when deciding a source file is binary.
pub const BINARY_SNIFF_BYTES: usize = 8192;

/// Largest DAP message body accepted from an adapter.
pub const DAP_MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;
