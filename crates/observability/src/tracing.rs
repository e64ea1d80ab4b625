//! Span macros and span-recording helpers

/// Span around one Debug Adapter Protocol request.
///
/// ```rust
/// use stacky_observability::dap_request_span;
///
/// let span = dap_request_span!("stackTrace", 7);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! dap_request_span {
    ($command:expr, $seq:expr) => {
        tracing::debug_span!(
            "dap.request",
            dap.command = $command,
            dap.seq = $seq,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around one assistant turn.
///
/// ```rust
/// use stacky_observability::turn_span;
///
/// let span = turn_span!("/ch", "gpt-4o");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! turn_span {
    ($command:expr, $model:expr) => {
        tracing::info_span!(
            "assistant.turn",
            turn.command = $command,
            llm.model = $model,
            prompt.tokens = tracing::field::Empty,
            prompt.dropped = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around debug context assembly.
#[macro_export]
macro_rules! context_span {
    ($max_stacks:expr, $token_budget:expr) => {
        tracing::debug_span!(
            "context.assemble",
            context.max_stacks = $max_stacks,
            context.token_budget = $token_budget,
            context.frames = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span and log it.
///
/// ```rust
/// use stacky_observability::record_error;
///
/// let err = std::io::Error::other("adapter went away");
/// record_error(&err);
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::error!(error = %error, "Operation failed");
}

/// Record a duration in milliseconds on the current span.
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
