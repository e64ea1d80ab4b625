//! Turns the paused program's stack into the debug context text block.

use std::time::Instant;

use stacky_constant::defaults;
use stacky_core::{CodeWindow, DebugContext, FrameContext, Variable};
use stacky_dap::ActiveSession;
use stacky_observability::{context_span, record_duration};
use tracing::{Instrument, debug, warn};

use super::code_window::extract_code_window;
use super::source::{SourceReader, is_binary};
use super::variables::resolve_variables;
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    pub max_stacks: usize,
    pub max_vars: usize,
    /// Model input budget the code windows are sized against
    pub token_budget: u32,
    /// When false, no scope or variable requests are made and no listing is rendered
    pub include_variables: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            max_stacks: defaults::MAX_STACKS,
            max_vars: defaults::MAX_VARS,
            token_budget: defaults::DEFAULT_MAX_INPUT_TOKENS,
            include_variables: true,
        }
    }
}

impl AssembleOptions {
    pub fn from_config(config: &RuntimeConfig, token_budget: u32) -> Self {
        Self {
            max_stacks: config.max_stacks,
            max_vars: config.max_vars,
            token_budget,
            include_variables: true,
        }
    }

    pub fn with_variables(mut self, include: bool) -> Self {
        self.include_variables = include;
        self
    }
}

/// Lines shown on each side of a frame's current line:
/// `ceil(token_budget / (max_stacks * AVERAGE_TOKENS_PER_LINE))`.
pub fn context_size(token_budget: u32, max_stacks: usize) -> usize {
    let per_frame = max_stacks.max(1) as u64 * u64::from(defaults::AVERAGE_TOKENS_PER_LINE);
    u64::from(token_budget).div_ceil(per_frame) as usize
}

/// Collect the structured context for the active frame's thread.
///
/// `None` session, thread or frame gives an empty context. Stack trace and
/// scope failures abort; unreadable sources and failed variable fetches only
/// drop that frame's window or listing.
pub async fn build_debug_context(
    session: Option<&ActiveSession>,
    reader: &dyn SourceReader,
    options: &AssembleOptions,
) -> Result<DebugContext> {
    let span = context_span!(options.max_stacks, options.token_budget);
    async move {
        let start = Instant::now();
        let ctx = collect(session, reader, options).await?;
        tracing::Span::current().record("context.frames", ctx.frames.len());
        let source_lines: usize = ctx
            .frames
            .iter()
            .filter_map(|f| f.code_window.as_ref())
            .map(CodeWindow::line_count)
            .sum();
        debug!(
            active_frame = ctx.active_frame().map(|f| f.index),
            source_lines,
            "Debug context collected"
        );
        record_duration("duration_ms", start.elapsed());
        Ok(ctx)
    }
    .instrument(span)
    .await
}

async fn collect(
    session: Option<&ActiveSession>,
    reader: &dyn SourceReader,
    options: &AssembleOptions,
) -> Result<DebugContext> {
    let Some(session) = session else {
        return Ok(DebugContext::default());
    };
    let (Some(thread_id), Some(active_frame_id)) = (session.thread_id(), session.frame_id()) else {
        debug!("No active thread or frame");
        return Ok(DebugContext::default());
    };

    let gateway = session.gateway();
    let frames = gateway.fetch_stack_trace(thread_id).await?;

    let mut locals = if options.include_variables && options.max_vars > 0 {
        let scopes = gateway.fetch_scopes(active_frame_id).await?;
        let resolved = resolve_variables(gateway, &scopes).await;
        let mut locals = resolved.local.unwrap_or_default();
        locals.truncate(options.max_vars);
        Some(locals)
    } else {
        None
    };

    let context_size = context_size(options.token_budget, options.max_stacks);
    let mut rendered = Vec::with_capacity(frames.len().min(options.max_stacks));

    for (i, frame) in frames.iter().take(options.max_stacks).enumerate() {
        let path = frame.source_path();
        let code_window = match path {
            Some(path) => load_code_window(reader, path, frame.line as usize, context_size).await,
            None => None,
        };

        // Only the first frame matching the active id carries the listing.
        let variables = if frame.id == active_frame_id {
            locals.take()
        } else {
            None
        };

        rendered.push(FrameContext {
            index: i + 1,
            frame_id: frame.id,
            function_name: frame.name.clone(),
            file_path: path.map(|p| reader.display_path(p)).unwrap_or_default(),
            code_window,
            variables,
        });
    }

    Ok(DebugContext { frames: rendered })
}

async fn load_code_window(
    reader: &dyn SourceReader,
    path: &str,
    line: usize,
    context_size: usize,
) -> Option<CodeWindow> {
    match read_source(reader, path).await {
        Ok(bytes) => {
            let window = extract_code_window(&bytes, line, context_size);
            (!window.is_empty()).then_some(window)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

async fn read_source(reader: &dyn SourceReader, path: &str) -> Result<Vec<u8>> {
    let bytes = reader
        .read(path)
        .await
        .map_err(|e| RuntimeError::SourceUnreadable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    if is_binary(&bytes) {
        return Err(RuntimeError::SourceUnreadable {
            path: path.to_string(),
            reason: "binary file".to_string(),
        });
    }
    Ok(bytes)
}

/// Render the context text block.
///
/// ~~~text
/// Stack Frame 1 "main" in "src/main.rs:"
///
/// Local Variables:
/// x = 1
///
/// ```
/// 1  | fn main() {
/// 2> |     let x = 1;
/// ```
/// ~~~
pub fn render_debug_context(ctx: &DebugContext) -> String {
    let mut out = String::new();
    for frame in &ctx.frames {
        out.push_str(&format!(
            "\nStack Frame {} \"{}\" in \"{}:\"\n",
            frame.index, frame.function_name, frame.file_path
        ));
        if let Some(vars) = &frame.variables {
            out.push_str("\nLocal Variables:\n");
            for Variable { name, value, .. } in vars {
                out.push_str(&format!("{} = {}\n", name, value));
            }
            out.push('\n');
        }
        if let Some(window) = &frame.code_window {
            out.push_str(&format!("```\n{}\n```\n", window.rendered_text));
        }
    }
    out.trim().to_string()
}

/// [`build_debug_context`] followed by [`render_debug_context`].
/// An empty string means no debug context is available.
pub async fn assemble_debug_context(
    session: Option<&ActiveSession>,
    reader: &dyn SourceReader,
    options: &AssembleOptions,
) -> Result<String> {
    let ctx = build_debug_context(session, reader, options).await?;
    Ok(render_debug_context(&ctx))
}
