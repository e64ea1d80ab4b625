//! One chat turn: command parsing, debug context, prompt rendering and the
//! streamed model answer.

use std::sync::Arc;
use std::time::Instant;

use stacky_constant::{defaults, messages};
use stacky_core::{ChatCommand, ChatTurn, TurnEvent};
use stacky_dap::ActiveSession;
use stacky_llms::{GenerateRequest, Provider};
use stacky_observability::{record_duration, record_error, turn_span};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use crate::config::RuntimeConfig;
use crate::context::{AssembleOptions, SourceReader, assemble_debug_context};
use crate::error::{Result, RuntimeError};
use crate::prompt::{CharEstimate, PromptInputs, TokenCounter, compose_blocks, export_history, render_prompt};
use crate::stream::ResponseStream;

/// A user message, split into its slash command and prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    /// Command name without the slash, e.g. `"ch"`
    pub command: Option<String>,
    pub prompt: String,
}

impl TurnRequest {
    pub fn new(command: Option<String>, prompt: impl Into<String>) -> Self {
        Self {
            command: command.map(|c| c.trim().trim_start_matches('/').to_string()),
            prompt: prompt.into(),
        }
    }

    /// Parse `"/ch why is this null?"`. Input without a leading `/` has no command.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.strip_prefix('/') {
            Some(rest) => {
                let (command, prompt) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Self::new(Some(command.to_string()), prompt.trim())
            }
            None => Self::new(None, input),
        }
    }

    pub fn to_history_turn(&self) -> ChatTurn {
        ChatTurn::request(self.command.clone(), self.prompt.clone())
    }
}

pub struct Assistant {
    config: RuntimeConfig,
    provider: Option<Arc<dyn Provider>>,
    reader: Arc<dyn SourceReader>,
    counter: Arc<dyn TokenCounter>,
}

impl Assistant {
    pub fn new(config: RuntimeConfig, reader: Arc<dyn SourceReader>) -> Self {
        Self {
            config,
            provider: None,
            reader,
            counter: Arc::new(CharEstimate),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn has_model(&self) -> bool {
        self.provider.is_some()
    }

    /// Prompt budget: configured override, then the model's context window
    /// less the completion reservation, then the fixed default.
    pub async fn input_budget(&self) -> u32 {
        if let Some(tokens) = self.config.max_input_tokens {
            return tokens;
        }
        if let Some(provider) = &self.provider {
            match provider.model_info(&self.config.model).await {
                Ok(info) => {
                    if let Some(window) = info.context_window {
                        return window.saturating_sub(self.config.max_tokens).max(1);
                    }
                }
                Err(e) => warn!(model = %self.config.model, "Model info unavailable: {}", e),
            }
        }
        defaults::DEFAULT_MAX_INPUT_TOKENS
    }

    /// The rendered debug context on its own, sized for the current model.
    pub async fn debug_context(
        &self,
        session: Option<&ActiveSession>,
        include_variables: bool,
    ) -> Result<String> {
        let budget = self.input_budget().await;
        let options = AssembleOptions::from_config(&self.config, budget).with_variables(include_variables);
        assemble_debug_context(session, self.reader.as_ref(), &options).await
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let provider = self.provider.as_ref().ok_or(RuntimeError::ModelUnavailable)?;
        Ok(provider.list_models().await?)
    }

    /// Answer one turn, streaming [`TurnEvent`]s to `events`.
    ///
    /// Returns the markdown shown to the user (empty when only a notice was
    /// emitted). Cancellation returns [`RuntimeError::Cancelled`] and emits
    /// nothing further.
    pub async fn handle_turn(
        &self,
        request: &TurnRequest,
        history: &[ChatTurn],
        session: Option<&ActiveSession>,
        events: &mpsc::Sender<TurnEvent>,
        cancel: CancellationToken,
    ) -> Result<String> {
        let _ = events.send(TurnEvent::progress(messages::THINKING)).await;

        let command = match request.command.as_deref().map(str::parse::<ChatCommand>) {
            Some(Ok(command)) => command,
            _ => return Ok(reply(events, messages::INVALID_COMMAND).await),
        };

        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Ok(reply(events, messages::EMPTY_PROMPT).await);
        }

        let Some(provider) = self.provider.clone() else {
            let _ = events.send(TurnEvent::notice(messages::NO_MODEL)).await;
            let _ = events.send(TurnEvent::done()).await;
            return Ok(String::new());
        };

        let span = turn_span!(command.as_str(), self.config.model.as_str());
        async move {
            let start = Instant::now();
            let budget = self.input_budget().await;

            let debug_context = if command.debug_context {
                let options = AssembleOptions::from_config(&self.config, budget);
                let ctx = assemble_debug_context(session, self.reader.as_ref(), &options)
                    .await
                    .inspect_err(|e| record_error(e))?;
                if ctx.is_empty() {
                    let _ = events.send(TurnEvent::notice(messages::NO_ACTIVE_SESSION)).await;
                }
                Some(ctx)
            } else {
                None
            };
            let history_text = command.history.then(|| export_history(history));

            let blocks = compose_blocks(&PromptInputs {
                user_prompt: prompt,
                debug_context: debug_context.as_deref(),
                history: history_text.as_deref(),
            });
            let rendered = render_prompt(&blocks, budget, self.counter.as_ref())
                .inspect_err(|e| record_error(e))?;
            let current = tracing::Span::current();
            current.record("prompt.tokens", rendered.token_count);
            current.record("prompt.dropped", rendered.dropped);
            debug!(
                budget,
                tokens = rendered.token_count,
                dropped = rendered.dropped,
                truncated = rendered.truncated,
                "Prompt rendered"
            );

            let request = GenerateRequest::new(self.config.model.clone(), rendered.messages)
                .with_max_tokens(self.config.max_tokens);

            let answer = match stream_answer(provider.as_ref(), request, events, cancel).await {
                Ok(text) => text,
                Err(RuntimeError::Cancelled) => {
                    info!("Turn cancelled");
                    return Err(RuntimeError::Cancelled);
                }
                Err(e) if e.is_off_topic() => {
                    record_error(&e);
                    let _ = events.send(TurnEvent::markdown(messages::OFF_TOPIC)).await;
                    messages::OFF_TOPIC.to_string()
                }
                Err(e) => {
                    record_error(&e);
                    let _ = events.send(TurnEvent::error(e.to_string())).await;
                    return Err(e);
                }
            };

            record_duration("duration_ms", start.elapsed());
            let _ = events.send(TurnEvent::done()).await;
            Ok(answer)
        }
        .instrument(span)
        .await
    }
}

async fn reply(events: &mpsc::Sender<TurnEvent>, markdown: &str) -> String {
    let _ = events.send(TurnEvent::markdown(markdown)).await;
    let _ = events.send(TurnEvent::done()).await;
    markdown.to_string()
}

async fn stream_answer(
    provider: &dyn Provider,
    request: GenerateRequest,
    events: &mpsc::Sender<TurnEvent>,
    cancel: CancellationToken,
) -> Result<String> {
    let stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RuntimeError::Cancelled),
        stream = provider.stream(request) => {
            stream.map_err(|e| RuntimeError::ModelRequest(e.to_string()))?
        }
    };

    let mut stream = ResponseStream::new(stream, cancel);
    let mut text = String::new();
    while let Some(fragment) = stream.next_fragment().await? {
        text.push_str(&fragment);
        let _ = events.send(TurnEvent::markdown(fragment)).await;
    }
    if let Some(usage) = stream.usage() {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Model usage"
        );
    }
    Ok(text)
}
