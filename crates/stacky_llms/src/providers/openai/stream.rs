//! OpenAI streaming support
//!
//! Server-sent events carry `data: {"choices":[{"delta":{"content":"..."}}]}`
//! chunks; `data: [DONE]` ends the stream.

use futures::stream::StreamExt;
use reqwest_eventsource::{Event, EventSource};

use super::types::OpenAIStreamChunk;
use crate::error::{Error, Result};
use crate::types::{FinishReason, GenerateStream, StreamEvent, Usage};

/// Per-stream bookkeeping carried across chunks.
#[derive(Debug, Default)]
struct StreamState {
    started: bool,
    usage: Usage,
    finish: Option<FinishReason>,
}

/// Turn an open event source into a [`GenerateStream`].
pub async fn create_stream(mut event_source: EventSource) -> Result<GenerateStream> {
    let stream = async_stream::stream! {
        let mut state = StreamState::default();
        let mut failed = false;

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => {
                    if message.data.trim() == "[DONE]" {
                        break;
                    }

                    match serde_json::from_str::<OpenAIStreamChunk>(&message.data) {
                        Ok(chunk) => {
                            for stream_event in process_chunk(chunk, &mut state) {
                                yield Ok(stream_event);
                            }
                        }
                        Err(e) => {
                            yield Err(Error::stream_error(format!("Failed to parse chunk: {}", e)));
                            failed = true;
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());
                    yield Err(Error::provider_error(format!(
                        "OpenAI API error {}: {}",
                        status, error_body
                    )));
                    failed = true;
                    break;
                }
                Err(e) => {
                    yield Err(Error::stream_error(format!("Stream error: {}", e)));
                    failed = true;
                    break;
                }
            }
        }

        event_source.close();
        if !failed {
            let reason = state.finish.take().unwrap_or(FinishReason::Stop);
            yield Ok(StreamEvent::finish(state.usage, reason));
        }
    };

    Ok(GenerateStream::new(Box::pin(stream)))
}

/// Map one chunk to unified events. `Finish` is emitted once, at stream end,
/// because usage arrives in a trailing chunk with no choices.
fn process_chunk(chunk: OpenAIStreamChunk, state: &mut StreamState) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if !state.started {
        state.started = true;
        events.push(StreamEvent::start(chunk.id.clone()));
    }

    if let Some(usage) = chunk.usage {
        state.usage = Usage::new(usage.prompt_tokens, usage.completion_tokens);
    }

    for choice in chunk.choices {
        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                events.push(StreamEvent::text_delta(chunk.id.clone(), content));
            }
        }
        if let Some(reason) = choice.finish_reason {
            state.finish = Some(FinishReason::parse(Some(&reason)));
        }
    }

    events
}
