use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use pin_project::pin_project;
use serde::{Deserialize, Serialize};

use super::{FinishReason, Usage};
use crate::error::Result;

/// One event of a streamed completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start { id: String },
    TextDelta { id: String, delta: String },
    Finish { usage: Usage, reason: FinishReason },
    Error { message: String },
}

impl StreamEvent {
    pub fn start(id: impl Into<String>) -> Self {
        StreamEvent::Start { id: id.into() }
    }

    pub fn text_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        StreamEvent::TextDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    pub fn finish(usage: Usage, reason: FinishReason) -> Self {
        StreamEvent::Finish { usage, reason }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }
}

/// A streamed completion. Dropping it drops the underlying HTTP request.
#[pin_project]
pub struct GenerateStream {
    #[pin]
    inner: Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>,
}

impl GenerateStream {
    pub fn new(inner: Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>) -> Self {
        Self { inner }
    }

    /// Build a stream from an already-known list of events.
    pub fn from_events(events: Vec<Result<StreamEvent>>) -> Self {
        Self::new(Box::pin(futures::stream::iter(events)))
    }
}

impl Stream for GenerateStream {
    type Item = Result<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

impl std::fmt::Debug for GenerateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_from_events_in_order() {
        let mut stream = GenerateStream::from_events(vec![
            Ok(StreamEvent::start("g1")),
            Ok(StreamEvent::text_delta("g1", "a")),
            Ok(StreamEvent::text_delta("g1", "b")),
            Ok(StreamEvent::finish(Usage::default(), FinishReason::Stop)),
        ]);

        let mut text = String::new();
        while let Some(event) = stream.next().await {
            if let StreamEvent::TextDelta { delta, .. } = event.unwrap() {
                text.push_str(&delta);
            }
        }
        assert_eq!(text, "ab");
    }

    #[test]
    fn test_event_serde_tag() {
        let json = serde_json::to_value(StreamEvent::text_delta("x", "hi")).unwrap();
        assert_eq!(json["type"], "text_delta");
        assert_eq!(json["delta"], "hi");
    }
}
