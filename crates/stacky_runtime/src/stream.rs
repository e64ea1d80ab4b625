//! Cancellable model response stream.

use futures::StreamExt;
use stacky_llms::{GenerateStream, StreamEvent, Usage};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, RuntimeError};

/// Text fragments of one model response, in arrival order.
///
/// Once `cancel` fires, every call returns [`RuntimeError::Cancelled`] and no
/// further fragments are produced. Dropping the stream drops the HTTP request.
pub struct ResponseStream {
    inner: GenerateStream,
    cancel: CancellationToken,
    finished: bool,
    usage: Option<Usage>,
}

impl ResponseStream {
    pub fn new(inner: GenerateStream, cancel: CancellationToken) -> Self {
        Self {
            inner,
            cancel,
            finished: false,
            usage: None,
        }
    }

    /// Next non-empty fragment, `Ok(None)` at completion.
    pub async fn next_fragment(&mut self) -> Result<Option<String>> {
        loop {
            if self.cancel.is_cancelled() {
                self.finished = true;
                return Err(RuntimeError::Cancelled);
            }
            if self.finished {
                return Ok(None);
            }

            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.finished = true;
                    return Err(RuntimeError::Cancelled);
                }
                ev = self.inner.next() => ev,
            };

            match event {
                None => {
                    self.finished = true;
                    return Ok(None);
                }
                Some(Ok(StreamEvent::TextDelta { delta, .. })) => {
                    if !delta.is_empty() {
                        return Ok(Some(delta));
                    }
                }
                Some(Ok(StreamEvent::Start { id })) => {
                    debug!(id = %id, "Model stream started");
                }
                Some(Ok(StreamEvent::Finish { usage, reason })) => {
                    debug!(?reason, prompt_tokens = usage.prompt_tokens, "Model stream finished");
                    self.usage = Some(usage);
                    self.finished = true;
                    return Ok(None);
                }
                Some(Ok(StreamEvent::Error { message })) => {
                    self.finished = true;
                    return Err(RuntimeError::ModelRequest(message));
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Err(RuntimeError::ModelRequest(e.to_string()));
                }
            }
        }
    }

    #[cfg(test)]
    async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.next_fragment().await? {
            text.push_str(&fragment);
        }
        Ok(text)
    }

    /// Token usage reported at the end of the stream, if any.
    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacky_llms::FinishReason;

    fn events(parts: &[&str]) -> GenerateStream {
        let mut events = vec![Ok(StreamEvent::start("g"))];
        events.extend(parts.iter().map(|p| Ok(StreamEvent::text_delta("g", *p))));
        events.push(Ok(StreamEvent::finish(Usage::new(5, 2), FinishReason::Stop)));
        GenerateStream::from_events(events)
    }

    #[tokio::test]
    async fn test_fragments_in_order() {
        let mut stream = ResponseStream::new(events(&["a", "", "b", "c"]), CancellationToken::new());
        let mut got = Vec::new();
        while let Some(f) = stream.next_fragment().await.unwrap() {
            got.push(f);
        }
        assert_eq!(got, vec!["a", "b", "c"]);
        assert_eq!(stream.usage().map(|u| u.total_tokens), Some(7));
        assert!(stream.next_fragment().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_stops_fragments() {
        let cancel = CancellationToken::new();
        let mut stream = ResponseStream::new(events(&["a", "b"]), cancel.clone());
        assert_eq!(stream.next_fragment().await.unwrap().as_deref(), Some("a"));

        cancel.cancel();
        assert!(matches!(stream.next_fragment().await, Err(RuntimeError::Cancelled)));
        assert!(matches!(stream.next_fragment().await, Err(RuntimeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let cancel = CancellationToken::new();
        let pending = GenerateStream::new(Box::pin(futures::stream::pending::<stacky_llms::Result<StreamEvent>>()));
        let mut stream = ResponseStream::new(pending, cancel.clone());

        let task = tokio::spawn(async move { stream.next_fragment().await });
        cancel.cancel();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(RuntimeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_error_event_is_model_request() {
        let stream = GenerateStream::from_events(vec![
            Ok(StreamEvent::text_delta("g", "partial")),
            Ok(StreamEvent::error("overloaded")),
        ]);
        let err = ResponseStream::new(stream, CancellationToken::new())
            .collect_text()
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ModelRequest(m) if m == "overloaded"));
    }

    #[tokio::test]
    async fn test_provider_error_keeps_message() {
        let stream = GenerateStream::from_events(vec![Err(stacky_llms::Error::provider_error(
            "OpenAI API error 400: off_topic",
        ))]);
        let err = ResponseStream::new(stream, CancellationToken::new())
            .collect_text()
            .await
            .unwrap_err();
        assert!(err.is_off_topic());
    }
}
