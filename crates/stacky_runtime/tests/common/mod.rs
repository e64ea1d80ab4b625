#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use stacky_core::{Scope, StackFrame, TurnEvent, Variable};
use stacky_dap::{ActiveSession, DapError, DebugGateway};
use stacky_llms::{
    FinishReason, GenerateRequest, GenerateResponse, GenerateStream, Headers, ModelInfo,
    Provider, StreamEvent, Usage,
};
use stacky_runtime::SourceReader;
use tokio::sync::mpsc;

/// Scripted debug session that records every request it serves.
#[derive(Default)]
pub struct FakeGateway {
    pub frames: Vec<StackFrame>,
    pub scopes: HashMap<i64, Vec<Scope>>,
    pub variables: HashMap<i64, Vec<Variable>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }

    pub fn with_scopes(mut self, frame_id: i64, scopes: Vec<Scope>) -> Self {
        self.scopes.insert(frame_id, scopes);
        self
    }

    pub fn with_variables(mut self, reference: i64, vars: Vec<Variable>) -> Self {
        self.variables.insert(reference, vars);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DebugGateway for FakeGateway {
    async fn fetch_stack_trace(&self, thread_id: i64) -> stacky_dap::Result<Vec<StackFrame>> {
        self.log(format!("stackTrace {thread_id}"));
        Ok(self.frames.clone())
    }

    async fn fetch_scopes(&self, frame_id: i64) -> stacky_dap::Result<Vec<Scope>> {
        self.log(format!("scopes {frame_id}"));
        Ok(self.scopes.get(&frame_id).cloned().unwrap_or_default())
    }

    async fn fetch_variables(&self, reference: i64) -> stacky_dap::Result<Vec<Variable>> {
        self.log(format!("variables {reference}"));
        self.variables
            .get(&reference)
            .cloned()
            .ok_or_else(|| DapError::RequestFailed {
                command: "variables".to_string(),
                message: "unknown reference".to_string(),
            })
    }
}

pub fn session(gateway: Arc<FakeGateway>, thread_id: i64, frame_id: i64) -> ActiveSession {
    ActiveSession::new(gateway, Some(thread_id), Some(frame_id))
}

/// In-memory source files keyed by path.
#[derive(Default)]
pub struct MemoryReader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), contents.into());
        self
    }
}

#[async_trait]
impl SourceReader for MemoryReader {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path} not found")))
    }
}

/// `count` numbered lines: "line 1", "line 2", ...
pub fn numbered_source(count: usize) -> String {
    (1..=count).map(|i| format!("line {i}\n")).collect()
}

/// Provider replaying scripted stream events and remembering requests.
pub struct FakeProvider {
    pub events: Vec<StreamEvent>,
    pub stream_error: Option<String>,
    pub context_window: Option<u32>,
    pub requests: Mutex<Vec<GenerateRequest>>,
    /// Stream never yields after the scripted events
    pub hang: bool,
}

impl FakeProvider {
    pub fn replying(fragments: &[&str]) -> Self {
        let mut events = vec![StreamEvent::start("resp-1")];
        events.extend(fragments.iter().map(|f| StreamEvent::text_delta("resp-1", *f)));
        events.push(StreamEvent::finish(Usage::new(10, 5), FinishReason::Stop));
        Self {
            events,
            stream_error: None,
            context_window: None,
            requests: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            stream_error: Some(message.to_string()),
            ..Self::replying(&[])
        }
    }

    pub fn with_context_window(mut self, tokens: u32) -> Self {
        self.context_window = Some(tokens);
        self
    }

    /// Stall after the text fragments instead of finishing.
    pub fn hanging(mut self) -> Self {
        self.events.retain(|e| !matches!(e, StreamEvent::Finish { .. }));
        self.hang = true;
        self
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn provider_id(&self) -> &str {
        "fake"
    }

    fn build_headers(&self, _custom_headers: Option<&Headers>) -> Headers {
        Headers::new()
    }

    async fn model_info(&self, model: &str) -> stacky_llms::Result<ModelInfo> {
        Ok(ModelInfo {
            context_window: self.context_window,
            ..ModelInfo::unknown(model)
        })
    }

    async fn generate(&self, _request: GenerateRequest) -> stacky_llms::Result<GenerateResponse> {
        Err(stacky_llms::Error::Other("not scripted".to_string()))
    }

    async fn stream(&self, request: GenerateRequest) -> stacky_llms::Result<GenerateStream> {
        self.requests.lock().unwrap().push(request);
        if let Some(message) = &self.stream_error {
            return Err(stacky_llms::Error::Provider(message.clone()));
        }
        let events: Vec<stacky_llms::Result<StreamEvent>> =
            self.events.iter().cloned().map(Ok).collect();
        if self.hang {
            let stream = futures::stream::iter(events).chain(futures::stream::pending());
            return Ok(GenerateStream::new(Box::pin(stream)));
        }
        Ok(GenerateStream::from_events(events))
    }
}

/// Drain everything already sent on `rx`.
pub fn drain(rx: &mut mpsc::Receiver<TurnEvent>) -> Vec<TurnEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn markdown_text(events: &[TurnEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            TurnEvent::Markdown { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
