//! Session bootstrap and the per-turn active-session value.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use stacky_core::Source;
use tracing::{info, warn};

use crate::client::DapClient;
use crate::error::{DapError, Result};
use crate::gateway::DebugGateway;
use crate::protocol::{
    InitializeArguments, SetBreakpointsArguments, SourceBreakpoint, StoppedEventBody,
    ThreadsResponseBody,
};

/// `launch` or `attach`, with adapter-specific arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum StartRequest {
    Launch(JsonValue),
    Attach(JsonValue),
}

impl StartRequest {
    pub fn command(&self) -> &'static str {
        match self {
            StartRequest::Launch(_) => "launch",
            StartRequest::Attach(_) => "attach",
        }
    }

    fn arguments(&self) -> &JsonValue {
        match self {
            StartRequest::Launch(args) | StartRequest::Attach(args) => args,
        }
    }
}

/// A `file:line` breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointSpec {
    pub path: String,
    pub line: u32,
}

impl FromStr for BreakpointSpec {
    type Err = DapError;

    fn from_str(s: &str) -> Result<Self> {
        let (path, line) = s
            .rsplit_once(':')
            .ok_or_else(|| DapError::Protocol(format!("Breakpoint '{}' is not file:line", s)))?;
        let line = line
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|l| *l > 0)
            .ok_or_else(|| DapError::Protocol(format!("Invalid breakpoint line in '{}'", s)))?;
        if path.is_empty() {
            return Err(DapError::Protocol(format!("Breakpoint '{}' has no file", s)));
        }
        Ok(Self {
            path: path.to_string(),
            line,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub adapter_id: String,
    pub request: StartRequest,
    pub breakpoints: Vec<BreakpointSpec>,
    /// How long to wait for `initialized` and for the first stop.
    pub stop_timeout: Duration,
}

impl SessionOptions {
    pub fn new(request: StartRequest) -> Self {
        Self {
            adapter_id: "stacky".to_string(),
            request,
            breakpoints: Vec::new(),
            stop_timeout: Duration::from_secs(stacky_constant::defaults::DAP_STOP_TIMEOUT_SECS),
        }
    }

    pub fn with_adapter_id(mut self, adapter_id: impl Into<String>) -> Self {
        self.adapter_id = adapter_id.into();
        self
    }

    pub fn with_breakpoints(mut self, breakpoints: Vec<BreakpointSpec>) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}

impl DapClient {
    /// Run the DAP handshake and wait for the debuggee to stop.
    ///
    /// Returns the stopped thread, or `None` if the program ended or never
    /// stopped within the timeout. Neither is an error: it means no debug
    /// context is available.
    pub async fn start_session(&self, options: &SessionOptions) -> Result<Option<i64>> {
        let init = InitializeArguments::new(options.adapter_id.clone());
        self.request_raw("initialize", Some(serde_json::to_value(init)?))
            .await?;

        let start = self
            .send_request(
                options.request.command(),
                Some(options.request.arguments().clone()),
            )
            .await?;

        if self
            .wait_for_event(&["initialized"], options.stop_timeout)
            .await?
            .is_none()
        {
            return Err(DapError::Timeout("initialized".to_string()));
        }

        let mut by_file: BTreeMap<&str, Vec<SourceBreakpoint>> = BTreeMap::new();
        for bp in &options.breakpoints {
            by_file
                .entry(bp.path.as_str())
                .or_default()
                .push(SourceBreakpoint { line: bp.line });
        }
        for (path, breakpoints) in by_file {
            let args = SetBreakpointsArguments {
                source: Source {
                    path: Some(path.to_string()),
                    ..Source::default()
                },
                breakpoints,
            };
            if let Err(e) = self
                .request_raw("setBreakpoints", Some(serde_json::to_value(args)?))
                .await
            {
                warn!("setBreakpoints for {} failed: {}", path, e);
            }
        }

        if let Err(e) = self.request_raw("configurationDone", None).await {
            warn!("configurationDone failed: {}", e);
        }

        start.wait().await?;
        info!("Debug session started, waiting for the program to stop");

        let Some(event) = self
            .wait_for_event(&["stopped", "terminated", "exited"], options.stop_timeout)
            .await?
        else {
            warn!("Program did not stop within {:?}", options.stop_timeout);
            return Ok(None);
        };

        if event.event != "stopped" {
            info!("Program ended before stopping ({})", event.event);
            return Ok(None);
        }

        let stopped: Option<StoppedEventBody> = event
            .body
            .map(serde_json::from_value::<StoppedEventBody>)
            .transpose()?;
        if let Some(thread_id) = stopped.as_ref().and_then(|s| s.thread_id) {
            info!(
                thread_id,
                reason = %stopped.as_ref().map(|s| s.reason.as_str()).unwrap_or(""),
                "Program stopped"
            );
            return Ok(Some(thread_id));
        }

        let threads: ThreadsResponseBody = self.request("threads", None).await?;
        Ok(threads.threads.first().map(|t| t.id))
    }
}

/// The debug session as one turn sees it.
///
/// Built fresh for each turn and never held across turns. A missing thread or
/// frame means "no context available", not an error.
#[derive(Clone)]
pub struct ActiveSession {
    gateway: Arc<dyn DebugGateway>,
    thread_id: Option<i64>,
    frame_id: Option<i64>,
}

impl ActiveSession {
    pub fn new(
        gateway: Arc<dyn DebugGateway>,
        thread_id: Option<i64>,
        frame_id: Option<i64>,
    ) -> Self {
        Self {
            gateway,
            thread_id,
            frame_id,
        }
    }

    /// Select the frame at `frame_index` (0 = innermost) of the thread's stack.
    pub async fn resolve(
        gateway: Arc<dyn DebugGateway>,
        thread_id: Option<i64>,
        frame_index: usize,
    ) -> Result<Self> {
        let frame_id = match thread_id {
            Some(thread_id) => gateway
                .fetch_stack_trace(thread_id)
                .await?
                .get(frame_index)
                .map(|f| f.id),
            None => None,
        };
        Ok(Self::new(gateway, thread_id, frame_id))
    }

    pub fn gateway(&self) -> &dyn DebugGateway {
        self.gateway.as_ref()
    }

    pub fn thread_id(&self) -> Option<i64> {
        self.thread_id
    }

    pub fn frame_id(&self) -> Option<i64> {
        self.frame_id
    }
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("thread_id", &self.thread_id)
            .field("frame_id", &self.frame_id)
            .finish()
    }
}
