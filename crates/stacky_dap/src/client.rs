//! DAP client: request/response correlation and event delivery.
//!
//! A background task owns the read half of the connection. Responses are
//! routed to the waiting request by `request_seq`; events are queued on an
//! unbounded channel and consumed with [`DapClient::wait_for_event`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::process::Child;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use stacky_observability::{dap_request_span, record_duration};
use tracing::{Instrument, debug, warn};

use crate::codec::{read_message, write_message};
use crate::error::{DapError, Result};
use crate::protocol::{EventMessage, ProtocolMessage, RequestMessage, ResponseMessage};

type Writer = Box<dyn AsyncWrite + Send + Unpin>;
type PendingMap = Arc<StdMutex<HashMap<i64, oneshot::Sender<ResponseMessage>>>>;

pub struct DapClient {
    writer: Arc<Mutex<Writer>>,
    seq: Arc<AtomicI64>,
    pending: PendingMap,
    events: Mutex<mpsc::UnboundedReceiver<EventMessage>>,
    reader_task: JoinHandle<()>,
    child: Option<Child>,
    timeout: Duration,
}

/// A request that has been written but whose response has not been awaited.
///
/// Some adapters answer `launch` only after `configurationDone`, so the
/// session bootstrap sends it first and collects the response later.
pub struct PendingResponse {
    command: String,
    seq: i64,
    rx: oneshot::Receiver<ResponseMessage>,
    pending: PendingMap,
    timeout: Duration,
}

impl PendingResponse {
    /// Wait for the response body. `success: false` becomes [`DapError::RequestFailed`].
    pub async fn wait(self) -> Result<Option<JsonValue>> {
        let response = match tokio::time::timeout(self.timeout, self.rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(DapError::Closed),
            Err(_) => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.remove(&self.seq);
                }
                return Err(DapError::Timeout(self.command));
            }
        };

        if !response.success {
            return Err(DapError::RequestFailed {
                command: self.command,
                message: response.error_message(),
            });
        }
        Ok(response.body)
    }
}

impl DapClient {
    /// Build a client over an arbitrary byte stream pair.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: Arc<Mutex<Writer>> = Arc::new(Mutex::new(Box::new(writer)));
        let seq = Arc::new(AtomicI64::new(1));
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let reader_task = tokio::spawn(read_loop(
            BufReader::new(reader),
            Arc::clone(&writer),
            Arc::clone(&seq),
            Arc::clone(&pending),
            events_tx,
        ));

        Self {
            writer,
            seq,
            pending,
            events: Mutex::new(events_rx),
            reader_task,
            child: None,
            timeout: Duration::from_secs(stacky_constant::defaults::DAP_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Keep the adapter process alive for as long as the client lives.
    pub fn with_child(mut self, child: Child) -> Self {
        self.child = Some(child);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn next_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Write a request and return a handle for its response.
    pub async fn send_request(
        &self,
        command: &str,
        arguments: Option<JsonValue>,
    ) -> Result<PendingResponse> {
        let seq = self.next_seq();
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| DapError::Protocol("pending request table poisoned".to_string()))?;
            pending.insert(seq, tx);
        }

        let message = ProtocolMessage::Request(RequestMessage {
            seq,
            command: command.to_string(),
            arguments,
        });

        debug!(seq, command, "DAP request");
        let written = {
            let mut writer = self.writer.lock().await;
            write_message(&mut *writer, &message).await
        };
        if let Err(e) = written {
            if let Ok(mut pending) = self.pending.lock() {
                pending.remove(&seq);
            }
            return Err(e);
        }

        Ok(PendingResponse {
            command: command.to_string(),
            seq,
            rx,
            pending: Arc::clone(&self.pending),
            timeout: self.timeout,
        })
    }

    /// Send a request and wait for its raw body.
    pub async fn request_raw(
        &self,
        command: &str,
        arguments: Option<JsonValue>,
    ) -> Result<Option<JsonValue>> {
        let pending = self.send_request(command, arguments).await?;
        let span = dap_request_span!(command, pending.seq);
        async move {
            let start = Instant::now();
            let result = pending.wait().await;
            record_duration("duration_ms", start.elapsed());
            if let Err(e) = &result {
                let span = tracing::Span::current();
                span.record("error", true);
                span.record("error.message", e.to_string());
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Send a request and decode its body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        command: &str,
        arguments: Option<JsonValue>,
    ) -> Result<T> {
        let body = self.request_raw(command, arguments).await?;
        let body = body.ok_or_else(|| {
            DapError::Protocol(format!("Response to '{}' has no body", command))
        })?;
        Ok(serde_json::from_value(body)?)
    }

    /// Wait until an event with one of `names` arrives, discarding others.
    ///
    /// Returns `Ok(None)` when `timeout` elapses, `Err(Closed)` when the
    /// adapter goes away.
    pub async fn wait_for_event(
        &self,
        names: &[&str],
        timeout: Duration,
    ) -> Result<Option<EventMessage>> {
        let mut events = self.events.lock().await;
        let wait = async {
            loop {
                match events.recv().await {
                    Some(event) if names.contains(&event.event.as_str()) => return Ok(event),
                    Some(event) => debug!(event = %event.event, "Skipping DAP event"),
                    None => return Err(DapError::Closed),
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// End the debug session. Errors are ignored because the adapter may
    /// already have exited.
    pub async fn disconnect(&mut self, terminate_debuggee: bool) {
        let args = serde_json::json!({ "terminateDebuggee": terminate_debuggee });
        if let Err(e) = self.request_raw("disconnect", Some(args)).await {
            debug!("disconnect: {}", e);
        }
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
        }
    }
}

impl Drop for DapClient {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn read_loop<R>(
    mut reader: BufReader<R>,
    writer: Arc<Mutex<Writer>>,
    seq: Arc<AtomicI64>,
    pending: PendingMap,
    events_tx: mpsc::UnboundedSender<EventMessage>,
) where
    R: AsyncRead + Send + Unpin + 'static,
{
    loop {
        let message = match read_message(&mut reader).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("DAP stream ended");
                break;
            }
            Err(DapError::Json(e)) => {
                warn!("Ignoring undecodable DAP message: {}", e);
                continue;
            }
            Err(e) => {
                warn!("DAP read failed: {}", e);
                break;
            }
        };

        match message {
            ProtocolMessage::Response(response) => {
                debug!(request_seq = response.request_seq, command = %response.command, success = response.success, "DAP response");
                let waiter = pending
                    .lock()
                    .ok()
                    .and_then(|mut p| p.remove(&response.request_seq));
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => debug!(
                        request_seq = response.request_seq,
                        "Response for unknown request"
                    ),
                }
            }
            ProtocolMessage::Event(event) => {
                debug!(event = %event.event, "DAP event");
                let _ = events_tx.send(event);
            }
            ProtocolMessage::Request(request) => {
                // Reverse requests (runInTerminal, startDebugging) are not supported.
                debug!(command = %request.command, "Declining reverse request");
                let reply = ProtocolMessage::Response(ResponseMessage {
                    seq: seq.fetch_add(1, Ordering::SeqCst),
                    request_seq: request.seq,
                    success: false,
                    command: request.command,
                    message: Some("not supported by stacky".to_string()),
                    body: None,
                });
                let mut writer = writer.lock().await;
                if let Err(e) = write_message(&mut *writer, &reply).await {
                    warn!("Failed to answer reverse request: {}", e);
                }
            }
        }
    }

    // Dropping the senders wakes every waiter with `Closed`.
    if let Ok(mut pending) = pending.lock() {
        pending.clear();
    }
}
