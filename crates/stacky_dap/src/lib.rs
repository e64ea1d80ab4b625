//! stacky-dap: the Protocol Gateway.
//!
//! Talks the Debug Adapter Protocol to an adapter process (stdio) or a
//! listening adapter (TCP) and exposes the three requests the context
//! pipeline needs through [`DebugGateway`].
//!
//! ```text
//! adapter ──Content-Length frames──► codec ──► DapClient ──► DebugGateway
//!                                               │
//!                                               └─► events (initialized, stopped, …)
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;
pub mod transport;


pub use client::{DapClient, PendingResponse};
pub use error::{DapError, Result};
pub use gateway::DebugGateway;
pub use protocol::{EventMessage, ProtocolMessage, RequestMessage, ResponseMessage};
pub use session::{ActiveSession, BreakpointSpec, SessionOptions, StartRequest};
pub use transport::AdapterTransport;
