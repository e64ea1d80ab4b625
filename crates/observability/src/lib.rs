//! Stacky observability: tracing subscriber setup with optional OTLP export.
//!
//! Logs always go to stderr so stdout stays free for answers and context
//! dumps.
//!
//! # Quick Start
//!
//! ```no_run
//! use stacky_observability::{ObservabilityConfig, init};
//!
//! let config = ObservabilityConfig::new("stacky")
//!     .with_default_level("warn")
//!     .with_otlp_endpoint("http://localhost:4317");
//!
//! init(config).unwrap();
//! tracing::info!("Started");
//! stacky_observability::shutdown();
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` - Service name
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint (OTLP export is off without it)
//! - `STACKY_LOG` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::ObservabilityConfig;
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use tracing::{record_duration, record_error};

// Macros are exported at the crate root via #[macro_export]:
// stacky_observability::dap_request_span!(), turn_span!(), context_span!().
