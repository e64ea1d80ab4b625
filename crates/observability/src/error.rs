use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservabilityError {
    /// A global subscriber is already installed, or installing one failed.
    #[error("Could not install tracing subscriber: {0}")]
    Subscriber(String),

    #[error("OTLP exporter setup failed: {0}")]
    Exporter(String),

    #[error("Invalid observability configuration: {0}")]
    Config(String),
}
