//! Configuration for logging and telemetry

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Service name reported to the trace backend
    pub service_name: String,

    pub service_version: Option<String>,

    /// OTLP endpoint for trace export (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,

    /// Write formatted log lines to stderr
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Explicit filter directive. Wins over `RUST_LOG`.
    pub log_level: Option<String>,

    /// Filter used when neither `log_level` nor `RUST_LOG` is set
    #[serde(default = "default_level")]
    pub default_level: String,

    /// ANSI colors in console output
    #[serde(default)]
    pub ansi: bool,

    #[serde(default)]
    pub resource_attributes: Vec<(String, String)>,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "stacky".to_string(),
            service_version: None,
            otlp_endpoint: None,
            enable_console: true,
            log_level: None,
            default_level: default_level(),
            ansi: false,
            resource_attributes: Vec::new(),
        }
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.resource_attributes.push((key.into(), value.into()));
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `OTEL_SERVICE_NAME` → service_name (default "stacky")
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `STACKY_LOG` → log_level (`RUST_LOG` is consulted later by the filter)
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "stacky".to_string());

        // OTLP stays off unless explicitly configured.
        let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let log_level = std::env::var("STACKY_LOG")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            service_name,
            otlp_endpoint,
            log_level,
            ..Default::default()
        }
    }

    /// The filter directive `init` will install, ignoring `RUST_LOG`.
    pub fn filter_directive(&self) -> &str {
        self.log_level.as_deref().unwrap_or(&self.default_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ObservabilityConfig::default();
        assert_eq!(c.service_name, "stacky");
        assert!(c.enable_console);
        assert_eq!(c.filter_directive(), "warn");
        assert!(c.otlp_endpoint.is_none());
    }

    #[test]
    fn test_builder() {
        let c = ObservabilityConfig::new("stacky-cli")
            .with_version("0.1.0")
            .with_default_level("info")
            .with_resource_attribute("host", "dev");
        assert_eq!(c.service_version.as_deref(), Some("0.1.0"));
        assert_eq!(c.filter_directive(), "info");

        let c = c.with_log_level("stacky_dap=debug");
        assert_eq!(c.filter_directive(), "stacky_dap=debug");
        assert_eq!(c.resource_attributes.len(), 1);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let c: ObservabilityConfig =
            serde_json::from_str(r#"{"service_name":"x","service_version":null,"otlp_endpoint":null,"log_level":null}"#)
                .unwrap();
        assert!(c.enable_console);
        assert_eq!(c.default_level, "warn");
    }
}
