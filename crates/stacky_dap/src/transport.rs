//! How stacky reaches a debug adapter.
//!
//! - **Stdio**: spawn the adapter and speak DAP over its stdin/stdout
//! - **Tcp**: connect to an adapter already listening on `host:port`

use std::process::Stdio;

use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::info;

use crate::client::DapClient;
use crate::error::{DapError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterTransport {
    Stdio { command: String, args: Vec<String> },
    Tcp { address: String },
}

impl AdapterTransport {
    /// Parse a shell-style adapter command line, e.g. `"python -m debugpy.adapter"`.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut parts = shlex::split(line)
            .ok_or_else(|| DapError::StartFailed(format!("Unbalanced quoting in '{}'", line)))?
            .into_iter();
        let command = parts
            .next()
            .ok_or_else(|| DapError::StartFailed("Empty adapter command".to_string()))?;
        Ok(AdapterTransport::Stdio {
            command,
            args: parts.collect(),
        })
    }

    pub fn tcp(address: impl Into<String>) -> Self {
        AdapterTransport::Tcp {
            address: address.into(),
        }
    }

    /// Open the connection and return a client bound to it.
    pub async fn connect(&self) -> Result<DapClient> {
        match self {
            AdapterTransport::Stdio { command, args } => {
                info!("Starting debug adapter: {} {:?}", command, args);
                let mut child = Command::new(command)
                    .args(args)
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .spawn()
                    .map_err(|e| {
                        DapError::StartFailed(format!("Failed to start '{}': {}", command, e))
                    })?;

                let stdin = child.stdin.take().ok_or_else(|| {
                    DapError::StartFailed("Could not capture adapter stdin".to_string())
                })?;
                let stdout = child.stdout.take().ok_or_else(|| {
                    DapError::StartFailed("Could not capture adapter stdout".to_string())
                })?;

                Ok(DapClient::new(stdout, stdin).with_child(child))
            }
            AdapterTransport::Tcp { address } => {
                info!("Connecting to debug adapter at {}", address);
                let stream = TcpStream::connect(address.as_str()).await.map_err(|e| {
                    DapError::StartFailed(format!("Failed to connect to {}: {}", address, e))
                })?;
                let (read, write) = stream.into_split();
                Ok(DapClient::new(read, write))
            }
        }
    }
}

impl std::fmt::Display for AdapterTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterTransport::Stdio { command, args } if args.is_empty() => {
                write!(f, "stdio:{}", command)
            }
            AdapterTransport::Stdio { command, args } => {
                write!(f, "stdio:{} {}", command, args.join(" "))
            }
            AdapterTransport::Tcp { address } => write!(f, "tcp:{}", address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line() {
        let t = AdapterTransport::from_command_line("python -m 'debugpy.adapter'").unwrap();
        assert_eq!(
            t,
            AdapterTransport::Stdio {
                command: "python".to_string(),
                args: vec!["-m".to_string(), "debugpy.adapter".to_string()],
            }
        );
        assert_eq!(t.to_string(), "stdio:python -m debugpy.adapter");
    }

    #[test]
    fn test_from_command_line_rejects_empty() {
        assert!(AdapterTransport::from_command_line("   ").is_err());
        assert!(AdapterTransport::from_command_line("lldb-dap \"unterminated").is_err());
    }

    #[tokio::test]
    async fn test_spawn_missing_adapter() {
        let t = AdapterTransport::from_command_line("definitely-not-a-debug-adapter-xyz").unwrap();
        let err = t.connect().await.err().unwrap();
        assert!(matches!(err, DapError::StartFailed(_)));
    }
}
