//! Shared setup: runtime config, model provider and the debug adapter connection.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;
use stacky_dap::{
    ActiveSession, AdapterTransport, BreakpointSpec, DapClient, DebugGateway, SessionOptions,
    StartRequest,
};
use stacky_llms::{OpenAIProvider, ProviderRegistry};
use stacky_runtime::{Assistant, FsSourceReader, RuntimeConfig};
use tracing::debug;

use crate::cli::ConnectArgs;
use crate::output;

pub const OPENAI: &str = "openai";

/// Env configuration with CLI overrides applied.
pub fn runtime_config(workdir: Option<&str>, model: Option<String>) -> Result<RuntimeConfig> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let mut config = RuntimeConfig::from_env(cwd);
    if let Some(dir) = workdir {
        config.workspace_root = PathBuf::from(dir);
    }
    if let Some(model) = model {
        config = config.with_model(model);
    }
    Ok(config)
}

/// Providers usable with the current environment. Empty without an API key.
pub fn build_registry(config: &RuntimeConfig) -> ProviderRegistry {
    let registry = ProviderRegistry::new();
    match OpenAIProvider::with_base_url(config.base_url.clone()) {
        Ok(provider) => registry.register(OPENAI, provider),
        Err(e) => {
            debug!("OpenAI provider unavailable: {}", e);
            registry
        }
    }
}

pub fn build_assistant(config: RuntimeConfig) -> Assistant {
    let provider = build_registry(&config).get_provider(OPENAI).ok();
    let reader = FsSourceReader::new().with_workspace_root(config.workspace_root.clone());
    let assistant = Assistant::new(config, Arc::new(reader));
    match provider {
        Some(provider) => assistant.with_provider(provider),
        None => assistant,
    }
}

/// A connected adapter and the thread it stopped on.
pub struct DebugConnection {
    client: Arc<DapClient>,
    thread_id: Option<i64>,
    frame: usize,
}

impl DebugConnection {
    /// Connect and run the session bootstrap. `None` when no adapter was given.
    pub async fn open(args: &ConnectArgs) -> Result<Option<Self>> {
        let transport = match (&args.adapter, &args.connect) {
            (Some(command), _) => AdapterTransport::from_command_line(command)?,
            (None, Some(address)) => AdapterTransport::tcp(address.clone()),
            (None, None) => return Ok(None),
        };
        let options = session_options(args)?;

        let spinner = output::spinner(&format!("Starting debug session ({})...", transport));
        let client = match transport.connect().await {
            Ok(client) => client,
            Err(e) => {
                output::spinner_error(&spinner, "Could not reach the debug adapter");
                return Err(e.into());
            }
        };
        let thread_id = match client.start_session(&options).await {
            Ok(thread_id) => thread_id,
            Err(e) => {
                output::spinner_error(&spinner, "Debug session failed to start");
                return Err(e.into());
            }
        };

        match thread_id {
            Some(id) => output::spinner_success(&spinner, &format!("Stopped on thread {}", id)),
            None => {
                spinner.finish_and_clear();
                output::warning("The program did not stop; no debug context is available");
            }
        }

        Ok(Some(Self {
            client: Arc::new(client),
            thread_id,
            frame: args.frame,
        }))
    }

    /// Fresh view of the paused program for one turn.
    pub async fn active_session(&self) -> Result<ActiveSession> {
        let gateway: Arc<dyn DebugGateway> = self.client.clone();
        Ok(ActiveSession::resolve(gateway, self.thread_id, self.frame).await?)
    }

    pub async fn close(self) {
        match Arc::try_unwrap(self.client) {
            Ok(mut client) => client.disconnect(true).await,
            Err(_) => debug!("Debug client still in use; dropping connection"),
        }
    }
}

/// The active session of `connection`, if any.
pub async fn session_of(connection: Option<&DebugConnection>) -> Result<Option<ActiveSession>> {
    match connection {
        Some(connection) => Ok(Some(connection.active_session().await?)),
        None => Ok(None),
    }
}

fn session_options(args: &ConnectArgs) -> Result<SessionOptions> {
    let request = match (&args.launch, &args.attach) {
        (Some(raw), _) => StartRequest::Launch(read_json_arg(raw)?),
        (None, Some(raw)) => StartRequest::Attach(read_json_arg(raw)?),
        (None, None) => bail!("--launch or --attach is required when an adapter is given"),
    };
    let breakpoints = args
        .breakpoints
        .iter()
        .map(|b| b.parse::<BreakpointSpec>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut options = SessionOptions::new(request)
        .with_adapter_id(args.adapter_id.clone())
        .with_breakpoints(breakpoints);
    if let Some(secs) = args.stop_timeout {
        options = options.with_stop_timeout(Duration::from_secs(secs));
    }
    Ok(options)
}

/// Inline JSON, or `@path` to a JSON file.
fn read_json_arg(raw: &str) -> Result<JsonValue> {
    let text = match raw.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("Start arguments are not valid JSON")
}
