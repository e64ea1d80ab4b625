//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// AI debugging assistant for Debug Adapter Protocol sessions
#[derive(Parser)]
#[command(name = "stacky", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for machine consumption
    Json,
}

/// How to reach the debug adapter and start the debuggee.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectArgs {
    /// Adapter command line spoken to over stdio (e.g. "lldb-dap")
    #[arg(long, conflicts_with = "connect")]
    pub adapter: Option<String>,

    /// Address of an adapter already listening (host:port)
    #[arg(long)]
    pub connect: Option<String>,

    /// Launch arguments as JSON, or @path to a JSON file
    #[arg(long, conflicts_with = "attach")]
    pub launch: Option<String>,

    /// Attach arguments as JSON, or @path to a JSON file
    #[arg(long)]
    pub attach: Option<String>,

    /// Breakpoint as file:line (repeatable)
    #[arg(long = "break", value_name = "FILE:LINE")]
    pub breakpoints: Vec<String>,

    /// Stack frame to treat as active (0 = innermost)
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Seconds to wait for the debuggee to stop
    #[arg(long, value_name = "SECS")]
    pub stop_timeout: Option<u64>,

    /// Adapter id sent with `initialize`
    #[arg(long, default_value = "stacky")]
    pub adapter_id: String,

    /// Workspace root for relative paths (default: STACKY_WORKSPACE or current directory)
    #[arg(long)]
    pub workdir: Option<String>,
}

impl ConnectArgs {
    pub fn has_adapter(&self) -> bool {
        self.adapter.is_some() || self.connect.is_some()
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the debug context of the stopped program
    Context {
        #[command(flatten)]
        connect: ConnectArgs,
        /// Leave out the local variables listing
        #[arg(long)]
        no_vars: bool,
        /// Also copy the context to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Ask one question, e.g. `stacky ask /ch "why is i negative?"`
    Ask {
        #[command(flatten)]
        connect: ConnectArgs,
        /// Model to use (default: STACKY_MODEL or gpt-4o)
        #[arg(long)]
        model: Option<String>,
        /// Command (/c, /h, /ch) followed by the prompt
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,
    },
    /// Interactive chat over one debug session
    Chat {
        #[command(flatten)]
        connect: ConnectArgs,
        /// Model to use (default: STACKY_MODEL or gpt-4o)
        #[arg(long)]
        model: Option<String>,
    },
    /// Inspect the configured LLM provider
    Providers {
        #[command(subcommand)]
        action: ProvidersAction,
    },
}

#[derive(Subcommand)]
pub enum ProvidersAction {
    /// Show the provider configuration
    Info,
    /// List models offered by the endpoint
    Models,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from([
            "stacky",
            "ask",
            "--adapter",
            "lldb-dap",
            "--launch",
            "{\"program\":\"a.out\"}",
            "--break",
            "main.c:12",
            "--break",
            "util.c:3",
            "/ch",
            "why",
            "negative?",
        ]);
        match cli.command {
            Command::Ask { connect, input, .. } => {
                assert_eq!(connect.adapter.as_deref(), Some("lldb-dap"));
                assert_eq!(connect.breakpoints, vec!["main.c:12", "util.c:3"]);
                assert_eq!(connect.frame, 0);
                assert_eq!(input.join(" "), "/ch why negative?");
            }
            _ => panic!("Expected ask"),
        }
    }

    #[test]
    fn test_adapter_and_connect_conflict() {
        let parsed = Cli::try_parse_from([
            "stacky",
            "context",
            "--adapter",
            "lldb-dap",
            "--connect",
            "127.0.0.1:4711",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_output_flag() {
        let cli = Cli::parse_from(["stacky", "providers", "models", "--output", "json"]);
        assert!(matches!(cli.output, OutputFormat::Json));
    }
}
