//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for opsplane
#[derive(Parser, Debug)]
#[command(name = "opsplane")]
#[command(author, version, about = "Operations console with gated tool execution")]
#[command(long_about = r#"
opsplane runs diagnostic and mutating operations tools behind a policy gate.

Readonly tools run immediately. Mutating tools need an approved ticket whose
id is passed back as the approval token. Free-text commands are routed to an
intent, planned, previewed and executed through the same gate.

Configuration files are loaded from (in priority order):
1. OPSPLANE_<SECTION>__<KEY>   Environment
2. --config <path>             Explicit config file
3. ./opsplane.toml             Project-level config
4. ~/.config/opsplane/config.toml   Global config

Example:
  opsplane tools
  opsplane preview host_logs target=web-1
  opsplane plan "deployment.release service_id=svc-checkout"
  opsplane                     (interactive console)
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Caller identity used for permission checks
    #[arg(long = "as", value_name = "CALLER", default_value = "operator", global = true)]
    pub caller: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the tools the caller may invoke
    Tools,

    /// Show how a tool call would resolve, without running it
    Preview {
        tool: String,
        /// Parameters as KEY=VALUE
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Execute a tool
    Exec {
        tool: String,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Approved ticket id for mutating tools
        #[arg(long, value_name = "TICKET")]
        token: Option<String>,
    },

    /// Suggest intents for free text
    Suggest {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Route free text to an intent and show its plan
    Plan {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Force an intent instead of detecting one
        #[arg(long)]
        intent: Option<String>,
    },

    /// Execute a free-text command
    Run {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[arg(long)]
        intent: Option<String>,
        /// Confirm execution
        #[arg(short, long)]
        yes: bool,
        #[arg(long, value_name = "TICKET")]
        token: Option<String>,
    },

    /// Interactive console (default)
    Console,
}

impl Cli {
    /// The subcommand to run; no subcommand opens the console.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Console)
    }
}
