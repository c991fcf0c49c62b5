//! Presentation layer for opsplane
//!
//! This crate contains the CLI definitions, output formatters and the
//! interactive operator console.

pub mod cli;
pub mod output;
pub mod repl;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use cli::params::parse_params;
pub use output::console::ConsoleFormatter;
pub use output::formatter::{OutputFormatter, formatter_for};
pub use output::json::JsonFormatter;
pub use repl::ConsoleRepl;
