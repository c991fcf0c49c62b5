//! Output formatter trait

use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;
use crate::output::json::JsonFormatter;
use opsplane_application::{AgentToolReply, CommandPreview, CommandSuggestion, ConsoleError, ToolPreview};
use opsplane_domain::{ApprovalTicket, CommandRecord, ExecutionRecord, ToolMeta};

/// Renders console results for the terminal.
pub trait OutputFormatter: Send + Sync {
    fn capabilities(&self, tools: &[ToolMeta]) -> String;

    fn tool_preview(&self, preview: &ToolPreview) -> String;

    fn execution(&self, record: &ExecutionRecord) -> String;

    fn agent_reply(&self, reply: &AgentToolReply) -> String;

    fn ticket(&self, ticket: &ApprovalTicket) -> String;

    fn tickets(&self, tickets: &[ApprovalTicket]) -> String;

    fn suggestions(&self, suggestions: &[CommandSuggestion]) -> String;

    fn command_preview(&self, preview: &CommandPreview) -> String;

    fn command_record(&self, record: &CommandRecord) -> String;

    fn command_history(&self, records: &[CommandRecord]) -> String;

    fn error(&self, error: &ConsoleError) -> String;
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
