//! JSON output formatter

use crate::output::formatter::OutputFormatter;
use opsplane_application::{AgentToolReply, CommandPreview, CommandSuggestion, ConsoleError, ToolPreview};
use opsplane_domain::{ApprovalTicket, CommandError, CommandRecord, ExecutionRecord, ToolMeta};
use serde::Serialize;
use serde_json::json;

/// Pretty-printed JSON, one document per result.
pub struct JsonFormatter;

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

impl OutputFormatter for JsonFormatter {
    fn capabilities(&self, tools: &[ToolMeta]) -> String {
        to_json(tools)
    }

    fn tool_preview(&self, preview: &ToolPreview) -> String {
        to_json(preview)
    }

    fn execution(&self, record: &ExecutionRecord) -> String {
        to_json(record)
    }

    fn agent_reply(&self, reply: &AgentToolReply) -> String {
        to_json(reply)
    }

    fn ticket(&self, ticket: &ApprovalTicket) -> String {
        to_json(ticket)
    }

    fn tickets(&self, tickets: &[ApprovalTicket]) -> String {
        to_json(tickets)
    }

    fn suggestions(&self, suggestions: &[CommandSuggestion]) -> String {
        to_json(suggestions)
    }

    fn command_preview(&self, preview: &CommandPreview) -> String {
        to_json(preview)
    }

    fn command_record(&self, record: &CommandRecord) -> String {
        to_json(record)
    }

    fn command_history(&self, records: &[CommandRecord]) -> String {
        to_json(records)
    }

    fn error(&self, error: &ConsoleError) -> String {
        let mut body = json!({
            "ok": false,
            "error_code": error.code(),
            "error_message": error.to_string(),
        });
        if let ConsoleError::Command(CommandError::ApprovalTokenRequired {
            ticket_id: Some(ticket_id),
        }) = error
        {
            body["ticket_id"] = json!(ticket_id);
        }
        to_json(&body)
    }
}
