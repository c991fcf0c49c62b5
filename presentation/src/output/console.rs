//! Console output formatter for control plane results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use opsplane_application::{
    AgentToolReply, CommandPreview, CommandSuggestion, ConsoleError, ToolPreview,
};
use opsplane_domain::{
    ApprovalTicket, CommandError, CommandRecord, CommandRisk, CommandStatus, ExecutionRecord,
    ExecutionStatus, RiskLevel, TicketStatus, ToolMeta, ToolMode, ToolResult,
};
use serde_json::Value;

/// Formats results for an interactive terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }

    fn mode(mode: ToolMode) -> String {
        match mode {
            ToolMode::Readonly => mode.as_str().green().to_string(),
            ToolMode::Mutating => mode.as_str().yellow().to_string(),
        }
    }

    fn risk(risk: RiskLevel) -> String {
        match risk {
            RiskLevel::Low => risk.as_str().green().to_string(),
            RiskLevel::Medium => risk.as_str().yellow().to_string(),
            RiskLevel::High => risk.as_str().red().bold().to_string(),
        }
    }

    fn command_risk(risk: CommandRisk) -> String {
        match risk {
            CommandRisk::Readonly => risk.as_str().green().to_string(),
            CommandRisk::Low => risk.as_str().yellow().to_string(),
            CommandRisk::High => risk.as_str().red().bold().to_string(),
        }
    }

    fn command_status(status: CommandStatus) -> String {
        match status {
            CommandStatus::Succeeded => status.as_str().green().to_string(),
            CommandStatus::Failed | CommandStatus::Rejected => status.as_str().red().to_string(),
            CommandStatus::Blocked => status.as_str().yellow().to_string(),
            CommandStatus::Previewed | CommandStatus::Running => status.as_str().cyan().to_string(),
        }
    }

    fn result(result: &ToolResult) -> String {
        if result.ok {
            format!(
                "{} {}\n{}\n",
                "✓".green().bold(),
                format!("{} ({}ms)", result.source, result.latency_ms).dimmed(),
                Self::indent(&Self::pretty(&result.data), "  ")
            )
        } else {
            let code = result
                .error_code
                .map(|c| c.as_str())
                .unwrap_or("tool_error");
            format!(
                "{} {} {}\n",
                "✗".red().bold(),
                code.red().bold(),
                result.error_message.as_deref().unwrap_or("")
            )
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn capabilities(&self, tools: &[ToolMeta]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools available for this caller.".dimmed());
        }
        let mut output = Self::header("Available Tools");
        for tool in tools {
            output.push_str(&format!(
                "\n{} [{} / {}] {}\n  {}\n",
                tool.name.bold(),
                Self::mode(tool.mode),
                Self::risk(tool.risk),
                format!("({})", tool.permission).dimmed(),
                tool.description
            ));
            if !tool.required.is_empty() {
                output.push_str(&format!(
                    "  {} {}\n",
                    "required:".dimmed(),
                    tool.required.join(", ")
                ));
            }
        }
        output
    }

    fn tool_preview(&self, preview: &ToolPreview) -> String {
        let mut output = format!(
            "{} {} [{} / {}]\n",
            "Preview:".cyan().bold(),
            preview.tool.bold(),
            Self::mode(preview.mode),
            Self::risk(preview.risk)
        );
        output.push_str(&Self::section_header("Resolved parameters"));
        for (key, value) in &preview.resolution.resolved {
            let source = preview
                .resolution
                .sources
                .get(key)
                .map(|s| format!(" ← {}", s.as_str()))
                .unwrap_or_default();
            output.push_str(&format!("  {} = {}{}\n", key, value, source.dimmed()));
        }
        if !preview.missing.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Missing:".yellow().bold(),
                preview.missing.join(", ")
            ));
        }
        if let Some(approval) = &preview.approval {
            output.push_str(&format!(
                "\n{} ticket {} pending review (expires {})\n",
                "Mutating:".yellow().bold(),
                approval.ticket_id.bold(),
                approval.expires_at
            ));
        } else if preview.requires_approval {
            output.push_str(&format!(
                "\n{}\n",
                "Mutating: an approved ticket is required to execute.".yellow()
            ));
        }
        output
    }

    fn execution(&self, record: &ExecutionRecord) -> String {
        let status = match record.status {
            ExecutionStatus::Succeeded => record.status.as_str().green().bold(),
            ExecutionStatus::Failed => record.status.as_str().red().bold(),
            _ => record.status.as_str().cyan().bold(),
        };
        let mut output = format!(
            "{} {} {} {}\n",
            "Execution".cyan().bold(),
            record.id.dimmed(),
            record.tool.bold(),
            status
        );
        if let Some(result) = &record.result {
            output.push_str(&Self::result(result));
            if let Some(ticket) = result.data.get("ticket_id").and_then(Value::as_str) {
                output.push_str(&format!(
                    "{} {}\n",
                    "Approval ticket:".yellow().bold(),
                    ticket
                ));
            }
        }
        output
    }

    fn agent_reply(&self, reply: &AgentToolReply) -> String {
        match &reply.approval {
            Some(required) => format!(
                "{} {} is waiting on ticket {} (expires at {})\n",
                "⏸".yellow().bold(),
                required.tool.bold(),
                required.ticket_id.yellow(),
                required.expires_at
            ),
            None => Self::result(&reply.result),
        }
    }

    fn ticket(&self, ticket: &ApprovalTicket) -> String {
        let status = match ticket.status {
            TicketStatus::Approved => ticket.status.as_str().green().bold(),
            TicketStatus::Pending => ticket.status.as_str().yellow().bold(),
            _ => ticket.status.as_str().red().bold(),
        };
        let mut output = format!(
            "{} {} {} [{}] {}\n",
            "Ticket".cyan().bold(),
            ticket.id,
            ticket.tool.bold(),
            Self::risk(ticket.risk),
            status
        );
        output.push_str(&format!(
            "  {} {}  {} {}\n",
            "requester:".dimmed(),
            ticket.requester,
            "expires_at:".dimmed(),
            ticket.expires_at
        ));
        if let Some(reviewer) = &ticket.reviewer {
            output.push_str(&format!("  {} {}\n", "reviewer:".dimmed(), reviewer));
        }
        if !ticket.params.is_empty() {
            output.push_str(&Self::indent(
                &Self::pretty(&Value::Object(ticket.params.clone())),
                "  ",
            ));
            output.push('\n');
        }
        output
    }

    fn tickets(&self, tickets: &[ApprovalTicket]) -> String {
        if tickets.is_empty() {
            return format!("{}\n", "No pending approvals.".dimmed());
        }
        tickets.iter().map(|t| self.ticket(t)).collect::<Vec<_>>().join("\n")
    }

    fn suggestions(&self, suggestions: &[CommandSuggestion]) -> String {
        if suggestions.is_empty() {
            return format!("{}\n", "No matching intents.".dimmed());
        }
        let mut output = String::new();
        for s in suggestions {
            output.push_str(&format!(
                "{} [{}] {}\n",
                s.intent.bold(),
                Self::command_risk(s.risk),
                s.description
            ));
            if !s.missing.is_empty() {
                output.push_str(&format!("  {} {}\n", "needs:".dimmed(), s.missing.join(", ")));
            }
        }
        output
    }

    fn command_preview(&self, preview: &CommandPreview) -> String {
        let record = &preview.record;
        let mut output = Self::header(&format!("Command {}", record.intent));
        output.push_str(&format!(
            "{} {}  {} {}  {} {}\n",
            "id:".dimmed(),
            record.command_id,
            "risk:".dimmed(),
            Self::command_risk(record.risk),
            "status:".dimmed(),
            Self::command_status(record.status)
        ));

        output.push_str(&Self::section_header("Plan"));
        for step in &preview.plan.steps {
            output.push_str(&format!("  {}. {} {}\n", step.order, step.action.bold(), step.detail));
        }

        if !preview.prompts.is_empty() {
            output.push_str(&Self::section_header("Missing"));
            for (field, prompt) in &preview.prompts {
                output.push_str(&format!("  {} {}\n", field.yellow().bold(), prompt));
            }
        }
        if let Some(required) = &preview.approval {
            output.push_str(&format!(
                "\n{} {} (approve it, then execute with the ticket id as token)\n",
                "Approval ticket:".yellow().bold(),
                required.ticket_id
            ));
        }
        if !preview.next_intents.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Next:".dimmed(),
                preview.next_intents.join(", ")
            ));
        }
        output
    }

    fn command_record(&self, record: &CommandRecord) -> String {
        let mut output = format!(
            "{} {} {} {}\n",
            "Command".cyan().bold(),
            record.command_id.dimmed(),
            record.intent.bold(),
            Self::command_status(record.status)
        );
        if let Some(summary) = &record.summary {
            output.push_str(&format!("  {}\n", summary));
        }
        if let Some(result) = &record.result {
            let data = result.get("data").unwrap_or(result);
            if !data.is_null() {
                output.push_str(&Self::indent(&Self::pretty(data), "  "));
                output.push('\n');
            }
        }
        output
    }

    fn command_history(&self, records: &[CommandRecord]) -> String {
        if records.is_empty() {
            return format!("{}\n", "No commands yet.".dimmed());
        }
        records
            .iter()
            .map(|r| {
                format!(
                    "{} {:<24} {:<10} {}\n",
                    r.command_id.dimmed(),
                    r.intent,
                    Self::command_status(r.status),
                    r.summary.as_deref().unwrap_or("")
                )
            })
            .collect()
    }

    fn error(&self, error: &ConsoleError) -> String {
        let mut output = format!("{} {}\n", format!("[{}]", error.code()).red().bold(), error);
        if let ConsoleError::Command(CommandError::ApprovalTokenRequired {
            ticket_id: Some(ticket_id),
        }) = error
        {
            output.push_str(&format!(
                "{} {}\n",
                "Approval ticket:".yellow().bold(),
                ticket_id
            ));
        }
        output
    }
}
