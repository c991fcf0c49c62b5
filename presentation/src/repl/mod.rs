//! Interactive operator console
//!
//! A reedline loop over one [`ConsoleService`]. Approval tickets, execution
//! records and command history live in the service, so the full
//! preview → approve → execute flow works within one session. The session's
//! parameter memory carries values from earlier calls into later resolutions.

mod line;

pub use line::{ReplLine, parse_line};

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use opsplane_application::{
    CommandRequest, ConsoleService, ExecutionContext, ExecutionEventSink, InMemorySessionMemory,
    PermissionChecker,
};
use opsplane_domain::ReviewDecision;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;
use tracing::debug;

const HISTORY_SIZE: usize = 1_000;
const HISTORY_LIMIT: usize = 20;

/// What the loop does after a line.
#[derive(Debug, PartialEq)]
pub enum ReplOutcome {
    Print(String),
    Quit,
}

pub struct ConsoleRepl {
    service: Arc<ConsoleService>,
    permissions: Arc<dyn PermissionChecker>,
    events: Arc<dyn ExecutionEventSink>,
    formatter: Box<dyn OutputFormatter>,
    memory: Arc<InMemorySessionMemory>,
    conversation_id: String,
    caller: String,
    token: Option<String>,
}

impl ConsoleRepl {
    pub fn new(
        service: Arc<ConsoleService>,
        permissions: Arc<dyn PermissionChecker>,
        events: Arc<dyn ExecutionEventSink>,
        formatter: Box<dyn OutputFormatter>,
        caller: impl Into<String>,
    ) -> Self {
        Self {
            service,
            permissions,
            events,
            formatter,
            memory: Arc::new(InMemorySessionMemory::new()),
            conversation_id: format!("console-{}", std::process::id()),
            caller: caller.into(),
            token: None,
        }
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    /// Context for the next request: caller, session memory and token.
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(self.caller.clone(), Arc::clone(&self.permissions))
            .with_conversation(self.conversation_id.clone())
            .with_memory(self.memory.clone())
            .with_events(Arc::clone(&self.events))
            .with_approval_token(self.token.clone())
    }

    /// Run the interactive loop until `/quit` or end of input.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = Reedline::create();

        let history_path = dirs::data_dir().map(|p| p.join("opsplane").join("history.txt"));
        if let Some(path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_SIZE, path) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => debug!("History disabled: {}", e),
            }
        }

        self.print_welcome();

        loop {
            let prompt = DefaultPrompt::new(
                DefaultPromptSegment::Basic(format!("opsplane({})", self.caller)),
                DefaultPromptSegment::Empty,
            );
            match editor.read_line(&prompt)? {
                Signal::Success(line) => match self.handle(parse_line(&line)).await {
                    ReplOutcome::Print(text) => {
                        if !text.is_empty() {
                            println!("{}", text);
                        }
                    }
                    ReplOutcome::Quit => {
                        println!("Bye!");
                        break;
                    }
                },
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                _ => continue,
            }
        }
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            opsplane - Operator Console      │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Caller: {}", self.caller.bold());
        println!("Type free text to plan a command, or /help for commands.");
        println!();
    }

    fn help() -> String {
        [
            "Commands:",
            "  /tools                       List tools you may invoke",
            "  /preview <tool> [k=v ...]    Show resolution; mutating tools get a ticket",
            "  /exec <tool> [k=v ...]       Execute a tool (uses the session token)",
            "  /call <tool> [k=v ...]       Conversational call; approval is reported inline",
            "  /request <tool> [k=v ...]    Create an approval ticket",
            "  /approve <ticket>            Approve a ticket",
            "  /reject <ticket>             Reject a ticket",
            "  /ticket <id>                 Show a ticket",
            "  /pending                     List pending tickets",
            "  /token [ticket]              Set or clear the session approval token",
            "  /execution <id>              Show an execution record",
            "  /suggest <text>              Suggest intents",
            "  /plan <text>                 Preview a command",
            "  /run <text>                  Execute a command (confirmed)",
            "  /confirm <command-id>        Execute a previewed command",
            "  /command <id>                Show a command record",
            "  /history                     Recent commands",
            "  /as <caller>                 Switch caller",
            "  /quit                        Exit",
        ]
        .join("\n")
    }

    fn execute_request(&self, request: CommandRequest) -> CommandRequest {
        match &self.token {
            Some(token) => request.confirmed().with_token(token.clone()),
            None => request.confirmed(),
        }
    }

    /// Apply one parsed line.
    pub async fn handle(&mut self, line: ReplLine) -> ReplOutcome {
        let ctx = self.context();
        let f = self.formatter.as_ref();
        let text = match line {
            ReplLine::Empty => String::new(),
            ReplLine::Quit => return ReplOutcome::Quit,
            ReplLine::Help => Self::help(),
            ReplLine::Invalid(msg) => format!("{}\nType /help for available commands", msg.red()),
            ReplLine::Tools => f.capabilities(&self.service.list_capabilities(&ctx)),
            ReplLine::Preview { tool, params } => {
                match self.service.preview_tool(&ctx, &tool, &params) {
                    Ok(preview) => f.tool_preview(&preview),
                    Err(e) => f.error(&e),
                }
            }
            ReplLine::Exec { tool, params } => {
                f.execution(&self.service.execute_tool(&ctx, &tool, params).await)
            }
            ReplLine::Call { tool, params } => {
                f.agent_reply(&self.service.agent_call_tool(&ctx, &tool, params).await)
            }
            ReplLine::Request { tool, params } => {
                match self.service.create_approval(&ctx, &tool, &params) {
                    Ok(ticket) => f.ticket(&ticket),
                    Err(e) => f.error(&e),
                }
            }
            ReplLine::Approve(id) => {
                match self.service.confirm_approval(&ctx, &id, ReviewDecision::Approve) {
                    Ok(ticket) => format!(
                        "{}{}",
                        f.ticket(&ticket),
                        format!("Use /token {} to execute with it.", ticket.id).dimmed()
                    ),
                    Err(e) => f.error(&e),
                }
            }
            ReplLine::Reject(id) => {
                match self.service.confirm_approval(&ctx, &id, ReviewDecision::Reject) {
                    Ok(ticket) => f.ticket(&ticket),
                    Err(e) => f.error(&e),
                }
            }
            ReplLine::Ticket(id) => match self.service.get_approval(&id) {
                Ok(ticket) => f.ticket(&ticket),
                Err(e) => f.error(&e),
            },
            ReplLine::Pending => f.tickets(&self.service.pending_approvals()),
            ReplLine::Execution(id) => match self.service.get_execution(&id) {
                Ok(record) => f.execution(&record),
                Err(e) => f.error(&e),
            },
            ReplLine::Token(token) => {
                let text = match &token {
                    Some(t) => format!("Approval token set to {}", t),
                    None => "Approval token cleared".to_string(),
                };
                self.token = token;
                text
            }
            ReplLine::As(caller) => {
                let text = format!("Now acting as {}", caller.bold());
                self.caller = caller;
                self.token = None;
                text
            }
            ReplLine::Suggest(text) => f.suggestions(&self.service.command_suggestions(&text)),
            ReplLine::Plan(text) | ReplLine::Text(text) => {
                match self.service.command_preview(&ctx, &CommandRequest::text(text)) {
                    Ok(preview) => f.command_preview(&preview),
                    Err(e) => f.error(&e),
                }
            }
            ReplLine::Run(text) => {
                let request = self.execute_request(CommandRequest::text(text));
                match self.service.command_execute(&ctx, &request).await {
                    Ok(record) => f.command_record(&record),
                    Err(e) => f.error(&e),
                }
            }
            ReplLine::Confirm(id) => {
                let request = self.execute_request(CommandRequest::for_command(id));
                match self.service.command_execute(&ctx, &request).await {
                    Ok(record) => f.command_record(&record),
                    Err(e) => f.error(&e),
                }
            }
            ReplLine::History => f.command_history(&self.service.command_history(HISTORY_LIMIT)),
            ReplLine::Command(id) => match self.service.command_get(&id) {
                Ok(record) => f.command_record(&record),
                Err(e) => f.error(&e),
            },
        };
        ReplOutcome::Print(text)
    }
}
