//! Console line parsing.

use crate::cli::params::parse_params;
use opsplane_domain::ParamMap;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplLine {
    Empty,
    Help,
    Quit,
    Tools,
    Preview { tool: String, params: ParamMap },
    Exec { tool: String, params: ParamMap },
    /// Conversational call: approval is reported inline.
    Call { tool: String, params: ParamMap },
    /// Mint a ticket ahead of a mutating call.
    Request { tool: String, params: ParamMap },
    Approve(String),
    Reject(String),
    Ticket(String),
    Pending,
    Execution(String),
    /// `None` clears the session token.
    Token(Option<String>),
    As(String),
    Suggest(String),
    Plan(String),
    Run(String),
    /// Execute a previewed command by id.
    Confirm(String),
    History,
    Command(String),
    /// Free text without a slash: previewed as a command.
    Text(String),
    Invalid(String),
}

fn tool_call(rest: &str) -> Result<(String, ParamMap), String> {
    let mut words = rest.split_whitespace();
    let tool = words.next().ok_or("expected a tool name")?;
    let pairs: Vec<&str> = words.collect();
    Ok((tool.to_string(), parse_params(&pairs)?))
}

fn required_arg(cmd: &str, rest: &str) -> Result<String, String> {
    let arg = rest.trim();
    if arg.is_empty() {
        Err(format!("{} needs an argument", cmd))
    } else {
        Ok(arg.to_string())
    }
}

pub fn parse_line(line: &str) -> ReplLine {
    let line = line.trim();
    if line.is_empty() {
        return ReplLine::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplLine::Text(line.to_string());
    };
    let (cmd, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));

    let parsed = match cmd {
        "quit" | "exit" | "q" => Ok(ReplLine::Quit),
        "help" | "h" | "?" => Ok(ReplLine::Help),
        "tools" => Ok(ReplLine::Tools),
        "pending" => Ok(ReplLine::Pending),
        "history" => Ok(ReplLine::History),
        "preview" => tool_call(rest).map(|(tool, params)| ReplLine::Preview { tool, params }),
        "exec" => tool_call(rest).map(|(tool, params)| ReplLine::Exec { tool, params }),
        "call" => tool_call(rest).map(|(tool, params)| ReplLine::Call { tool, params }),
        "request" => tool_call(rest).map(|(tool, params)| ReplLine::Request { tool, params }),
        "approve" => required_arg(cmd, rest).map(ReplLine::Approve),
        "reject" => required_arg(cmd, rest).map(ReplLine::Reject),
        "ticket" => required_arg(cmd, rest).map(ReplLine::Ticket),
        "execution" => required_arg(cmd, rest).map(ReplLine::Execution),
        "as" => required_arg(cmd, rest).map(ReplLine::As),
        "suggest" => required_arg(cmd, rest).map(ReplLine::Suggest),
        "plan" => required_arg(cmd, rest).map(ReplLine::Plan),
        "run" => required_arg(cmd, rest).map(ReplLine::Run),
        "confirm" => required_arg(cmd, rest).map(ReplLine::Confirm),
        "command" => required_arg(cmd, rest).map(ReplLine::Command),
        "token" => Ok(ReplLine::Token(required_arg(cmd, rest).ok())),
        other => Err(format!("unknown command: /{}", other)),
    };
    parsed.unwrap_or_else(ReplLine::Invalid)
}
