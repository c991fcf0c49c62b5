//! CLI entrypoint for opsplane
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use opsplane_application::{
    Clock, CommandRequest, ConsoleService, ExecutionContext, ExecutionEventSink,
    NoExecutionEvents, OpsStore, PermissionChecker, SystemClock,
};
use opsplane_domain::ExecutionStatus;
use opsplane_infrastructure::{
    ClusterRegistry, ConfigLoader, FileConfig, HostCommandRunner, InMemoryOpsStore,
    JsonlEventSink, OpsSeed, Severity, StaticPermissionProvider, ToolDeps, default_tool_registry,
};
use opsplane_presentation::{Cli, Command, ConsoleRepl, formatter_for, parse_params};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Daily rolling writer under `dir`, creating the directory first.
fn file_writer(dir: &str) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, "opsplane.log");
    Ok(tracing_appender::non_blocking(appender))
}

/// Stderr logging filtered by `-v`, plus a daily log file when `log_dir` is set.
fn init_logging(verbose: u8, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let file = log_dir.map(|dir| (dir, file_writer(dir)));
    let (file_layer, guard, file_error) = match file {
        Some((_, Ok((writer, guard)))) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Some((dir, Err(e))) => (None, None, Some((dir, e))),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    if let Some((dir, e)) = file_error {
        warn!(log_dir = %dir, error = %e, "Log directory unusable, logging to stderr only");
    }

    guard
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("failed to load configuration: {}", e))
}

/// No seed file configured: the built-in sample. Configured but absent: empty.
fn load_seed(config: &FileConfig) -> Result<OpsSeed> {
    match &config.store.seed_file {
        None => Ok(OpsSeed::sample()),
        Some(path) if Path::new(path).exists() => OpsSeed::load(Path::new(path))
            .with_context(|| format!("failed to load seed file {}", path)),
        Some(_) => Ok(OpsSeed::default()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let _log_guard = init_logging(cli.verbose, config.logging.log_dir.as_deref());

    info!("Starting opsplane");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Error => error!(field = %issue.field, "{}", issue.message),
            Severity::Warning => warn!(field = %issue.field, "{}", issue.message),
        }
    }
    if FileConfig::has_errors(&issues) {
        bail!("configuration has {} error(s)", issues.len());
    }

    // === Dependency Injection ===
    let seed = load_seed(&config)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let clusters = Arc::new(ClusterRegistry::from_seeds(
        &seed.clusters,
        config.cluster.default.as_deref(),
    ));
    let ops: Arc<dyn OpsStore> = Arc::new(InMemoryOpsStore::from_seed(seed));
    let deps = ToolDeps {
        runner: Arc::new(HostCommandRunner::new()),
        clusters,
        ops: Arc::clone(&ops),
        clock: Arc::clone(&clock),
    };
    let service = Arc::new(ConsoleService::assemble(
        default_tool_registry(&deps),
        ops,
        clock,
        &config.to_plane_config(),
    ));

    let permissions: Arc<dyn PermissionChecker> =
        Arc::new(StaticPermissionProvider::from_config(&config.access));
    let events: Arc<dyn ExecutionEventSink> =
        match config.logging.event_log.as_deref().and_then(JsonlEventSink::new) {
            Some(sink) => {
                info!("Event log: {}", sink.path().display());
                Arc::new(sink)
            }
            None => Arc::new(NoExecutionEvents),
        };

    let formatter = formatter_for(cli.output);
    let ctx = ExecutionContext::new(cli.caller.clone(), Arc::clone(&permissions))
        .with_events(Arc::clone(&events));

    let ok = match cli.command() {
        Command::Tools => {
            println!("{}", formatter.capabilities(&service.list_capabilities(&ctx)));
            true
        }
        Command::Preview { tool, params } => {
            let params = parse_params(&params).map_err(anyhow::Error::msg)?;
            match service.preview_tool(&ctx, &tool, &params) {
                Ok(preview) => {
                    println!("{}", formatter.tool_preview(&preview));
                    true
                }
                Err(e) => {
                    eprintln!("{}", formatter.error(&e));
                    false
                }
            }
        }
        Command::Exec { tool, params, token } => {
            let params = parse_params(&params).map_err(anyhow::Error::msg)?;
            let ctx = ctx.with_approval_token(token);
            let record = service.execute_tool(&ctx, &tool, params).await;
            println!("{}", formatter.execution(&record));
            record.status == ExecutionStatus::Succeeded
        }
        Command::Suggest { text } => {
            println!("{}", formatter.suggestions(&service.command_suggestions(&text.join(" "))));
            true
        }
        Command::Plan { text, intent } => {
            let mut request = CommandRequest::text(text.join(" "));
            if let Some(intent) = intent {
                request = request.with_intent(intent);
            }
            match service.command_preview(&ctx, &request) {
                Ok(preview) => {
                    println!("{}", formatter.command_preview(&preview));
                    true
                }
                Err(e) => {
                    eprintln!("{}", formatter.error(&e));
                    false
                }
            }
        }
        Command::Run {
            text,
            intent,
            yes,
            token,
        } => {
            let mut request = CommandRequest::text(text.join(" "));
            if let Some(intent) = intent {
                request = request.with_intent(intent);
            }
            if yes {
                request = request.confirmed();
            }
            if let Some(token) = token {
                request = request.with_token(token);
            }
            match service.command_execute(&ctx, &request).await {
                Ok(record) => {
                    println!("{}", formatter.command_record(&record));
                    true
                }
                Err(e) => {
                    eprintln!("{}", formatter.error(&e));
                    false
                }
            }
        }
        Command::Console => {
            let mut repl = ConsoleRepl::new(service, permissions, events, formatter, cli.caller);
            repl.run().await.context("console failed")?;
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
