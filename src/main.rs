//! mcp-filter - stdio entry point.
//!
//! `run` builds the filtered catalog and serves MCP on stdin/stdout.
//! `check` builds the catalog, prints it, and exits.

use clap::{Args, Parser, Subcommand};
use mcp_filter::mcp::McpServer;
use mcp_filter::types::{parse_headers, split_shell_words, ConfigOverrides};
use mcp_filter::{Config, Error, FilterApplication};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(
    name = "mcp-filter",
    version,
    about = "Expose a filtered, optionally renamed subset of an MCP server's tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the filtered tool surface on stdio.
    Run(FilterArgs),
    /// Build the filtered catalog, print it, and exit.
    Check(FilterArgs),
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Server name reported to clients.
    #[arg(long)]
    name: Option<String>,

    /// Upstream transport: stdio or http.
    #[arg(short = 't', long)]
    transport: Option<String>,

    /// Command that starts the upstream server (stdio transport).
    #[arg(long)]
    stdio_command: Option<String>,

    /// Argument for the upstream command; repeatable, shell-split.
    #[arg(long = "stdio-arg", allow_hyphen_values = true)]
    stdio_args: Vec<String>,

    /// Upstream endpoint (http transport).
    #[arg(long)]
    http_url: Option<String>,

    /// Extra request header as key=value; repeatable.
    #[arg(long = "http-header")]
    http_headers: Vec<String>,

    /// Exact tool name to allow; repeatable, comma-separated.
    #[arg(short = 'a', long = "allow-tool")]
    allow_tools: Vec<String>,

    /// Regex of tool names to allow; repeatable.
    #[arg(long = "allow-pattern")]
    allow_patterns: Vec<String>,

    /// Regex of tool names to hide; repeatable.
    #[arg(long = "deny-pattern")]
    deny_patterns: Vec<String>,

    /// Prefix prepended to every exposed tool name.
    #[arg(short = 'p', long)]
    prefix: Option<String>,

    /// Log level: debug, info, warning or error.
    #[arg(long)]
    log_level: Option<String>,

    /// Publish the synthetic health tool.
    #[arg(long)]
    health: bool,

    /// Compute and log the token estimate for exposed metadata.
    #[arg(long, overrides_with = "no_token_estimates")]
    token_estimates: bool,

    /// Skip the token estimate.
    #[arg(long)]
    no_token_estimates: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

impl FilterArgs {
    fn into_overrides(self) -> mcp_filter::Result<ConfigOverrides> {
        let stdio_args = if self.stdio_args.is_empty() {
            None
        } else {
            let mut words = Vec::new();
            for arg in &self.stdio_args {
                if arg.chars().any(char::is_whitespace) {
                    words.extend(split_shell_words(arg)?);
                } else {
                    words.push(arg.clone());
                }
            }
            Some(words)
        };

        let http_headers = if self.http_headers.is_empty() {
            None
        } else {
            Some(parse_headers(self.http_headers.iter().map(String::as_str))?)
        };

        let token_estimates = if self.no_token_estimates {
            Some(false)
        } else if self.token_estimates {
            Some(true)
        } else {
            None
        };

        Ok(ConfigOverrides {
            name: self.name,
            log_level: self.log_level,
            json_logs: self.json_logs.then_some(true),
            include_health_tool: self.health.then_some(true),
            show_token_estimates: token_estimates,
            transport: self.transport,
            stdio_command: self.stdio_command,
            stdio_args,
            http_url: self.http_url,
            http_headers,
            allow_tools: non_empty(self.allow_tools),
            allow_patterns: non_empty(self.allow_patterns),
            deny_patterns: non_empty(self.deny_patterns),
            rename_prefix: self.prefix,
        })
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let (check_only, args) = match cli.command {
        Command::Run(args) => (false, args),
        Command::Check(args) => (true, args),
    };

    let config = match args.into_overrides().and_then(Config::load) {
        Ok(config) => config,
        Err(err) => {
            let msg = match err {
                Error::Config(msg) => msg,
                other => other.to_string(),
            };
            eprintln!("Configuration error: {}", msg);
            return ExitCode::from(1);
        }
    };

    mcp_filter::observability::init_tracing(&config.log_level, config.json_logs);

    let shutdown = CancellationToken::new();
    let app = match FilterApplication::connect(&config, shutdown.child_token()).await {
        Ok(app) => Arc::new(app),
        Err(err) => {
            tracing::error!(error = %err, "failed to build filtered catalog");
            eprintln!("Startup failed: {}", err);
            return ExitCode::from(1);
        }
    };

    if check_only {
        for tool in app.catalog().tools() {
            println!("{} -> {}", tool.public_name, tool.upstream_name);
        }
        println!("tools: {}", app.catalog().len());
        if config.show_token_estimates {
            println!("token estimate: {}", app.token_estimate());
        }
        return ExitCode::SUCCESS;
    }

    let server = McpServer::with_cancellation(app, shutdown.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::info!("interrupt received, shutting down");
        shutdown.cancel();

        // A second interrupt exits immediately.
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt, exiting");
            std::process::exit(130);
        }
    });

    match server.serve_stdio().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "MCP server failed");
            ExitCode::FAILURE
        }
    }
}
