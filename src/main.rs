use anyhow::Result;
use clap::{Parser, Subcommand};

mod choreo;
mod cmd;
mod config;
mod error;
mod mcp;
mod tools;
mod utils;

use cmd::{ExecArgs, GlobalOpts, ListArgs, ServeArgs};

/// Choreo MCP - Choreo management API as Model Context Protocol tools
///
/// Commands:
///   choreo-mcp [serve]                       run the MCP server on stdio (default)
///   choreo-mcp list [--json]                 show tools and parameters
///   choreo-mcp exec <TOOL> [--param k=v ...]  invoke one tool directly
///
/// Global flags / env:
///   --base-url   CHOREO_API_URL       (default https://apis.choreo.dev)
///   --token      CHOREO_TOKEN         ambient bearer token
///   --org        CHOREO_ORG           organization to resolve at startup
///   --timeout    CHOREO_TIMEOUT_SECS  HTTP timeout (default 30)
///   -v / -vv     Increase verbosity; -q errors only; RUST_LOG overrides
///
/// Logs go to stderr; stdout carries the MCP protocol.
///
/// Examples:
///   CHOREO_TOKEN=... choreo-mcp
///   choreo-mcp exec get_projects --param orgId=123 --param token=... --json
///   CHOREO_TOKEN=... choreo-mcp exec get_components --param projectId=p1
#[derive(Parser, Debug)]
#[command(
    name = "choreo-mcp",
    version,
    about = "Choreo MCP - expose the Choreo management API as MCP tools",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server over stdio
    Serve(ServeArgs),

    /// List tools and their parameters
    List(ListArgs),

    /// Invoke a tool directly
    Exec(ExecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // Reject bad configuration before any command runs.
    if let Err(e) = cli.global.settings() {
        eprintln!("Invalid configuration: {e:#}");
        std::process::exit(2);
    }

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => cmd::execute_serve(args, &cli.global),
        Commands::List(args) => cmd::execute_list(args, &cli.global),
        Commands::Exec(args) => cmd::execute_exec(args, &cli.global),
    }
}
