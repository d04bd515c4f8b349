mod commands;
mod context;
mod render;
mod shell;
mod table_ops;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use recs_core::table::PAGE_SIZE_OPTIONS;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use context::{ConsoleContext, StartupOptions};

#[derive(Parser)]
#[command(name = "recs")]
#[command(about = "Search call records and browse the API audit log", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding config.toml, the saved session and logs
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Config file to read instead of <config-dir>/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and RECS_BASE_URL
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Write logs to stderr instead of the log directory
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    Shell,
    /// Log in and save the session token
    Login {
        #[arg(short, long)]
        username: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the saved session token
    Logout,
    /// Ask the backend whether the saved session is still valid
    Check,
    /// Search records in a date range
    Search(SearchArgs),
    /// Print the API audit log
    Audit(TableArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Start of the range, e.g. 2024-03-01 or 2024-03-01T08:00Z
    #[arg(long, value_parser = parse_when)]
    pub start: DateTime<Utc>,
    /// End of the range
    #[arg(long, value_parser = parse_when)]
    pub end: DateTime<Utc>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub voicemail: Option<String>,
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long)]
    pub cluster: Option<String>,
    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// Column key to sort by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    /// Page to print, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,
    /// Rows per page (10, 25, 50 or 100)
    #[arg(long, value_parser = parse_rows)]
    pub rows: Option<NonZeroUsize>,
    /// Also write the full table as CSV to the export directory
    #[arg(long)]
    pub export: bool,
}

fn parse_when(value: &str) -> Result<DateTime<Utc>, String> {
    recs_core::search::parse_datetime(value).map_err(|e| e.to_string())
}

fn parse_rows(value: &str) -> Result<NonZeroUsize, String> {
    value
        .parse::<usize>()
        .ok()
        .filter(|size| PAGE_SIZE_OPTIONS.contains(size))
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| format!("must be one of {:?}", PAGE_SIZE_OPTIONS))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = StartupOptions {
        config_dir: cli.config_dir,
        config_file: cli.config,
        base_url: cli.base_url,
        log_stderr: cli.log_stderr,
    };
    let ctx = ConsoleContext::init(&options).await?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::Shell::new(ctx)?.run().await,
        Commands::Login { username, password } => commands::login(&ctx, username, password).await,
        Commands::Logout => commands::logout(&ctx).await,
        Commands::Check => commands::check(&ctx).await,
        Commands::Search(args) => commands::search(&ctx, &args).await,
        Commands::Audit(args) => commands::audit(&ctx, &args).await,
    }
}
