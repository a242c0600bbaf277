//! epss-tools: EPSS score lookup CLI
//!
//! Queries the FIRST.org EPSS feed for exploitation-probability scores.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use epss_tools::{
    cli::{self, ListConfig, LookupConfig, EXIT_ERROR},
    ApiConfig, CallOptions, FilterOptions, OutputFormat,
};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "epss-tools")]
#[command(version)]
#[command(about = "EPSS score lookup client", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Results found
    1  No matching records / CVE not found
    2  Error occurred

EXAMPLES:
    # Latest score for one CVE
    epss-tools lookup cve-2022-26332

    # Score on a specific date, with the full time series
    epss-tools lookup cve-2022-26332 --date 2023-11-24 --history

    # Batch lookup as CSV
    epss-tools lookup cve-2022-26332 CVE-2022-27225 -o csv

    # High-risk 2023 CVEs added in the last 100 days
    epss-tools list --pattern 2023 --score-gt 0.1 --percentile-gt 0.98 --days-since-added 100")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// EPSS feed base URL
    #[arg(long, global = true, env = "EPSS_TOOLS_API_URL")]
    api_url: Option<String>,

    /// API timeout in seconds (default: 30)
    #[arg(long, global = true, default_value = "30")]
    api_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `lookup` subcommand
#[derive(Parser)]
struct LookupArgs {
    /// CVE ids to look up (e.g. CVE-2022-26332)
    #[arg(required = true)]
    cve_ids: Vec<String>,

    /// Score date (YYYY-MM-DD); defaults to the latest available
    #[arg(long)]
    date: Option<chrono::NaiveDate>,

    /// Attach the historical time series per record
    #[arg(long)]
    history: bool,

    /// Output format (json, csv, yaml)
    #[arg(short, long, default_value = "json")]
    output: OutputFormat,

    /// Print the raw serialized payload from the low-level generic call
    #[arg(long, conflicts_with_all = ["date", "history"])]
    raw: bool,
}

/// Arguments for the `list` subcommand
#[derive(Parser)]
struct ListArgs {
    /// CVE id pattern: substring, with * and ? wildcards
    #[arg(short, long)]
    pattern: Option<String>,

    /// Only records with a score strictly greater than this
    #[arg(long, value_name = "FLOAT")]
    score_gt: Option<f64>,

    /// Only records with a percentile strictly greater than this
    #[arg(long, value_name = "FLOAT")]
    percentile_gt: Option<f64>,

    /// Only records first scored within the last N days
    #[arg(long, value_name = "DAYS")]
    days_since_added: Option<u32>,

    /// Score date (YYYY-MM-DD); defaults to the latest available
    #[arg(long)]
    date: Option<chrono::NaiveDate>,

    /// Attach the historical time series per match
    #[arg(long)]
    history: bool,

    /// Maximum records to request from the feed
    #[arg(long)]
    limit: Option<usize>,

    /// Pagination offset
    #[arg(long)]
    offset: Option<usize>,

    /// Output format (json, csv, yaml)
    #[arg(short, long, default_value = "json")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up EPSS scores for one or more CVE ids
    Lookup(LookupArgs),

    /// List EPSS records matching threshold and pattern filters
    List(ListArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_filter = if quiet {
        "epss_tools=error"
    } else if verbose {
        "epss_tools=debug"
    } else {
        "epss_tools=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn api_config(cli: &Cli) -> ApiConfig {
    let mut config = ApiConfig {
        timeout: Duration::from_secs(cli.api_timeout),
        ..Default::default()
    };
    if let Some(url) = &cli.api_url {
        config.base_url.clone_from(url);
    }
    config
}

fn run(cli: Cli) -> Result<i32> {
    let config = api_config(&cli);

    match cli.command {
        Commands::Lookup(args) => cli::run_lookup(
            config,
            &LookupConfig {
                cve_ids: args.cve_ids,
                date: args.date,
                with_history: args.history,
                format: args.output,
                raw: args.raw,
            },
        ),
        Commands::List(args) => cli::run_list(
            config,
            &ListConfig {
                filter: FilterOptions {
                    options: CallOptions {
                        date: args.date,
                        with_history: false,
                    },
                    cve_id_pattern: args.pattern,
                    score_gt: args.score_gt,
                    percentile_gt: args.percentile_gt,
                    days_since_added: args.days_since_added,
                    limit: args.limit,
                    offset: args.offset,
                },
                with_history: args.history,
                format: args.output,
            },
        ),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(0)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}
