// Copyright 2026 Beacon Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use beacon_runtime::cli;
use beacon_runtime::registry::types::Strategy;

#[derive(Parser)]
#[command(
    name = "beacon",
    about = "Beacon — web page performance monitor",
    version,
    after_help = "Run 'beacon <command> --help' for details on each command.\nSet BEACON_API_BASE to point at your audit/registry backend."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit one or more URLs and add them to the registry
    Register {
        /// URLs to register (bare hostnames get https://)
        #[arg(required = true)]
        urls: Vec<String>,
        /// Display name (meaningful when registering a single URL)
        #[arg(long)]
        name: Option<String>,
        /// Device profile to audit with
        #[arg(long, default_value = "mobile")]
        strategy: Strategy,
    },
    /// List every registered page with its latest score
    List,
    /// Re-audit pages and update their scores
    Refresh {
        /// Row ids to refresh
        ids: Vec<i64>,
        /// Refresh every registered page
        #[arg(long)]
        all: bool,
        /// Device profile to audit with
        #[arg(long, default_value = "mobile")]
        strategy: Strategy,
        /// Maximum concurrent refreshes
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
    /// Delete pages from the registry
    Remove {
        /// Row ids to remove
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("BEACON_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("BEACON_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("BEACON_VERBOSE", "1");
    }

    let default_directive = if cli.verbose {
        "beacon_runtime=debug"
    } else {
        "beacon_runtime=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap()),
        )
        .init();

    let result = match cli.command {
        Commands::Register {
            urls,
            name,
            strategy,
        } => cli::register_cmd::run(&urls, name.as_deref(), strategy).await,
        Commands::List => cli::list_cmd::run().await,
        Commands::Refresh {
            ids,
            all,
            strategy,
            concurrency,
        } => cli::refresh_cmd::run(&ids, all, strategy, concurrency).await,
        Commands::Remove { ids } => cli::remove_cmd::run(&ids).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "beacon", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
