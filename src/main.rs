mod commands;
mod config;
mod context;
mod output;
mod plan;
mod process;
mod review;
mod traits;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{ApplyCommand, ApplyOptions, ReviewCommand, ShowCommand};
use config::ReviewOverrides;
use context::Context;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "PMP_REVIEW_LOG";

#[derive(Parser)]
#[command(name = "pmp-review")]
#[command(about = "Review OpenTofu/Terraform changes resource by resource before approving an apply", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct PolicyArgs {
    /// Refuse approval until every resource change is marked reviewed
    #[arg(long)]
    require_review_all: bool,

    /// Keep resource changes expanded after marking them reviewed
    #[arg(long)]
    no_auto_collapse: bool,

    /// Start with every resource change collapsed
    #[arg(long)]
    collapsed: bool,

    /// Only show changed lines inside resource changes
    #[arg(long)]
    changed_only: bool,
}

impl PolicyArgs {
    fn overrides(&self) -> ReviewOverrides {
        ReviewOverrides {
            require_review_all: self.require_review_all,
            no_auto_collapse: self.no_auto_collapse,
            collapsed: self.collapsed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run apply and review the changes interactively at the confirmation prompt
    Apply {
        /// Path to the project directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Apply command to run (defaults to the config file or "tofu apply")
        #[arg(short, long)]
        command: Option<String>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Classify captured apply/plan output and print its blocks
    Show {
        /// File containing the captured output
        file: String,

        /// Print the parsed blocks as JSON
        #[arg(long)]
        json: bool,

        /// Only show changed lines inside resource changes
        #[arg(long)]
        changed_only: bool,
    },

    /// Review captured apply output and print the resulting answer (yes/no)
    Review {
        /// File containing the captured output
        file: String,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let ctx = Context::new();

    match cli.command {
        Commands::Apply {
            path,
            command,
            policy,
        } => {
            let options = ApplyOptions {
                path,
                command,
                overrides: policy.overrides(),
                changed_only: policy.changed_only,
            };
            ApplyCommand::execute(&ctx, &options)?;
        }
        Commands::Show {
            file,
            json,
            changed_only,
        } => {
            ShowCommand::execute(&ctx, &file, json, changed_only)?;
        }
        Commands::Review { file, policy } => {
            ReviewCommand::execute(&ctx, &file, policy.overrides(), policy.changed_only)?;
        }
    }

    Ok(())
}
