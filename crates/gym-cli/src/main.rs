//! Gym membership CLI
//!
//! Command-line front end for the membership engine, operating on a JSON
//! state file.
//!
//! # Usage
//!
//! ```bash
//! gymctl benefit add --id sauna --name "Sauna"
//! gymctl plan import -f gold.toml
//! gymctl member enroll --org club-1 --member m-42 --plan gold
//! gymctl member freeze <record-id> --months 2 --reason travel
//! gymctl --now 2024-05-01T09:00:00Z member unfreeze <record-id>
//! gymctl member redeem <record-id> --benefit sauna --format json
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use gym_membership::{Gender, GenderScope};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;
mod state;

#[derive(Parser)]
#[command(name = "gymctl")]
#[command(version)]
#[command(about = "Gym membership lifecycle and benefit quotas", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.gymctl/config.toml)
    #[arg(long, env = "GYMCTL_CONFIG")]
    config: Option<PathBuf>,

    /// State file, overriding the configured one
    #[arg(long, env = "GYMCTL_STATE")]
    state: Option<PathBuf>,

    /// Evaluate as of this instant (RFC 3339) instead of the system clock
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage membership plans
    Plan {
        #[command(subcommand)]
        action: PlanCommands,
    },
    /// Manage the benefit catalog
    Benefit {
        #[command(subcommand)]
        action: BenefitCommands,
    },
    /// Enroll members and manage their memberships
    Member {
        #[command(subcommand)]
        action: MemberCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// List all plans
    List,
    /// Check a plan file without storing it
    Validate {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Validate and store a plan file (TOML or JSON)
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum BenefitCommands {
    /// List the catalog
    List {
        /// Only benefits offered to this gender
        #[arg(long)]
        gender: Option<GenderArg>,
    },
    /// Add or replace a benefit
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "all")]
        scope: ScopeArg,
        /// Store as inactive
        #[arg(long)]
        inactive: bool,
    },
}

#[derive(Subcommand)]
enum MemberCommands {
    /// Enroll a member on a plan
    Enroll {
        #[arg(long)]
        org: String,
        #[arg(long)]
        member: String,
        #[arg(long)]
        plan: String,
        /// Join date (defaults to now)
        #[arg(long)]
        join: Option<DateTime<Utc>>,
    },
    /// Full membership record
    Show { record: String },
    /// Memberships of one member
    List {
        #[arg(long)]
        member: String,
    },
    /// Effective status and days remaining
    Status { record: String },
    /// Freeze an active membership
    Freeze {
        record: String,
        #[arg(long)]
        months: u32,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        chargeable: bool,
    },
    /// Resume a frozen membership
    Unfreeze { record: String },
    /// Extend the expiry by a number of days
    Gift {
        record: String,
        #[arg(long, allow_hyphen_values = true)]
        days: i64,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Redeem one unit of a benefit
    Redeem {
        record: String,
        #[arg(long)]
        benefit: String,
        #[arg(long)]
        gender: Option<GenderArg>,
        /// Only check, do not consume
        #[arg(long)]
        check: bool,
    },
    /// Remaining benefit balances
    Balances { record: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    All,
    Male,
    Female,
}

impl From<ScopeArg> for GenderScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::All => GenderScope::All,
            ScopeArg::Male => GenderScope::Male,
            ScopeArg::Female => GenderScope::Female,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::Config::default_path()?,
    };
    let config = config::Config::load(&config_path)?;
    let now = cli.now.unwrap_or_else(Utc::now);
    let state_path = cli.state.unwrap_or_else(|| config.state_file());

    match cli.command {
        Commands::Config { action } => commands::config::handle(action, &config, &config_path, cli.format),
        Commands::Plan { action } => {
            let ws = state::Workspace::open(&state_path, &config)?;
            commands::plans::handle(action, &ws, cli.format).await?;
            ws.persist(&state_path).await
        }
        Commands::Benefit { action } => {
            let ws = state::Workspace::open(&state_path, &config)?;
            commands::benefits::handle(action, &ws, cli.format).await?;
            ws.persist(&state_path).await
        }
        Commands::Member { action } => {
            let ws = state::Workspace::open(&state_path, &config)?;
            commands::members::handle(action, &ws, now, cli.format).await?;
            ws.persist(&state_path).await
        }
    }
}
