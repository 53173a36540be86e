mod generate;
mod stage;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bank-fixtures")]
#[command(version)]
#[command(about = "Generate deterministic retail banking fixtures as TSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every stage: branches, customers, accounts, transactions, relationships
    Generate {
        /// Size preset: tiny, small, medium, large, or enterprise
        #[arg(short, long, default_value = "small")]
        size: String,

        /// Output directory for the TSV files
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Random seed; the same seed and size produce identical files
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Write an empty transactions file instead of generating transactions
        #[arg(long)]
        skip_transactions: bool,

        /// YAML file overriding fields of the selected size preset
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Reference date used as "today" (YYYY-MM-DD, default 2025-01-01)
        #[arg(long)]
        as_of: Option<String>,

        /// Show progress during generation
        #[arg(short, long)]
        progress: bool,

        /// Suppress warnings on stderr
        #[arg(short, long)]
        quiet: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate branches.tsv
    Branches {
        /// Number of branches
        #[arg(short, long, default_value_t = 50)]
        count: usize,

        /// Data directory
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Reference date used as "today" (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Suppress warnings on stderr
        #[arg(short, long)]
        quiet: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate customers.tsv
    Customers {
        /// Number of individual customers
        #[arg(long, default_value_t = 5000)]
        individual: usize,

        /// Number of corporate customers
        #[arg(long, default_value_t = 500)]
        corporate: usize,

        /// Number of high-net-worth customers
        #[arg(long, default_value_t = 100)]
        hnw: usize,

        /// Data directory
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Reference date used as "today" (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Suppress warnings on stderr
        #[arg(short, long)]
        quiet: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate accounts.tsv from the customers and branches on disk
    Accounts {
        /// Average number of accounts per individual customer
        #[arg(long, default_value_t = 2.5)]
        avg_accounts: f64,

        /// Data directory
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Reference date used as "today" (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Suppress warnings on stderr
        #[arg(short, long)]
        quiet: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate transactions.tsv from the accounts on disk
    Transactions {
        /// Average number of transactions per active account
        #[arg(long, default_value_t = 50.0)]
        avg_transactions: f64,

        /// Length of the transaction history in days
        #[arg(long, default_value_t = 365)]
        days: u32,

        /// Data directory
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Reference date used as "today" (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Suppress warnings on stderr
        #[arg(short, long)]
        quiet: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate relationship files from the entity files on disk
    Relationships {
        /// Data directory
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Reference date used as "today" (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Suppress warnings on stderr
        #[arg(short, long)]
        quiet: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            size,
            output,
            seed,
            skip_transactions,
            config,
            as_of,
            progress,
            quiet,
            json,
        } => generate::run(
            size,
            output,
            seed,
            skip_transactions,
            config,
            as_of,
            progress,
            quiet,
            json,
        ),
        Commands::Branches {
            count,
            output,
            seed,
            as_of,
            quiet,
            json,
        } => stage::branches(count, output, seed, as_of, quiet, json),
        Commands::Customers {
            individual,
            corporate,
            hnw,
            output,
            seed,
            as_of,
            quiet,
            json,
        } => stage::customers(individual, corporate, hnw, output, seed, as_of, quiet, json),
        Commands::Accounts {
            avg_accounts,
            output,
            seed,
            as_of,
            quiet,
            json,
        } => stage::accounts(avg_accounts, output, seed, as_of, quiet, json),
        Commands::Transactions {
            avg_transactions,
            days,
            output,
            seed,
            as_of,
            quiet,
            json,
        } => stage::transactions(avg_transactions, days, output, seed, as_of, quiet, json),
        Commands::Relationships {
            output,
            seed,
            as_of,
            quiet,
            json,
        } => stage::relationships(output, seed, as_of, quiet, json),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "bank-fixtures",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

/// Parse `--as-of`, defaulting to the fixed reference date
fn parse_as_of(as_of: Option<String>) -> anyhow::Result<chrono::NaiveDate> {
    match as_of {
        Some(s) => chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid --as-of date '{}': {}", s, e)),
        None => Ok(bank_fixtures::pipeline::default_as_of()),
    }
}

/// Human-readable summary shared by every generating command
fn print_summary(stats: &bank_fixtures::pipeline::PipelineStats, output: &std::path::Path) {
    println!("\nStatistics:");
    for stage in &stats.stages {
        if stage.rows_skipped > 0 {
            println!(
                "  {}: {} rows ({} malformed input rows skipped)",
                stage.stage, stage.rows_written, stage.rows_skipped
            );
        } else {
            println!("  {}: {} rows", stage.stage, stage.rows_written);
        }
    }

    if !stats.relationship_counts.is_empty() {
        println!("\nRelationships:");
        for kind in &stats.relationship_counts {
            println!("  {}: {}", kind.kind, kind.count);
        }
    }

    println!("\nFiles in {}:", output.display());
    for file in &stats.files {
        println!(
            "  {}: {} rows ({:.2} KB)",
            file.name,
            file.rows,
            file.bytes as f64 / 1024.0
        );
    }

    if !stats.warnings.is_empty() {
        println!();
        for warning in &stats.warnings {
            println!("  Warning: {}", warning);
        }
    }

    println!("\n  Elapsed time: {:.3}s", stats.elapsed_secs);
}
