//! Generate command CLI handler.

use super::{parse_as_of, print_summary};
use bank_fixtures::pipeline::{self, PipelineConfig};
use bank_fixtures::preset::{SizeOverrides, SizePreset};
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn run(
    size: String,
    output: PathBuf,
    seed: u64,
    skip_transactions: bool,
    config: Option<PathBuf>,
    as_of: Option<String>,
    progress: bool,
    quiet: bool,
    json: bool,
) -> anyhow::Result<()> {
    let preset = size
        .parse::<SizePreset>()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let mut size_config = preset.config();

    if let Some(ref path) = config {
        let overrides = SizeOverrides::load(path).map_err(|e| {
            anyhow::anyhow!("Failed to load config file {}: {}", path.display(), e)
        })?;
        overrides.apply(&mut size_config);
    }

    let as_of = parse_as_of(as_of)?;

    if !json && !quiet {
        println!(
            "Generating {} dataset (seed {}) in {}",
            preset,
            seed,
            output.display()
        );
        println!(
            "  {} branches, {} customers, ~{:.1} accounts/customer, ~{:.0} transactions/account over {} days",
            size_config.branches,
            size_config.total_customers(),
            size_config.avg_accounts_per_customer,
            size_config.avg_transactions_per_account,
            size_config.transaction_days
        );
        if skip_transactions {
            println!("  Transactions: skipped");
        }
    }

    let pipeline_config = PipelineConfig {
        output_dir: output.clone(),
        preset: preset.name().to_string(),
        size: size_config,
        seed,
        as_of,
        skip_transactions,
        progress: progress && !json,
        quiet: quiet || json,
    };

    let stats = pipeline::run(&pipeline_config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("\n✓ Generation completed successfully!");
        print_summary(&stats, &output);
    }

    Ok(())
}
