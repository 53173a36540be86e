//! Single-stage CLI handlers.
//!
//! Each handler runs one stage against the data directory with its own
//! freshly seeded generator.

use super::{parse_as_of, print_summary};
use bank_fixtures::fake::FakeData;
use bank_fixtures::pipeline::{self, PipelineStats, StageContext};
use bank_fixtures::relationship::TransferInference;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

fn run_stage<F>(
    output: PathBuf,
    seed: u64,
    as_of: Option<String>,
    quiet: bool,
    json: bool,
    stage: F,
) -> anyhow::Result<()>
where
    F: FnOnce(&StageContext, &mut FakeData, &mut PipelineStats) -> anyhow::Result<()>,
{
    let start = Instant::now();
    let as_of = parse_as_of(as_of)?;

    fs::create_dir_all(&output).map_err(|e| {
        anyhow::anyhow!("Failed to create output directory {}: {}", output.display(), e)
    })?;

    let ctx = StageContext {
        dir: output.clone(),
        as_of,
        progress: false,
        quiet: quiet || json,
    };
    let mut fake = FakeData::new(seed);
    let mut stats = PipelineStats::new(seed, as_of);

    stage(&ctx, &mut fake, &mut stats)?;
    stats.elapsed_secs = start.elapsed().as_secs_f64();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(&stats, &output);
    }
    Ok(())
}

pub fn branches(
    count: usize,
    output: PathBuf,
    seed: u64,
    as_of: Option<String>,
    quiet: bool,
    json: bool,
) -> anyhow::Result<()> {
    run_stage(output, seed, as_of, quiet, json, |ctx, fake, stats| {
        pipeline::generate_branches(ctx, fake, stats, count)
    })
}

#[allow(clippy::too_many_arguments)]
pub fn customers(
    individual: usize,
    corporate: usize,
    hnw: usize,
    output: PathBuf,
    seed: u64,
    as_of: Option<String>,
    quiet: bool,
    json: bool,
) -> anyhow::Result<()> {
    run_stage(output, seed, as_of, quiet, json, |ctx, fake, stats| {
        pipeline::generate_customers(ctx, fake, stats, individual, corporate, hnw)
    })
}

pub fn accounts(
    avg_accounts: f64,
    output: PathBuf,
    seed: u64,
    as_of: Option<String>,
    quiet: bool,
    json: bool,
) -> anyhow::Result<()> {
    if avg_accounts <= 0.0 {
        anyhow::bail!("--avg-accounts must be greater than 0");
    }
    run_stage(output, seed, as_of, quiet, json, |ctx, fake, stats| {
        pipeline::generate_accounts(ctx, fake, stats, avg_accounts)
    })
}

#[allow(clippy::too_many_arguments)]
pub fn transactions(
    avg_transactions: f64,
    days: u32,
    output: PathBuf,
    seed: u64,
    as_of: Option<String>,
    quiet: bool,
    json: bool,
) -> anyhow::Result<()> {
    if days == 0 {
        anyhow::bail!("--days must be greater than 0");
    }
    run_stage(output, seed, as_of, quiet, json, |ctx, fake, stats| {
        pipeline::generate_transactions(ctx, fake, stats, avg_transactions, days)
    })
}

pub fn relationships(
    output: PathBuf,
    seed: u64,
    as_of: Option<String>,
    quiet: bool,
    json: bool,
) -> anyhow::Result<()> {
    run_stage(output, seed, as_of, quiet, json, |ctx, fake, stats| {
        pipeline::generate_relationships(ctx, fake, stats, TransferInference::default())
    })
}
