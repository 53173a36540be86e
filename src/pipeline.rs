//! Stage orchestration and file handoff.
//!
//! Each stage reads its upstream files from the output directory, generates
//! its own entities and writes them back as TSV. A missing upstream file is
//! not fatal: the stage substitutes a placeholder set and records a warning.

use crate::account::{placeholder_branches, placeholder_customers, AccountGenerator, AccountRow};
use crate::branch::{BranchGenerator, BranchRow};
use crate::customer::{CustomerGenerator, CustomerRow};
use crate::fake::FakeData;
use crate::preset::SizeConfig;
use crate::record::{Record, ToRecord};
use crate::relationship::{
    empty_header, generated_kinds, RelationshipGenerator, RelationshipInputs, TransferInference,
    ALL_FILE,
};
use crate::transaction::{placeholder_accounts, TransactionGenerator, TransactionRow, SKIPPED_HEADER};
use crate::tsv::{read_table, write_header_only, write_table, ColumnOrder, TableRows};
use anyhow::Context;
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const BRANCHES_FILE: &str = "branches.tsv";
pub const CUSTOMERS_FILE: &str = "customers.tsv";
pub const ACCOUNTS_FILE: &str = "accounts.tsv";
pub const TRANSACTIONS_FILE: &str = "transactions.tsv";

const BRANCH_HEADER: &[&str] = &["branch_id", "branch_name", "city", "state"];
const CUSTOMER_HEADER: &[&str] = &["customer_id", "customer_type", "city", "member_since"];
const ACCOUNT_HEADER: &[&str] = &[
    "account_id",
    "account_type",
    "branch_id",
    "customer_id",
    "open_date",
    "status",
];

/// Default reference date standing in for "today"
pub fn default_as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

/// Settings for a full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    /// Preset name reported in the summary
    pub preset: String,
    pub size: SizeConfig,
    pub seed: u64,
    pub as_of: NaiveDate,
    pub skip_transactions: bool,
    pub progress: bool,
    pub quiet: bool,
}

/// Shared per-stage settings
#[derive(Debug, Clone)]
pub struct StageContext {
    pub dir: PathBuf,
    pub as_of: NaiveDate,
    pub progress: bool,
    /// Suppress warning echo on stderr
    pub quiet: bool,
}

impl StageContext {
    pub fn new(dir: impl Into<PathBuf>, as_of: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            as_of,
            progress: false,
            quiet: true,
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn spinner(&self, message: &'static str) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(message);
        Some(pb)
    }
}

/// One written output file
#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    pub name: String,
    pub rows: usize,
    pub bytes: u64,
}

/// Counters for a single stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageStats {
    pub stage: String,
    /// Upstream rows read back from disk
    pub rows_read: usize,
    /// Upstream rows dropped for missing or malformed required columns
    pub rows_skipped: usize,
    pub rows_written: usize,
    pub used_placeholders: bool,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindCount {
    pub kind: String,
    pub count: usize,
}

/// Summary of a pipeline run or single stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub preset: Option<String>,
    pub seed: u64,
    pub as_of: String,
    pub stages: Vec<StageStats>,
    pub files: Vec<OutputFile>,
    pub relationship_counts: Vec<KindCount>,
    pub warnings: Vec<String>,
    pub elapsed_secs: f64,
}

impl PipelineStats {
    pub fn new(seed: u64, as_of: NaiveDate) -> Self {
        Self {
            seed,
            as_of: as_of.to_string(),
            ..Default::default()
        }
    }

    pub fn stage(&self, name: &str) -> Option<&StageStats> {
        self.stages.iter().find(|s| s.stage == name)
    }

    pub fn file(&self, name: &str) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.name == name)
    }

    fn warn(&mut self, ctx: &StageContext, message: String) {
        if !ctx.quiet {
            eprintln!("  Warning: {}", message);
        }
        self.warnings.push(message);
    }
}

/// Stage-local bookkeeping, folded into [`PipelineStats`] on completion
struct StageRun {
    stats: StageStats,
    start: Instant,
    pb: Option<ProgressBar>,
}

impl StageRun {
    fn start(ctx: &StageContext, name: &str, message: &'static str) -> Self {
        Self {
            stats: StageStats {
                stage: name.to_string(),
                ..Default::default()
            },
            start: Instant::now(),
            pb: ctx.spinner(message),
        }
    }

    /// Read an upstream table, counting rows. `None` when missing or empty.
    fn load<T: DeserializeOwned>(&mut self, ctx: &StageContext, file: &str) -> anyhow::Result<Option<Vec<T>>> {
        let table: Option<TableRows<T>> = read_table(&ctx.path(file))?;
        Ok(table.and_then(|t| {
            self.stats.rows_read += t.rows.len();
            self.stats.rows_skipped += t.skipped;
            (!t.rows.is_empty()).then_some(t.rows)
        }))
    }

    fn write(
        &mut self,
        ctx: &StageContext,
        stats: &mut PipelineStats,
        file: &str,
        records: &[Record],
        order: ColumnOrder,
        empty_header: &[&str],
    ) -> anyhow::Result<()> {
        let path = ctx.path(file);
        let rows = write_table(&path, records, order, empty_header)?;
        self.stats.rows_written += rows;
        stats.files.push(output_file(&path, file, rows)?);
        Ok(())
    }

    fn finish(mut self, stats: &mut PipelineStats) {
        self.stats.elapsed_secs = self.start.elapsed().as_secs_f64();
        if let Some(pb) = self.pb {
            pb.finish_with_message(format!("{}: {} rows", self.stats.stage, self.stats.rows_written));
        }
        stats.stages.push(self.stats);
    }
}

fn output_file(path: &Path, name: &str, rows: usize) -> anyhow::Result<OutputFile> {
    let bytes = fs::metadata(path)
        .with_context(|| format!("Failed to stat output file: {}", path.display()))?
        .len();
    Ok(OutputFile {
        name: name.to_string(),
        rows,
        bytes,
    })
}

fn to_records<T: ToRecord>(items: &[T]) -> Vec<Record> {
    items.iter().map(ToRecord::to_record).collect()
}

/// Write `count` branches to `branches.tsv`
pub fn generate_branches(
    ctx: &StageContext,
    fake: &mut FakeData,
    stats: &mut PipelineStats,
    count: usize,
) -> anyhow::Result<()> {
    let mut run = StageRun::start(ctx, "branches", "Generating branches...");
    let branches = BranchGenerator::new(count, ctx.as_of).generate(fake);
    run.write(
        ctx,
        stats,
        BRANCHES_FILE,
        &to_records(&branches),
        ColumnOrder::FirstRecord,
        BRANCH_HEADER,
    )?;
    run.finish(stats);
    Ok(())
}

/// Write the customer base to `customers.tsv`
pub fn generate_customers(
    ctx: &StageContext,
    fake: &mut FakeData,
    stats: &mut PipelineStats,
    individual: usize,
    corporate: usize,
    high_net_worth: usize,
) -> anyhow::Result<()> {
    let mut run = StageRun::start(ctx, "customers", "Generating customers...");
    let customers = CustomerGenerator::new(individual, corporate, high_net_worth, ctx.as_of).generate(fake);
    run.write(
        ctx,
        stats,
        CUSTOMERS_FILE,
        &to_records(&customers),
        ColumnOrder::Sorted,
        CUSTOMER_HEADER,
    )?;
    run.finish(stats);
    Ok(())
}

/// Read customers and branches, write `accounts.tsv`
pub fn generate_accounts(
    ctx: &StageContext,
    fake: &mut FakeData,
    stats: &mut PipelineStats,
    avg_accounts_per_customer: f64,
) -> anyhow::Result<()> {
    let mut run = StageRun::start(ctx, "accounts", "Generating accounts...");

    let customers = match run.load::<CustomerRow>(ctx, CUSTOMERS_FILE)? {
        Some(rows) => rows,
        None => {
            run.stats.used_placeholders = true;
            stats.warn(ctx, format!("No customers in {}, using placeholder customers", CUSTOMERS_FILE));
            placeholder_customers()
        }
    };
    let branches = match run.load::<BranchRow>(ctx, BRANCHES_FILE)? {
        Some(rows) => rows.into_iter().map(|b| b.branch_id).collect(),
        None => {
            run.stats.used_placeholders = true;
            stats.warn(ctx, format!("No branches in {}, using placeholder branch", BRANCHES_FILE));
            placeholder_branches()
        }
    };

    let accounts = AccountGenerator::new(avg_accounts_per_customer, ctx.as_of).generate(fake, &customers, &branches);
    run.write(
        ctx,
        stats,
        ACCOUNTS_FILE,
        &to_records(&accounts),
        ColumnOrder::Sorted,
        ACCOUNT_HEADER,
    )?;
    run.finish(stats);
    Ok(())
}

/// Read accounts, write `transactions.tsv` for the active ones
pub fn generate_transactions(
    ctx: &StageContext,
    fake: &mut FakeData,
    stats: &mut PipelineStats,
    avg_transactions_per_account: f64,
    days: u32,
) -> anyhow::Result<()> {
    let mut run = StageRun::start(ctx, "transactions", "Generating transactions...");

    let accounts = match run.load::<AccountRow>(ctx, ACCOUNTS_FILE)? {
        Some(rows) => rows,
        None => {
            run.stats.used_placeholders = true;
            stats.warn(ctx, format!("No accounts in {}, using placeholder accounts", ACCOUNTS_FILE));
            placeholder_accounts()
        }
    };
    if !accounts.iter().any(AccountRow::is_active) {
        stats.warn(ctx, "No active accounts, no transactions generated".to_string());
    }

    let transactions =
        TransactionGenerator::new(avg_transactions_per_account, days, ctx.as_of).generate(fake, &accounts);
    run.write(
        ctx,
        stats,
        TRANSACTIONS_FILE,
        &to_records(&transactions),
        ColumnOrder::FirstRecord,
        SKIPPED_HEADER,
    )?;
    run.finish(stats);
    Ok(())
}

/// Write a header-only `transactions.tsv` so later stages see an empty set
pub fn skip_transactions(ctx: &StageContext, stats: &mut PipelineStats) -> anyhow::Result<()> {
    let run = StageRun::start(ctx, "transactions", "Skipping transactions...");
    let path = ctx.path(TRANSACTIONS_FILE);
    write_header_only(&path, SKIPPED_HEADER)?;
    stats.files.push(output_file(&path, TRANSACTIONS_FILE, 0)?);
    run.finish(stats);
    Ok(())
}

/// Read every entity file and write the relationship files
pub fn generate_relationships(
    ctx: &StageContext,
    fake: &mut FakeData,
    stats: &mut PipelineStats,
    transfer_inference: TransferInference,
) -> anyhow::Result<()> {
    let mut run = StageRun::start(ctx, "relationships", "Generating relationships...");

    let customers = run.load::<CustomerRow>(ctx, CUSTOMERS_FILE)?;
    let accounts = run.load::<AccountRow>(ctx, ACCOUNTS_FILE)?;
    let branches = run.load::<BranchRow>(ctx, BRANCHES_FILE)?;
    let transactions = run.load::<TransactionRow>(ctx, TRANSACTIONS_FILE)?;

    for (file, missing) in [
        (CUSTOMERS_FILE, customers.is_none()),
        (ACCOUNTS_FILE, accounts.is_none()),
        (BRANCHES_FILE, branches.is_none()),
    ] {
        if missing {
            stats.warn(ctx, format!("No rows in {}, related edges will be empty", file));
        }
    }
    if transactions.is_none() && !ctx.path(TRANSACTIONS_FILE).exists() {
        stats.warn(ctx, format!("{} not found, no transfer edges inferred", TRANSACTIONS_FILE));
    }

    let customers = customers.unwrap_or_default();
    let accounts = accounts.unwrap_or_default();
    let branch_ids: Vec<String> = branches
        .unwrap_or_default()
        .into_iter()
        .map(|b| b.branch_id)
        .collect();
    let transactions = transactions.unwrap_or_default();

    let set = RelationshipGenerator::new(ctx.as_of)
        .with_transfer_inference(transfer_inference)
        .generate(
            fake,
            RelationshipInputs {
                customers: &customers,
                accounts: &accounts,
                branch_ids: &branch_ids,
                transactions: &transactions,
            },
        );

    for (file, kinds, relationships) in set.files() {
        run.write(
            ctx,
            stats,
            file,
            &to_records(relationships),
            ColumnOrder::Sorted,
            &empty_header(kinds),
        )?;
    }

    // The combined file repeats every edge, so it is not added to rows_written
    let all: Vec<Record> = set.all().map(ToRecord::to_record).collect();
    let path = ctx.path(ALL_FILE);
    let rows = write_table(
        &path,
        &all,
        ColumnOrder::Sorted,
        &empty_header(&generated_kinds()),
    )?;
    stats.files.push(output_file(&path, ALL_FILE, rows)?);

    stats.relationship_counts = set
        .counts_by_kind()
        .into_iter()
        .map(|(kind, count)| KindCount {
            kind: kind.label().to_string(),
            count,
        })
        .collect();

    run.finish(stats);
    Ok(())
}

/// Run every stage in order against one seeded generator
pub fn run(config: &PipelineConfig) -> anyhow::Result<PipelineStats> {
    let start = Instant::now();

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let ctx = StageContext {
        dir: config.output_dir.clone(),
        as_of: config.as_of,
        progress: config.progress,
        quiet: config.quiet,
    };
    let size = &config.size;
    let mut fake = FakeData::new(config.seed);
    let mut stats = PipelineStats::new(config.seed, config.as_of);
    stats.preset = Some(config.preset.clone());

    generate_branches(&ctx, &mut fake, &mut stats, size.branches)?;
    generate_customers(
        &ctx,
        &mut fake,
        &mut stats,
        size.individual_customers,
        size.corporate_customers,
        size.hnw_customers,
    )?;
    generate_accounts(&ctx, &mut fake, &mut stats, size.avg_accounts_per_customer)?;
    if config.skip_transactions {
        skip_transactions(&ctx, &mut stats)?;
    } else {
        generate_transactions(
            &ctx,
            &mut fake,
            &mut stats,
            size.avg_transactions_per_account,
            size.transaction_days,
        )?;
    }
    generate_relationships(&ctx, &mut fake, &mut stats, TransferInference::default())?;

    stats.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::SizePreset;
    use crate::relationship::TRANSFER_TO_FILE;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            output_dir: dir.to_path_buf(),
            preset: "tiny".to_string(),
            size: SizePreset::Tiny.config(),
            seed: 42,
            as_of: default_as_of(),
            skip_transactions: false,
            progress: false,
            quiet: true,
        }
    }

    #[test]
    fn test_run_writes_every_file() {
        let dir = TempDir::new().unwrap();
        let stats = run(&config(dir.path())).unwrap();

        for name in [
            BRANCHES_FILE,
            CUSTOMERS_FILE,
            ACCOUNTS_FILE,
            TRANSACTIONS_FILE,
            "owns_account.tsv",
            "banks_at.tsv",
            "transfer_to.tsv",
            "knows.tsv",
            "employed_by.tsv",
            "authorized_user.tsv",
            ALL_FILE,
        ] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
            assert!(stats.file(name).is_some(), "unreported {}", name);
        }
        assert_eq!(stats.stage("branches").unwrap().rows_written, 10);
        assert_eq!(stats.stage("customers").unwrap().rows_written, 115);
        assert!(stats.warnings.is_empty(), "{:?}", stats.warnings);
    }

    #[test]
    fn test_combined_file_holds_every_edge() {
        let dir = TempDir::new().unwrap();
        let stats = run(&config(dir.path())).unwrap();

        let per_file: usize = stats.stage("relationships").unwrap().rows_written;
        assert_eq!(stats.file(ALL_FILE).unwrap().rows, per_file);
        let counted: usize = stats.relationship_counts.iter().map(|k| k.count).sum();
        assert_eq!(counted, per_file);
    }

    #[test]
    fn test_skip_transactions_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(dir.path());
        cfg.skip_transactions = true;
        run(&cfg).unwrap();

        let content = fs::read_to_string(dir.path().join(TRANSACTIONS_FILE)).unwrap();
        assert_eq!(content, "transaction_id\taccount_id\ttransaction_type\tamount\n");
        let transfers = fs::read_to_string(dir.path().join("transfer_to.tsv")).unwrap();
        assert_eq!(transfers.lines().count(), 1);
    }

    #[test]
    fn test_accounts_without_upstream_use_placeholders() {
        let dir = TempDir::new().unwrap();
        let ctx = StageContext::new(dir.path(), default_as_of());
        let mut fake = FakeData::new(7);
        let mut stats = PipelineStats::new(7, default_as_of());

        generate_accounts(&ctx, &mut fake, &mut stats, 2.5).unwrap();

        let stage = stats.stage("accounts").unwrap();
        assert!(stage.used_placeholders);
        assert!(stage.rows_written >= 1000);
        assert_eq!(stats.warnings.len(), 2);

        let content = fs::read_to_string(dir.path().join(ACCOUNTS_FILE)).unwrap();
        assert!(content.contains("BR-00001"));
        assert!(content.contains("CUST-00000001"));
    }

    #[test]
    fn test_transactions_without_active_accounts() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(ACCOUNTS_FILE),
            "account_id\taccount_type\tstatus\nACC-0000000001\tChecking\tClosed\n",
        )
        .unwrap();
        let ctx = StageContext::new(dir.path(), default_as_of());
        let mut fake = FakeData::new(1);
        let mut stats = PipelineStats::new(1, default_as_of());

        generate_transactions(&ctx, &mut fake, &mut stats, 10.0, 30).unwrap();

        let stage = stats.stage("transactions").unwrap();
        assert_eq!(stage.rows_written, 0);
        assert!(!stage.used_placeholders);
        assert_eq!(stats.warnings.len(), 1);
        let content = fs::read_to_string(dir.path().join(TRANSACTIONS_FILE)).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CUSTOMERS_FILE),
            "customer_id\tcustomer_type\nCUST-00000001\tIndividual\n\tIndividual\nCUST-00000003\t\n",
        )
        .unwrap();
        fs::write(dir.path().join(BRANCHES_FILE), "branch_id\nBR-00001\n").unwrap();
        let ctx = StageContext::new(dir.path(), default_as_of());
        let mut fake = FakeData::new(3);
        let mut stats = PipelineStats::new(3, default_as_of());

        generate_accounts(&ctx, &mut fake, &mut stats, 2.0).unwrap();

        let stage = stats.stage("accounts").unwrap();
        assert_eq!(stage.rows_skipped, 2);
        assert_eq!(stage.rows_read, 2);
        assert!(!stage.used_placeholders);
        assert!(stage.rows_written >= 1 && stage.rows_written <= 6);
    }

    #[test]
    fn test_relationships_with_nothing_upstream() {
        let dir = TempDir::new().unwrap();
        let ctx = StageContext::new(dir.path(), default_as_of());
        let mut fake = FakeData::new(9);
        let mut stats = PipelineStats::new(9, default_as_of());

        generate_relationships(&ctx, &mut fake, &mut stats, TransferInference::default()).unwrap();

        assert_eq!(stats.stage("relationships").unwrap().rows_written, 0);
        assert_eq!(stats.warnings.len(), 4);
        let header = fs::read_to_string(dir.path().join(ALL_FILE)).unwrap();
        assert_eq!(header.trim_end(), empty_header(&generated_kinds()).join("\t"));
        assert!(header.contains("\trelationship_id\trelationship_type\tsource_id\t"));

        let transfers = fs::read_to_string(dir.path().join(TRANSFER_TO_FILE)).unwrap();
        assert_eq!(
            transfers,
            "first_transfer_date\tfrequency\tlast_transfer_date\trelationship_id\t\
             relationship_type\tsource_id\tsource_type\tstatus\ttarget_id\ttarget_type\n"
        );
    }
}
