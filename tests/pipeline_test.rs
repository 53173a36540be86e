//! End-to-end tests for the full pipeline and single-stage invocation.

use bank_fixtures::fake::FakeData;
use bank_fixtures::pipeline::{self, PipelineConfig, PipelineStats, StageContext};
use bank_fixtures::preset::SizePreset;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ALL_FILES: &[&str] = &[
    "branches.tsv",
    "customers.tsv",
    "accounts.tsv",
    "transactions.tsv",
    "owns_account.tsv",
    "banks_at.tsv",
    "transfer_to.tsv",
    "knows.tsv",
    "employed_by.tsv",
    "authorized_user.tsv",
    "relationships_all.tsv",
];

fn config(dir: &Path, preset: SizePreset, seed: u64) -> PipelineConfig {
    PipelineConfig {
        output_dir: dir.to_path_buf(),
        preset: preset.name().to_string(),
        size: preset.config(),
        seed,
        as_of: pipeline::default_as_of(),
        skip_transactions: false,
        progress: false,
        quiet: true,
    }
}

fn read_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .unwrap();
    reader.deserialize().map(|r| r.unwrap()).collect()
}

fn header(path: &Path) -> Vec<String> {
    let content = fs::read_to_string(path).unwrap();
    content
        .lines()
        .next()
        .unwrap()
        .split('\t')
        .map(str::to_string)
        .collect()
}

fn ids(rows: &[HashMap<String, String>], column: &str) -> HashSet<String> {
    rows.iter().map(|r| r[column].clone()).collect()
}

#[test]
fn test_tiny_seed_42_end_to_end() {
    let dir = TempDir::new().unwrap();
    pipeline::run(&config(dir.path(), SizePreset::Tiny, 42)).unwrap();

    let branches = read_rows(&dir.path().join("branches.tsv"));
    let customers = read_rows(&dir.path().join("customers.tsv"));
    let accounts = read_rows(&dir.path().join("accounts.tsv"));

    assert_eq!(branches.len(), 10);
    assert_eq!(customers.len(), 115);

    let branch_ids = ids(&branches, "branch_id");
    let customer_ids = ids(&customers, "customer_id");
    assert!(!accounts.is_empty());
    for account in &accounts {
        assert!(customer_ids.contains(&account["customer_id"]), "{:?}", account);
        assert!(branch_ids.contains(&account["branch_id"]), "{:?}", account);
    }
}

#[test]
fn test_same_seed_is_byte_identical() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    pipeline::run(&config(first.path(), SizePreset::Tiny, 7)).unwrap();
    pipeline::run(&config(second.path(), SizePreset::Tiny, 7)).unwrap();

    for name in ALL_FILES {
        let a = fs::read(first.path().join(name)).unwrap();
        let b = fs::read(second.path().join(name)).unwrap();
        assert!(a == b, "{} differs between runs", name);
    }
}

#[test]
fn test_different_seed_changes_output() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    pipeline::run(&config(first.path(), SizePreset::Tiny, 1)).unwrap();
    pipeline::run(&config(second.path(), SizePreset::Tiny, 2)).unwrap();

    let a = fs::read(first.path().join("customers.tsv")).unwrap();
    let b = fs::read(second.path().join("customers.tsv")).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_referential_integrity() {
    let dir = TempDir::new().unwrap();
    pipeline::run(&config(dir.path(), SizePreset::Tiny, 42)).unwrap();

    let branches = read_rows(&dir.path().join("branches.tsv"));
    let customers = read_rows(&dir.path().join("customers.tsv"));
    let accounts = read_rows(&dir.path().join("accounts.tsv"));
    let transactions = read_rows(&dir.path().join("transactions.tsv"));

    let active: HashSet<String> = accounts
        .iter()
        .filter(|a| a["status"] == "Active")
        .map(|a| a["account_id"].clone())
        .collect();
    assert!(!transactions.is_empty());
    for tx in &transactions {
        assert!(active.contains(&tx["account_id"]), "{:?}", tx);
    }

    let mut by_type: HashMap<&str, HashSet<String>> = HashMap::new();
    by_type.insert("Branch", ids(&branches, "branch_id"));
    by_type.insert("Customer", ids(&customers, "customer_id"));
    by_type.insert("Account", ids(&accounts, "account_id"));

    let relationships = read_rows(&dir.path().join("relationships_all.tsv"));
    assert!(!relationships.is_empty());
    for rel in &relationships {
        let sources = &by_type[rel["source_type"].as_str()];
        let targets = &by_type[rel["target_type"].as_str()];
        assert!(sources.contains(&rel["source_id"]), "{:?}", rel);
        assert!(targets.contains(&rel["target_id"]), "{:?}", rel);
    }
}

#[test]
fn test_relationship_files_partition_combined_file() {
    let dir = TempDir::new().unwrap();
    pipeline::run(&config(dir.path(), SizePreset::Tiny, 42)).unwrap();

    let per_file: usize = [
        "owns_account.tsv",
        "banks_at.tsv",
        "transfer_to.tsv",
        "knows.tsv",
        "employed_by.tsv",
        "authorized_user.tsv",
    ]
    .iter()
    .map(|f| read_rows(&dir.path().join(f)).len())
    .sum();
    let all = read_rows(&dir.path().join("relationships_all.tsv"));
    assert_eq!(all.len(), per_file);

    let accounts = read_rows(&dir.path().join("accounts.tsv"));
    let owns = read_rows(&dir.path().join("owns_account.tsv"));
    assert_eq!(owns.len(), accounts.len());
}

#[test]
fn test_column_order_policies() {
    let dir = TempDir::new().unwrap();
    pipeline::run(&config(dir.path(), SizePreset::Tiny, 42)).unwrap();

    for name in ["customers.tsv", "accounts.tsv", "owns_account.tsv", "relationships_all.tsv"] {
        let columns = header(&dir.path().join(name));
        let mut sorted = columns.clone();
        sorted.sort();
        assert_eq!(columns, sorted, "{} header is not sorted", name);
    }

    assert_eq!(header(&dir.path().join("branches.tsv"))[0], "branch_id");
    let tx_header = header(&dir.path().join("transactions.tsv"));
    assert_eq!(tx_header[0], "transaction_id");
    assert_eq!(tx_header[1], "account_id");
}

#[test]
fn test_transactions_sorted_by_timestamp() {
    let dir = TempDir::new().unwrap();
    pipeline::run(&config(dir.path(), SizePreset::Tiny, 42)).unwrap();

    let transactions = read_rows(&dir.path().join("transactions.tsv"));
    let stamps: Vec<String> = transactions
        .iter()
        .map(|t| format!("{} {}", t["transaction_date"], t["transaction_time"]))
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_skip_transactions_leaves_no_transfers() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config(dir.path(), SizePreset::Tiny, 42);
    cfg.skip_transactions = true;
    let stats = pipeline::run(&cfg).unwrap();

    assert!(read_rows(&dir.path().join("transactions.tsv")).is_empty());
    assert!(read_rows(&dir.path().join("transfer_to.tsv")).is_empty());
    assert!(!read_rows(&dir.path().join("owns_account.tsv")).is_empty());
    assert!(stats.warnings.is_empty(), "{:?}", stats.warnings);
}

#[test]
fn test_stats_report_every_file() {
    let dir = TempDir::new().unwrap();
    let stats = pipeline::run(&config(dir.path(), SizePreset::Tiny, 42)).unwrap();

    assert_eq!(stats.preset.as_deref(), Some("tiny"));
    assert_eq!(stats.as_of, "2025-01-01");
    assert_eq!(stats.stages.len(), 5);
    for name in ALL_FILES {
        let file = stats.file(name).unwrap();
        let on_disk = fs::metadata(dir.path().join(name)).unwrap().len();
        assert_eq!(file.bytes, on_disk);
    }

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["seed"], 42);
    assert!(json["stages"].is_array());
}

#[test]
fn test_stages_run_independently() {
    let dir = TempDir::new().unwrap();
    let ctx = StageContext::new(dir.path(), pipeline::default_as_of());
    let mut stats = PipelineStats::new(5, pipeline::default_as_of());

    pipeline::generate_branches(&ctx, &mut FakeData::new(5), &mut stats, 4).unwrap();
    pipeline::generate_accounts(&ctx, &mut FakeData::new(5), &mut stats, 1.5).unwrap();

    // Only the customers file was missing
    assert_eq!(stats.warnings.len(), 1);
    assert!(stats.warnings[0].contains("customers.tsv"));

    let branches = ids(&read_rows(&dir.path().join("branches.tsv")), "branch_id");
    let accounts = read_rows(&dir.path().join("accounts.tsv"));
    assert!(accounts.len() >= 1000);
    for account in &accounts {
        assert!(branches.contains(&account["branch_id"]));
        assert!(account["customer_id"].starts_with("CUST-"));
    }
}

#[test]
fn test_placeholder_accounts_feed_transactions() {
    let dir = TempDir::new().unwrap();
    let ctx = StageContext::new(dir.path(), pipeline::default_as_of());
    let mut stats = PipelineStats::new(11, pipeline::default_as_of());

    pipeline::generate_transactions(&ctx, &mut FakeData::new(11), &mut stats, 5.0, 30).unwrap();

    assert_eq!(stats.warnings.len(), 1);
    assert!(stats.stage("transactions").unwrap().used_placeholders);
    let transactions = read_rows(&dir.path().join("transactions.tsv"));
    let accounts = ids(&transactions, "account_id");
    assert_eq!(accounts.len(), 100);
}
