//! Range, cardinality and distribution invariants of the generated fixtures.

use bank_fixtures::account::config::AccountType;
use bank_fixtures::account::AccountGenerator;
use bank_fixtures::customer::CustomerRow;
use bank_fixtures::fake::FakeData;
use bank_fixtures::pipeline::{self, PipelineConfig, PipelineStats, StageContext};
use bank_fixtures::preset::SizePreset;
use bank_fixtures::relationship::TransferInference;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tempfile::TempDir;

fn read_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .unwrap();
    reader.deserialize().map(|r| r.unwrap()).collect()
}

fn number(row: &HashMap<String, String>, column: &str) -> f64 {
    row[column]
        .parse()
        .unwrap_or_else(|_| panic!("{} is not numeric in {:?}", column, row))
}

/// One small-preset run shared by every test in this file
fn small_run() -> &'static Path {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let preset = SizePreset::Small;
        pipeline::run(&PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            preset: preset.name().to_string(),
            size: preset.config(),
            seed: 42,
            as_of: pipeline::default_as_of(),
            skip_transactions: false,
            progress: false,
            quiet: true,
        })
        .unwrap();
        dir
    })
    .path()
}

#[test]
fn test_account_balances_within_type_range() {
    let accounts = read_rows(&small_run().join("accounts.tsv"));
    assert!(!accounts.is_empty());

    for account in &accounts {
        let account_type = AccountType::from_label(&account["account_type"]).unwrap();
        let config = account_type.config();
        let balance = number(account, "balance");
        assert!(
            balance >= config.min_balance && balance <= config.max_balance,
            "{:?}",
            account
        );
    }
}

#[test]
fn test_credit_card_balances() {
    let accounts = read_rows(&small_run().join("accounts.tsv"));
    let cards: Vec<_> = accounts
        .iter()
        .filter(|a| a["account_type"] == "CreditCard")
        .collect();
    assert!(!cards.is_empty());

    for card in cards {
        let balance = number(card, "balance");
        let limit = number(card, "credit_limit");
        let available = number(card, "available_credit");
        assert!(balance <= 0.0);
        assert!((available - (limit + balance)).abs() < 0.01, "{:?}", card);
        assert!(number(card, "minimum_payment") >= 25.0);
    }
}

#[test]
fn test_type_specific_columns_only_on_matching_type() {
    let accounts = read_rows(&small_run().join("accounts.tsv"));
    for account in &accounts {
        let is_card = account["account_type"] == "CreditCard";
        assert_eq!(!account["credit_limit"].is_empty(), is_card, "{:?}", account);
        let is_cd = account["account_type"] == "CD";
        assert_eq!(!account["maturity_date"].is_empty(), is_cd, "{:?}", account);
    }
}

#[test]
fn test_customer_risk_scores() {
    let customers = read_rows(&small_run().join("customers.tsv"));
    assert_eq!(customers.len(), 575);

    for customer in &customers {
        let risk = number(customer, "risk_score");
        assert!((1.0..=100.0).contains(&risk), "{:?}", customer);
        if customer["customer_type"] == "HighNetWorth" {
            assert!((5.0..=35.0).contains(&risk), "{:?}", customer);
        }
    }
}

#[test]
fn test_transaction_risk_and_flags() {
    let transactions = read_rows(&small_run().join("transactions.tsv"));
    assert!(!transactions.is_empty());

    for tx in &transactions {
        let risk = number(tx, "risk_score");
        assert!((0.0..=100.0).contains(&risk));
        assert_eq!(tx["is_flagged"] == "Y", risk > 50.0, "{:?}", tx);
    }
}

#[test]
fn test_accounts_per_customer_bounds() {
    let customers = read_rows(&small_run().join("customers.tsv"));
    let accounts = read_rows(&small_run().join("accounts.tsv"));

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for account in &accounts {
        *counts.entry(account["customer_id"].as_str()).or_default() += 1;
    }

    for customer in &customers {
        let n = counts.get(customer["customer_id"].as_str()).copied().unwrap_or(0);
        match customer["customer_type"].as_str() {
            "Individual" => assert!((1..=6).contains(&n)),
            "Corporate" => assert!((2..=8).contains(&n)),
            _ => assert!((3..=10).contains(&n)),
        }
    }
}

#[test]
fn test_individual_account_type_distribution() {
    let customers: Vec<CustomerRow> = (1..=5000)
        .map(|i| CustomerRow {
            customer_id: format!("CUST-{:08}", i),
            customer_type: "Individual".to_string(),
            city: String::new(),
            member_since: String::new(),
        })
        .collect();
    let branches = vec!["BR-00001".to_string()];

    let mut fake = FakeData::new(2024);
    let accounts =
        AccountGenerator::new(2.5, pipeline::default_as_of()).generate(&mut fake, &customers, &branches);
    assert!(accounts.len() >= 10_000, "only {} accounts", accounts.len());

    let total = accounts.len() as f64;
    for (account_type, weight) in AccountType::weights() {
        let observed = accounts
            .iter()
            .filter(|a| a.account_type == account_type)
            .count() as f64
            / total;
        assert!(
            (observed - weight).abs() <= 0.03,
            "{:?}: observed {:.3}, expected {:.3}",
            account_type,
            observed,
            weight
        );
    }
}

#[test]
fn test_two_transfers_between_crafted_accounts() {
    let mut found = false;

    for seed in 0..2000u64 {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("accounts.tsv"),
            "account_id\tcustomer_id\tbranch_id\taccount_type\tstatus\n\
             ACC-0000000001\tCUST-00000001\tBR-00001\tChecking\tActive\n\
             ACC-0000000002\tCUST-00000002\tBR-00001\tChecking\tActive\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("transactions.tsv"),
            "account_id\ttransaction_type\tstatus\tamount\ttransaction_date\n\
             ACC-0000000001\tTransfer\tCompleted\t100.25\t2024-03-01\n\
             ACC-0000000001\tPurchase\tCompleted\t12.00\t2024-03-02\n\
             ACC-0000000001\tTransfer\tPending\t80.00\t2024-03-03\n\
             ACC-0000000001\tTransfer\tCompleted\t50.50\t2024-03-09\n",
        )
        .unwrap();

        let ctx = StageContext::new(dir.path(), pipeline::default_as_of());
        let mut stats = PipelineStats::new(seed, pipeline::default_as_of());
        pipeline::generate_relationships(
            &ctx,
            &mut FakeData::new(seed),
            &mut stats,
            TransferInference::default(),
        )
        .unwrap();

        let edges = read_rows(&dir.path().join("transfer_to.tsv"));
        assert!(edges.len() <= 1);
        if let Some(edge) = edges.first() {
            assert_eq!(edge["source_id"], "ACC-0000000001");
            assert_eq!(edge["target_id"], "ACC-0000000002");
            assert_eq!(edge["frequency"], "2");
            assert_eq!(edge["total_amount"], "150.75");
            assert_eq!(edge["first_transfer_date"], "2024-03-01");
            assert_eq!(edge["last_transfer_date"], "2024-03-09");
            found = true;
            break;
        }
    }

    assert!(found, "no seed sampled both transfers");
}

#[test]
fn test_malformed_rows_are_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("accounts.tsv"),
        "account_id\taccount_type\tstatus\n\
         ACC-0000000001\tSavings\tActive\n\
         \tChecking\tActive\n\
         ACC-0000000003\tChecking\tActive\n",
    )
    .unwrap();

    let ctx = StageContext::new(dir.path(), pipeline::default_as_of());
    let mut stats = PipelineStats::new(3, pipeline::default_as_of());
    pipeline::generate_transactions(&ctx, &mut FakeData::new(3), &mut stats, 5.0, 30).unwrap();

    let stage = stats.stage("transactions").unwrap();
    assert_eq!(stage.rows_read, 2);
    assert_eq!(stage.rows_skipped, 1);
    assert!(stats.warnings.is_empty());

    let transactions = read_rows(&dir.path().join("transactions.tsv"));
    assert!(transactions
        .iter()
        .all(|t| t["account_id"] == "ACC-0000000001" || t["account_id"] == "ACC-0000000003"));
}
