//! Relationship (graph edge) generation.
//!
//! Edges are derived from the four entity sets read back from disk. Most
//! follow foreign keys already present in the data; TRANSFER_TO is
//! inferred statistically from completed transfers because transactions
//! carry no counterparty column.

pub mod kind;

pub use kind::{EntityType, RelationshipKind};

use crate::account::{AccountRow, AccountType};
use crate::customer::{CustomerKind, CustomerRow};
use crate::fake::{round_to, FakeData};
use crate::record::{Record, ToRecord};
use crate::transaction::TransactionRow;
use ahash::AHashMap;
use chrono::NaiveDate;

/// Start date used when an upstream row has none
const DEFAULT_START_DATE: &str = "2020-01-01";

const PERSONAL_RELATIONSHIPS: &[&str] = &[
    "Family",
    "Friend",
    "Colleague",
    "Business Partner",
    "Neighbor",
    "Acquaintance",
];

const RELATIONSHIP_STRENGTHS: &[(&str, f64)] = &[("Strong", 0.3), ("Medium", 0.5), ("Weak", 0.2)];

const POSITIONS: &[&str] = &[
    "Executive", "Manager", "Director", "VP", "Analyst", "Engineer", "Consultant", "Specialist",
    "Associate", "Coordinator",
];

const DEPARTMENTS: &[&str] = &[
    "Finance",
    "Operations",
    "Technology",
    "HR",
    "Marketing",
    "Sales",
    "Legal",
    "Administration",
    "R&D",
    "Customer Service",
];

const AUTHORIZATION_LEVELS: &[&str] = &["Full", "Limited", "View Only"];
const SPENDING_LIMITS: &[Option<i64>] = &[Some(500), Some(1000), Some(2500), Some(5000), None];
const REFERRAL_BONUSES: &[i64] = &[50, 100, 150, 200];
const CORPORATE_OWNERSHIP_PERCENTAGES: &[i64] = &[100, 50, 33];

/// Probability a cross-city KNOWS candidate is kept
const CROSS_CITY_KNOWS_PROBABILITY: f64 = 0.3;
const AUTHORIZED_USER_PROBABILITY: f64 = 0.2;
const EMPLOYMENT_ACTIVE_PROBABILITY: f64 = 0.75;

/// Output file names of the relationship stage
pub const OWNS_FILE: &str = "owns_account.tsv";
pub const BANKS_AT_FILE: &str = "banks_at.tsv";
pub const TRANSFER_TO_FILE: &str = "transfer_to.tsv";
pub const KNOWS_FILE: &str = "knows.tsv";
pub const EMPLOYED_BY_FILE: &str = "employed_by.tsv";
pub const AUTHORIZED_USER_FILE: &str = "authorized_user.tsv";
pub const ALL_FILE: &str = "relationships_all.tsv";

/// Columns every relationship row carries
pub const COMMON_COLUMNS: &[&str] = &[
    "relationship_id",
    "relationship_type",
    "source_type",
    "source_id",
    "target_type",
    "target_id",
    "status",
];

/// Sorted header for a file of `kinds`, used when the file has no rows
pub fn empty_header(kinds: &[RelationshipKind]) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = COMMON_COLUMNS.to_vec();
    for kind in kinds {
        for property in kind.properties() {
            if !columns.contains(property) {
                columns.push(property);
            }
        }
    }
    columns.sort_unstable();
    columns
}

/// Kinds the generator emits, in kind order
pub fn generated_kinds() -> Vec<RelationshipKind> {
    RelationshipKind::ALL
        .into_iter()
        .filter(|k| k.is_generated())
        .collect()
}

/// A generated edge
#[derive(Debug, Clone)]
pub struct Relationship {
    pub relationship_id: String,
    pub kind: RelationshipKind,
    pub source_id: String,
    pub target_id: String,
    pub status: &'static str,
    pub properties: Record,
}

impl ToRecord for Relationship {
    fn to_record(&self) -> Record {
        let mut r = Record::with_capacity(COMMON_COLUMNS.len() + self.properties.len());
        r.set("relationship_id", &self.relationship_id);
        r.set("relationship_type", self.kind.label());
        r.set("source_type", self.kind.source().label());
        r.set("source_id", &self.source_id);
        r.set("target_type", self.kind.target().label());
        r.set("target_id", &self.target_id);
        r.set("status", self.status);
        r.extend(self.properties.clone());
        r
    }
}

/// Sequential identifiers for the edges of one output file
struct IdSequence(usize);

impl IdSequence {
    fn new() -> Self {
        Self(0)
    }

    fn next(&mut self, kind: RelationshipKind) -> String {
        self.0 += 1;
        format!("REL-{}-{:08}", kind.id_code(), self.0)
    }
}

/// Policy for inferring TRANSFER_TO edges from completed transfers
#[derive(Debug, Clone, Copy)]
pub struct TransferInference {
    /// Chance that a completed transfer is attributed to a random counterparty
    pub probability: f64,
    /// Minimum attributed transfers before a pair becomes an edge
    pub min_count: usize,
}

impl Default for TransferInference {
    fn default() -> Self {
        Self {
            probability: 0.10,
            min_count: 2,
        }
    }
}

#[derive(Debug)]
struct TransferStats {
    source: usize,
    target: usize,
    count: usize,
    total_amount: f64,
    first_date: String,
    last_date: String,
}

/// Entity sets the relationship stage reads
#[derive(Debug, Clone, Copy)]
pub struct RelationshipInputs<'a> {
    pub customers: &'a [CustomerRow],
    pub accounts: &'a [AccountRow],
    pub branch_ids: &'a [String],
    pub transactions: &'a [TransactionRow],
}

/// Every generated edge, grouped by output file
#[derive(Debug, Default)]
pub struct RelationshipSet {
    pub owns: Vec<Relationship>,
    pub banks_at: Vec<Relationship>,
    pub transfers: Vec<Relationship>,
    /// KNOWS and REFERRED_BY edges
    pub social: Vec<Relationship>,
    pub employment: Vec<Relationship>,
    pub authorized_users: Vec<Relationship>,
}

impl RelationshipSet {
    /// Per-category output files with the kinds each holds, in write order
    pub fn files(&self) -> [(&'static str, &'static [RelationshipKind], &[Relationship]); 6] {
        use RelationshipKind::*;
        [
            (OWNS_FILE, &[Owns], self.owns.as_slice()),
            (BANKS_AT_FILE, &[BanksAt], self.banks_at.as_slice()),
            (TRANSFER_TO_FILE, &[TransferTo], self.transfers.as_slice()),
            (KNOWS_FILE, &[Knows, ReferredBy], self.social.as_slice()),
            (EMPLOYED_BY_FILE, &[EmployedBy], self.employment.as_slice()),
            (AUTHORIZED_USER_FILE, &[AuthorizedUser], self.authorized_users.as_slice()),
        ]
    }

    /// Every edge in file order
    pub fn all(&self) -> impl Iterator<Item = &Relationship> {
        self.owns
            .iter()
            .chain(&self.banks_at)
            .chain(&self.transfers)
            .chain(&self.social)
            .chain(&self.employment)
            .chain(&self.authorized_users)
    }

    pub fn len(&self) -> usize {
        self.files().iter().map(|(_, _, rels)| rels.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Edge counts for every generated kind, zero counts included
    pub fn counts_by_kind(&self) -> Vec<(RelationshipKind, usize)> {
        generated_kinds()
            .into_iter()
            .map(|k| (k, self.all().filter(|r| r.kind == k).count()))
            .collect()
    }
}

/// Derives graph edges from the generated entity sets
pub struct RelationshipGenerator {
    as_of: NaiveDate,
    transfer_inference: TransferInference,
}

impl RelationshipGenerator {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            transfer_inference: TransferInference::default(),
        }
    }

    pub fn with_transfer_inference(mut self, policy: TransferInference) -> Self {
        self.transfer_inference = policy;
        self
    }

    pub fn generate(&self, fake: &mut FakeData, inputs: RelationshipInputs<'_>) -> RelationshipSet {
        let accounts_by_customer = group_accounts(inputs.accounts);

        RelationshipSet {
            owns: self.owns(fake, inputs.customers, &accounts_by_customer),
            banks_at: self.banks_at(fake, inputs.customers, &accounts_by_customer, inputs.branch_ids),
            transfers: self.transfers(fake, inputs.transactions, inputs.accounts),
            social: self.social(fake, inputs.customers),
            employment: self.employment(fake, inputs.customers),
            authorized_users: self.authorized_users(fake, inputs.customers, &accounts_by_customer),
        }
    }

    /// OWNS: one edge per account, the first account of each customer primary
    pub fn owns(
        &self,
        fake: &mut FakeData,
        customers: &[CustomerRow],
        accounts_by_customer: &AHashMap<&str, Vec<&AccountRow>>,
    ) -> Vec<Relationship> {
        let mut ids = IdSequence::new();
        let mut edges = Vec::new();

        for customer in customers {
            let Some(accounts) = accounts_by_customer.get(customer.customer_id.as_str()) else {
                continue;
            };
            for (i, account) in accounts.iter().enumerate() {
                let primary = i == 0;
                let percentage = if customer.kind() == Some(CustomerKind::Corporate) {
                    *fake.pick(CORPORATE_OWNERSHIP_PERCENTAGES)
                } else {
                    100
                };
                let properties = Record::new()
                    .with("ownership_type", if primary { "Primary" } else { "Secondary" })
                    .with("ownership_percentage", percentage)
                    .with("start_date", or_default_date(&account.open_date))
                    .with("is_primary", primary);
                edges.push(Relationship {
                    relationship_id: ids.next(RelationshipKind::Owns),
                    kind: RelationshipKind::Owns,
                    source_id: customer.customer_id.clone(),
                    target_id: account.account_id.clone(),
                    status: "Active",
                    properties,
                });
            }
        }
        edges
    }

    /// BANKS_AT: distinct branches of a customer's accounts in first-seen order,
    /// or one random branch for customers without accounts
    pub fn banks_at(
        &self,
        fake: &mut FakeData,
        customers: &[CustomerRow],
        accounts_by_customer: &AHashMap<&str, Vec<&AccountRow>>,
        branch_ids: &[String],
    ) -> Vec<Relationship> {
        let mut ids = IdSequence::new();
        let mut edges = Vec::new();

        for customer in customers {
            let mut branches: Vec<&str> = Vec::new();
            if let Some(accounts) = accounts_by_customer.get(customer.customer_id.as_str()) {
                for account in accounts {
                    let branch = account.branch_id.as_str();
                    if !branch.is_empty() && !branches.contains(&branch) {
                        branches.push(branch);
                    }
                }
            }
            if branches.is_empty() && !branch_ids.is_empty() {
                branches.push(fake.pick(branch_ids).as_str());
            }

            for (i, branch_id) in branches.into_iter().enumerate() {
                let primary = i == 0;
                let properties = Record::new()
                    .with(
                        "relationship_category",
                        if primary { "Primary" } else { "Secondary" },
                    )
                    .with("start_date", or_default_date(&customer.member_since))
                    .with("is_primary_branch", primary);
                edges.push(Relationship {
                    relationship_id: ids.next(RelationshipKind::BanksAt),
                    kind: RelationshipKind::BanksAt,
                    source_id: customer.customer_id.clone(),
                    target_id: branch_id.to_string(),
                    status: "Active",
                    properties,
                });
            }
        }
        edges
    }

    /// TRANSFER_TO: attribute a share of completed transfers to a random
    /// other account and keep pairs that recur.
    ///
    /// Candidate targets are the accounts in file order, excluding the
    /// source. Pairs are emitted in the order they were first attributed.
    pub fn transfers(
        &self,
        fake: &mut FakeData,
        transactions: &[TransactionRow],
        accounts: &[AccountRow],
    ) -> Vec<Relationship> {
        let policy = self.transfer_inference;
        let index: AHashMap<&str, usize> = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (a.account_id.as_str(), i))
            .collect();

        let mut stats: Vec<TransferStats> = Vec::new();
        let mut by_pair: AHashMap<(usize, usize), usize> = AHashMap::new();

        for tx in transactions.iter().filter(|t| t.is_completed_transfer()) {
            let Some(&source) = index.get(tx.account_id.as_str()) else {
                continue;
            };
            if accounts.len() < 2 || !fake.bool_with_probability(policy.probability) {
                continue;
            }
            let target = fake.index_excluding(accounts.len(), source);

            let slot = *by_pair.entry((source, target)).or_insert_with(|| {
                stats.push(TransferStats {
                    source,
                    target,
                    count: 0,
                    total_amount: 0.0,
                    first_date: tx.transaction_date.clone(),
                    last_date: tx.transaction_date.clone(),
                });
                stats.len() - 1
            });
            let entry = &mut stats[slot];
            entry.count += 1;
            entry.total_amount += tx.amount;
            if tx.transaction_date < entry.first_date {
                entry.first_date = tx.transaction_date.clone();
            }
            if tx.transaction_date > entry.last_date {
                entry.last_date = tx.transaction_date.clone();
            }
        }

        let mut ids = IdSequence::new();
        stats
            .into_iter()
            .filter(|s| s.count >= policy.min_count)
            .map(|s| Relationship {
                relationship_id: ids.next(RelationshipKind::TransferTo),
                kind: RelationshipKind::TransferTo,
                source_id: accounts[s.source].account_id.clone(),
                target_id: accounts[s.target].account_id.clone(),
                status: "Active",
                properties: Record::new()
                    .with("frequency", s.count)
                    .with("total_amount", round_to(s.total_amount, 2))
                    .with("first_transfer_date", s.first_date)
                    .with("last_transfer_date", s.last_date),
            })
            .collect()
    }

    /// KNOWS and REFERRED_BY edges between customers
    pub fn social(&self, fake: &mut FakeData, customers: &[CustomerRow]) -> Vec<Relationship> {
        let mut ids = IdSequence::new();
        let mut edges = Vec::new();
        if customers.len() < 2 {
            return edges;
        }

        let attempts = customers.len() / 5;
        for _ in 0..attempts {
            let (a, b) = fake.distinct_pair(customers.len());
            let (c1, c2) = (&customers[a], &customers[b]);
            if c1.city != c2.city && !fake.bool_with_probability(CROSS_CITY_KNOWS_PROBABILITY) {
                continue;
            }
            let properties = Record::new()
                .with("relationship_category", *fake.pick(PERSONAL_RELATIONSHIPS))
                .with("since", fake.date_before(self.as_of, 30, 3650))
                .with("strength", *fake.weighted(RELATIONSHIP_STRENGTHS));
            edges.push(Relationship {
                relationship_id: ids.next(RelationshipKind::Knows),
                kind: RelationshipKind::Knows,
                source_id: c1.customer_id.clone(),
                target_id: c2.customer_id.clone(),
                status: "Active",
                properties,
            });
        }

        for _ in 0..attempts / 5 {
            let (a, b) = fake.distinct_pair(customers.len());
            let (referrer, referee) = (&customers[a], &customers[b]);
            let referrer_since = or_default_date(&referrer.member_since);
            let referee_since = or_default_date(&referee.member_since);
            if referrer_since >= referee_since {
                continue;
            }
            let properties = Record::new()
                .with("referral_date", referee_since)
                .with("referral_bonus", *fake.pick(REFERRAL_BONUSES))
                .with(
                    "campaign_id",
                    format!(
                        "CAMP-{}-{:02}",
                        fake.int_range(2020, 2024),
                        fake.int_range(1, 12)
                    ),
                );
            edges.push(Relationship {
                relationship_id: ids.next(RelationshipKind::ReferredBy),
                kind: RelationshipKind::ReferredBy,
                source_id: referee.customer_id.clone(),
                target_id: referrer.customer_id.clone(),
                status: "Completed",
                properties,
            });
        }
        edges
    }

    /// EMPLOYED_BY: a bounded sample of individuals, each with one corporate employer
    pub fn employment(&self, fake: &mut FakeData, customers: &[CustomerRow]) -> Vec<Relationship> {
        let individuals: Vec<&CustomerRow> = customers
            .iter()
            .filter(|c| c.kind() == Some(CustomerKind::Individual))
            .collect();
        let corporates: Vec<&CustomerRow> = customers
            .iter()
            .filter(|c| c.kind() == Some(CustomerKind::Corporate))
            .collect();
        if individuals.is_empty() || corporates.is_empty() {
            return Vec::new();
        }

        let employed = (individuals.len() / 10).min(corporates.len() * 50);
        let mut ids = IdSequence::new();
        let mut edges = Vec::with_capacity(employed);

        for idx in fake.sample_indices(individuals.len(), employed) {
            let employer = *fake.pick(&corporates);
            let properties = Record::new()
                .with("position", *fake.pick(POSITIONS))
                .with("department", *fake.pick(DEPARTMENTS))
                .with("start_date", fake.date_before(self.as_of, 30, 3650))
                .with(
                    "is_active",
                    fake.bool_with_probability(EMPLOYMENT_ACTIVE_PROBABILITY),
                );
            edges.push(Relationship {
                relationship_id: ids.next(RelationshipKind::EmployedBy),
                kind: RelationshipKind::EmployedBy,
                source_id: individuals[idx].customer_id.clone(),
                target_id: employer.customer_id.clone(),
                status: "Active",
                properties,
            });
        }
        edges
    }

    /// AUTHORIZED_USER: another customer attached to some credit card accounts
    pub fn authorized_users(
        &self,
        fake: &mut FakeData,
        customers: &[CustomerRow],
        accounts_by_customer: &AHashMap<&str, Vec<&AccountRow>>,
    ) -> Vec<Relationship> {
        let mut ids = IdSequence::new();
        let mut edges = Vec::new();

        for (owner_idx, customer) in customers.iter().enumerate() {
            let Some(accounts) = accounts_by_customer.get(customer.customer_id.as_str()) else {
                continue;
            };
            for account in accounts {
                if account.kind() != Some(AccountType::CreditCard)
                    || !fake.bool_with_probability(AUTHORIZED_USER_PROBABILITY)
                    || customers.len() < 2
                {
                    continue;
                }
                let user = &customers[fake.index_excluding(customers.len(), owner_idx)];
                let properties = Record::new()
                    .with("authorization_level", *fake.pick(AUTHORIZATION_LEVELS))
                    .with("start_date", or_default_date(&account.open_date))
                    .with("spending_limit", *fake.pick(SPENDING_LIMITS));
                edges.push(Relationship {
                    relationship_id: ids.next(RelationshipKind::AuthorizedUser),
                    kind: RelationshipKind::AuthorizedUser,
                    source_id: user.customer_id.clone(),
                    target_id: account.account_id.clone(),
                    status: "Active",
                    properties,
                });
            }
        }
        edges
    }
}

/// Accounts keyed by owning customer, each list in file order
pub fn group_accounts(accounts: &[AccountRow]) -> AHashMap<&str, Vec<&AccountRow>> {
    let mut grouped: AHashMap<&str, Vec<&AccountRow>> = AHashMap::new();
    for account in accounts {
        grouped
            .entry(account.customer_id.as_str())
            .or_default()
            .push(account);
    }
    grouped
}

fn or_default_date(value: &str) -> &str {
    if value.is_empty() {
        DEFAULT_START_DATE
    } else {
        value
    }
}
