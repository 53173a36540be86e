//! Account generation.
//!
//! Accounts are generated per customer read back from `customers.tsv`,
//! each assigned to one branch from `branches.tsv`. Type-specific fields
//! live in [`AccountDetails`] and only appear in the output for the
//! matching account type.

pub mod config;

pub use config::{AccountType, AccountTypeConfig};

use crate::customer::{CustomerKind, CustomerRow};
use crate::fake::{round_to, FakeData};
use crate::record::{FieldValue, Record, ToRecord};
use chrono::{Duration, NaiveDate};
use config::*;
use serde::Deserialize;

/// Account types a corporate customer draws from (uniformly, so Checking is doubled)
const CORPORATE_TYPES: &[AccountType] = &[
    AccountType::Checking,
    AccountType::Checking,
    AccountType::CreditCard,
    AccountType::Savings,
];

const HIGH_NET_WORTH_TYPES: &[AccountType] = &[
    AccountType::Checking,
    AccountType::Savings,
    AccountType::Investment,
    AccountType::CreditCard,
    AccountType::Cd,
];

/// Upper bound on accounts held by an individual customer
pub const MAX_INDIVIDUAL_ACCOUNTS: usize = 6;

/// Fields that only exist for one family of account types
#[derive(Debug, Clone)]
pub enum AccountDetails {
    Checking {
        overdraft_limit: i64,
        monthly_fee: i64,
        debit_card_number: String,
    },
    Savings {
        monthly_fee: i64,
        withdrawal_limit: i64,
        min_balance_required: i64,
    },
    Cd {
        term_months: i64,
        maturity_date: NaiveDate,
        early_withdrawal_penalty: f64,
        auto_renew: bool,
    },
    CreditCard {
        credit_limit: f64,
        available_credit: f64,
        annual_fee: i64,
        minimum_payment: f64,
        payment_due_day: i64,
        rewards_program: &'static str,
        card_number_last4: i64,
    },
    Loan {
        original_balance: f64,
        term_months: i64,
        monthly_payment: f64,
        next_payment_date: NaiveDate,
        collateral: String,
        escrow_balance: f64,
    },
    Investment {
        portfolio_value: f64,
        cost_basis: f64,
        ytd_return_pct: f64,
        advisor_id: Option<String>,
        margin_enabled: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: String,
    pub account_number: String,
    pub routing_number: String,
    pub customer_id: String,
    pub branch_id: String,
    pub account_type: AccountType,
    pub subtype: &'static str,
    pub status: &'static str,
    pub currency: &'static str,
    pub balance: f64,
    pub available_balance: f64,
    pub interest_rate: f64,
    pub open_date: NaiveDate,
    pub last_activity_date: NaiveDate,
    pub details: AccountDetails,
}

impl ToRecord for Account {
    fn to_record(&self) -> Record {
        let mut r = Record::with_capacity(24);
        r.set("account_id", &self.account_id);
        r.set("account_number", &self.account_number);
        r.set("routing_number", &self.routing_number);
        r.set("customer_id", &self.customer_id);
        r.set("branch_id", &self.branch_id);
        r.set("account_type", self.account_type.label());
        r.set("account_subtype", self.subtype);
        r.set("status", self.status);
        r.set("currency", self.currency);
        r.set("balance", self.balance);
        r.set("available_balance", self.available_balance);
        r.set("interest_rate", FieldValue::decimal(self.interest_rate, 4));
        r.set("open_date", self.open_date);
        r.set("last_activity_date", self.last_activity_date);

        match &self.details {
            AccountDetails::Checking {
                overdraft_limit,
                monthly_fee,
                debit_card_number,
            } => {
                r.set("overdraft_limit", *overdraft_limit);
                r.set("monthly_fee", *monthly_fee);
                r.set("debit_card_number", debit_card_number);
            }
            AccountDetails::Savings {
                monthly_fee,
                withdrawal_limit,
                min_balance_required,
            } => {
                r.set("monthly_fee", *monthly_fee);
                r.set("withdrawal_limit", *withdrawal_limit);
                r.set("min_balance_required", *min_balance_required);
            }
            AccountDetails::Cd {
                term_months,
                maturity_date,
                early_withdrawal_penalty,
                auto_renew,
            } => {
                r.set("term_months", *term_months);
                r.set("maturity_date", *maturity_date);
                r.set(
                    "early_withdrawal_penalty",
                    FieldValue::decimal(*early_withdrawal_penalty, 2),
                );
                r.set("auto_renew", *auto_renew);
            }
            AccountDetails::CreditCard {
                credit_limit,
                available_credit,
                annual_fee,
                minimum_payment,
                payment_due_day,
                rewards_program,
                card_number_last4,
            } => {
                r.set("credit_limit", *credit_limit);
                r.set("available_credit", *available_credit);
                r.set("annual_fee", *annual_fee);
                r.set("minimum_payment", *minimum_payment);
                r.set("payment_due_date", *payment_due_day);
                r.set("rewards_program", *rewards_program);
                r.set("card_number_last4", *card_number_last4);
            }
            AccountDetails::Loan {
                original_balance,
                term_months,
                monthly_payment,
                next_payment_date,
                collateral,
                escrow_balance,
            } => {
                r.set("original_balance", *original_balance);
                r.set("term_months", *term_months);
                r.set("monthly_payment", *monthly_payment);
                r.set("next_payment_date", *next_payment_date);
                r.set("collateral", collateral);
                r.set("escrow_balance", *escrow_balance);
            }
            AccountDetails::Investment {
                portfolio_value,
                cost_basis,
                ytd_return_pct,
                advisor_id,
                margin_enabled,
            } => {
                r.set("portfolio_value", *portfolio_value);
                r.set("cost_basis", *cost_basis);
                r.set("ytd_return_pct", FieldValue::decimal(*ytd_return_pct, 4));
                r.set("advisor_id", advisor_id.clone());
                r.set("margin_enabled", *margin_enabled);
            }
        }
        r
    }
}

/// Account columns as read back by later stages
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRow {
    #[serde(deserialize_with = "crate::tsv::required")]
    pub account_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub branch_id: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub open_date: String,
}

impl AccountRow {
    pub fn kind(&self) -> Option<AccountType> {
        AccountType::from_label(&self.account_type)
    }

    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }
}

/// Stand-in customers used when no customer file can be read
pub fn placeholder_customers() -> Vec<CustomerRow> {
    (1..=1000)
        .map(|i| CustomerRow {
            customer_id: format!("CUST-{:08}", i),
            customer_type: CustomerKind::Individual.label().to_string(),
            city: String::new(),
            member_since: String::new(),
        })
        .collect()
}

/// Stand-in branch list used when no branch file can be read
pub fn placeholder_branches() -> Vec<String> {
    vec!["BR-00001".to_string()]
}

/// Fixed-payment annuity; straight-line when rate or term is zero
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: i64) -> f64 {
    if annual_rate == 0.0 || term_months == 0 {
        return round_to(principal / term_months.max(1) as f64, 2);
    }
    let r = annual_rate / 12.0;
    let growth = (1.0 + r).powi(term_months as i32);
    round_to(principal * r * growth / (growth - 1.0), 2)
}

/// Nine-digit routing number with a valid ABA checksum.
///
/// Starts with a Federal Reserve district (01-12), but does not identify a
/// real institution.
pub fn routing_number(fake: &mut FakeData) -> String {
    let district = fake.int_range(1, 12);
    let body = fake.digits(6);

    let mut digits: Vec<u32> = format!("{:02}{}", district, body)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    let weighted: u32 = digits
        .iter()
        .zip([3, 7, 1, 3, 7, 1, 3, 7])
        .map(|(d, w)| d * w)
        .sum();
    digits.push((10 - weighted % 10) % 10);

    digits
        .into_iter()
        .filter_map(|d| char::from_digit(d, 10))
        .collect()
}

/// Generates accounts for an existing customer base
pub struct AccountGenerator {
    avg_accounts_per_customer: f64,
    as_of: NaiveDate,
}

impl AccountGenerator {
    pub fn new(avg_accounts_per_customer: f64, as_of: NaiveDate) -> Self {
        Self {
            avg_accounts_per_customer,
            as_of,
        }
    }

    pub fn generate(
        &self,
        fake: &mut FakeData,
        customers: &[CustomerRow],
        branches: &[String],
    ) -> Vec<Account> {
        let mut accounts = Vec::new();
        let mut sequence = 1usize;

        for customer in customers {
            let branch_id = fake.pick(branches).clone();

            let (count, allowed) = match customer.kind() {
                Some(CustomerKind::Corporate) => (fake.int_range(2, 8) as usize, Some(CORPORATE_TYPES)),
                Some(CustomerKind::HighNetWorth) => {
                    (fake.int_range(3, 10) as usize, Some(HIGH_NET_WORTH_TYPES))
                }
                _ => (self.individual_account_count(fake), None),
            };

            for _ in 0..count {
                let account_type = match allowed {
                    Some(types) => *fake.pick(types),
                    None => *fake.weighted(&AccountType::weights()),
                };
                accounts.push(self.account(
                    fake,
                    sequence,
                    &customer.customer_id,
                    &branch_id,
                    account_type,
                ));
                sequence += 1;
            }
        }

        accounts
    }

    fn individual_account_count(&self, fake: &mut FakeData) -> usize {
        let drawn = fake.exponential(self.avg_accounts_per_customer) as usize;
        drawn.clamp(1, MAX_INDIVIDUAL_ACCOUNTS)
    }

    /// Generate one account of the given type
    pub fn account(
        &self,
        fake: &mut FakeData,
        sequence: usize,
        customer_id: &str,
        branch_id: &str,
        account_type: AccountType,
    ) -> Account {
        let config = account_type.config();
        let subtype = *fake.pick(config.subtypes);

        let account_number = format!(
            "{}{}{:08}",
            config.number_prefix,
            fake.int_range(100, 999),
            sequence
        );
        let open_date = fake.date_before(self.as_of, 1, 15 * 365);

        // credit limit and loan principal feed the balance as well as the details
        let credit_limit = match account_type {
            AccountType::CreditCard => Some(*fake.pick(CREDIT_LIMITS)),
            _ => None,
        };
        let (balance, principal) = balance(fake, account_type, &config, credit_limit);
        let interest_rate = interest_rate(fake, account_type, &config, subtype);
        let status = *fake.weighted(ACCOUNT_STATUS);
        let currency = *fake.weighted(CURRENCIES);
        let last_activity_date = fake.date_before(self.as_of, 0, 90).max(open_date);
        let routing_number = routing_number(fake);

        let details = match account_type {
            AccountType::Checking => AccountDetails::Checking {
                overdraft_limit: *fake.pick(OVERDRAFT_LIMITS),
                monthly_fee: *fake.pick(CHECKING_MONTHLY_FEES),
                debit_card_number: format!("4{}", fake.digits(15)),
            },
            AccountType::Savings => AccountDetails::Savings {
                monthly_fee: *fake.pick(SAVINGS_MONTHLY_FEES),
                withdrawal_limit: SAVINGS_WITHDRAWAL_LIMIT,
                min_balance_required: *fake.pick(SAVINGS_MIN_BALANCE),
            },
            AccountType::Cd => {
                let term_months = cd_term_months(subtype);
                AccountDetails::Cd {
                    term_months,
                    maturity_date: open_date + Duration::days(term_months * 30),
                    early_withdrawal_penalty: CD_EARLY_WITHDRAWAL_PENALTY,
                    auto_renew: fake.yes_no(),
                }
            }
            AccountType::CreditCard => {
                let credit_limit = credit_limit.unwrap_or(CREDIT_LIMITS[0]);
                AccountDetails::CreditCard {
                    credit_limit,
                    available_credit: round_to(credit_limit + balance, 2),
                    annual_fee: *fake.pick(CARD_ANNUAL_FEES),
                    minimum_payment: round_to((balance.abs() * 0.02).max(25.0), 2),
                    payment_due_day: fake.int_range(1, 28),
                    rewards_program: *fake.pick(REWARDS_PROGRAMS),
                    card_number_last4: fake.int_range(1000, 9999),
                }
            }
            AccountType::Mortgage | AccountType::AutoLoan | AccountType::PersonalLoan => {
                let (term_months, collateral) = match account_type {
                    AccountType::Mortgage => {
                        (*fake.pick(MORTGAGE_TERMS_MONTHS), "Real Property".to_string())
                    }
                    AccountType::AutoLoan => {
                        let term = *fake.pick(AUTO_LOAN_TERMS_MONTHS);
                        let year = fake.int_range(2018, 2024);
                        let make = fake.pick(VEHICLE_MAKES);
                        let body = fake.pick(VEHICLE_BODIES);
                        (term, format!("{} {} {}", year, make, body))
                    }
                    _ => {
                        let term = *fake.pick(PERSONAL_LOAN_TERMS_MONTHS);
                        let collateral = if subtype.contains("Unsecured") {
                            "None"
                        } else {
                            "Various"
                        };
                        (term, collateral.to_string())
                    }
                };
                let original_balance = round_to(principal.unwrap_or(balance), 2);
                AccountDetails::Loan {
                    original_balance,
                    term_months,
                    monthly_payment: monthly_payment(original_balance, interest_rate, term_months),
                    next_payment_date: fake.date_after(self.as_of, 1, 30),
                    collateral,
                    escrow_balance: if account_type == AccountType::Mortgage {
                        round_to(fake.float_range(0.0, 5000.0), 2)
                    } else {
                        0.0
                    },
                }
            }
            AccountType::Investment => AccountDetails::Investment {
                portfolio_value: balance,
                cost_basis: round_to(balance * fake.float_range(0.7, 1.1), 2),
                ytd_return_pct: round_to(fake.float_range(-0.15, 0.25), 4),
                advisor_id: if fake.bool_with_probability(0.3) {
                    Some(format!("ADV-{}", fake.int_range(1000, 9999)))
                } else {
                    None
                },
                margin_enabled: fake.yes_no(),
            },
        };

        let available_balance = match &details {
            AccountDetails::CreditCard {
                available_credit, ..
            } => *available_credit,
            _ => balance,
        };

        Account {
            account_id: format!("ACC-{:010}", sequence),
            account_number,
            routing_number,
            customer_id: customer_id.to_string(),
            branch_id: branch_id.to_string(),
            account_type,
            subtype,
            status,
            currency,
            balance,
            available_balance,
            interest_rate,
            open_date,
            last_activity_date,
            details,
        }
    }
}

/// Type-specific balance, clamped to the type's range.
///
/// Loans also return the original principal the balance was derived from.
fn balance(
    fake: &mut FakeData,
    account_type: AccountType,
    config: &AccountTypeConfig,
    credit_limit: Option<f64>,
) -> (f64, Option<f64>) {
    let (min, max) = (config.min_balance, config.max_balance);

    let (raw, principal) = match account_type {
        AccountType::CreditCard => {
            let limit = credit_limit.unwrap_or(CREDIT_LIMITS[0]);
            if fake.bool_with_probability(0.3) {
                (0.0, None)
            } else {
                (-limit * fake.float_range(0.1, 0.7), None)
            }
        }
        t if t.is_loan() => {
            let principal = fake.float_range(min, max);
            (principal * fake.float_range(0.2, 0.95), Some(principal))
        }
        AccountType::Cd => {
            let admissible: Vec<f64> = CD_DENOMINATIONS
                .iter()
                .copied()
                .filter(|d| (min..=max).contains(d))
                .collect();
            (*fake.pick(&admissible), None)
        }
        AccountType::Investment => {
            let amount = if fake.bool_with_probability(0.3) {
                fake.float_range(0.0, 10_000.0)
            } else if fake.bool_with_probability(0.6) {
                fake.float_range(10_000.0, 100_000.0)
            } else {
                fake.float_range(100_000.0, max)
            };
            (amount, None)
        }
        _ => (fake.lognormal(8.0, 1.5), None),
    };

    (round_to(raw.clamp(min, max), 2), principal)
}

fn interest_rate(
    fake: &mut FakeData,
    account_type: AccountType,
    config: &AccountTypeConfig,
    subtype: &str,
) -> f64 {
    let (lo, hi) = config.interest_rate;
    let rate = match account_type {
        AccountType::Cd => fake.float_range(lo, hi) + cd_term_bonus(subtype),
        AccountType::Savings if subtype.contains("High-Yield") => fake.float_range(0.04, 0.05),
        AccountType::Savings if subtype.contains("Money Market") => fake.float_range(0.03, 0.045),
        AccountType::Savings => fake.float_range(0.001, 0.02),
        AccountType::CreditCard if subtype.contains("Secured") => fake.float_range(0.18, 0.24),
        AccountType::CreditCard if subtype.contains("Premium") => fake.float_range(0.15, 0.20),
        _ => fake.float_range(lo, hi),
    };
    round_to(rate, 4)
}
