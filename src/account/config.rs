//! Account type configuration table.

/// Product category of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Checking,
    Savings,
    Cd,
    CreditCard,
    Mortgage,
    AutoLoan,
    PersonalLoan,
    Investment,
}

/// Static configuration for one account type
#[derive(Debug, Clone, Copy)]
pub struct AccountTypeConfig {
    pub subtypes: &'static [&'static str],
    pub min_balance: f64,
    pub max_balance: f64,
    pub interest_rate: (f64, f64),
    /// Relative weight when the type is drawn without a variant constraint
    pub weight: f64,
    /// Leading digit of the account number
    pub number_prefix: char,
}

impl AccountType {
    pub const ALL: [AccountType; 8] = [
        AccountType::Checking,
        AccountType::Savings,
        AccountType::Cd,
        AccountType::CreditCard,
        AccountType::Mortgage,
        AccountType::AutoLoan,
        AccountType::PersonalLoan,
        AccountType::Investment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Checking => "Checking",
            AccountType::Savings => "Savings",
            AccountType::Cd => "CD",
            AccountType::CreditCard => "CreditCard",
            AccountType::Mortgage => "Mortgage",
            AccountType::AutoLoan => "AutoLoan",
            AccountType::PersonalLoan => "PersonalLoan",
            AccountType::Investment => "Investment",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn is_loan(&self) -> bool {
        matches!(
            self,
            AccountType::Mortgage | AccountType::AutoLoan | AccountType::PersonalLoan
        )
    }

    /// `(type, weight)` pairs for weighted choice
    pub fn weights() -> [(AccountType, f64); 8] {
        Self::ALL.map(|t| (t, t.config().weight))
    }

    pub fn config(&self) -> AccountTypeConfig {
        match self {
            AccountType::Checking => AccountTypeConfig {
                subtypes: &[
                    "Personal Checking",
                    "Business Checking",
                    "Student Checking",
                    "Premium Checking",
                ],
                min_balance: 0.0,
                max_balance: 50_000.0,
                interest_rate: (0.0, 0.01),
                weight: 0.35,
                number_prefix: '1',
            },
            AccountType::Savings => AccountTypeConfig {
                subtypes: &[
                    "Regular Savings",
                    "High-Yield Savings",
                    "Money Market",
                    "Youth Savings",
                ],
                min_balance: 0.0,
                max_balance: 250_000.0,
                interest_rate: (0.01, 0.05),
                weight: 0.25,
                number_prefix: '2',
            },
            AccountType::Cd => AccountTypeConfig {
                subtypes: &["6-Month CD", "12-Month CD", "24-Month CD", "60-Month CD"],
                min_balance: 1000.0,
                max_balance: 500_000.0,
                interest_rate: (0.03, 0.055),
                weight: 0.08,
                number_prefix: '3',
            },
            AccountType::CreditCard => AccountTypeConfig {
                subtypes: &[
                    "Standard Card",
                    "Rewards Card",
                    "Premium Card",
                    "Secured Card",
                    "Business Card",
                ],
                min_balance: -50_000.0,
                max_balance: 0.0,
                interest_rate: (0.15, 0.27),
                weight: 0.15,
                number_prefix: '4',
            },
            AccountType::Mortgage => AccountTypeConfig {
                subtypes: &[
                    "30-Year Fixed",
                    "15-Year Fixed",
                    "ARM 5/1",
                    "ARM 7/1",
                    "Jumbo Loan",
                ],
                min_balance: 50_000.0,
                max_balance: 2_000_000.0,
                interest_rate: (0.055, 0.08),
                weight: 0.07,
                number_prefix: '5',
            },
            AccountType::AutoLoan => AccountTypeConfig {
                subtypes: &["New Auto Loan", "Used Auto Loan", "Auto Refinance"],
                min_balance: 5000.0,
                max_balance: 100_000.0,
                interest_rate: (0.045, 0.12),
                weight: 0.05,
                number_prefix: '6',
            },
            AccountType::PersonalLoan => AccountTypeConfig {
                subtypes: &[
                    "Unsecured Personal",
                    "Secured Personal",
                    "Debt Consolidation",
                    "Home Improvement",
                ],
                min_balance: 1000.0,
                max_balance: 50_000.0,
                interest_rate: (0.06, 0.25),
                weight: 0.03,
                number_prefix: '7',
            },
            AccountType::Investment => AccountTypeConfig {
                subtypes: &[
                    "Brokerage",
                    "IRA Traditional",
                    "IRA Roth",
                    "401k Rollover",
                    "Trust Account",
                ],
                min_balance: 0.0,
                max_balance: 5_000_000.0,
                interest_rate: (0.0, 0.0),
                weight: 0.02,
                number_prefix: '8',
            },
        }
    }
}

pub const ACCOUNT_STATUS: &[(&str, f64)] = &[
    ("Active", 0.88),
    ("Dormant", 0.05),
    ("Closed", 0.03),
    ("Frozen", 0.02),
    ("Pending", 0.02),
];

pub const CURRENCIES: &[(&str, f64)] = &[
    ("USD", 0.95),
    ("EUR", 0.02),
    ("GBP", 0.01),
    ("CAD", 0.01),
    ("MXN", 0.01),
];

pub const CHECKING_MONTHLY_FEES: &[i64] = &[0, 0, 0, 12, 25];
pub const OVERDRAFT_LIMITS: &[i64] = &[0, 500, 1000, 2500];
pub const SAVINGS_MONTHLY_FEES: &[i64] = &[0, 0, 5, 10];
pub const SAVINGS_MIN_BALANCE: &[i64] = &[0, 100, 500, 1000];
/// Monthly withdrawal cap on savings products
pub const SAVINGS_WITHDRAWAL_LIMIT: i64 = 6;
pub const CD_DENOMINATIONS: &[f64] = &[
    1000.0, 5000.0, 10_000.0, 25_000.0, 50_000.0, 100_000.0, 250_000.0,
];
pub const CD_EARLY_WITHDRAWAL_PENALTY: f64 = 0.10;
pub const CREDIT_LIMITS: &[f64] = &[1000.0, 5000.0, 10_000.0, 25_000.0, 50_000.0, 100_000.0];
pub const CARD_ANNUAL_FEES: &[i64] = &[0, 0, 0, 95, 250, 550];
pub const REWARDS_PROGRAMS: &[&str] = &["None", "CashBack", "Points", "Miles"];
pub const MORTGAGE_TERMS_MONTHS: &[i64] = &[180, 360];
pub const AUTO_LOAN_TERMS_MONTHS: &[i64] = &[36, 48, 60, 72, 84];
pub const PERSONAL_LOAN_TERMS_MONTHS: &[i64] = &[12, 24, 36, 48, 60];
pub const VEHICLE_MAKES: &[&str] = &["Toyota", "Honda", "Ford", "BMW", "Mercedes"];
pub const VEHICLE_BODIES: &[&str] = &["Sedan", "SUV", "Truck"];

/// Term of a certificate, read from its subtype
pub fn cd_term_months(subtype: &str) -> i64 {
    match subtype {
        "6-Month CD" => 6,
        "24-Month CD" => 24,
        "60-Month CD" => 60,
        _ => 12,
    }
}

/// Rate bonus for longer certificate terms
pub fn cd_term_bonus(subtype: &str) -> f64 {
    match subtype {
        "12-Month CD" => 0.005,
        "24-Month CD" => 0.01,
        "60-Month CD" => 0.015,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = AccountType::weights().iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_label_round_trip() {
        for t in AccountType::ALL {
            assert_eq!(AccountType::from_label(t.label()), Some(t));
        }
        assert_eq!(AccountType::from_label("Brokerage"), None);
    }

    #[test]
    fn test_ranges_are_ordered() {
        for t in AccountType::ALL {
            let c = t.config();
            assert!(c.min_balance <= c.max_balance, "{}", t.label());
            assert!(c.interest_rate.0 <= c.interest_rate.1);
            assert!(!c.subtypes.is_empty());
        }
    }
}
