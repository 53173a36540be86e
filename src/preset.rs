//! Dataset size presets and YAML overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Generation size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    /// Quick test (~100 customers, ~1K transactions)
    Tiny,
    /// Demo/development (~500 customers, ~25K transactions)
    Small,
    /// Testing (~2,500 customers, ~300K transactions)
    Medium,
    /// Performance testing (~10K customers, ~2M transactions)
    Large,
    /// Full scale (~50K customers, ~15M transactions)
    Enterprise,
}

impl SizePreset {
    pub const ALL: [SizePreset; 5] = [
        SizePreset::Tiny,
        SizePreset::Small,
        SizePreset::Medium,
        SizePreset::Large,
        SizePreset::Enterprise,
    ];

    pub fn config(&self) -> SizeConfig {
        match self {
            SizePreset::Tiny => SizeConfig {
                branches: 10,
                individual_customers: 100,
                corporate_customers: 10,
                hnw_customers: 5,
                avg_accounts_per_customer: 1.5,
                avg_transactions_per_account: 10.0,
                transaction_days: 30,
            },
            SizePreset::Small => SizeConfig {
                branches: 25,
                individual_customers: 500,
                corporate_customers: 50,
                hnw_customers: 25,
                avg_accounts_per_customer: 2.0,
                avg_transactions_per_account: 25.0,
                transaction_days: 90,
            },
            SizePreset::Medium => SizeConfig {
                branches: 75,
                individual_customers: 2500,
                corporate_customers: 250,
                hnw_customers: 100,
                avg_accounts_per_customer: 2.5,
                avg_transactions_per_account: 50.0,
                transaction_days: 180,
            },
            SizePreset::Large => SizeConfig {
                branches: 150,
                individual_customers: 10_000,
                corporate_customers: 1000,
                hnw_customers: 500,
                avg_accounts_per_customer: 3.0,
                avg_transactions_per_account: 75.0,
                transaction_days: 365,
            },
            SizePreset::Enterprise => SizeConfig {
                branches: 500,
                individual_customers: 50_000,
                corporate_customers: 5000,
                hnw_customers: 2000,
                avg_accounts_per_customer: 3.5,
                avg_transactions_per_account: 100.0,
                transaction_days: 730,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SizePreset::Tiny => "tiny",
            SizePreset::Small => "small",
            SizePreset::Medium => "medium",
            SizePreset::Large => "large",
            SizePreset::Enterprise => "enterprise",
        }
    }
}

impl std::str::FromStr for SizePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" | "t" => Ok(SizePreset::Tiny),
            "small" | "s" => Ok(SizePreset::Small),
            "medium" | "m" => Ok(SizePreset::Medium),
            "large" | "l" => Ok(SizePreset::Large),
            "enterprise" | "e" => Ok(SizePreset::Enterprise),
            _ => Err(format!(
                "Unknown size: {}. Use tiny, small, medium, large, or enterprise",
                s
            )),
        }
    }
}

impl std::fmt::Display for SizePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Concrete generation counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeConfig {
    pub branches: usize,
    pub individual_customers: usize,
    pub corporate_customers: usize,
    pub hnw_customers: usize,
    pub avg_accounts_per_customer: f64,
    pub avg_transactions_per_account: f64,
    /// Length of the transaction history window
    pub transaction_days: u32,
}

impl SizeConfig {
    pub fn total_customers(&self) -> usize {
        self.individual_customers + self.corporate_customers + self.hnw_customers
    }
}

/// Partial size settings loaded from YAML; present fields replace the preset's
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOverrides {
    pub branches: Option<usize>,
    pub individual_customers: Option<usize>,
    pub corporate_customers: Option<usize>,
    pub hnw_customers: Option<usize>,
    pub avg_accounts_per_customer: Option<f64>,
    pub avg_transactions_per_account: Option<f64>,
    pub transaction_days: Option<u32>,
}

impl SizeOverrides {
    /// Load overrides from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let overrides: SizeOverrides = serde_yaml_ng::from_str(&content)?;
        Ok(overrides)
    }

    pub fn apply(&self, config: &mut SizeConfig) {
        if let Some(v) = self.branches {
            config.branches = v;
        }
        if let Some(v) = self.individual_customers {
            config.individual_customers = v;
        }
        if let Some(v) = self.corporate_customers {
            config.corporate_customers = v;
        }
        if let Some(v) = self.hnw_customers {
            config.hnw_customers = v;
        }
        if let Some(v) = self.avg_accounts_per_customer {
            config.avg_accounts_per_customer = v;
        }
        if let Some(v) = self.avg_transactions_per_account {
            config.avg_transactions_per_account = v;
        }
        if let Some(v) = self.transaction_days {
            config.transaction_days = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        assert_eq!("tiny".parse::<SizePreset>().unwrap(), SizePreset::Tiny);
        assert_eq!("LARGE".parse::<SizePreset>().unwrap(), SizePreset::Large);
        assert_eq!("e".parse::<SizePreset>().unwrap(), SizePreset::Enterprise);
        assert!("huge".parse::<SizePreset>().is_err());
    }

    #[test]
    fn test_tiny_counts() {
        let config = SizePreset::Tiny.config();
        assert_eq!(config.branches, 10);
        assert_eq!(config.total_customers(), 115);
        assert_eq!(config.transaction_days, 30);
    }

    #[test]
    fn test_presets_grow() {
        let totals: Vec<usize> = SizePreset::ALL
            .iter()
            .map(|p| p.config().total_customers())
            .collect();
        assert!(totals.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
branches: 3
avg_transactions_per_account: 4.5
"#;
        let overrides: SizeOverrides = serde_yaml_ng::from_str(yaml).unwrap();
        let mut config = SizePreset::Small.config();
        overrides.apply(&mut config);
        assert_eq!(config.branches, 3);
        assert_eq!(config.avg_transactions_per_account, 4.5);
        assert_eq!(config.individual_customers, 500);
    }
}
