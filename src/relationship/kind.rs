//! Relationship kinds and the entity types they connect.

use std::fmt;

/// Entity type at either end of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Customer,
    Account,
    Branch,
    Transaction,
    Employee,
}

impl EntityType {
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Customer => "Customer",
            EntityType::Account => "Account",
            EntityType::Branch => "Branch",
            EntityType::Transaction => "Transaction",
            EntityType::Employee => "Employee",
        }
    }
}

/// Typed, directed relationship between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Owns,
    BanksAt,
    HasTransaction,
    TransferTo,
    Knows,
    ReferredBy,
    AuthorizedUser,
    EmployedBy,
    ManagedBy,
    WorksAt,
    GuarantorFor,
    BeneficiaryOf,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 12] = [
        RelationshipKind::Owns,
        RelationshipKind::BanksAt,
        RelationshipKind::HasTransaction,
        RelationshipKind::TransferTo,
        RelationshipKind::Knows,
        RelationshipKind::ReferredBy,
        RelationshipKind::AuthorizedUser,
        RelationshipKind::EmployedBy,
        RelationshipKind::ManagedBy,
        RelationshipKind::WorksAt,
        RelationshipKind::GuarantorFor,
        RelationshipKind::BeneficiaryOf,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RelationshipKind::Owns => "OWNS",
            RelationshipKind::BanksAt => "BANKS_AT",
            RelationshipKind::HasTransaction => "HAS_TRANSACTION",
            RelationshipKind::TransferTo => "TRANSFER_TO",
            RelationshipKind::Knows => "KNOWS",
            RelationshipKind::ReferredBy => "REFERRED_BY",
            RelationshipKind::AuthorizedUser => "AUTHORIZED_USER",
            RelationshipKind::EmployedBy => "EMPLOYED_BY",
            RelationshipKind::ManagedBy => "MANAGED_BY",
            RelationshipKind::WorksAt => "WORKS_AT",
            RelationshipKind::GuarantorFor => "GUARANTOR_FOR",
            RelationshipKind::BeneficiaryOf => "BENEFICIARY_OF",
        }
    }

    /// Three-letter code embedded in relationship identifiers
    pub fn id_code(&self) -> &'static str {
        match self {
            RelationshipKind::Owns => "OWN",
            RelationshipKind::BanksAt => "BNK",
            RelationshipKind::HasTransaction => "HTX",
            RelationshipKind::TransferTo => "TRF",
            RelationshipKind::Knows => "KNW",
            RelationshipKind::ReferredBy => "REF",
            RelationshipKind::AuthorizedUser => "AUT",
            RelationshipKind::EmployedBy => "EMP",
            RelationshipKind::ManagedBy => "MGR",
            RelationshipKind::WorksAt => "WRK",
            RelationshipKind::GuarantorFor => "GUA",
            RelationshipKind::BeneficiaryOf => "BEN",
        }
    }

    pub fn source(&self) -> EntityType {
        match self {
            RelationshipKind::HasTransaction | RelationshipKind::TransferTo => EntityType::Account,
            RelationshipKind::WorksAt => EntityType::Employee,
            _ => EntityType::Customer,
        }
    }

    pub fn target(&self) -> EntityType {
        match self {
            RelationshipKind::Owns
            | RelationshipKind::TransferTo
            | RelationshipKind::AuthorizedUser
            | RelationshipKind::GuarantorFor
            | RelationshipKind::BeneficiaryOf => EntityType::Account,
            RelationshipKind::BanksAt | RelationshipKind::WorksAt => EntityType::Branch,
            RelationshipKind::HasTransaction => EntityType::Transaction,
            RelationshipKind::Knows
            | RelationshipKind::ReferredBy
            | RelationshipKind::EmployedBy => EntityType::Customer,
            RelationshipKind::ManagedBy => EntityType::Employee,
        }
    }

    /// Kind-specific property columns
    pub fn properties(&self) -> &'static [&'static str] {
        match self {
            RelationshipKind::Owns => &[
                "ownership_type",
                "ownership_percentage",
                "start_date",
                "is_primary",
            ],
            RelationshipKind::BanksAt => {
                &["relationship_category", "start_date", "is_primary_branch"]
            }
            RelationshipKind::HasTransaction => &[],
            RelationshipKind::TransferTo => &[
                "frequency",
                "total_amount",
                "first_transfer_date",
                "last_transfer_date",
            ],
            RelationshipKind::Knows => &["relationship_category", "since", "strength"],
            RelationshipKind::ReferredBy => &["referral_date", "referral_bonus", "campaign_id"],
            RelationshipKind::AuthorizedUser => {
                &["authorization_level", "start_date", "spending_limit"]
            }
            RelationshipKind::EmployedBy => &["position", "department", "start_date", "is_active"],
            RelationshipKind::ManagedBy => &["assignment_date", "relationship_tier"],
            RelationshipKind::WorksAt => &["position", "department", "start_date", "is_manager"],
            RelationshipKind::GuarantorFor => &["guarantee_amount", "guarantee_date"],
            RelationshipKind::BeneficiaryOf => &["beneficiary_type", "percentage", "designation_date"],
        }
    }

    /// Whether the generator emits edges of this kind
    pub fn is_generated(&self) -> bool {
        !matches!(
            self,
            RelationshipKind::HasTransaction
                | RelationshipKind::ManagedBy
                | RelationshipKind::WorksAt
                | RelationshipKind::GuarantorFor
                | RelationshipKind::BeneficiaryOf
        )
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    #[test]
    fn test_codes_unique() {
        let codes: AHashSet<&str> = RelationshipKind::ALL.iter().map(|k| k.id_code()).collect();
        assert_eq!(codes.len(), 12);
    }

    #[test]
    fn test_generated_kinds() {
        let generated: Vec<_> = RelationshipKind::ALL
            .iter()
            .filter(|k| k.is_generated())
            .map(|k| k.label())
            .collect();
        assert_eq!(
            generated,
            vec![
                "OWNS",
                "BANKS_AT",
                "TRANSFER_TO",
                "KNOWS",
                "REFERRED_BY",
                "AUTHORIZED_USER",
                "EMPLOYED_BY"
            ]
        );
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(RelationshipKind::Owns.source(), EntityType::Customer);
        assert_eq!(RelationshipKind::Owns.target(), EntityType::Account);
        assert_eq!(RelationshipKind::TransferTo.source(), EntityType::Account);
        assert_eq!(RelationshipKind::EmployedBy.target(), EntityType::Customer);
        assert_eq!(RelationshipKind::WorksAt.source(), EntityType::Employee);
    }
}
