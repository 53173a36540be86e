//! Customer generation.
//!
//! Three variants share one identifier sequence: retail individuals,
//! corporate customers and high-net-worth individuals. High-net-worth
//! customers start life as an individual and then have their KYC, risk
//! and segment fields refined. The full set is shuffled before output.

use crate::fake::{FakeData, Gender, LAST_NAMES};
use crate::record::{Record, ToRecord};
use chrono::NaiveDate;
use serde::Deserialize;

const CORP_PREFIXES: &[&str] = &[
    "Global", "Advanced", "Premier", "United", "National", "International", "Strategic",
    "Innovative", "Dynamic", "Pacific", "Atlantic", "Continental", "American", "Western",
    "Eastern", "Northern", "Southern", "Central", "Metro",
];

const CORP_CORES: &[&str] = &[
    "Tech", "Systems", "Solutions", "Services", "Industries", "Enterprises", "Holdings",
    "Partners", "Capital", "Ventures", "Group", "Associates", "Consulting", "Manufacturing",
    "Logistics", "Healthcare", "Energy", "Media",
];

const CORP_SUFFIXES: &[&str] = &["Inc", "LLC", "Corp", "Ltd", "Co", "Group", "International"];

const INDUSTRIES: &[(&str, f64)] = &[
    ("Technology", 0.18),
    ("Healthcare", 0.12),
    ("Financial Services", 0.10),
    ("Manufacturing", 0.10),
    ("Retail", 0.09),
    ("Real Estate", 0.08),
    ("Energy", 0.06),
    ("Transportation", 0.05),
    ("Construction", 0.05),
    ("Professional Services", 0.05),
    ("Hospitality", 0.04),
    ("Agriculture", 0.03),
    ("Telecommunications", 0.03),
    ("Education", 0.02),
];

const CONTACT_TITLES: &[&str] = &["CFO", "Controller", "Finance Director", "Treasury Manager", "CEO"];

const NET_WORTH_TIERS: &[&str] = &["Tier1_1M_5M", "Tier2_5M_25M", "Tier3_25M_Plus"];

const PREFERRED_CONTACT: &[&str] = &["email", "phone", "mail"];

/// Residential cities with their zip prefix and relative weight
const CITIES: &[((&str, &str, &str), f64)] = &[
    (("New York", "NY", "100"), 0.12),
    (("Los Angeles", "CA", "900"), 0.08),
    (("Chicago", "IL", "606"), 0.06),
    (("Houston", "TX", "770"), 0.05),
    (("Phoenix", "AZ", "850"), 0.04),
    (("Philadelphia", "PA", "191"), 0.04),
    (("San Antonio", "TX", "782"), 0.03),
    (("San Diego", "CA", "921"), 0.03),
    (("Dallas", "TX", "752"), 0.03),
    (("San Jose", "CA", "951"), 0.03),
    (("Austin", "TX", "787"), 0.03),
    (("Jacksonville", "FL", "322"), 0.02),
    (("Fort Worth", "TX", "761"), 0.02),
    (("Columbus", "OH", "432"), 0.02),
    (("Charlotte", "NC", "282"), 0.02),
    (("San Francisco", "CA", "941"), 0.03),
    (("Indianapolis", "IN", "462"), 0.02),
    (("Seattle", "WA", "981"), 0.03),
    (("Denver", "CO", "802"), 0.02),
    (("Boston", "MA", "021"), 0.03),
    (("Nashville", "TN", "372"), 0.02),
    (("Detroit", "MI", "482"), 0.02),
    (("Portland", "OR", "972"), 0.02),
    (("Miami", "FL", "331"), 0.03),
    (("Atlanta", "GA", "303"), 0.03),
];

const STREET_NAMES: &[&str] = &[
    "Main", "Oak", "Maple", "Cedar", "Pine", "Elm", "Washington", "Park", "Lake", "Hill", "River",
    "Forest", "Sunset", "Highland", "Valley", "Spring", "Church", "Mill", "Center", "Union",
    "Liberty", "Market", "Court", "Bridge",
];

const STREET_TYPES: &[&str] = &["St", "Ave", "Blvd", "Dr", "Ln", "Rd", "Way", "Pl", "Ct"];

const UNIT_TYPES: &[&str] = &["Apt", "Suite", "Unit", "#"];

const PERSONAL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "icloud.com",
    "hotmail.com",
    "aol.com",
];

/// Customer variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerKind {
    Individual,
    Corporate,
    HighNetWorth,
}

impl CustomerKind {
    pub fn label(&self) -> &'static str {
        match self {
            CustomerKind::Individual => "Individual",
            CustomerKind::Corporate => "Corporate",
            CustomerKind::HighNetWorth => "HighNetWorth",
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            CustomerKind::Individual => "CUST",
            CustomerKind::Corporate => "CORP",
            CustomerKind::HighNetWorth => "HNW",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Individual" => Some(CustomerKind::Individual),
            "Corporate" => Some(CustomerKind::Corporate),
            "HighNetWorth" => Some(CustomerKind::HighNetWorth),
            _ => None,
        }
    }
}

/// Know-your-customer verification state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KycStatus {
    Verified,
    Pending,
    PendingReview,
    Rejected,
}

impl KycStatus {
    pub fn label(&self) -> &'static str {
        match self {
            KycStatus::Verified => "Verified",
            KycStatus::Pending => "Pending",
            KycStatus::PendingReview => "PendingReview",
            KycStatus::Rejected => "Rejected",
        }
    }
}

const INDIVIDUAL_KYC: &[(KycStatus, f64)] = &[
    (KycStatus::Verified, 0.85),
    (KycStatus::Pending, 0.08),
    (KycStatus::PendingReview, 0.05),
    (KycStatus::Rejected, 0.02),
];

const CORPORATE_KYC: &[(KycStatus, f64)] = &[
    (KycStatus::Verified, 0.90),
    (KycStatus::Pending, 0.05),
    (KycStatus::PendingReview, 0.04),
    (KycStatus::Rejected, 0.01),
];

const HIGH_NET_WORTH_KYC: &[(KycStatus, f64)] = &[
    (KycStatus::Verified, 0.95),
    (KycStatus::Pending, 0.03),
    (KycStatus::PendingReview, 0.02),
];

/// Corporate size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanySize {
    Small,
    Medium,
    Large,
    Enterprise,
}

impl CompanySize {
    const WEIGHTS: [(CompanySize, f64); 4] = [
        (CompanySize::Small, 0.60),
        (CompanySize::Medium, 0.25),
        (CompanySize::Large, 0.12),
        (CompanySize::Enterprise, 0.03),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CompanySize::Small => "Small",
            CompanySize::Medium => "Medium",
            CompanySize::Large => "Large",
            CompanySize::Enterprise => "Enterprise",
        }
    }

    pub fn employee_range(&self) -> (i64, i64) {
        match self {
            CompanySize::Small => (1, 50),
            CompanySize::Medium => (51, 500),
            CompanySize::Large => (501, 5000),
            CompanySize::Enterprise => (5001, 100_000),
        }
    }

    pub fn revenue_range(&self) -> (i64, i64) {
        match self {
            CompanySize::Small => (100_000, 5_000_000),
            CompanySize::Medium => (5_000_000, 50_000_000),
            CompanySize::Large => (50_000_000, 500_000_000),
            CompanySize::Enterprise => (500_000_000, 50_000_000_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Address {
    pub street: String,
    pub city: &'static str,
    pub state: &'static str,
    pub zip_code: String,
}

#[derive(Debug, Clone)]
pub struct CorporateProfile {
    pub ein: String,
    pub industry: &'static str,
    pub company_size: CompanySize,
    pub employee_count: i64,
    pub annual_revenue: i64,
    pub contact_title: &'static str,
}

#[derive(Debug, Clone)]
pub struct WealthProfile {
    pub net_worth_tier: &'static str,
    pub relationship_manager: String,
}

/// Variant-specific customer attributes
#[derive(Debug, Clone)]
pub enum CustomerProfile {
    Individual,
    Corporate(CorporateProfile),
    HighNetWorth(WealthProfile),
}

/// A generated customer.
///
/// For corporate customers `first_name`/`last_name` name the contact person
/// while `full_name` is the company.
#[derive(Debug, Clone)]
pub struct Customer {
    pub customer_id: String,
    pub kind: CustomerKind,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub ssn_last4: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub kyc_status: KycStatus,
    pub risk_score: u8,
    pub member_since: NaiveDate,
    pub segments: Vec<&'static str>,
    pub preferred_contact: &'static str,
    pub marketing_consent: bool,
    pub profile: CustomerProfile,
}

impl Customer {
    pub fn status(&self) -> &'static str {
        if self.kyc_status == KycStatus::Rejected {
            "Suspended"
        } else {
            "Active"
        }
    }
}

impl ToRecord for Customer {
    fn to_record(&self) -> Record {
        let mut r = Record::with_capacity(30);
        r.set("customer_id", &self.customer_id);
        r.set("customer_type", self.kind.label());
        r.set("first_name", self.first_name);
        r.set("last_name", self.last_name);
        r.set("full_name", &self.full_name);
        r.set("gender", self.gender.map(|g| g.code()));
        r.set("date_of_birth", self.date_of_birth);
        r.set("ssn_last4", self.ssn_last4.clone());
        r.set("email", &self.email);
        r.set("phone", &self.phone);
        r.set("street_address", &self.address.street);
        r.set("city", self.address.city);
        r.set("state", self.address.state);
        r.set("zip_code", &self.address.zip_code);
        r.set("country", "USA");
        r.set("kyc_status", self.kyc_status.label());
        r.set("risk_score", self.risk_score);
        r.set("member_since", self.member_since);
        r.set("segments", self.segments.join("|"));
        r.set("preferred_contact", self.preferred_contact);
        r.set("marketing_consent", self.marketing_consent);
        r.set("status", self.status());

        match &self.profile {
            CustomerProfile::Individual => {}
            CustomerProfile::Corporate(corp) => {
                r.set("ein", &corp.ein);
                r.set("industry", corp.industry);
                r.set("company_size", corp.company_size.label());
                r.set("employee_count", corp.employee_count);
                r.set("annual_revenue", corp.annual_revenue);
                r.set("contact_name", format!("{} {}", self.first_name, self.last_name));
                r.set("contact_title", corp.contact_title);
            }
            CustomerProfile::HighNetWorth(wealth) => {
                r.set("net_worth_tier", wealth.net_worth_tier);
                r.set("relationship_manager", &wealth.relationship_manager);
            }
        }
        r
    }
}

/// Customer columns as read back by later stages
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRow {
    #[serde(deserialize_with = "crate::tsv::required")]
    pub customer_id: String,
    #[serde(deserialize_with = "crate::tsv::required")]
    pub customer_type: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub member_since: String,
}

impl CustomerRow {
    pub fn kind(&self) -> Option<CustomerKind> {
        CustomerKind::from_label(&self.customer_type)
    }
}

/// Additive risk heuristic shared by individual and corporate customers,
/// clamped to [1, 100]
pub fn risk_score(
    fake: &mut FakeData,
    kind: CustomerKind,
    kyc: KycStatus,
    account_age_days: i64,
) -> u8 {
    let mut score: i64 = 30;

    score += match kind {
        CustomerKind::Individual => fake.int_range(-5, 15),
        CustomerKind::Corporate => fake.int_range(-10, 10),
        CustomerKind::HighNetWorth => fake.int_range(-15, 5),
    };

    score += match kyc {
        KycStatus::Verified => -fake.int_range(5, 15),
        KycStatus::Pending => fake.int_range(10, 25),
        KycStatus::PendingReview => fake.int_range(20, 40),
        KycStatus::Rejected => fake.int_range(40, 60),
    };

    // newer relationships carry more risk
    if account_age_days < 90 {
        score += fake.int_range(10, 20);
    } else if account_age_days < 365 {
        score += fake.int_range(0, 10);
    } else if account_age_days > 1825 {
        score -= fake.int_range(5, 15);
    }

    score += fake.int_range(-5, 5);

    score.clamp(1, 100) as u8
}

/// Generates the customer base
pub struct CustomerGenerator {
    num_individual: usize,
    num_corporate: usize,
    num_hnw: usize,
    as_of: NaiveDate,
}

impl CustomerGenerator {
    pub fn new(num_individual: usize, num_corporate: usize, num_hnw: usize, as_of: NaiveDate) -> Self {
        Self {
            num_individual,
            num_corporate,
            num_hnw,
            as_of,
        }
    }

    pub fn total(&self) -> usize {
        self.num_individual + self.num_corporate + self.num_hnw
    }

    /// Generate every customer, shuffled
    pub fn generate(&self, fake: &mut FakeData) -> Vec<Customer> {
        let mut customers = Vec::with_capacity(self.total());
        let mut sequence = 1usize;

        for _ in 0..self.num_individual {
            customers.push(self.individual(fake, sequence));
            sequence += 1;
        }
        for _ in 0..self.num_corporate {
            customers.push(self.corporate(fake, sequence));
            sequence += 1;
        }
        for _ in 0..self.num_hnw {
            customers.push(self.high_net_worth(fake, sequence));
            sequence += 1;
        }

        fake.shuffle(&mut customers);
        customers
    }

    fn individual(&self, fake: &mut FakeData, sequence: usize) -> Customer {
        let gender = fake.gender();
        let first_name = fake.first_name(gender);
        let last_name = fake.last_name();

        let address = address(fake);
        let member_since = fake.date_before(self.as_of, 0, 15 * 365);
        let account_age_days = (self.as_of - member_since).num_days();

        let kyc_status = *fake.weighted(INDIVIDUAL_KYC);

        let mut segments = vec!["Individual"];
        if fake.bool_with_probability(0.15) {
            segments.push("Premium");
        }
        if fake.bool_with_probability(0.05) {
            segments.push("HighRisk");
        }
        if account_age_days > 3650 {
            segments.push("LongTerm");
        }

        let date_of_birth = {
            let age = fake.int_range(18, 80);
            fake.date_before(self.as_of, age * 365, age * 365 + 364)
        };
        let ssn_last4 = format!("{:04}", fake.int_range(1, 9999));
        let email = personal_email(fake, first_name, last_name);
        let phone = fake.customer_phone();
        let risk_score = risk_score(fake, CustomerKind::Individual, kyc_status, account_age_days);

        Customer {
            customer_id: format!("{}-{:08}", CustomerKind::Individual.id_prefix(), sequence),
            kind: CustomerKind::Individual,
            first_name,
            last_name,
            full_name: format!("{} {}", first_name, last_name),
            gender: Some(gender),
            date_of_birth: Some(date_of_birth),
            ssn_last4: Some(ssn_last4),
            email,
            phone,
            address,
            kyc_status,
            risk_score,
            member_since,
            segments,
            preferred_contact: *fake.pick(PREFERRED_CONTACT),
            marketing_consent: fake.yes_no(),
            profile: CustomerProfile::Individual,
        }
    }

    fn corporate(&self, fake: &mut FakeData, sequence: usize) -> Customer {
        let company_name = if fake.bool_with_probability(0.2) {
            format!("{} {}", fake.pick(LAST_NAMES), fake.pick(CORP_CORES))
        } else {
            format!("{} {}", fake.pick(CORP_PREFIXES), fake.pick(CORP_CORES))
        };
        let full_name = format!("{} {}", company_name, fake.pick(CORP_SUFFIXES));

        let address = address(fake);
        let member_since = fake.date_before(self.as_of, 0, 25 * 365);
        let account_age_days = (self.as_of - member_since).num_days();

        let industry = *fake.weighted(INDUSTRIES);
        let kyc_status = *fake.weighted(CORPORATE_KYC);

        let company_size = *fake.weighted(&CompanySize::WEIGHTS);
        let (emp_min, emp_max) = company_size.employee_range();
        let employee_count = fake.int_range(emp_min, emp_max);
        let (rev_min, rev_max) = company_size.revenue_range();
        let annual_revenue = fake.int_range(rev_min, rev_max);

        let mut segments = vec!["Corporate"];
        if matches!(company_size, CompanySize::Large | CompanySize::Enterprise) {
            segments.push("Premium");
        }
        if annual_revenue > 100_000_000 {
            segments.push("KeyAccount");
        }

        let contact_gender = fake.gender();
        let contact_first = fake.first_name(contact_gender);
        let contact_last = fake.last_name();

        let email_domain: String = company_name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let phone = fake.customer_phone();
        let risk_score = risk_score(fake, CustomerKind::Corporate, kyc_status, account_age_days);
        let marketing_consent = fake.yes_no();
        let ein = format!("{}-{}", fake.int_range(10, 99), fake.int_range(1_000_000, 9_999_999));
        let contact_title = *fake.pick(CONTACT_TITLES);

        Customer {
            customer_id: format!("{}-{:08}", CustomerKind::Corporate.id_prefix(), sequence),
            kind: CustomerKind::Corporate,
            first_name: contact_first,
            last_name: contact_last,
            full_name,
            gender: None,
            date_of_birth: None,
            ssn_last4: None,
            email: format!("accounts@{}.com", email_domain),
            phone,
            address,
            kyc_status,
            risk_score,
            member_since,
            segments,
            preferred_contact: "email",
            marketing_consent,
            profile: CustomerProfile::Corporate(CorporateProfile {
                ein,
                industry,
                company_size,
                employee_count,
                annual_revenue,
                contact_title,
            }),
        }
    }

    fn high_net_worth(&self, fake: &mut FakeData, sequence: usize) -> Customer {
        let mut customer = self.individual(fake, sequence);

        customer.customer_id = format!("{}-{:08}", CustomerKind::HighNetWorth.id_prefix(), sequence);
        customer.kind = CustomerKind::HighNetWorth;
        customer.kyc_status = *fake.weighted(HIGH_NET_WORTH_KYC);
        // replaces the additive heuristic entirely
        customer.risk_score = fake.int_range(5, 35) as u8;

        let mut segments = vec!["Individual", "HighNetWorth", "Premium", "PrivateBanking"];
        if fake.bool_with_probability(0.3) {
            segments.push("WealthManagement");
        }
        customer.segments = segments;

        customer.profile = CustomerProfile::HighNetWorth(WealthProfile {
            net_worth_tier: *fake.pick(NET_WORTH_TIERS),
            relationship_manager: format!("RM-{}", fake.int_range(1000, 9999)),
        });
        customer
    }
}

fn address(fake: &mut FakeData) -> Address {
    let (city, state, zip_prefix) = *fake.weighted(CITIES);

    let number = fake.int_range(1, 9999);
    let street_name = fake.pick(STREET_NAMES);
    let street_type = fake.pick(STREET_TYPES);
    let unit = if fake.bool_with_probability(0.3) {
        format!(" {} {}", fake.pick(UNIT_TYPES), fake.int_range(1, 500))
    } else {
        String::new()
    };

    Address {
        street: format!("{} {} {}{}", number, street_name, street_type, unit),
        city,
        state,
        zip_code: format!("{}{}", zip_prefix, fake.int_range(10, 99)),
    }
}

fn personal_email(fake: &mut FakeData, first_name: &str, last_name: &str) -> String {
    let first = first_name.to_lowercase();
    let last: String = last_name
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != ' ')
        .collect();
    let first_initial = &first[..1];
    let last_initial = &last[..1];

    let sep = *fake.pick(&[".", "_", ""]);
    let local = match fake.index(4) {
        0 => format!("{first}{sep}{last}"),
        1 => format!("{first_initial}{sep}{last}"),
        2 => format!("{first}{sep}{last_initial}"),
        _ => format!("{first}{last}{}", fake.int_range(1, 99)),
    };
    format!("{}@{}", local, fake.pick(PERSONAL_DOMAINS))
}
