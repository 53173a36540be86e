//! Branch generation.
//!
//! Branches are spread over a fixed table of US banking markets in
//! proportion to each market's weight. The first branch of the first
//! tier-1 market is the headquarters; the first branch of any tier-1/2
//! market may become a regional center.

use crate::fake::{round_to, FakeData};
use crate::record::{FieldValue, Record, ToRecord};
use chrono::NaiveDate;
use serde::Deserialize;

/// A banking market
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub city: &'static str,
    pub state: &'static str,
    pub region: &'static str,
    pub zip: &'static str,
    pub lat: f64,
    pub lng: f64,
    /// 1 = major financial center ... 4 = small market
    pub tier: u8,
    pub weight: u32,
}

#[allow(clippy::too_many_arguments)]
const fn loc(
    city: &'static str,
    state: &'static str,
    region: &'static str,
    zip: &'static str,
    lat: f64,
    lng: f64,
    tier: u8,
    weight: u32,
) -> Location {
    Location {
        city,
        state,
        region,
        zip,
        lat,
        lng,
        tier,
        weight,
    }
}

pub const LOCATIONS: &[Location] = &[
    // Tier 1
    loc("New York", "NY", "Northeast", "10001", 40.7128, -74.0060, 1, 15),
    loc("Los Angeles", "CA", "West", "90001", 34.0522, -118.2437, 1, 12),
    loc("Chicago", "IL", "Midwest", "60601", 41.8781, -87.6298, 1, 10),
    loc("Houston", "TX", "South", "77001", 29.7604, -95.3698, 1, 8),
    loc("San Francisco", "CA", "West", "94102", 37.7749, -122.4194, 1, 8),
    loc("Boston", "MA", "Northeast", "02101", 42.3601, -71.0589, 1, 7),
    loc("Dallas", "TX", "South", "75201", 32.7767, -96.7970, 1, 7),
    loc("Miami", "FL", "South", "33101", 25.7617, -80.1918, 1, 6),
    loc("Atlanta", "GA", "South", "30301", 33.7490, -84.3880, 1, 6),
    loc("Seattle", "WA", "West", "98101", 47.6062, -122.3321, 1, 5),
    // Tier 2
    loc("Phoenix", "AZ", "West", "85001", 33.4484, -112.0740, 2, 4),
    loc("Philadelphia", "PA", "Northeast", "19101", 39.9526, -75.1652, 2, 4),
    loc("San Diego", "CA", "West", "92101", 32.7157, -117.1611, 2, 3),
    loc("Denver", "CO", "West", "80201", 39.7392, -104.9903, 2, 4),
    loc("Austin", "TX", "South", "78701", 30.2672, -97.7431, 2, 4),
    loc("Charlotte", "NC", "South", "28201", 35.2271, -80.8431, 2, 5),
    loc("Minneapolis", "MN", "Midwest", "55401", 44.9778, -93.2650, 2, 3),
    loc("Portland", "OR", "West", "97201", 45.5152, -122.6784, 2, 3),
    loc("Detroit", "MI", "Midwest", "48201", 42.3314, -83.0458, 2, 3),
    loc("Nashville", "TN", "South", "37201", 36.1627, -86.7816, 2, 3),
    // Tier 3
    loc("San Jose", "CA", "West", "95101", 37.3382, -121.8863, 3, 3),
    loc("Columbus", "OH", "Midwest", "43201", 39.9612, -82.9988, 3, 2),
    loc("Indianapolis", "IN", "Midwest", "46201", 39.7684, -86.1581, 3, 2),
    loc("Jacksonville", "FL", "South", "32201", 30.3322, -81.6557, 3, 2),
    loc("San Antonio", "TX", "South", "78201", 29.4241, -98.4936, 3, 2),
    loc("Fort Worth", "TX", "South", "76101", 32.7555, -97.3308, 3, 2),
    loc("Baltimore", "MD", "Northeast", "21201", 39.2904, -76.6122, 3, 2),
    loc("Salt Lake City", "UT", "West", "84101", 40.7608, -111.8910, 3, 2),
    loc("Kansas City", "MO", "Midwest", "64101", 39.0997, -94.5786, 3, 2),
    loc("Las Vegas", "NV", "West", "89101", 36.1699, -115.1398, 3, 2),
    loc("Milwaukee", "WI", "Midwest", "53201", 43.0389, -87.9065, 3, 2),
    loc("Cleveland", "OH", "Midwest", "44101", 41.4993, -81.6944, 3, 2),
    loc("Tampa", "FL", "South", "33601", 27.9506, -82.4572, 3, 2),
    loc("Raleigh", "NC", "South", "27601", 35.7796, -78.6382, 3, 2),
    loc("Pittsburgh", "PA", "Northeast", "15201", 40.4406, -79.9959, 3, 2),
    // Tier 4
    loc("Cincinnati", "OH", "Midwest", "45201", 39.1031, -84.5120, 4, 1),
    loc("St. Louis", "MO", "Midwest", "63101", 38.6270, -90.1994, 4, 1),
    loc("Orlando", "FL", "South", "32801", 28.5383, -81.3792, 4, 1),
    loc("Sacramento", "CA", "West", "95814", 38.5816, -121.4944, 4, 1),
    loc("New Orleans", "LA", "South", "70112", 29.9511, -90.0715, 4, 1),
    loc("Tucson", "AZ", "West", "85701", 32.2226, -110.9747, 4, 1),
    loc("Honolulu", "HI", "West", "96801", 21.3069, -157.8583, 4, 1),
    loc("Albuquerque", "NM", "West", "87101", 35.0844, -106.6504, 4, 1),
    loc("Omaha", "NE", "Midwest", "68101", 41.2565, -95.9345, 4, 1),
];

const STREET_NAMES: &[&str] = &[
    "Main", "Broadway", "Market", "Wall", "Commerce", "Financial", "Bank", "First", "Second",
    "Third", "Park", "Madison", "Lexington", "Fifth", "Center", "Central", "State", "Washington",
    "Lincoln", "Oak", "Maple",
];

const STREET_TYPES: &[&str] = &["Street", "Avenue", "Boulevard", "Plaza", "Drive", "Way"];

const IN_STORE_PARTNERS: &[&str] = &["Walmart", "Target", "Kroger", "Safeway", "Costco"];

const NAME_SUFFIXES: &[&str] = &[
    "Main",
    "Downtown",
    "Central",
    "Plaza",
    "Financial District",
    "Midtown",
    "North",
    "South",
    "East",
    "West",
];

const BRANCH_STATUS: &[(&str, f64)] = &[
    ("Active", 0.95),
    ("Temporarily Closed", 0.03),
    ("Closed", 0.02),
];

/// Chance that the first branch of a tier-1/2 market is a regional center
const REGIONAL_CENTER_PROBABILITY: f64 = 0.3;

/// Branch format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchType {
    Headquarters,
    RegionalCenter,
    FullService,
    Standard,
    Express,
    InStore,
    AtmOnly,
}

/// Operating profile of a branch type
#[derive(Debug)]
pub struct BranchProfile {
    pub services: &'static [&'static str],
    pub employees: (u32, u32),
    pub square_footage: (u32, u32),
    pub hours: &'static str,
    pub weight: f64,
}

impl BranchType {
    pub const ALL: [BranchType; 7] = [
        BranchType::Headquarters,
        BranchType::RegionalCenter,
        BranchType::FullService,
        BranchType::Standard,
        BranchType::Express,
        BranchType::InStore,
        BranchType::AtmOnly,
    ];

    const WEIGHTS: [(BranchType, f64); 7] = [
        (BranchType::Headquarters, 0.02),
        (BranchType::RegionalCenter, 0.08),
        (BranchType::FullService, 0.40),
        (BranchType::Standard, 0.30),
        (BranchType::Express, 0.12),
        (BranchType::InStore, 0.05),
        (BranchType::AtmOnly, 0.03),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BranchType::Headquarters => "Headquarters",
            BranchType::RegionalCenter => "Regional Center",
            BranchType::FullService => "Full Service",
            BranchType::Standard => "Standard",
            BranchType::Express => "Express",
            BranchType::InStore => "In-Store",
            BranchType::AtmOnly => "ATM Only",
        }
    }

    pub fn profile(&self) -> BranchProfile {
        let weight = Self::WEIGHTS
            .iter()
            .find(|(t, _)| t == self)
            .map(|(_, w)| *w)
            .unwrap_or(0.0);
        match self {
            BranchType::Headquarters => BranchProfile {
                services: &[
                    "Corporate Banking",
                    "Wealth Management",
                    "Commercial Lending",
                    "Treasury Services",
                    "Investment Banking",
                ],
                employees: (200, 1000),
                square_footage: (50_000, 200_000),
                hours: "8:00 AM - 6:00 PM",
                weight,
            },
            BranchType::RegionalCenter => BranchProfile {
                services: &[
                    "Commercial Banking",
                    "Business Banking",
                    "Wealth Management",
                    "Mortgage Services",
                ],
                employees: (50, 200),
                square_footage: (15_000, 50_000),
                hours: "8:00 AM - 6:00 PM",
                weight,
            },
            BranchType::FullService => BranchProfile {
                services: &[
                    "Personal Banking",
                    "Business Banking",
                    "Mortgage",
                    "Safe Deposit",
                    "Notary",
                ],
                employees: (15, 50),
                square_footage: (4000, 15_000),
                hours: "9:00 AM - 5:00 PM",
                weight,
            },
            BranchType::Standard => BranchProfile {
                services: &["Personal Banking", "Basic Business", "ATM"],
                employees: (8, 20),
                square_footage: (2000, 5000),
                hours: "9:00 AM - 5:00 PM",
                weight,
            },
            BranchType::Express => BranchProfile {
                services: &["Teller Services", "ATM", "Account Opening"],
                employees: (3, 10),
                square_footage: (800, 2500),
                hours: "9:00 AM - 6:00 PM",
                weight,
            },
            BranchType::InStore => BranchProfile {
                services: &["Basic Teller", "ATM", "Account Services"],
                employees: (2, 6),
                square_footage: (400, 1200),
                hours: "10:00 AM - 7:00 PM",
                weight,
            },
            BranchType::AtmOnly => BranchProfile {
                services: &["ATM"],
                employees: (0, 0),
                square_footage: (50, 200),
                hours: "24/7",
                weight,
            },
        }
    }
}

/// A generated branch
#[derive(Debug, Clone)]
pub struct Branch {
    pub branch_id: String,
    pub branch_code: String,
    pub branch_name: String,
    pub branch_type: BranchType,
    pub location: Location,
    pub street_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub fax: Option<String>,
    pub email: String,
    pub hours_saturday: &'static str,
    pub hours_sunday: &'static str,
    pub employee_count: u32,
    pub square_footage: u32,
    pub manager_id: Option<String>,
    pub open_date: NaiveDate,
    pub last_renovation: NaiveDate,
    pub atm_count: u32,
    pub drive_through: bool,
    pub wheelchair_accessible: bool,
    pub safe_deposit_boxes: u32,
    pub status: &'static str,
    pub monthly_transactions: u32,
    pub customer_satisfaction_score: f64,
}

impl ToRecord for Branch {
    fn to_record(&self) -> Record {
        let profile = self.branch_type.profile();
        let mut r = Record::with_capacity(32);
        r.set("branch_id", &self.branch_id);
        r.set("branch_code", &self.branch_code);
        r.set("branch_name", &self.branch_name);
        r.set("branch_type", self.branch_type.label());
        r.set("tier", self.location.tier);
        r.set("region", self.location.region);
        r.set("street_address", &self.street_address);
        r.set("city", self.location.city);
        r.set("state", self.location.state);
        r.set("zip_code", self.location.zip);
        r.set("country", "USA");
        r.set("latitude", FieldValue::decimal(self.latitude, 6));
        r.set("longitude", FieldValue::decimal(self.longitude, 6));
        r.set("phone", &self.phone);
        r.set("fax", self.fax.clone());
        r.set("email", &self.email);
        r.set("hours_weekday", profile.hours);
        r.set("hours_saturday", self.hours_saturday);
        r.set("hours_sunday", self.hours_sunday);
        r.set("services", profile.services.join("|"));
        r.set("employee_count", self.employee_count);
        r.set("square_footage", self.square_footage);
        r.set("manager_id", self.manager_id.clone());
        r.set("open_date", self.open_date);
        r.set("last_renovation", self.last_renovation);
        r.set("atm_count", self.atm_count);
        r.set("drive_through", self.drive_through);
        r.set("wheelchair_accessible", self.wheelchair_accessible);
        r.set("safe_deposit_boxes", self.safe_deposit_boxes);
        r.set("status", self.status);
        r.set("monthly_transactions", self.monthly_transactions);
        r.set(
            "customer_satisfaction_score",
            FieldValue::decimal(self.customer_satisfaction_score, 2),
        );
        r
    }
}

/// Branch columns as read back by later stages
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRow {
    #[serde(deserialize_with = "crate::tsv::required")]
    pub branch_id: String,
    #[serde(default)]
    pub city: String,
}

/// Number of branches per market, in table order, summing to `count`.
///
/// Each market first gets `max(1, floor(count * weight / total))`. If that
/// falls short of `count` the shortfall is handed out one branch at a time
/// to the heaviest markets. Generation stops once `count` slots are used, so
/// small counts only reach the first markets of the table.
pub fn allocate(count: usize) -> Vec<(&'static Location, usize)> {
    let total_weight: u32 = LOCATIONS.iter().map(|l| l.weight).sum();
    let mut slots: Vec<usize> = LOCATIONS
        .iter()
        .map(|l| ((count * l.weight as usize) / total_weight as usize).max(1))
        .collect();

    let assigned: usize = slots.iter().sum();
    if assigned < count {
        let mut by_weight: Vec<usize> = (0..LOCATIONS.len()).collect();
        by_weight.sort_by(|a, b| LOCATIONS[*b].weight.cmp(&LOCATIONS[*a].weight));
        for i in 0..(count - assigned) {
            slots[by_weight[i % by_weight.len()]] += 1;
        }
    }

    let mut remaining = count;
    let mut allocation = Vec::new();
    for (location, n) in LOCATIONS.iter().zip(slots) {
        if remaining == 0 {
            break;
        }
        let n = n.min(remaining);
        allocation.push((location, n));
        remaining -= n;
    }
    allocation
}

/// Generates the branch network
pub struct BranchGenerator {
    count: usize,
    as_of: NaiveDate,
}

impl BranchGenerator {
    pub fn new(count: usize, as_of: NaiveDate) -> Self {
        Self { count, as_of }
    }

    pub fn generate(&self, fake: &mut FakeData) -> Vec<Branch> {
        let mut branches = Vec::with_capacity(self.count);
        let mut sequence = 1usize;

        for (location, n) in allocate(self.count) {
            for i in 0..n {
                let forced = if i == 0 && location.tier == 1 && sequence == 1 {
                    Some(BranchType::Headquarters)
                } else if i == 0
                    && location.tier <= 2
                    && fake.bool_with_probability(REGIONAL_CENTER_PROBABILITY)
                {
                    Some(BranchType::RegionalCenter)
                } else {
                    None
                };
                let branch_type =
                    forced.unwrap_or_else(|| *fake.weighted(&BranchType::WEIGHTS));

                branches.push(self.generate_branch(fake, sequence, location, branch_type));
                sequence += 1;
            }
        }

        branches
    }

    fn generate_branch(
        &self,
        fake: &mut FakeData,
        sequence: usize,
        location: &Location,
        branch_type: BranchType,
    ) -> Branch {
        let profile = branch_type.profile();

        let street_number = fake.int_range(1, 999) * 10 + fake.int_range(0, 9);
        let street = format!("{} {}", fake.pick(STREET_NAMES), fake.pick(STREET_TYPES));
        let latitude = round_to(location.lat + fake.float_range(-0.05, 0.05), 6);
        let longitude = round_to(location.lng + fake.float_range(-0.05, 0.05), 6);

        let employee_count = fake.uint_range(profile.employees.0, profile.employees.1);
        let square_footage = fake.uint_range(profile.square_footage.0, profile.square_footage.1);

        let years_ago = if branch_type == BranchType::AtmOnly {
            fake.int_range(1, 15)
        } else {
            fake.int_range(1, 50)
        };
        let open_date = fake.date_before(self.as_of, years_ago * 365, years_ago * 365 + 364);

        let manager_id =
            (employee_count > 0).then(|| format!("EMP-{}", fake.int_range(10_000, 99_999)));

        let branch_name = match branch_type {
            BranchType::Headquarters => format!("{} Corporate Headquarters", location.city),
            BranchType::RegionalCenter => format!("{} Regional Banking Center", location.city),
            BranchType::InStore => {
                format!("{} {} Branch", location.city, fake.pick(IN_STORE_PARTNERS))
            }
            BranchType::AtmOnly => format!("{} ATM Location #{}", location.city, sequence),
            _ => format!("{} {} Branch", location.city, fake.pick(NAME_SUFFIXES)),
        };

        let phone = fake.phone();
        let fax = match branch_type {
            BranchType::AtmOnly | BranchType::Express => None,
            _ => Some(fake.phone()),
        };

        let drive_through = matches!(
            branch_type,
            BranchType::FullService | BranchType::Standard | BranchType::Express
        ) && fake.bool_with_probability(0.6);

        let wheelchair_accessible = branch_type != BranchType::AtmOnly || fake.yes_no();

        let safe_deposit_boxes = if profile.services.contains(&"Safe Deposit") {
            fake.uint_range(50, 500)
        } else {
            0
        };

        Branch {
            branch_id: format!("BR-{:05}", sequence),
            branch_code: format!("BR-{}-{:04}", location.state, sequence),
            branch_name,
            branch_type,
            location: *location,
            street_address: format!("{} {}", street_number, street),
            latitude,
            longitude,
            phone,
            fax,
            email: format!("branch{}@samyamabank.com", sequence),
            hours_saturday: match branch_type {
                BranchType::AtmOnly | BranchType::InStore => profile.hours,
                _ => "9:00 AM - 1:00 PM",
            },
            hours_sunday: if branch_type == BranchType::AtmOnly {
                "24/7"
            } else {
                "Closed"
            },
            employee_count,
            square_footage,
            manager_id,
            open_date,
            last_renovation: fake.date_before(self.as_of, 0, 3650),
            atm_count: if branch_type == BranchType::AtmOnly {
                1
            } else {
                fake.uint_range(1, 4)
            },
            drive_through,
            wheelchair_accessible,
            safe_deposit_boxes,
            status: *fake.weighted(BRANCH_STATUS),
            monthly_transactions: if branch_type == BranchType::AtmOnly {
                fake.uint_range(500, 5000)
            } else {
                fake.uint_range(5000, 50_000)
            },
            customer_satisfaction_score: round_to(fake.float_range(3.5, 5.0), 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_allocation_sums_to_count() {
        for count in [1, 10, 25, 44, 75, 150, 500] {
            let total: usize = allocate(count).iter().map(|(_, n)| n).sum();
            assert_eq!(total, count, "allocation for {count}");
        }
    }

    #[test]
    fn test_every_market_gets_a_branch_when_count_allows() {
        let allocation = allocate(150);
        assert_eq!(allocation.len(), LOCATIONS.len());
        assert!(allocation.iter().all(|(_, n)| *n >= 1));
    }

    #[test]
    fn test_heavier_markets_get_more_branches() {
        let allocation = allocate(500);
        let new_york = allocation[0].1;
        let omaha = allocation.last().unwrap().1;
        assert!(new_york > omaha);
    }

    #[test]
    fn test_first_branch_is_headquarters() {
        let mut fake = FakeData::new(42);
        let branches = BranchGenerator::new(25, as_of()).generate(&mut fake);
        assert_eq!(branches.len(), 25);
        assert_eq!(branches[0].branch_type, BranchType::Headquarters);
        assert_eq!(branches[0].location.city, "New York");
        assert_eq!(branches[0].branch_id, "BR-00001");
    }

    #[test]
    fn test_fields_within_profile() {
        let mut fake = FakeData::new(7);
        for branch in BranchGenerator::new(150, as_of()).generate(&mut fake) {
            let profile = branch.branch_type.profile();
            assert!(branch.employee_count >= profile.employees.0);
            assert!(branch.employee_count <= profile.employees.1);
            assert!(branch.square_footage >= profile.square_footage.0);
            assert!(branch.square_footage <= profile.square_footage.1);
            assert!((branch.latitude - branch.location.lat).abs() <= 0.050001);
            assert_eq!(branch.manager_id.is_some(), branch.employee_count > 0);
            assert!(branch.open_date < as_of());
        }
    }

    #[test]
    fn test_ids_unique_and_sequential() {
        let mut fake = FakeData::new(1);
        let branches = BranchGenerator::new(60, as_of()).generate(&mut fake);
        for (i, b) in branches.iter().enumerate() {
            assert_eq!(b.branch_id, format!("BR-{:05}", i + 1));
        }
    }

    #[test]
    fn test_record_has_homogeneous_columns() {
        let mut fake = FakeData::new(3);
        let branches = BranchGenerator::new(20, as_of()).generate(&mut fake);
        let first: Vec<_> = branches[0].to_record().keys().collect();
        for b in &branches {
            assert_eq!(b.to_record().keys().collect::<Vec<_>>(), first);
        }
    }
}
