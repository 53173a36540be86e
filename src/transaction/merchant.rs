//! Merchant tables for purchase transactions.

use crate::fake::FakeData;

/// Merchant category code with its sampling weight and typical ticket size
#[derive(Debug, Clone, Copy)]
pub struct MerchantCategory {
    pub code: &'static str,
    pub name: &'static str,
    pub avg_amount: f64,
    /// Known merchant names; empty means a generic "<category> Merchant"
    pub names: &'static [&'static str],
}

const fn mcc(
    code: &'static str,
    name: &'static str,
    avg_amount: f64,
    names: &'static [&'static str],
) -> MerchantCategory {
    MerchantCategory {
        code,
        name,
        avg_amount,
        names,
    }
}

pub const MERCHANT_CATEGORIES: &[(MerchantCategory, f64)] = &[
    (
        mcc(
            "5411",
            "Grocery Stores",
            85.0,
            &[
                "Kroger", "Safeway", "Whole Foods", "Trader Joe's", "Walmart Grocery", "Target",
                "Publix", "Costco", "Aldi", "H-E-B",
            ],
        ),
        0.15,
    ),
    (
        mcc(
            "5541",
            "Gas Stations",
            45.0,
            &[
                "Shell", "Chevron", "ExxonMobil", "BP", "76", "Costco Gas", "QuikTrip", "Wawa",
                "Sheetz", "Circle K",
            ],
        ),
        0.12,
    ),
    (
        mcc(
            "5812",
            "Restaurants",
            35.0,
            &[
                "Olive Garden", "Chili's", "Applebee's", "Red Lobster", "Outback",
                "Texas Roadhouse", "The Cheesecake Factory", "PF Chang's",
            ],
        ),
        0.12,
    ),
    (
        mcc(
            "5814",
            "Fast Food",
            12.0,
            &[
                "McDonald's", "Starbucks", "Subway", "Chick-fil-A", "Taco Bell", "Wendy's",
                "Burger King", "Chipotle", "Dunkin'", "Panera",
            ],
        ),
        0.08,
    ),
    (
        mcc(
            "5912",
            "Drug Stores",
            28.0,
            &["CVS Pharmacy", "Walgreens", "Rite Aid", "Duane Reade"],
        ),
        0.06,
    ),
    (
        mcc(
            "5311",
            "Department Stores",
            75.0,
            &["Macy's", "Nordstrom", "JCPenney", "Kohl's", "Dillard's", "Belk"],
        ),
        0.05,
    ),
    (mcc("5999", "Miscellaneous Retail", 50.0, &[]), 0.05),
    (mcc("5942", "Book Stores", 25.0, &[]), 0.02),
    (mcc("7832", "Movie Theaters", 30.0, &[]), 0.02),
    (
        mcc(
            "7011",
            "Hotels",
            180.0,
            &[
                "Marriott", "Hilton", "Hyatt", "IHG", "Best Western", "Hampton Inn",
                "Holiday Inn", "Courtyard",
            ],
        ),
        0.03,
    ),
    (
        mcc(
            "4511",
            "Airlines",
            350.0,
            &[
                "Delta Airlines", "United Airlines", "American Airlines", "Southwest", "JetBlue",
                "Alaska Airlines",
            ],
        ),
        0.02,
    ),
    (
        mcc(
            "5732",
            "Electronics Stores",
            150.0,
            &["Best Buy", "Apple Store", "Microsoft Store", "Micro Center"],
        ),
        0.03,
    ),
    (
        mcc(
            "5651",
            "Clothing Stores",
            65.0,
            &[
                "Old Navy", "Gap", "H&M", "Zara", "Forever 21", "TJ Maxx", "Ross", "Marshalls",
            ],
        ),
        0.04,
    ),
    (mcc("5691", "Mens/Womens Clothing", 85.0, &[]), 0.03),
    (mcc("5947", "Gift Shops", 40.0, &[]), 0.02),
    (mcc("8011", "Medical Services", 125.0, &[]), 0.04),
    (mcc("8021", "Dental Services", 200.0, &[]), 0.02),
    (mcc("8099", "Health Services", 100.0, &[]), 0.02),
    (
        mcc("4121", "Taxi/Rideshare", 25.0, &["Uber", "Lyft", "Yellow Cab", "City Taxi"]),
        0.03,
    ),
    (mcc("5964", "Online Retail", 55.0, &[]), 0.06),
];

const MERCHANT_LOCATIONS: &[(&str, &str)] = &[
    ("New York", "NY"),
    ("Los Angeles", "CA"),
    ("Chicago", "IL"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
    ("San Francisco", "CA"),
    ("Dallas", "TX"),
    ("Miami", "FL"),
];

/// Merchant attached to a purchase
#[derive(Debug, Clone)]
pub struct Merchant {
    pub name: String,
    pub category: &'static MerchantCategory,
    pub city: &'static str,
    pub state: &'static str,
}

impl Merchant {
    /// Sample a category by weight, then a name and a location
    pub fn sample(fake: &mut FakeData) -> Self {
        let category = fake.weighted(MERCHANT_CATEGORIES);
        let name = if category.names.is_empty() {
            format!("{} Merchant", category.name)
        } else {
            fake.pick(category.names).to_string()
        };
        let (city, state) = *fake.pick(MERCHANT_LOCATIONS);
        Merchant {
            name,
            category,
            city,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    #[test]
    fn test_category_codes_unique() {
        let codes: AHashSet<&str> = MERCHANT_CATEGORIES.iter().map(|(c, _)| c.code).collect();
        assert_eq!(codes.len(), MERCHANT_CATEGORIES.len());
    }

    #[test]
    fn test_generic_name_for_unlisted_category() {
        let mut fake = FakeData::new(42);
        for _ in 0..500 {
            let merchant = Merchant::sample(&mut fake);
            if merchant.category.names.is_empty() {
                assert!(merchant.name.ends_with(" Merchant"));
            } else {
                assert!(merchant.category.names.contains(&merchant.name.as_str()));
            }
        }
    }
}
