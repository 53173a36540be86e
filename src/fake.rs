//! Fake data generation helpers.
//!
//! `FakeData` owns the single seeded random stream of a run. Every stage
//! receives it by `&mut` so that generation decisions are drawn in a fixed
//! order and a given seed always reproduces the same fixtures.

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal};

/// Male first names, roughly ordered by US census frequency
pub const MALE_FIRST_NAMES: &[&str] = &[
    "James", "Robert", "John", "Michael", "David", "William", "Richard", "Joseph", "Thomas",
    "Christopher", "Charles", "Daniel", "Matthew", "Anthony", "Mark", "Donald", "Steven", "Paul",
    "Andrew", "Joshua", "Kenneth", "Kevin", "Brian", "George", "Timothy", "Ronald", "Edward",
    "Jason", "Jeffrey", "Ryan", "Jacob", "Gary", "Nicholas", "Eric", "Jonathan", "Stephen",
    "Larry", "Justin", "Scott", "Brandon", "Benjamin", "Samuel", "Raymond", "Gregory", "Frank",
    "Alexander", "Patrick", "Jack", "Dennis", "Jerry", "Tyler", "Aaron", "Jose", "Adam", "Nathan",
];

/// Female first names, roughly ordered by US census frequency
pub const FEMALE_FIRST_NAMES: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Barbara", "Elizabeth", "Susan", "Jessica", "Sarah",
    "Karen", "Lisa", "Nancy", "Betty", "Margaret", "Sandra", "Ashley", "Kimberly", "Emily",
    "Donna", "Michelle", "Dorothy", "Carol", "Amanda", "Melissa", "Deborah", "Stephanie",
    "Rebecca", "Sharon", "Laura", "Cynthia", "Kathleen", "Amy", "Angela", "Shirley", "Anna",
    "Brenda", "Pamela", "Emma", "Nicole", "Helen", "Samantha", "Katherine", "Christine", "Debra",
    "Rachel", "Carolyn", "Janet", "Catherine", "Maria", "Heather", "Diane", "Ruth",
];

/// Last names for people and founder-named companies
pub const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell", "Carter", "Roberts", "Chen", "Wang", "Kim", "Patel",
    "Shah", "Singh", "Kumar", "O'Brien", "Murphy", "Kelly", "Sullivan", "McCarthy", "Cohen",
    "Goldstein",
];

/// Area codes used for customer phone numbers
const CUSTOMER_AREA_CODES: &[u32] = &[
    212, 213, 312, 415, 617, 702, 713, 718, 310, 404, 305, 214, 972, 469, 512, 737,
];

/// Gender used to pick a first-name table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Fake data generator with deterministic RNG
pub struct FakeData {
    rng: ChaCha8Rng,
}

impl FakeData {
    /// Seed a new generator state
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform float in [0, 1)
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Generate a random integer in range (inclusive)
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Generate a random unsigned integer in range (inclusive)
    pub fn uint_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Uniform float in [min, max]
    pub fn float_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Generate a boolean with given probability of true
    pub fn bool_with_probability(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    /// Pick a random element from a non-empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    /// Uniform index in `0..len` that is never `excluded`; `len` must be at least 2
    pub fn index_excluding(&mut self, len: usize, excluded: usize) -> usize {
        let idx = self.rng.random_range(0..len - 1);
        if idx >= excluded {
            idx + 1
        } else {
            idx
        }
    }

    /// Two distinct indices in `0..len`; `len` must be at least 2
    pub fn distinct_pair(&mut self, len: usize) -> (usize, usize) {
        let picked = rand::seq::index::sample(&mut self.rng, len, 2);
        (picked.index(0), picked.index(1))
    }

    /// `amount` distinct indices in `0..len`, in sampling order
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }

    /// Weighted choice over `(category, weight)` pairs.
    ///
    /// Weights are relative and need not sum to one. The table must be
    /// non-empty; the last entry absorbs floating point slack.
    pub fn weighted<'a, T>(&mut self, table: &'a [(T, f64)]) -> &'a T {
        let total: f64 = table.iter().map(|(_, w)| w.max(0.0)).sum();
        let mut target = self.unit() * total;
        for (item, weight) in table {
            let weight = weight.max(0.0);
            if target < weight {
                return item;
            }
            target -= weight;
        }
        &table[table.len() - 1].0
    }

    /// Gaussian draw; a non-positive deviation returns the mean
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) if std_dev > 0.0 => dist.sample(&mut self.rng),
            _ => mean,
        }
    }

    /// Log-normal draw with underlying normal parameters `mu` and `sigma`
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        match LogNormal::new(mu, sigma) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mu.exp(),
        }
    }

    /// Exponential draw with the given mean
    pub fn exponential(&mut self, mean: f64) -> f64 {
        if mean <= 0.0 {
            return 0.0;
        }
        match Exp::new(1.0 / mean) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Pick a gender uniformly
    pub fn gender(&mut self) -> Gender {
        if self.bool_with_probability(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    /// Generate a first name conditioned on gender
    pub fn first_name(&mut self, gender: Gender) -> &'static str {
        match gender {
            Gender::Male => *self.pick(MALE_FIRST_NAMES),
            Gender::Female => *self.pick(FEMALE_FIRST_NAMES),
        }
    }

    /// Generate a random last name
    pub fn last_name(&mut self) -> &'static str {
        *self.pick(LAST_NAMES)
    }

    /// Phone number with an arbitrary area code
    pub fn phone(&mut self) -> String {
        let area = self.uint_range(200, 999);
        self.phone_in_area(area)
    }

    /// Phone number drawn from the metro area codes customers live in
    pub fn customer_phone(&mut self) -> String {
        let area = *self.pick(CUSTOMER_AREA_CODES);
        self.phone_in_area(area)
    }

    fn phone_in_area(&mut self, area: u32) -> String {
        let exchange = self.uint_range(200, 999);
        let line = self.uint_range(1000, 9999);
        format!("+1-{}-{}-{}", area, exchange, line)
    }

    /// String of `len` random decimal digits
    pub fn digits(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'0' + self.rng.random_range(0..10u8)))
            .collect()
    }

    /// Date `min_days..=max_days` before `as_of`
    pub fn date_before(&mut self, as_of: NaiveDate, min_days: i64, max_days: i64) -> NaiveDate {
        let days = self.int_range(min_days, max_days);
        as_of - Duration::days(days)
    }

    /// Date `min_days..=max_days` after `as_of`
    pub fn date_after(&mut self, as_of: NaiveDate, min_days: i64, max_days: i64) -> NaiveDate {
        let days = self.int_range(min_days, max_days);
        as_of + Duration::days(days)
    }

    /// Y/N flag drawn uniformly
    pub fn yes_no(&mut self) -> bool {
        self.bool_with_probability(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_generation() {
        let mut fake1 = FakeData::new(42);
        let mut fake2 = FakeData::new(42);

        // Same seed should produce same results
        assert_eq!(fake1.last_name(), fake2.last_name());
        assert_eq!(fake1.int_range(0, 1_000_000), fake2.int_range(0, 1_000_000));
        assert_eq!(fake1.gauss(10.0, 2.0), fake2.gauss(10.0, 2.0));
    }

    #[test]
    fn test_weighted_never_picks_zero_weight() {
        let mut fake = FakeData::new(7);
        let table = [("never", 0.0), ("always", 1.0)];
        for _ in 0..1000 {
            assert_eq!(*fake.weighted(&table), "always");
        }
    }

    #[test]
    fn test_weighted_proportions() {
        let mut fake = FakeData::new(3);
        let table = [("a", 0.7), ("b", 0.2), ("c", 0.1)];
        let mut a = 0;
        for _ in 0..20_000 {
            if *fake.weighted(&table) == "a" {
                a += 1;
            }
        }
        let share = a as f64 / 20_000.0;
        assert!((share - 0.7).abs() < 0.02, "share of a was {share}");
    }

    #[test]
    fn test_index_excluding() {
        let mut fake = FakeData::new(1);
        for _ in 0..500 {
            let idx = fake.index_excluding(5, 2);
            assert!(idx < 5);
            assert_ne!(idx, 2);
        }
        assert_eq!(fake.index_excluding(2, 0), 1);
    }

    #[test]
    fn test_distinct_pair() {
        let mut fake = FakeData::new(9);
        for _ in 0..500 {
            let (a, b) = fake.distinct_pair(3);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut fake = FakeData::new(5);
        assert_eq!(fake.int_range(4, 4), 4);
        assert_eq!(fake.float_range(0.0, 0.0), 0.0);
        assert_eq!(fake.gauss(3.0, 0.0), 3.0);
        assert_eq!(fake.exponential(0.0), 0.0);
    }

    #[test]
    fn test_names_come_from_gendered_tables() {
        let mut fake = FakeData::new(5);
        for _ in 0..200 {
            assert!(MALE_FIRST_NAMES.contains(&fake.first_name(Gender::Male)));
            assert!(FEMALE_FIRST_NAMES.contains(&fake.first_name(Gender::Female)));
            assert!(LAST_NAMES.contains(&fake.last_name()));
        }
    }

    #[test]
    fn test_phone_format() {
        let mut fake = FakeData::new(42);
        let phone = fake.customer_phone();
        assert!(phone.starts_with("+1-"));
        assert_eq!(phone.split('-').count(), 4);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(149.6, 0), 150.0);
    }
}
