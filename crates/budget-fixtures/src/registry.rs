//! Seed registry types and JSON parsing.
//!
//! The registry holds named seed definitions plus the currency and category
//! pools that generated users draw from. It is loaded from JSON and provides
//! deterministic seed lookups.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::RegistryError;
use crate::validation::{is_valid_currency_code, is_valid_name};

/// Current supported registry version.
const SUPPORTED_VERSION: u32 = 1;

/// Fewest category names a registry may offer.
pub(crate) const MIN_CATEGORY_NAMES: usize = 3;

/// A seed registry containing named seeds and the data pools they use.
///
/// # Example
///
/// ```
/// use budget_fixtures::SeedRegistry;
///
/// let json = r#"{
///     "version": 1,
///     "currencies": ["AED"],
///     "categoryNames": ["Salary", "Savings", "Groceries"],
///     "seeds": [{"name": "test", "seed": 42, "userCount": 5, "months": 2, "startMonth": "2021-01"}]
/// }"#;
///
/// let registry = SeedRegistry::from_json(json).expect("valid registry");
/// assert_eq!(registry.seeds().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRegistry {
    version: u32,
    currencies: Vec<String>,
    category_names: Vec<String>,
    seeds: Vec<SeedDefinition>,
}

impl SeedRegistry {
    /// Parses a seed registry from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if:
    /// - The JSON is malformed or fields are missing
    /// - The version is unsupported
    /// - A currency code or category name is invalid
    /// - Category names are too few or collide ignoring case
    /// - The seeds array is empty or a start month is malformed
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawSeedRegistry =
            serde_json::from_str(json).map_err(|e| RegistryError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a seed registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path).map_err(|e| RegistryError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawSeedRegistry) -> Result<Self, RegistryError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.currencies.is_empty() {
            return Err(RegistryError::EmptyCurrencies);
        }
        if let Some((index, value)) = raw
            .currencies
            .iter()
            .enumerate()
            .find(|(_, code)| !is_valid_currency_code(code))
        {
            return Err(RegistryError::InvalidCurrency {
                index,
                value: value.clone(),
            });
        }

        let category_names = validate_category_names(raw.category_names)?;

        if raw.seeds.is_empty() {
            return Err(RegistryError::EmptySeeds);
        }
        let seeds = raw
            .seeds
            .into_iter()
            .map(SeedDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: raw.version,
            currencies: raw.currencies,
            category_names,
            seeds,
        })
    }

    /// Returns the registry version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the currencies users are assigned from.
    #[must_use]
    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// Returns the category names users pick from.
    #[must_use]
    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    /// Returns all seed definitions.
    #[must_use]
    pub fn seeds(&self) -> &[SeedDefinition] {
        &self.seeds
    }

    /// Finds a seed definition by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SeedNotFound`] if no seed with the given name
    /// exists.
    pub fn find_seed(&self, name: &str) -> Result<&SeedDefinition, RegistryError> {
        self.seeds
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RegistryError::SeedNotFound {
                name: name.to_owned(),
            })
    }
}

fn validate_category_names(names: Vec<String>) -> Result<Vec<String>, RegistryError> {
    if names.len() < MIN_CATEGORY_NAMES {
        return Err(RegistryError::TooFewCategoryNames {
            required: MIN_CATEGORY_NAMES,
            actual: names.len(),
        });
    }
    let mut seen = HashSet::new();
    for (index, name) in names.iter().enumerate() {
        if !is_valid_name(name) {
            return Err(RegistryError::InvalidCategoryName {
                index,
                value: name.clone(),
            });
        }
        if !seen.insert(name.trim().to_lowercase()) {
            return Err(RegistryError::DuplicateCategoryName {
                value: name.clone(),
            });
        }
    }
    Ok(names.into_iter().map(|name| name.trim().to_owned()).collect())
}

/// First simulated month of a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StartMonth {
    year: i32,
    month: u32,
}

impl StartMonth {
    /// Parse a `YYYY-MM` month.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year = year.parse().ok()?;
        let month = month.parse().ok()?;
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month of the year, 1 to 12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The month `offset` months later.
    #[must_use]
    pub fn plus(self, offset: u32) -> Self {
        let zero_based = self.month - 1 + offset;
        let years = i32::try_from(zero_based.div_euclid(12)).unwrap_or(i32::MAX);
        Self {
            year: self.year.saturating_add(years),
            month: zero_based.rem_euclid(12) + 1,
        }
    }
}

impl fmt::Display for StartMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A named seed definition for deterministic data generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDefinition {
    name: String,
    seed: u64,
    user_count: usize,
    months: u32,
    start_month: StartMonth,
}

impl SeedDefinition {
    /// Returns the seed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the RNG seed value.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of users to generate.
    #[must_use]
    pub const fn user_count(&self) -> usize {
        self.user_count
    }

    /// Returns how many consecutive months of activity each user gets.
    #[must_use]
    pub const fn months(&self) -> u32 {
        self.months
    }

    /// Returns the first simulated month.
    #[must_use]
    pub const fn start_month(&self) -> StartMonth {
        self.start_month
    }

    /// A copy generating `user_count` users instead.
    #[must_use]
    pub fn with_user_count(&self, user_count: usize) -> Self {
        Self {
            user_count,
            ..self.clone()
        }
    }
}

impl TryFrom<RawSeedDefinition> for SeedDefinition {
    type Error = RegistryError;

    fn try_from(raw: RawSeedDefinition) -> Result<Self, Self::Error> {
        let start_month =
            StartMonth::parse(&raw.start_month).ok_or_else(|| RegistryError::InvalidStartMonth {
                seed: raw.name.clone(),
                value: raw.start_month.clone(),
            })?;
        Ok(Self {
            name: raw.name,
            seed: raw.seed,
            user_count: raw.user_count,
            months: raw.months,
            start_month,
        })
    }
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeedRegistry {
    version: u32,
    currencies: Vec<String>,
    category_names: Vec<String>,
    seeds: Vec<RawSeedDefinition>,
}

/// Raw JSON representation of a seed definition.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeedDefinition {
    name: String,
    seed: u64,
    user_count: usize,
    months: u32,
    start_month: String,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const VALID_JSON: &str = r#"{
        "version": 1,
        "currencies": ["AED", "EUR"],
        "categoryNames": ["Salary", "Savings", "Groceries", "Transport"],
        "seeds": [
            {"name": "lean-month", "seed": 2021, "userCount": 4, "months": 3, "startMonth": "2021-01"},
            {"name": "busy-year", "seed": 1234, "userCount": 2, "months": 12, "startMonth": "2020-06"}
        ]
    }"#;

    #[rstest]
    fn parses_valid_registry() {
        let registry = SeedRegistry::from_json(VALID_JSON).expect("valid registry");

        assert_eq!(registry.version(), 1);
        assert_eq!(registry.currencies(), ["AED", "EUR"]);
        assert_eq!(registry.category_names().len(), 4);
        assert_eq!(registry.seeds().len(), 2);
    }

    #[rstest]
    fn finds_seed_by_name() {
        let registry = SeedRegistry::from_json(VALID_JSON).expect("valid registry");
        let seed = registry.find_seed("busy-year").expect("seed found");

        assert_eq!(seed.seed(), 1234);
        assert_eq!(seed.user_count(), 2);
        assert_eq!(seed.months(), 12);
        assert_eq!(seed.start_month().to_string(), "2020-06");
    }

    #[rstest]
    #[case::unsupported_version(
        r#"{"version": 2, "currencies": ["AED"], "categoryNames": ["A", "B", "C"], "seeds": []}"#,
        RegistryError::UnsupportedVersion { expected: 1, actual: 2 }
    )]
    #[case::no_currencies(
        r#"{"version": 1, "currencies": [], "categoryNames": ["A", "B", "C"], "seeds": []}"#,
        RegistryError::EmptyCurrencies
    )]
    #[case::lower_case_currency(
        r#"{"version": 1, "currencies": ["AED", "eur"], "categoryNames": ["A", "B", "C"], "seeds": []}"#,
        RegistryError::InvalidCurrency { index: 1, value: "eur".to_owned() }
    )]
    #[case::too_few_categories(
        r#"{"version": 1, "currencies": ["AED"], "categoryNames": ["A", "B"], "seeds": []}"#,
        RegistryError::TooFewCategoryNames { required: 3, actual: 2 }
    )]
    #[case::long_category(
        r#"{"version": 1, "currencies": ["AED"], "categoryNames": ["A", "B", "abcdefghijklmnopqrstuvwxyz"], "seeds": []}"#,
        RegistryError::InvalidCategoryName { index: 2, value: "abcdefghijklmnopqrstuvwxyz".to_owned() }
    )]
    #[case::colliding_categories(
        r#"{"version": 1, "currencies": ["AED"], "categoryNames": ["Health", "Food", "HEALTH"], "seeds": []}"#,
        RegistryError::DuplicateCategoryName { value: "HEALTH".to_owned() }
    )]
    #[case::empty_seeds(
        r#"{"version": 1, "currencies": ["AED"], "categoryNames": ["A", "B", "C"], "seeds": []}"#,
        RegistryError::EmptySeeds
    )]
    #[case::bad_start_month(
        r#"{"version": 1, "currencies": ["AED"], "categoryNames": ["A", "B", "C"],
            "seeds": [{"name": "a", "seed": 1, "userCount": 1, "months": 1, "startMonth": "2021-13"}]}"#,
        RegistryError::InvalidStartMonth { seed: "a".to_owned(), value: "2021-13".to_owned() }
    )]
    fn rejects_invalid_registry(#[case] json: &str, #[case] expected: RegistryError) {
        assert_eq!(SeedRegistry::from_json(json), Err(expected));
    }

    #[rstest]
    #[case("2021-01", 0, "2021-01")]
    #[case("2021-11", 1, "2021-12")]
    #[case("2021-11", 2, "2022-01")]
    #[case("2020-06", 30, "2022-12")]
    fn months_advance_across_years(#[case] start: &str, #[case] offset: u32, #[case] expected: &str) {
        let month = StartMonth::parse(start).expect("month");

        assert_eq!(month.plus(offset).to_string(), expected);
    }

    #[rstest]
    #[case("2021-1")]
    #[case("21-01")]
    #[case("2021-00")]
    #[case("2021/01")]
    fn rejects_malformed_months(#[case] value: &str) {
        assert_eq!(StartMonth::parse(value), None);
    }
}
