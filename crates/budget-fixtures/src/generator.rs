//! Deterministic user generation from seed definitions.
//!
//! The same seed definition and registry always produce identical output.

use std::ops::RangeInclusive;

use fake::Fake;
use fake::faker::company::raw::CompanyName;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::GenerationError;
use crate::registry::{MIN_CATEGORY_NAMES, SeedDefinition, SeedRegistry, StartMonth};
use crate::seed::{
    AccountKindSeed, ExampleAccountSeed, ExampleRecordSeed, ExampleUserSeed, RecordKindSeed,
};
use crate::validation::{NOTE_MAX, email_local_part, truncate_chars};

/// Maximum number of attempts to generate a usable person name.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Most categories a user is given.
const MAX_CATEGORIES: usize = 6;

const EXPENSES_PER_MONTH: RangeInclusive<usize> = 3..=10;
const SALARY: RangeInclusive<i64> = 300_000..=900_000;
const EXPENSE: RangeInclusive<i64> = 500..=25_000;
const SAVING: RangeInclusive<i64> = 50_000..=150_000;

/// Expenses fall on days every month has.
const EXPENSE_DAYS: RangeInclusive<u32> = 2..=27;
const TRANSFER_DAY: u32 = 28;

const CURRENT_NAMES: [&str; 4] = ["Everyday", "Main", "Checking", "Wallet"];
const SAVING_NAMES: [&str; 4] = ["Rainy day", "Savings", "Nest egg", "Holiday fund"];

const EMAIL_DOMAIN: &str = "example.com";

/// Generates example users from a seed definition.
///
/// Uses the seed's `seed` value to initialise a deterministic RNG. Every
/// generated user has:
///
/// - A unique email address
/// - A Current and a Saving account sharing one currency from the registry
/// - Between three and six categories from the registry
/// - For each simulated month: a salary on day 1, three to ten expenses and
///   one transfer from Current to Saving
///
/// The first category files salaries and the second files transfers;
/// expenses use the rest.
///
/// # Errors
///
/// Returns [`GenerationError`] if:
/// - Name generation fails after maximum retries
/// - The seed simulates no months
///
/// # Example
///
/// ```
/// use budget_fixtures::{SeedRegistry, generate_example_users};
///
/// let json = r#"{
///     "version": 1,
///     "currencies": ["AED"],
///     "categoryNames": ["Salary", "Savings", "Groceries"],
///     "seeds": [{"name": "test", "seed": 42, "userCount": 3, "months": 2, "startMonth": "2021-01"}]
/// }"#;
///
/// let registry = SeedRegistry::from_json(json).expect("valid");
/// let seed_def = registry.find_seed("test").expect("found");
/// let users = generate_example_users(&registry, seed_def).expect("generated");
///
/// assert_eq!(users.len(), 3);
/// // Same seed produces identical users
/// let users2 = generate_example_users(&registry, seed_def).expect("generated");
/// assert_eq!(users, users2);
/// ```
pub fn generate_example_users(
    registry: &SeedRegistry,
    seed_def: &SeedDefinition,
) -> Result<Vec<ExampleUserSeed>, GenerationError> {
    if seed_def.months() == 0 {
        return Err(GenerationError::NoMonths {
            seed: seed_def.name().to_owned(),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed_def.seed());
    (0..seed_def.user_count())
        .map(|index| generate_single_user(&mut rng, registry, seed_def, index))
        .collect()
}

fn generate_single_user(
    rng: &mut ChaCha8Rng,
    registry: &SeedRegistry,
    seed_def: &SeedDefinition,
    index: usize,
) -> Result<ExampleUserSeed, GenerationError> {
    let email = generate_email(rng, index)?;
    let currency = registry
        .currencies()
        .choose(rng)
        .cloned()
        .unwrap_or_default();
    let accounts = vec![
        ExampleAccountSeed {
            name: pick(rng, &CURRENT_NAMES).to_owned(),
            kind: AccountKindSeed::Current,
        },
        ExampleAccountSeed {
            name: pick(rng, &SAVING_NAMES).to_owned(),
            kind: AccountKindSeed::Saving,
        },
    ];
    let categories = select_subset(
        rng,
        registry.category_names(),
        MIN_CATEGORY_NAMES,
        MAX_CATEGORIES,
    );

    let mut records = Vec::new();
    for offset in 0..seed_def.months() {
        let month = seed_def.start_month().plus(offset);
        records.extend(generate_month(rng, month, &categories));
    }
    records.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(ExampleUserSeed {
        email,
        currency,
        accounts,
        categories,
        records,
    })
}

fn generate_month(
    rng: &mut ChaCha8Rng,
    month: StartMonth,
    categories: &[String],
) -> Vec<ExampleRecordSeed> {
    let [salary_category, saving_category, spending @ ..] = categories else {
        return Vec::new();
    };

    let mut records = vec![ExampleRecordSeed {
        note: "Salary".to_owned(),
        category: salary_category.clone(),
        value: rng.random_range(SALARY),
        date: timestamp(month, 1, 9, 0),
        kind: RecordKindSeed::Income,
    }];

    let expenses = rng.random_range(EXPENSES_PER_MONTH);
    for _ in 0..expenses {
        let company: String = CompanyName(EN).fake_with_rng(rng);
        let category = spending.choose(rng).unwrap_or(salary_category);
        records.push(ExampleRecordSeed {
            note: truncate_chars(&company, NOTE_MAX),
            category: category.clone(),
            value: rng.random_range(EXPENSE),
            date: timestamp(
                month,
                rng.random_range(EXPENSE_DAYS),
                rng.random_range(8..=21),
                rng.random_range(0..60),
            ),
            kind: RecordKindSeed::Expense,
        });
    }

    records.push(ExampleRecordSeed {
        note: "Monthly saving".to_owned(),
        category: saving_category.clone(),
        value: rng.random_range(SAVING),
        date: timestamp(month, TRANSFER_DAY, 18, 0),
        kind: RecordKindSeed::Transfer,
    });
    records
}

/// Generates `first.last.index@example.com` from a fake person name.
///
/// Retries up to `MAX_NAME_ATTEMPTS` times when the name has no ASCII
/// letters left after clean-up. The index keeps addresses unique.
fn generate_email(rng: &mut ChaCha8Rng, index: usize) -> Result<String, GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let first: String = FirstName(EN).fake_with_rng(rng);
        let last: String = LastName(EN).fake_with_rng(rng);
        let first = email_local_part(&first);
        let last = email_local_part(&last);

        if !first.is_empty() && !last.is_empty() {
            return Ok(format!("{first}.{last}.{index}@{EMAIL_DOMAIN}"));
        }
    }

    Err(GenerationError::NameGenerationFailed {
        max_attempts: MAX_NAME_ATTEMPTS,
    })
}

fn timestamp(month: StartMonth, day: u32, hour: u32, minute: u32) -> String {
    format!(
        "{:04}-{:02}-{day:02}T{hour:02}:{minute:02}:00Z",
        month.year(),
        month.month()
    )
}

fn pick<'a>(rng: &mut ChaCha8Rng, names: &[&'a str]) -> &'a str {
    names.choose(rng).copied().unwrap_or_default()
}

/// Selects a deterministic subset of names.
///
/// The selection count is determined by the RNG state, bounded by
/// `min_count` and `max_count` and clamped to the names available.
fn select_subset(
    rng: &mut ChaCha8Rng,
    names: &[String],
    min_count: usize,
    max_count: usize,
) -> Vec<String> {
    let clamped_min = min_count.min(names.len());
    let clamped_max = max_count.min(names.len());

    let count = if clamped_min == clamped_max {
        clamped_min
    } else {
        rng.random_range(clamped_min..=clamped_max)
    };

    let mut shuffled = names.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::validation::{is_valid_name, is_valid_note};

    const TEST_REGISTRY_JSON: &str = r#"{
        "version": 1,
        "currencies": ["AED", "EUR", "USD"],
        "categoryNames": ["Salary", "Savings", "Groceries", "Transport", "Health", "Eating out", "Utilities"],
        "seeds": [
            {"name": "test-seed", "seed": 42, "userCount": 10, "months": 3, "startMonth": "2020-11"},
            {"name": "small-seed", "seed": 123, "userCount": 2, "months": 1, "startMonth": "2021-01"},
            {"name": "idle-seed", "seed": 7, "userCount": 1, "months": 0, "startMonth": "2021-01"}
        ]
    }"#;

    #[fixture]
    fn test_registry() -> SeedRegistry {
        SeedRegistry::from_json(TEST_REGISTRY_JSON).expect("valid test registry")
    }

    fn users(registry: &SeedRegistry, seed_name: &str) -> Vec<ExampleUserSeed> {
        let seed_def = registry.find_seed(seed_name).expect("seed should be found");
        generate_example_users(registry, seed_def).expect("generation should succeed")
    }

    #[rstest]
    fn generation_is_deterministic(test_registry: SeedRegistry) {
        let first = users(&test_registry, "test-seed");
        let second = users(&test_registry, "test-seed");

        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
    }

    #[rstest]
    fn different_seeds_produce_different_users(test_registry: SeedRegistry) {
        let first = users(&test_registry, "test-seed");
        let second = users(&test_registry, "small-seed");

        assert_ne!(first.first(), second.first());
    }

    #[rstest]
    fn emails_are_unique(test_registry: SeedRegistry) {
        let generated = users(&test_registry, "test-seed");
        let emails: HashSet<_> = generated.iter().map(|user| user.email.as_str()).collect();

        assert_eq!(emails.len(), generated.len());
        assert!(emails.iter().all(|email| email.ends_with("@example.com")));
    }

    #[rstest]
    fn users_get_one_current_and_one_saving_account(test_registry: SeedRegistry) {
        for user in users(&test_registry, "test-seed") {
            assert!(user.account(AccountKindSeed::Current).is_some());
            assert!(user.account(AccountKindSeed::Saving).is_some());
            assert!(user.accounts.iter().all(|account| is_valid_name(&account.name)));
            assert!(test_registry.currencies().contains(&user.currency));
        }
    }

    #[rstest]
    fn categories_are_a_registry_subset(test_registry: SeedRegistry) {
        for user in users(&test_registry, "test-seed") {
            assert!((MIN_CATEGORY_NAMES..=MAX_CATEGORIES).contains(&user.categories.len()));
            assert!(
                user.categories
                    .iter()
                    .all(|name| test_registry.category_names().contains(name))
            );
            assert!(
                user.records
                    .iter()
                    .all(|record| user.categories.contains(&record.category))
            );
        }
    }

    #[rstest]
    fn every_month_has_salary_expenses_and_a_transfer(test_registry: SeedRegistry) {
        for user in users(&test_registry, "test-seed") {
            for month in ["2020-11", "2020-12", "2021-01"] {
                let in_month: Vec<_> = user
                    .records
                    .iter()
                    .filter(|record| record.date.starts_with(month))
                    .collect();
                let count = |kind| in_month.iter().filter(|r| r.kind == kind).count();

                assert_eq!(count(RecordKindSeed::Income), 1);
                assert_eq!(count(RecordKindSeed::Transfer), 1);
                assert!(EXPENSES_PER_MONTH.contains(&count(RecordKindSeed::Expense)));
                assert!(
                    in_month
                        .iter()
                        .any(|r| r.kind == RecordKindSeed::Income
                            && r.date == format!("{month}-01T09:00:00Z"))
                );
            }
        }
    }

    #[rstest]
    fn records_are_valid_and_ordered(test_registry: SeedRegistry) {
        for user in users(&test_registry, "test-seed") {
            assert!(user.records.iter().all(|record| record.value > 0));
            assert!(user.records.iter().all(|record| is_valid_note(&record.note)));
            assert!(user.records.windows(2).all(|pair| match pair {
                [a, b] => a.date <= b.date,
                _ => true,
            }));
        }
    }

    #[rstest]
    fn seeds_without_months_are_rejected(test_registry: SeedRegistry) {
        let seed_def = test_registry.find_seed("idle-seed").expect("seed found");

        assert_eq!(
            generate_example_users(&test_registry, seed_def),
            Err(GenerationError::NoMonths {
                seed: "idle-seed".to_owned()
            })
        );
    }

    #[rstest]
    fn select_subset_respects_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let names: Vec<String> = (0..10).map(|n| format!("Category {n}")).collect();

        for _ in 0..100 {
            let subset = select_subset(&mut rng, &names, 3, 6);
            assert!((3..=6).contains(&subset.len()), "size {}", subset.len());
        }
    }
}
