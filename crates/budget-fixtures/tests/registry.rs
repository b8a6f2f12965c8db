//! Integration tests for loading registries from disk and generating from
//! the registry shipped with the backend.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::path::{Path, PathBuf};

use budget_fixtures::{
    AccountKindSeed, RecordKindSeed, RegistryError, SeedRegistry, generate_example_users,
    is_valid_name, is_valid_note,
};
use rstest::{fixture, rstest};

fn shipped_registry_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../backend/fixtures/example-data/seeds.json")
}

#[fixture]
fn shipped_registry() -> SeedRegistry {
    SeedRegistry::from_file(&shipped_registry_path()).expect("shipped registry loads")
}

#[rstest]
fn shipped_registry_is_valid(shipped_registry: SeedRegistry) {
    assert_eq!(shipped_registry.version(), 1);
    assert!(shipped_registry.find_seed("desert-fox").is_ok());
    assert!(shipped_registry.find_seed("quiet-ledger").is_ok());
}

#[rstest]
fn missing_files_are_io_errors() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("does-not-exist.json");

    let result = SeedRegistry::from_file(&path);

    assert!(matches!(result, Err(RegistryError::IoError { path: p, .. }) if p == path));
}

#[rstest]
#[case("desert-fox")]
#[case("quiet-ledger")]
fn shipped_seeds_generate_backend_compatible_users(
    shipped_registry: SeedRegistry,
    #[case] seed_name: &str,
) {
    let seed_def = shipped_registry.find_seed(seed_name).expect("seed exists");

    let users = generate_example_users(&shipped_registry, seed_def).expect("generated");

    assert_eq!(users.len(), seed_def.user_count());
    for user in &users {
        assert!(user.account(AccountKindSeed::Current).is_some());
        assert!(user.account(AccountKindSeed::Saving).is_some());
        assert!(user.categories.iter().all(|name| is_valid_name(name)));
        assert!(user.records.iter().all(|record| is_valid_note(&record.note)));
        let transfers = user
            .records
            .iter()
            .filter(|record| record.kind == RecordKindSeed::Transfer)
            .count();
        assert_eq!(transfers, usize::try_from(seed_def.months()).expect("fits"));
    }
}

#[rstest]
fn user_count_overrides_keep_the_sequence(shipped_registry: SeedRegistry) {
    let seed_def = shipped_registry.find_seed("desert-fox").expect("seed exists");

    let all = generate_example_users(&shipped_registry, seed_def).expect("generated");
    let fewer = generate_example_users(&shipped_registry, &seed_def.with_user_count(2))
        .expect("generated");

    assert_eq!(fewer.as_slice(), all.get(..2).expect("at least two users"));
}
