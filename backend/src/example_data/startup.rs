//! Startup seeding orchestration.

use std::path::{Path, PathBuf};

use budget_fixtures::{GenerationError, RegistryError, SeedRegistry, generate_example_users};
use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;
use tracing::info;

use crate::example_data::config::ExampleDataSettings;
use crate::example_data::seeder::{
    ExampleDataSeedOutcome, ExampleDataSeeder, ExampleDataSeedingError, SeedingResult,
};

/// Errors returned while executing startup seeding.
#[derive(Debug, Error)]
pub enum StartupSeedingError {
    /// Registry file could not be read.
    #[error("failed to read registry at {path}: {source}")]
    RegistryRead {
        /// Path to the registry file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Registry parsing failed.
    #[error("registry parse error: {0}")]
    Registry(#[from] RegistryError),
    /// The seed could not be expanded into users.
    #[error("example data generation error: {0}")]
    Generation(#[from] GenerationError),
    /// Replaying the users through the services failed.
    #[error("example data seeding error: {0}")]
    Seeding(#[from] ExampleDataSeedingError),
    /// Seed name must not be empty.
    #[error("seed name must not be empty")]
    EmptySeedName,
}

/// Apply example data on startup when enabled.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// use backend::example_data::{ExampleDataSeeder, ExampleDataSettings, seed_example_data_on_startup};
/// use backend::inbound::http::state::HttpState;
/// use backend::outbound::memory::MemoryStore;
/// use mockable::DefaultClock;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = ExampleDataSettings {
///     enabled: false,
///     seed_name: Some("desert-fox".to_owned()),
///     count: None,
///     registry_path: Some(PathBuf::from("fixtures/example-data/seeds.json")),
/// };
/// let state = HttpState::over_store(Arc::new(MemoryStore::new()), Arc::new(DefaultClock));
/// let outcome = seed_example_data_on_startup(&settings, &ExampleDataSeeder::from_state(&state)).await?;
/// assert!(outcome.is_none());
/// # Ok(())
/// # }
/// ```
pub async fn seed_example_data_on_startup(
    settings: &ExampleDataSettings,
    seeder: &ExampleDataSeeder,
) -> Result<Option<ExampleDataSeedOutcome>, StartupSeedingError> {
    if !settings.is_enabled() {
        info!(reason = "disabled", "example data seeding skipped");
        return Ok(None);
    }

    let seed_name = settings.seed_name().trim();
    if seed_name.is_empty() {
        return Err(StartupSeedingError::EmptySeedName);
    }

    let registry = load_registry(&settings.registry_path())?;
    let seed_def = registry.find_seed(seed_name)?;
    let seed_def = settings
        .count
        .map_or_else(|| seed_def.clone(), |count| seed_def.with_user_count(count));
    let users = generate_example_users(&registry, &seed_def)?;

    let outcome = seeder.seed(seed_name, &users).await?;

    match outcome.result {
        SeedingResult::Applied => {
            info!(
                seed_key = %outcome.seed_key,
                user_count = outcome.user_count,
                record_count = outcome.record_count,
                "example data seeding applied"
            );
        }
        SeedingResult::AlreadySeeded => {
            info!(
                seed_key = %outcome.seed_key,
                "example data seed already applied; skipping"
            );
        }
    }

    Ok(Some(outcome))
}

fn load_registry(path: &Path) -> Result<SeedRegistry, StartupSeedingError> {
    let read_error = |source| StartupSeedingError::RegistryRead {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "registry path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let contents = dir.read_to_string(Path::new(file_name)).map_err(read_error)?;
    Ok(SeedRegistry::from_json(&contents)?)
}
