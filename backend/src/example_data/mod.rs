//! Startup wiring for example data seeding.

mod config;
mod seeder;
mod startup;

pub use config::ExampleDataSettings;
pub use seeder::{
    ExampleDataSeedOutcome, ExampleDataSeeder, ExampleDataSeedingError, SeedingResult,
};
pub use startup::{StartupSeedingError, seed_example_data_on_startup};
