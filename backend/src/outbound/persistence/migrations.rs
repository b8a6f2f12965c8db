//! Schema migrations, applied at startup on a blocking connection.

use std::path::{Path, PathBuf};

use diesel::{Connection, PgConnection};
use diesel_migrations::{
    EmbeddedMigrations, FileBasedMigrations, MigrationHarness, embed_migrations,
};
use tracing::info;

/// Migrations compiled into the binary from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures while bringing the schema up to date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The migration connection could not be opened.
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    /// The configured migration directory could not be read.
    #[error("failed to load migrations from {}: {message}", dir.display())]
    Load { dir: PathBuf, message: String },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    /// The blocking migration task did not complete.
    #[error("migration task failed: {message}")]
    Task { message: String },
}

/// Apply every pending migration.
///
/// Reads migrations from `migration_dir` when given, otherwise uses the
/// embedded set. Returns the versions applied by this call.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a
/// migration fails.
pub async fn run_migrations(
    database_url: &str,
    migration_dir: Option<&Path>,
) -> Result<Vec<String>, MigrationError> {
    let url = database_url.to_owned();
    let dir = migration_dir.map(Path::to_path_buf);
    let applied = tokio::task::spawn_blocking(move || apply(&url, dir.as_deref()))
        .await
        .map_err(|err| MigrationError::Task {
            message: err.to_string(),
        })??;
    info!(applied = applied.len(), "schema migrations applied");
    Ok(applied)
}

fn apply(database_url: &str, migration_dir: Option<&Path>) -> Result<Vec<String>, MigrationError> {
    let mut connection =
        PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
            message: err.to_string(),
        })?;
    let applied = match migration_dir {
        Some(dir) => {
            let source = FileBasedMigrations::from_path(dir).map_err(|err| MigrationError::Load {
                dir: dir.to_path_buf(),
                message: err.to_string(),
            })?;
            connection.run_pending_migrations(source)
        }
        None => connection.run_pending_migrations(MIGRATIONS),
    }
    .map_err(|err| MigrationError::Apply {
        message: err.to_string(),
    })?;
    Ok(applied.iter().map(ToString::to_string).collect())
}
