//! Replays generated example users through the driving ports.
//!
//! Seeding goes through the same services as HTTP requests, so every
//! generated record is validated, balanced and audited like a real one.

use std::collections::HashMap;
use std::sync::Arc;

use budget_fixtures::{AccountKindSeed, ExampleRecordSeed, ExampleUserSeed, RecordKindSeed};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountsCommand, AmountInput, CategoriesCommand, CreateRecordRequest, CreateUserRequest,
    NewAccount, NewCategory, RecordsCommand, UsersCommand,
};
use crate::domain::{AccountId, CategoryId, Error, ErrorCode, RequestContext, title_case};
use crate::inbound::http::state::HttpState;

/// Whether a seeding run wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingResult {
    /// At least one user was created.
    Applied,
    /// Every generated user already existed.
    AlreadySeeded,
}

/// Summary of a seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleDataSeedOutcome {
    /// Seed name the users were generated from.
    pub seed_key: String,
    /// Users created by this run.
    pub user_count: usize,
    /// Records created by this run, counting both halves of a transfer once.
    pub record_count: usize,
    /// Applied or skipped.
    pub result: SeedingResult,
}

/// Failures while replaying generated users.
#[derive(Debug, Error)]
pub enum ExampleDataSeedingError {
    /// A service rejected generated data.
    #[error("seeding {email} failed: {source}")]
    Service {
        /// Email of the user being seeded.
        email: String,
        /// Domain error raised by the service.
        #[source]
        source: Error,
    },
    /// A generated user lacks an account of the given kind.
    #[error("generated user {email} has no {kind} account")]
    MissingAccount { email: String, kind: &'static str },
    /// A record names a category the user was not given.
    #[error("generated user {email} has no category {name}")]
    MissingCategory { email: String, name: String },
}

/// Replays generated users through the driving ports.
#[derive(Clone)]
pub struct ExampleDataSeeder {
    users: Arc<dyn UsersCommand>,
    accounts: Arc<dyn AccountsCommand>,
    categories: Arc<dyn CategoriesCommand>,
    records: Arc<dyn RecordsCommand>,
}

struct SeededAccounts {
    current: AccountId,
    saving: AccountId,
}

impl ExampleDataSeeder {
    /// Seeder over explicit ports.
    pub fn new(
        users: Arc<dyn UsersCommand>,
        accounts: Arc<dyn AccountsCommand>,
        categories: Arc<dyn CategoriesCommand>,
        records: Arc<dyn RecordsCommand>,
    ) -> Self {
        Self {
            users,
            accounts,
            categories,
            records,
        }
    }

    /// Seeder over the ports the HTTP adapter uses.
    pub fn from_state(state: &HttpState) -> Self {
        Self::new(
            Arc::clone(&state.users),
            Arc::clone(&state.accounts),
            Arc::clone(&state.categories),
            Arc::clone(&state.records),
        )
    }

    /// Create every user with its accounts, categories and records.
    ///
    /// Users whose email is already registered are skipped, so replaying a
    /// seed twice reports [`SeedingResult::AlreadySeeded`].
    ///
    /// # Errors
    ///
    /// Returns [`ExampleDataSeedingError`] on the first rejected write.
    pub async fn seed(
        &self,
        seed_key: &str,
        users: &[ExampleUserSeed],
    ) -> Result<ExampleDataSeedOutcome, ExampleDataSeedingError> {
        let mut user_count = 0;
        let mut record_count = 0;
        for user in users {
            if let Some(records) = self.seed_user(user).await? {
                user_count += 1;
                record_count += records;
            }
        }
        let result = if user_count == 0 && !users.is_empty() {
            SeedingResult::AlreadySeeded
        } else {
            SeedingResult::Applied
        };
        Ok(ExampleDataSeedOutcome {
            seed_key: seed_key.to_owned(),
            user_count,
            record_count,
            result,
        })
    }

    /// Returns the number of records written, or `None` when the user
    /// already exists.
    async fn seed_user(
        &self,
        user: &ExampleUserSeed,
    ) -> Result<Option<usize>, ExampleDataSeedingError> {
        let service_error = |source| ExampleDataSeedingError::Service {
            email: user.email.clone(),
            source,
        };

        let created = match self
            .users
            .create_user(CreateUserRequest {
                email: user.email.clone(),
            })
            .await
        {
            Ok(created) => created,
            Err(err) if err.code() == ErrorCode::UserEmailDuplicated => {
                debug!(email = %user.email, "example user already exists");
                return Ok(None);
            }
            Err(err) => return Err(service_error(err)),
        };
        let ctx = RequestContext::for_user(created.id());

        let accounts = self.seed_accounts(ctx, user).await?;
        let categories = self
            .categories
            .create_categories(
                ctx,
                user.categories
                    .iter()
                    .map(|name| NewCategory { name: name.clone() })
                    .collect(),
            )
            .await
            .map_err(service_error)?
            .into_iter()
            .map(|category| (category.name().to_owned(), category.id()))
            .collect::<HashMap<_, _>>();

        for record in &user.records {
            let request = record_request(user, record, &accounts, &categories)?;
            self.records
                .create_record(ctx.with_account(accounts.current), request)
                .await
                .map_err(service_error)?;
        }

        info!(
            user_id = %created.id(),
            records = user.records.len(),
            "example user seeded"
        );
        Ok(Some(user.records.len()))
    }

    async fn seed_accounts(
        &self,
        ctx: RequestContext,
        user: &ExampleUserSeed,
    ) -> Result<SeededAccounts, ExampleDataSeedingError> {
        let account_name = |kind: AccountKindSeed| {
            user.account(kind)
                .map(|account| account.name.clone())
                .ok_or_else(|| ExampleDataSeedingError::MissingAccount {
                    email: user.email.clone(),
                    kind: kind.as_str(),
                })
        };
        let current = account_name(AccountKindSeed::Current)?;
        let saving = account_name(AccountKindSeed::Saving)?;

        let created = self
            .accounts
            .create_accounts(
                ctx,
                [
                    (current, AccountKindSeed::Current),
                    (saving, AccountKindSeed::Saving),
                ]
                .into_iter()
                .map(|(name, kind)| NewAccount {
                    name,
                    currency: user.currency.clone(),
                    account_type: kind.as_str().to_owned(),
                })
                .collect(),
            )
            .await
            .map_err(|source| ExampleDataSeedingError::Service {
                email: user.email.clone(),
                source,
            })?;

        match created.as_slice() {
            [current, saving] => Ok(SeededAccounts {
                current: current.id(),
                saving: saving.id(),
            }),
            _ => Err(ExampleDataSeedingError::MissingAccount {
                email: user.email.clone(),
                kind: AccountKindSeed::Current.as_str(),
            }),
        }
    }
}

fn record_request(
    user: &ExampleUserSeed,
    record: &ExampleRecordSeed,
    accounts: &SeededAccounts,
    categories: &HashMap<String, CategoryId>,
) -> Result<CreateRecordRequest, ExampleDataSeedingError> {
    let category_id = categories
        .get(&title_case(&record.category))
        .copied()
        .ok_or_else(|| ExampleDataSeedingError::MissingCategory {
            email: user.email.clone(),
            name: record.category.clone(),
        })?;
    let beneficiary_account_id =
        (record.kind == RecordKindSeed::Transfer).then_some(accounts.saving);
    Ok(CreateRecordRequest {
        note: record.note.clone(),
        category_id,
        amount: AmountInput {
            currency: user.currency.clone(),
            value: record.value,
        },
        date: record.date.clone(),
        record_type: record.kind.as_str().to_owned(),
        beneficiary_account_id,
    })
}
