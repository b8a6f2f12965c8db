//! Account creation, renaming and listing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountsCommand, AccountsQuery, NewAccount, Sequence, Store, StoreError, StoreTransaction,
    UpdateAccountRequest,
};
use crate::domain::transaction::{begin, finish, mint, store_error};
use crate::domain::{
    Account, AccountBalance, AccountId, AuditInfo, Error, RequestContext, UpdatedBy, UserId,
};

/// Manages the caller's accounts through a [`Store`].
#[derive(Clone)]
pub struct AccountService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> AccountService<S> {
    /// Create a service over `store`, stamping audit times from `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S: Store> AccountService<S> {
    async fn create(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        accounts: &[NewAccount],
    ) -> Result<Vec<Account>, Error> {
        let audit = AuditInfo::make_for_creation(UpdatedBy::user(owner), self.clock.utc());
        let mut created = Vec::with_capacity(accounts.len());
        for account in accounts {
            let id: AccountId = mint(tx, Sequence::Account).await?;
            created.push(Account::try_from_strings(
                id,
                &account.name,
                &account.account_type,
                &account.currency,
                audit,
            )?);
        }
        tx.insert_accounts(owner, &created)
            .await
            .map_err(|err| duplicate_name(err, &created))?;
        info!(user_id = %owner, count = created.len(), "accounts created");
        Ok(created)
    }

    async fn rename(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        request: &UpdateAccountRequest,
    ) -> Result<Account, Error> {
        let current = tx
            .find_account(owner, request.account_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| not_found(request.account_id))?;
        let renamed = current.renamed(&request.name, UpdatedBy::user(owner), self.clock.utc())?;
        tx.update_account(owner, &renamed, request.expected_version)
            .await
            .map_err(|err| duplicate_name(err, std::slice::from_ref(&renamed)))?;
        info!(
            user_id = %owner,
            account_id = %renamed.id(),
            version = renamed.audit().version(),
            "account renamed"
        );
        Ok(renamed)
    }
}

/// The error for an account the caller does not own.
pub(crate) fn not_found(id: AccountId) -> Error {
    Error::account_not_found(format!("account {id} does not exist"))
        .with_field("accountId", "no such account")
}

fn duplicate_name(err: StoreError, accounts: &[Account]) -> Error {
    let Some(key) = err.duplicate_key() else {
        return store_error(err);
    };
    let names = match key.value("name") {
        Some(name) => name.to_owned(),
        None => accounts
            .iter()
            .map(Account::name)
            .collect::<Vec<_>>()
            .join(", "),
    };
    Error::account_name_duplicated(format!("account names already exist: {names}"))
        .with_field("name", "already exists")
}

#[async_trait]
impl<S: Store> AccountsCommand for AccountService<S> {
    async fn create_accounts(
        &self,
        ctx: RequestContext,
        accounts: Vec<NewAccount>,
    ) -> Result<Vec<Account>, Error> {
        let owner = ctx.require_user()?;
        if accounts.is_empty() {
            debug!(user_id = %owner, "no accounts to create");
            return Ok(Vec::new());
        }
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.create(tx.as_mut(), owner, &accounts).await;
        finish(tx, outcome).await
    }

    async fn update_account(
        &self,
        ctx: RequestContext,
        request: UpdateAccountRequest,
    ) -> Result<Account, Error> {
        let owner = ctx.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.rename(tx.as_mut(), owner, &request).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl<S: Store> AccountsQuery for AccountService<S> {
    async fn list_accounts(&self, ctx: RequestContext) -> Result<Vec<AccountBalance>, Error> {
        let owner = ctx.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = tx.list_account_balances(owner).await.map_err(store_error);
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
