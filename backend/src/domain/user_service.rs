//! User registration service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CreateUserRequest, Sequence, Store, StoreError, StoreTransaction, UsersCommand,
};
use crate::domain::transaction::{begin, finish, mint, store_error};
use crate::domain::{AuditInfo, Error, UpdatedBy, User, UserId};

/// Registers users through a [`Store`].
#[derive(Clone)]
pub struct UserService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> UserService<S> {
    /// Create a service over `store`, stamping audit times from `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S: Store> UserService<S> {
    async fn register(
        &self,
        tx: &mut dyn StoreTransaction,
        request: &CreateUserRequest,
    ) -> Result<User, Error> {
        let id: UserId = mint(tx, Sequence::User).await?;
        let audit = AuditInfo::make_for_creation(UpdatedBy::user(id), self.clock.utc());
        let user = User::new(id, &request.email, audit)?;
        tx.insert_user(&user)
            .await
            .map_err(|err| duplicate_user(err, &user))?;
        info!(user_id = %id, "user created");
        Ok(user)
    }
}

const EMAIL_KEY: &str = "users_email_key";

fn duplicate_user(err: StoreError, user: &User) -> Error {
    match err.duplicate_key() {
        Some(key) if key.constraint() == EMAIL_KEY || key.value("email").is_some() => {
            Error::user_email_duplicated(format!("'{}' is already registered", user.email()))
                .with_field("email", "already registered")
        }
        Some(_) => Error::user_id_duplicated(format!("user {} already exists", user.id())),
        None => store_error(err),
    }
}

#[async_trait]
impl<S: Store> UsersCommand for UserService<S> {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.register(tx.as_mut(), &request).await;
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
