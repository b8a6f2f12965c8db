//! Driving port for user registration.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Request to register a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Email address, optionally in `Name <addr>` form.
    pub email: String,
}

/// Registers users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create a user with a fresh id.
    ///
    /// # Errors
    ///
    /// `USER_EMAIL_INVALID` for malformed addresses,
    /// `USER_EMAIL_DUPLICATED` when the address is taken, and system errors
    /// for store failures.
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error>;
}
