//! Per-request caller context handed to driving ports.

use crate::domain::{AccountId, Error, UpdatedBy, UserId};

/// Identity of the caller and the account a request is scoped to.
///
/// Either may be absent; services ask for what they need and fail with the
/// matching `SERVICE_REQUIRED_*` code.
///
/// # Examples
/// ```
/// use backend::domain::{ErrorCode, RequestContext, UserId};
///
/// let ctx = RequestContext::anonymous();
/// assert_eq!(ctx.require_user().unwrap_err().code(), ErrorCode::ServiceRequiredUserId);
///
/// let ctx = RequestContext::for_user(UserId::new(1).expect("valid id"));
/// assert!(ctx.require_user().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    user_id: Option<UserId>,
    account_id: Option<AccountId>,
}

impl RequestContext {
    /// No caller identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            account_id: None,
        }
    }

    /// Context for an identified caller.
    #[must_use]
    pub const fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            account_id: None,
        }
    }

    /// Scope the request to an account.
    #[must_use]
    pub const fn with_account(self, account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..self
        }
    }

    /// Caller identity, if present.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Scoped account, if present.
    #[must_use]
    pub const fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    /// The caller identity.
    ///
    /// # Errors
    ///
    /// [`Error::service_required_user_id`] when absent.
    pub fn require_user(&self) -> Result<UserId, Error> {
        self.user_id
            .ok_or_else(|| Error::service_required_user_id("caller identity is required"))
    }

    /// The scoped account.
    ///
    /// # Errors
    ///
    /// [`Error::service_required_account_id`] when absent.
    pub fn require_account(&self) -> Result<AccountId, Error> {
        self.account_id
            .ok_or_else(|| Error::service_required_account_id("account id is required"))
    }

    /// Audit principal for writes made on behalf of the caller.
    #[must_use]
    pub const fn principal(&self) -> UpdatedBy {
        match self.user_id {
            Some(id) => UpdatedBy::user(id),
            None => UpdatedBy::ZERO,
        }
    }
}
