//! Driving port for category reads.

use async_trait::async_trait;

use crate::domain::{Category, Error, RequestContext};

/// Lists the calling user's categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoriesQuery: Send + Sync {
    /// Every category of the caller, including when each was last used.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID` or a system error.
    async fn list_categories(&self, ctx: RequestContext) -> Result<Vec<Category>, Error>;
}
