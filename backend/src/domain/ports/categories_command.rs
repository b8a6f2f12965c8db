//! Driving port for category writes.

use async_trait::async_trait;

use crate::domain::{Category, CategoryId, Error, RequestContext};

/// One category to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Name; stored title-cased.
    pub name: String,
}

/// Rename a category under an optimistic version check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCategoryRequest {
    /// Category to rename.
    pub category_id: CategoryId,
    /// New name.
    pub name: String,
    /// Version the caller last read.
    pub expected_version: u32,
}

/// Creates and renames categories for the calling user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoriesCommand: Send + Sync {
    /// Create every category in one transaction.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID`, `CATEGORY_VALIDATION_FAILED`,
    /// `CATEGORY_NAME_DUPLICATED`, or a system error.
    async fn create_categories(
        &self,
        ctx: RequestContext,
        categories: Vec<NewCategory>,
    ) -> Result<Vec<Category>, Error>;

    /// Rename a category, bumping its version.
    ///
    /// # Errors
    ///
    /// `CATEGORIES_NOT_FOUND`, `CATEGORY_NAME_DUPLICATED`, or
    /// `DATABASE_STATE` when the version is stale.
    async fn update_category(
        &self,
        ctx: RequestContext,
        request: UpdateCategoryRequest,
    ) -> Result<Category, Error>;
}
