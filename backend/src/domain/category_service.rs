//! Category creation, renaming and listing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    CategoriesCommand, CategoriesQuery, NewCategory, Sequence, Store, StoreError,
    StoreTransaction, UpdateCategoryRequest,
};
use crate::domain::transaction::{begin, finish, mint, store_error};
use crate::domain::{AuditInfo, Category, CategoryId, Error, RequestContext, UpdatedBy, UserId};

/// Manages the caller's categories through a [`Store`].
#[derive(Clone)]
pub struct CategoryService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> CategoryService<S> {
    /// Create a service over `store`, stamping audit times from `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S: Store> CategoryService<S> {
    async fn create(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        categories: &[NewCategory],
    ) -> Result<Vec<Category>, Error> {
        let audit = AuditInfo::make_for_creation(UpdatedBy::user(owner), self.clock.utc());
        let mut created = Vec::with_capacity(categories.len());
        for category in categories {
            let id: CategoryId = mint(tx, Sequence::Category).await?;
            created.push(Category::new(id, &category.name, audit)?);
        }
        tx.insert_categories(owner, &created)
            .await
            .map_err(|err| duplicate_name(err, &created))?;
        info!(user_id = %owner, count = created.len(), "categories created");
        Ok(created)
    }

    async fn rename(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        request: &UpdateCategoryRequest,
    ) -> Result<Category, Error> {
        let current = tx
            .find_category(owner, request.category_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| not_found(request.category_id))?;
        let renamed = current.renamed(&request.name, UpdatedBy::user(owner), self.clock.utc())?;
        tx.update_category(owner, &renamed, request.expected_version)
            .await
            .map_err(|err| duplicate_name(err, std::slice::from_ref(&renamed)))?;
        info!(
            user_id = %owner,
            category_id = %renamed.id(),
            version = renamed.audit().version(),
            "category renamed"
        );
        Ok(renamed)
    }
}

/// The error for a category the caller does not own.
pub(crate) fn not_found(id: CategoryId) -> Error {
    Error::categories_not_found(format!("category {id} does not exist"))
        .with_field("category", "no such category")
}

fn duplicate_name(err: StoreError, categories: &[Category]) -> Error {
    let Some(key) = err.duplicate_key() else {
        return store_error(err);
    };
    let names = key.value("name").map_or_else(
        || {
            categories
                .iter()
                .map(Category::name)
                .collect::<Vec<_>>()
                .join(", ")
        },
        str::to_owned,
    );
    Error::category_name_duplicated(format!("category names already exist: {names}"))
        .with_field("name", "already exists")
}

#[async_trait]
impl<S: Store> CategoriesCommand for CategoryService<S> {
    async fn create_categories(
        &self,
        ctx: RequestContext,
        categories: Vec<NewCategory>,
    ) -> Result<Vec<Category>, Error> {
        let owner = ctx.require_user()?;
        if categories.is_empty() {
            debug!(user_id = %owner, "no categories to create");
            return Ok(Vec::new());
        }
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.create(tx.as_mut(), owner, &categories).await;
        finish(tx, outcome).await
    }

    async fn update_category(
        &self,
        ctx: RequestContext,
        request: UpdateCategoryRequest,
    ) -> Result<Category, Error> {
        let owner = ctx.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.rename(tx.as_mut(), owner, &request).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl<S: Store> CategoriesQuery for CategoryService<S> {
    async fn list_categories(&self, ctx: RequestContext) -> Result<Vec<Category>, Error> {
        let owner = ctx.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = tx.list_categories(owner).await.map_err(store_error);
        finish(tx, outcome).await
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ErrorCode;
    use crate::outbound::memory::MemoryStore;
    use crate::test_support::fixture_clock;

    #[fixture]
    fn service() -> CategoryService<MemoryStore> {
        CategoryService::new(Arc::new(MemoryStore::new()), fixture_clock())
    }

    fn caller() -> RequestContext {
        RequestContext::for_user(UserId::new(1).expect("valid id"))
    }

    fn named(names: &[&str]) -> Vec<NewCategory> {
        names
            .iter()
            .map(|name| NewCategory {
                name: (*name).to_owned(),
            })
            .collect()
    }

    #[rstest]
    #[tokio::test]
    async fn names_are_title_cased(service: CategoryService<MemoryStore>) {
        let created = service
            .create_categories(caller(), named(&["salary", "HEALTH"]))
            .await
            .expect("categories created");

        let names: Vec<&str> = created.iter().map(Category::name).collect();
        assert_eq!(names, vec!["Salary", "Health"]);
        assert!(created.iter().all(|category| category.last_used_at().is_none()));
    }

    #[rstest]
    #[tokio::test]
    async fn case_variants_collide(service: CategoryService<MemoryStore>) {
        service
            .create_categories(caller(), named(&["health"]))
            .await
            .expect("first category");

        let err = service
            .create_categories(caller(), named(&["HEALTH"]))
            .await
            .expect_err("duplicate name");

        assert_eq!(err.code(), ErrorCode::CategoryNameDuplicated);
        assert!(err.detail().contains("Health"));
    }

    #[rstest]
    #[case("")]
    #[case("abcdefghijklmnopqrstuvwxyz")]
    #[tokio::test]
    async fn names_outside_the_length_limits_are_rejected(
        service: CategoryService<MemoryStore>,
        #[case] name: &str,
    ) {
        let err = service
            .create_categories(caller(), named(&[name]))
            .await
            .expect_err("invalid name");

        assert_eq!(err.code(), ErrorCode::CategoryValidationFailed);
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_keeps_the_last_use(service: CategoryService<MemoryStore>) {
        let created = service
            .create_categories(caller(), named(&["Food"]))
            .await
            .expect("category created");
        let id = created.first().map(Category::id).expect("one category");

        let renamed = service
            .update_category(
                caller(),
                UpdateCategoryRequest {
                    category_id: id,
                    name: "groceries".to_owned(),
                    expected_version: 1,
                },
            )
            .await
            .expect("renamed");
        let listed = service.list_categories(caller()).await.expect("listing");

        assert_eq!(renamed.name(), "Groceries");
        assert_eq!(renamed.audit().version(), 2);
        assert_eq!(listed, vec![renamed]);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_categories_are_not_found(service: CategoryService<MemoryStore>) {
        let err = service
            .update_category(
                caller(),
                UpdateCategoryRequest {
                    category_id: CategoryId::new(9).expect("valid id"),
                    name: "Food".to_owned(),
                    expected_version: 1,
                },
            )
            .await
            .expect_err("missing category");

        assert_eq!(err.code(), ErrorCode::CategoriesNotFound);
    }
}
