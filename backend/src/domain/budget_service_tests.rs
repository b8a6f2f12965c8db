//! Tests for budget creation and spending derivation.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AccountsCommand, AmountInput, CategoriesCommand, CreateRecordRequest, NewAccount, NewCategory,
    NewCategoryLimit, RecordsCommand,
};
use crate::domain::{AccountId, AccountService, CategoryBudget, CategoryService, RecordService};
use crate::outbound::memory::MemoryStore;
use crate::test_support::fixture_clock;

struct Harness {
    accounts: AccountService<MemoryStore>,
    categories: CategoryService<MemoryStore>,
    records: RecordService<MemoryStore>,
    budgets: BudgetService<MemoryStore>,
}

struct Seeded {
    current: AccountId,
    saving: AccountId,
    food: CategoryId,
    fun: CategoryId,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = fixture_clock();
    Harness {
        accounts: AccountService::new(Arc::clone(&store), clock.clone()),
        categories: CategoryService::new(Arc::clone(&store), clock.clone()),
        records: RecordService::new(Arc::clone(&store), clock.clone()),
        budgets: BudgetService::new(store, clock),
    }
}

fn caller() -> RequestContext {
    RequestContext::for_user(UserId::new(1).expect("valid id"))
}

fn aed(value: i64) -> AmountInput {
    AmountInput {
        currency: "AED".to_owned(),
        value,
    }
}

async fn seed(harness: &Harness) -> Seeded {
    let account = |name: &str, account_type: &str| NewAccount {
        name: name.to_owned(),
        currency: "AED".to_owned(),
        account_type: account_type.to_owned(),
    };
    let accounts = harness
        .accounts
        .create_accounts(
            caller(),
            vec![account("Current", "Current"), account("Savings", "Saving")],
        )
        .await
        .expect("accounts created");
    let categories = harness
        .categories
        .create_categories(
            caller(),
            vec![
                NewCategory {
                    name: "Food".to_owned(),
                },
                NewCategory {
                    name: "Fun".to_owned(),
                },
            ],
        )
        .await
        .expect("categories created");
    Seeded {
        current: accounts[0].id(),
        saving: accounts[1].id(),
        food: categories[0].id(),
        fun: categories[1].id(),
    }
}

fn monthly(seeded: &Seeded, limits: Vec<NewCategoryLimit>) -> CreateBudgetRequest {
    CreateBudgetRequest {
        account_ids: vec![seeded.current, seeded.saving],
        period_type: "MONTH".to_owned(),
        limits,
    }
}

fn limit(category_id: CategoryId, value: i64) -> NewCategoryLimit {
    NewCategoryLimit {
        category_id,
        max_limit: aed(value),
    }
}

async fn spend(
    harness: &Harness,
    account: AccountId,
    category: CategoryId,
    record_type: &str,
    value: i64,
    date: &str,
) {
    harness
        .records
        .create_record(
            caller().with_account(account),
            CreateRecordRequest {
                note: String::new(),
                category_id: category,
                amount: aed(value),
                date: date.to_owned(),
                record_type: record_type.to_owned(),
                beneficiary_account_id: None,
            },
        )
        .await
        .expect("record created");
}

#[rstest]
#[tokio::test]
async fn limits_for_unknown_categories_are_dropped(harness: Harness) {
    let seeded = seed(&harness).await;
    let unknown = CategoryId::new(99).expect("valid id");

    let budget = harness
        .budgets
        .create_budget(
            caller(),
            monthly(&seeded, vec![limit(seeded.food, 5_000), limit(unknown, 100)]),
        )
        .await
        .expect("budget created");

    let limited: Vec<CategoryId> = budget
        .category_budgets()
        .iter()
        .map(CategoryBudget::category_id)
        .collect();
    assert_eq!(limited, vec![seeded.food]);
    assert_eq!(budget.account_ids(), &[seeded.current, seeded.saving]);
}

#[rstest]
#[tokio::test]
async fn budgets_need_a_known_category(harness: Harness) {
    let seeded = seed(&harness).await;

    let err = harness
        .budgets
        .create_budget(
            caller(),
            monthly(&seeded, vec![limit(CategoryId::new(99).expect("valid id"), 100)]),
        )
        .await
        .expect_err("no known categories");

    assert_eq!(err.code(), ErrorCode::BudgetValidationFailed);
}

#[rstest]
#[case::bad_period(|r: &mut CreateBudgetRequest| r.period_type = "YEAR".to_owned(), ErrorCode::BudgetValidationFailed)]
#[case::no_accounts(|r: &mut CreateBudgetRequest| r.account_ids.clear(), ErrorCode::BudgetValidationFailed)]
#[case::bad_currency(
    |r: &mut CreateBudgetRequest| r.limits[0].max_limit.currency = "XXX".to_owned(),
    ErrorCode::BudgetValidationFailed
)]
#[case::other_currency(
    |r: &mut CreateBudgetRequest| r.limits[0].max_limit.currency = "USD".to_owned(),
    ErrorCode::BudgetValidationFailed
)]
#[case::unknown_account(
    |r: &mut CreateBudgetRequest| r.account_ids.push(AccountId::new(99).expect("valid id")),
    ErrorCode::AccountNotFound
)]
#[tokio::test]
async fn invalid_budgets_are_rejected(
    harness: Harness,
    #[case] edit: fn(&mut CreateBudgetRequest),
    #[case] code: ErrorCode,
) {
    let seeded = seed(&harness).await;
    let mut request = monthly(&seeded, vec![limit(seeded.food, 5_000)]);
    edit(&mut request);

    let err = harness
        .budgets
        .create_budget(caller(), request)
        .await
        .expect_err("invalid budget");
    let listed = harness
        .budgets
        .list_budgets(caller())
        .await
        .expect("listing");

    assert_eq!(err.code(), code);
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn spending_counts_this_months_expenses_only(harness: Harness) {
    let seeded = seed(&harness).await;
    harness
        .budgets
        .create_budget(
            caller(),
            monthly(
                &seeded,
                vec![limit(seeded.food, 5_000), limit(seeded.fun, 1_000)],
            ),
        )
        .await
        .expect("budget created");
    spend(&harness, seeded.current, seeded.food, "EXPENSE", 3_000, "2021-01-03T10:00:00Z").await;
    spend(&harness, seeded.saving, seeded.food, "EXPENSE", 2_500, "2021-01-09T10:00:00Z").await;
    spend(&harness, seeded.current, seeded.food, "EXPENSE", 9_000, "2020-12-31T23:00:00Z").await;
    spend(&harness, seeded.current, seeded.food, "INCOME", 9_000, "2021-01-04T10:00:00Z").await;
    spend(&harness, seeded.current, seeded.fun, "EXPENSE", 400, "2021-01-05T10:00:00Z").await;

    let budgets = harness
        .budgets
        .list_budgets(caller())
        .await
        .expect("listing");

    let budget = budgets.first().expect("one budget");
    let spent: Vec<(i64, bool)> = budget
        .category_budgets()
        .iter()
        .map(|entry| {
            (
                entry.amount_spent().minor_units().expect("fits"),
                entry.exceeded(),
            )
        })
        .collect();
    assert_eq!(spent, vec![(5_500, true), (400, false)]);
}

#[rstest]
#[tokio::test]
async fn weekly_budgets_start_on_monday(harness: Harness) {
    let seeded = seed(&harness).await;
    harness
        .budgets
        .create_budget(
            caller(),
            CreateBudgetRequest {
                period_type: "week".to_owned(),
                ..monthly(&seeded, vec![limit(seeded.fun, 1_000)])
            },
        )
        .await
        .expect("budget created");
    // 2021-01-15 is a Friday; its week starts on Monday the 11th.
    spend(&harness, seeded.current, seeded.fun, "EXPENSE", 300, "2021-01-10T23:59:59Z").await;
    spend(&harness, seeded.current, seeded.fun, "EXPENSE", 200, "2021-01-11T00:00:00Z").await;

    let budgets = harness
        .budgets
        .list_budgets(caller())
        .await
        .expect("listing");

    let spent = budgets
        .first()
        .and_then(|budget| budget.category_budgets().first())
        .map(|entry| entry.amount_spent().minor_units().expect("fits"));
    assert_eq!(spent, Some(200));
}
