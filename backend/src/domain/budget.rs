//! Budget aggregate: spending limits per category over a calendar period.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{
    AccountId, AuditInfo, BudgetId, CalendarMonth, CalendarWeek, CategoryId, Error, Money, Record,
    RecordType,
};

/// Length of the period a budget applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodType {
    /// ISO week starting Monday 00:00 UTC.
    Week,
    /// Calendar month starting on day 1 at 00:00 UTC.
    Month,
}

impl PeriodType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "WEEK",
            Self::Month => "MONTH",
        }
    }

    /// Half-open `[from, to)` bounds of the period containing `now`.
    #[must_use]
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::Week => {
                let week = CalendarWeek::of(now);
                (week.first_day(), week.end_exclusive())
            }
            Self::Month => {
                let month = CalendarMonth::of(now);
                (month.first_day(), month.end_exclusive())
            }
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEEK" => Ok(Self::Week),
            "MONTH" => Ok(Self::Month),
            _ => Err(Error::budget_validation(format!("No such period type '{s}'"))
                .with_field("periodType", "must be WEEK or MONTH")),
        }
    }
}

/// Limit for one category within a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryBudget {
    category_id: CategoryId,
    max_limit: Money,
    amount_spent: Money,
}

impl CategoryBudget {
    /// Limited category.
    #[must_use]
    pub const fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// Spending limit.
    #[must_use]
    pub const fn max_limit(&self) -> Money {
        self.max_limit
    }

    /// Spending in the current period; zero until computed.
    #[must_use]
    pub const fn amount_spent(&self) -> Money {
        self.amount_spent
    }

    /// Whether spending is strictly above the limit.
    #[must_use]
    pub fn exceeded(&self) -> bool {
        self.amount_spent
            .exceeds(&self.max_limit)
            .unwrap_or_default()
    }
}

/// Unvalidated budget fields.
#[derive(Debug, Clone)]
pub struct BudgetDraft {
    /// Issued budget id.
    pub id: BudgetId,
    /// Accounts whose combined activity the budget covers.
    pub account_ids: Vec<AccountId>,
    /// Period length.
    pub period_type: PeriodType,
    /// `(category, limit)` pairs.
    pub limits: Vec<(CategoryId, Money)>,
    /// Audit metadata.
    pub audit: AuditInfo,
}

/// A validated budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    id: BudgetId,
    account_ids: Vec<AccountId>,
    period_type: PeriodType,
    category_budgets: Vec<CategoryBudget>,
    audit: AuditInfo,
}

impl TryFrom<BudgetDraft> for Budget {
    type Error = Error;

    fn try_from(draft: BudgetDraft) -> Result<Self, Self::Error> {
        let BudgetDraft {
            id,
            account_ids,
            period_type,
            limits,
            audit,
        } = draft;

        let mut seen_accounts = BTreeSet::new();
        let account_ids: Vec<AccountId> = account_ids
            .into_iter()
            .filter(|id| seen_accounts.insert(*id))
            .collect();
        if account_ids.is_empty() {
            return Err(invalid("accounts", "a budget needs at least one account"));
        }

        let Some((_, first)) = limits.first() else {
            return Err(invalid("categories", "a budget needs at least one category"));
        };
        let currency = first.currency();
        let mut seen_categories = BTreeSet::new();
        let mut category_budgets = Vec::with_capacity(limits.len());
        for (category_id, max_limit) in limits {
            if max_limit.currency() != currency {
                return Err(invalid(
                    "categories",
                    format!(
                        "all limits must be in {currency}, found {}",
                        max_limit.currency()
                    ),
                ));
            }
            if !max_limit.is_positive() {
                return Err(invalid("maxLimit", "limits must be positive"));
            }
            if !seen_categories.insert(category_id) {
                return Err(invalid(
                    "categories",
                    format!("category {category_id} is limited twice"),
                ));
            }
            category_budgets.push(CategoryBudget {
                category_id,
                max_limit,
                amount_spent: Money::zero(currency),
            });
        }

        Ok(Self {
            id,
            account_ids,
            period_type,
            category_budgets,
            audit,
        })
    }
}

fn invalid(field: &str, message: impl Into<String>) -> Error {
    let message = message.into();
    Error::budget_validation(message.clone()).with_field(field, message)
}

impl Budget {
    /// Rebuild a budget with `amount_spent` derived from `records`.
    ///
    /// Only expense records filed under a limited category count; callers
    /// pass the linked accounts' records for the current period.
    ///
    /// # Errors
    ///
    /// [`Error::amount_mismatching_currencies`] when a counted record is in
    /// another currency.
    pub fn with_spending<'a>(
        mut self,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> Result<Self, Error> {
        for record in records {
            if record.record_type() != RecordType::Expense {
                continue;
            }
            let Some(entry) = self
                .category_budgets
                .iter_mut()
                .find(|entry| entry.category_id == record.category().id)
            else {
                continue;
            };
            entry.amount_spent = entry.amount_spent.try_add(&record.amount().abs())?;
        }
        Ok(self)
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> BudgetId {
        self.id
    }

    /// Covered accounts.
    #[must_use]
    pub fn account_ids(&self) -> &[AccountId] {
        &self.account_ids
    }

    /// Period length.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// Per-category limits.
    #[must_use]
    pub fn category_budgets(&self) -> &[CategoryBudget] {
        &self.category_budgets
    }

    /// Audit metadata.
    #[must_use]
    pub const fn audit(&self) -> &AuditInfo {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, RecordCategory, RecordDraft, RecordId, UpdatedBy};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 6, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn category(raw: u64) -> CategoryId {
        CategoryId::new(raw).expect("valid id")
    }

    fn money(code: &str, value: i64) -> Money {
        Money::new(code, value).expect("valid currency")
    }

    #[fixture]
    fn draft() -> BudgetDraft {
        BudgetDraft {
            id: BudgetId::new(1).expect("valid id"),
            account_ids: vec![AccountId::new(1).expect("valid id")],
            period_type: PeriodType::Month,
            limits: vec![
                (category(1), money("AED", 50_000)),
                (category(2), money("AED", 10_000)),
            ],
            audit: AuditInfo::make_for_creation(UpdatedBy::ZERO, now()),
        }
    }

    fn expense(id: u64, category_id: u64, value: i64) -> Record {
        Record::try_from(RecordDraft {
            id: RecordId::new(id).expect("valid id"),
            note: String::new(),
            category: RecordCategory {
                id: category(category_id),
                name: "Food".into(),
            },
            amount: money("AED", value),
            date: Some(now()),
            record_type: RecordType::Expense,
            source_account_id: None,
            beneficiary: None,
            transfer_reference: None,
            audit: AuditInfo::make_for_creation(UpdatedBy::ZERO, now()),
        })
        .expect("valid record")
    }

    #[rstest]
    fn derives_spending_per_category(draft: BudgetDraft) {
        let budget = Budget::try_from(draft).expect("valid budget");
        let records = [
            expense(1, 2, 6_000),
            expense(2, 2, 6_000),
            expense(3, 1, 100),
            expense(4, 9, 1_000_000),
        ];

        let budget = budget.with_spending(&records).expect("same currency");

        let [food, fun] = budget.category_budgets() else {
            panic!("expected two category budgets");
        };
        assert_eq!(food.amount_spent(), money("AED", 100));
        assert!(!food.exceeded());
        assert_eq!(fun.amount_spent(), money("AED", 12_000));
        assert!(fun.exceeded());
    }

    #[rstest]
    fn rejects_mixed_currencies(mut draft: BudgetDraft) {
        draft.limits.push((category(3), money("USD", 1_000)));
        let err = Budget::try_from(draft).expect_err("mixed currencies");
        assert_eq!(err.code(), ErrorCode::BudgetValidationFailed);
    }

    #[rstest]
    fn rejects_empty_shapes(draft: BudgetDraft) {
        let no_accounts = BudgetDraft {
            account_ids: Vec::new(),
            ..draft.clone()
        };
        let no_limits = BudgetDraft {
            limits: Vec::new(),
            ..draft
        };
        assert!(Budget::try_from(no_accounts).is_err());
        assert!(Budget::try_from(no_limits).is_err());
    }

    #[rstest]
    fn rejects_repeated_categories(mut draft: BudgetDraft) {
        draft.limits.push((category(1), money("AED", 1)));
        assert!(Budget::try_from(draft).is_err());
    }

    #[rstest]
    #[case(PeriodType::Week, (2021, 1, 4), (2021, 1, 11))]
    #[case(PeriodType::Month, (2021, 1, 1), (2021, 2, 1))]
    fn period_bounds_contain_now(
        #[case] period: PeriodType,
        #[case] from: (i32, u32, u32),
        #[case] to: (i32, u32, u32),
    ) {
        let at = |(y, m, d): (i32, u32, u32)| {
            Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
                .single()
                .expect("valid timestamp")
        };
        assert_eq!(period.bounds(now()), (at(from), at(to)));
    }
}
