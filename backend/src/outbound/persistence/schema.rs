//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Audit columns share
//! one layout on every aggregate table: `created_by`/`modified_by` hold the
//! principal's user id, NULL for the zero principal.

diesel::table! {
    /// Registered users.
    users (id) {
        id -> Int8,
        /// Unique login address.
        email -> Varchar,
        created_by -> Nullable<Int8>,
        created_at -> Timestamptz,
        modified_by -> Nullable<Int8>,
        modified_at -> Nullable<Timestamptz>,
        /// Optimistic-concurrency version, starting at 1.
        version -> Int4,
    }
}

diesel::table! {
    /// Accounts; `(user_id, name)` is unique.
    accounts (id) {
        id -> Int8,
        user_id -> Int8,
        name -> Varchar,
        /// `CURRENT` or `SAVING`.
        account_type -> Varchar,
        /// ISO-4217 code.
        currency -> Varchar,
        created_by -> Nullable<Int8>,
        created_at -> Timestamptz,
        modified_by -> Nullable<Int8>,
        modified_at -> Nullable<Timestamptz>,
        version -> Int4,
    }
}

diesel::table! {
    /// Categories; `(user_id, name)` is unique.
    categories (id) {
        id -> Int8,
        user_id -> Int8,
        name -> Varchar,
        /// Date of the newest record booked against the category.
        last_used_at -> Nullable<Timestamptz>,
        created_by -> Nullable<Int8>,
        created_at -> Timestamptz,
        modified_by -> Nullable<Int8>,
        modified_at -> Nullable<Timestamptz>,
        version -> Int4,
    }
}

diesel::table! {
    /// Records booked against accounts.
    ///
    /// Transfer columns are set together on both halves of a transfer and
    /// are NULL otherwise.
    records (id) {
        id -> Int8,
        user_id -> Int8,
        account_id -> Int8,
        category_id -> Int8,
        note -> Varchar,
        /// Signed minor units; never zero.
        amount -> Int8,
        currency -> Varchar,
        date -> Timestamptz,
        /// `INCOME`, `EXPENSE` or `TRANSFER`.
        record_type -> Varchar,
        source_account_id -> Nullable<Int8>,
        beneficiary_account_id -> Nullable<Int8>,
        transfer_reference -> Nullable<Uuid>,
        created_by -> Nullable<Int8>,
        created_at -> Timestamptz,
        modified_by -> Nullable<Int8>,
        modified_at -> Nullable<Timestamptz>,
        version -> Int4,
    }
}

diesel::table! {
    /// Budgets.
    budgets (id) {
        id -> Int8,
        user_id -> Int8,
        /// `WEEK` or `MONTH`.
        period_type -> Varchar,
        created_by -> Nullable<Int8>,
        created_at -> Timestamptz,
        modified_by -> Nullable<Int8>,
        modified_at -> Nullable<Timestamptz>,
        version -> Int4,
    }
}

diesel::table! {
    /// Per-category spending limits of a budget.
    budget_categories (budget_id, category_id) {
        budget_id -> Int8,
        category_id -> Int8,
        max_limit -> Int8,
        currency -> Varchar,
    }
}

diesel::table! {
    /// Accounts whose expenses count against a budget.
    budget_accounts (budget_id, account_id) {
        budget_id -> Int8,
        account_id -> Int8,
    }
}

diesel::joinable!(accounts -> users (user_id));
diesel::joinable!(categories -> users (user_id));
diesel::joinable!(budgets -> users (user_id));
diesel::joinable!(budget_categories -> budgets (budget_id));
diesel::joinable!(budget_accounts -> budgets (budget_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    accounts,
    categories,
    records,
    budgets,
    budget_categories,
    budget_accounts,
);
