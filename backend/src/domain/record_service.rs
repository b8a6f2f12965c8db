//! Record creation and listing.
//!
//! Creating a record runs in one store transaction: the record is checked
//! against its category and account, saved, and for a transfer paired with
//! a counterpart record on the receiving account. The category's last use
//! is bumped and the owning account's balance re-read before commit, so a
//! failure at any step leaves no trace. A balance that no longer fits in
//! 64-bit minor units is such a failure.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{
    CreateRecordRequest, CreatedRecord, RecordSearch, RecordsCommand, RecordsPage, RecordsQuery,
    Sequence, Store, StoreTransaction,
};
use crate::domain::transaction::{begin, finish, mint, store_error};
use crate::domain::{
    Account, AccountId, AuditInfo, Beneficiary, CalendarMonth, Error, ErrorCode, Money, Record,
    RecordCategory, RecordDraft, RecordFilter, RecordId, RecordType, Records, RequestContext,
    SearchTerm, UpdatedBy, UserId, account_service, category_service, title_case,
};

/// Creates and lists records through a [`Store`].
#[derive(Clone)]
pub struct RecordService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> RecordService<S> {
    /// Create a service over `store`, stamping audit times from `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

/// The receiving side of a transfer being created.
struct Transfer {
    beneficiary: Account,
    reference: Uuid,
}

impl<S: Store> RecordService<S> {
    async fn create(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        account_id: AccountId,
        request: &CreateRecordRequest,
    ) -> Result<CreatedRecord, Error> {
        let record_id: RecordId = mint(tx, Sequence::Record).await?;
        let category = tx
            .find_category(owner, request.category_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| category_service::not_found(request.category_id))?;
        let amount = request
            .amount
            .to_money()
            .map_err(|err| err.recode(ErrorCode::RecordValidationFailed))?;
        let record_type: RecordType = request.record_type.parse()?;
        let date = parse_date(&request.date)?;
        let account = load_account(tx, owner, account_id).await?;
        same_currency(&account, amount)?;

        let transfer = match (record_type, request.beneficiary_account_id) {
            (RecordType::Transfer, Some(beneficiary_id)) if beneficiary_id == account_id => {
                return Err(Error::record_validation(
                    "a transfer needs a different beneficiary account",
                )
                .with_field("beneficiary", "must differ from the sending account"));
            }
            (RecordType::Transfer, Some(beneficiary_id)) => {
                let beneficiary = load_account(tx, owner, beneficiary_id).await?;
                same_currency(&beneficiary, amount)?;
                Some(Transfer {
                    beneficiary,
                    reference: Uuid::new_v4(),
                })
            }
            (RecordType::Transfer, None) => {
                return Err(Error::record_validation("transfers need a beneficiary account")
                    .with_field("beneficiary", "required for transfers"));
            }
            (_, Some(_)) => {
                return Err(Error::record_validation(format!(
                    "{record_type} records cannot have a beneficiary"
                ))
                .with_field("beneficiary", "only transfers have a beneficiary"));
            }
            (_, None) => None,
        };

        let audit = AuditInfo::make_for_creation(UpdatedBy::user(owner), self.clock.utc());
        let record = Record::try_from(RecordDraft {
            id: record_id,
            note: request.note.clone(),
            category: RecordCategory {
                id: category.id(),
                name: category.name().to_owned(),
            },
            amount: match &transfer {
                Some(_) if amount.is_positive() => amount.negate(),
                _ => amount,
            },
            date,
            record_type,
            source_account_id: transfer.as_ref().map(|_| account_id),
            beneficiary: transfer.as_ref().map(|t| Beneficiary {
                id: t.beneficiary.id(),
                name: t.beneficiary.name().to_owned(),
                account_type: t.beneficiary.account_type(),
            }),
            transfer_reference: transfer.as_ref().map(|t| t.reference),
            audit,
        })?;
        tx.insert_record(owner, account_id, &record)
            .await
            .map_err(store_error)?;

        if let Some(transfer) = &transfer {
            let counterpart_id: RecordId = mint(tx, Sequence::Record).await?;
            let counterpart = record.counterpart(counterpart_id, audit)?;
            tx.insert_record(owner, transfer.beneficiary.id(), &counterpart)
                .await
                .map_err(store_error)?;
            debug!(
                record_id = %counterpart.id(),
                account_id = %transfer.beneficiary.id(),
                "transfer counterpart saved"
            );
        }

        tx.touch_category(owner, category.id(), record.date())
            .await
            .map_err(store_error)?;
        let balance = tx
            .find_account_balance(owner, account_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| account_service::not_found(account_id))?;
        balance.balance.minor_units()?;

        info!(
            user_id = %owner,
            account_id = %account_id,
            record_id = %record.id(),
            record_type = %record.record_type(),
            transfer_reference = ?transfer.as_ref().map(|t| t.reference),
            "record created"
        );
        Ok(CreatedRecord {
            record,
            account: balance,
        })
    }

    async fn latest(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        account_id: AccountId,
    ) -> Result<RecordsPage, Error> {
        let account = load_account(tx, owner, account_id).await?;
        let month = tx
            .latest_record_date(owner, account_id)
            .await
            .map_err(store_error)?
            .map_or_else(|| CalendarMonth::current(self.clock.as_ref()), CalendarMonth::of);
        page(tx, owner, account, RecordFilter::month(month)).await
    }

    async fn search(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        account_id: AccountId,
        search: RecordSearch,
    ) -> Result<RecordsPage, Error> {
        let filter = self.filter(search)?;
        let account = load_account(tx, owner, account_id).await?;
        page(tx, owner, account, filter).await
    }

    /// Resolve search defaults against the clock.
    fn filter(&self, search: RecordSearch) -> Result<RecordFilter, Error> {
        let now = self.clock.utc();
        let from = search
            .from
            .unwrap_or_else(|| CalendarMonth::of(now).first_day());
        let to = search.to.unwrap_or(now);
        if from > to {
            return Err(
                Error::request_unmarshalling(format!("search range {from} .. {to} is inverted"))
                    .with_field("from", "must not be after to"),
            );
        }
        let mut filter = RecordFilter::between(from, to);
        filter.categories = search
            .categories
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(title_case)
            .collect();
        filter.types = search.types.into_iter().collect();
        filter.term = search
            .term
            .as_deref()
            .map(SearchTerm::parse)
            .unwrap_or_default();
        Ok(filter)
    }
}

async fn load_account(
    tx: &mut dyn StoreTransaction,
    owner: UserId,
    id: AccountId,
) -> Result<Account, Error> {
    tx.find_account(owner, id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| account_service::not_found(id))
}

async fn page(
    tx: &mut dyn StoreTransaction,
    owner: UserId,
    account: Account,
    filter: RecordFilter,
) -> Result<RecordsPage, Error> {
    let records = Records::from(
        tx.list_records(owner, account.id(), &filter)
            .await
            .map_err(store_error)?,
    );
    let summary = records.summary_or_zero(account.currency())?.checked()?;
    debug!(account_id = %account.id(), count = records.len(), "records listed");
    Ok(RecordsPage {
        account,
        records,
        summary,
        from: filter.from,
        to: filter.to,
    })
}

fn same_currency(account: &Account, amount: Money) -> Result<(), Error> {
    if account.currency() == amount.currency() {
        return Ok(());
    }
    Err(Error::amount_mismatching_currencies(format!(
        "account {} holds {}, not {}",
        account.id(),
        account.currency(),
        amount.currency()
    ))
    .with_field("amount", "currency must match the account"))
}

/// An empty date is left for the record to reject as missing.
fn parse_date(raw: &str) -> Result<Option<DateTime<Utc>>, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|date| Some(date.with_timezone(&Utc)))
        .map_err(|err| {
            Error::record_validation(format!("'{raw}' is not an RFC-3339 timestamp"))
                .with_field("date", err.to_string())
        })
}

#[async_trait]
impl<S: Store> RecordsCommand for RecordService<S> {
    async fn create_record(
        &self,
        ctx: RequestContext,
        request: CreateRecordRequest,
    ) -> Result<CreatedRecord, Error> {
        let owner = ctx.require_user()?;
        let account_id = ctx.require_account()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.create(tx.as_mut(), owner, account_id, &request).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl<S: Store> RecordsQuery for RecordService<S> {
    async fn latest_records(&self, ctx: RequestContext) -> Result<RecordsPage, Error> {
        let owner = ctx.require_user()?;
        let account_id = ctx.require_account()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.latest(tx.as_mut(), owner, account_id).await;
        finish(tx, outcome).await
    }

    async fn search_records(
        &self,
        ctx: RequestContext,
        search: RecordSearch,
    ) -> Result<RecordsPage, Error> {
        let owner = ctx.require_user()?;
        let account_id = ctx.require_account()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.search(tx.as_mut(), owner, account_id, search).await;
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "record_service_tests.rs"]
mod tests;
