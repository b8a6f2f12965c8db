//! Date-ordered record collections and their aggregations.
//!
//! Every aggregation walks the whole collection so that a currency mismatch
//! anywhere is reported, even on records the aggregation would skip.

use chrono::{DateTime, Utc};

use crate::domain::{Currency, Error, Money, Record, RecordType};

/// Records ordered by date ascending; ties keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Records(Vec<Record>);

/// Income, expense and savings totals of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordsSummary {
    /// Sum of positive amounts.
    pub total_income: Money,
    /// Sum of absolute expense amounts.
    pub total_expenses: Money,
    /// Sum of absolute amounts transferred into saving accounts.
    pub total_savings: Money,
}

impl RecordsSummary {
    /// All-zero summary, used for accounts with no records.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            total_income: Money::zero(currency),
            total_expenses: Money::zero(currency),
            total_savings: Money::zero(currency),
        }
    }

    /// Pass the summary through when every total fits in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::amount_overflow`] for the first saturated total.
    pub fn checked(self) -> Result<Self, Error> {
        self.total_income.minor_units()?;
        self.total_expenses.minor_units()?;
        self.total_savings.minor_units()?;
        Ok(self)
    }
}

impl From<Vec<Record>> for Records {
    fn from(mut records: Vec<Record>) -> Self {
        records.sort_by_key(Record::date);
        Self(records)
    }
}

impl FromIterator<Record> for Records {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl IntoIterator for Records {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Records {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records in date order.
    #[must_use]
    pub fn as_slice(&self) -> &[Record] {
        &self.0
    }

    /// Sum of every amount.
    ///
    /// # Errors
    ///
    /// [`Error::amount_total_of_empty_set`] on an empty collection,
    /// [`Error::amount_mismatching_currencies`] on mixed currencies.
    pub fn total(&self) -> Result<Money, Error> {
        self.sum_where(|_| true)
    }

    /// Sum of positive amounts.
    ///
    /// # Errors
    ///
    /// As [`Records::total`].
    pub fn total_income(&self) -> Result<Money, Error> {
        self.sum_where(|record| record.amount().is_positive())
    }

    /// Sum of absolute amounts of negative expense records.
    ///
    /// # Errors
    ///
    /// As [`Records::total`].
    pub fn total_expenses(&self) -> Result<Money, Error> {
        self.sum_where(is_expense).map(Money::abs)
    }

    /// Sum of absolute amounts of transfers into saving accounts.
    ///
    /// # Errors
    ///
    /// As [`Records::total`].
    pub fn total_savings(&self) -> Result<Money, Error> {
        self.fold(|record| {
            let amount = record.amount();
            if record.is_saving_transfer() {
                amount.abs()
            } else {
                Money::zero(amount.currency())
            }
        })
    }

    /// Earliest and latest record dates.
    ///
    /// # Errors
    ///
    /// [`Error::records_period_of_empty_set`] on an empty collection.
    pub fn period(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), Error> {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => Ok((first.date(), last.date())),
            _ => Err(Error::records_period_of_empty_set(
                "cannot compute the period of no records",
            )),
        }
    }

    /// Income, expense and savings totals in one pass.
    ///
    /// # Errors
    ///
    /// As [`Records::total`].
    pub fn summary(&self) -> Result<RecordsSummary, Error> {
        let mut summary = RecordsSummary::zero(self.first_currency()?);
        for record in &self.0 {
            let amount = record.amount();
            let nothing = Money::zero(amount.currency());
            let pick = |selected: bool, value: Money| if selected { value } else { nothing };
            summary.total_income = summary
                .total_income
                .try_add(&pick(amount.is_positive(), amount))?;
            summary.total_expenses = summary
                .total_expenses
                .try_add(&pick(is_expense(record), amount.abs()))?;
            summary.total_savings = summary
                .total_savings
                .try_add(&pick(record.is_saving_transfer(), amount.abs()))?;
        }
        Ok(summary)
    }

    /// [`Records::summary`], or all zeros in `currency` when empty.
    ///
    /// # Errors
    ///
    /// [`Error::amount_mismatching_currencies`] on mixed currencies.
    pub fn summary_or_zero(&self, currency: Currency) -> Result<RecordsSummary, Error> {
        if self.is_empty() {
            Ok(RecordsSummary::zero(currency))
        } else {
            self.summary()
        }
    }

    fn first_currency(&self) -> Result<Currency, Error> {
        self.0
            .first()
            .map(|record| record.amount().currency())
            .ok_or_else(|| Error::amount_total_of_empty_set("cannot total no records"))
    }

    fn sum_where(&self, include: impl Fn(&Record) -> bool) -> Result<Money, Error> {
        self.fold(|record| {
            let amount = record.amount();
            if include(record) {
                amount
            } else {
                Money::zero(amount.currency())
            }
        })
    }

    fn fold(&self, term: impl Fn(&Record) -> Money) -> Result<Money, Error> {
        let zero = Money::zero(self.first_currency()?);
        self.0
            .iter()
            .try_fold(zero, |acc, record| acc.try_add(&term(record)))
    }
}

fn is_expense(record: &Record) -> bool {
    record.record_type() == RecordType::Expense && record.amount().is_negative()
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
