//! Monetary amounts in minor units.
//!
//! A [`Money`] is an immutable `(currency, minor units)` pair. Arithmetic
//! saturates at the `i64` bounds and remembers that it did, so an overflowed
//! total is never mistaken for a genuine value: [`Money::minor_units`]
//! reports [`ErrorCode::AmountOverflow`](crate::domain::ErrorCode) instead.

use std::cmp::Ordering;
use std::fmt;

use crate::domain::{Currency, Error};

/// Signed amount of a single currency.
///
/// # Examples
/// ```
/// use backend::domain::Money;
///
/// let salary = Money::new("AED", 10_000).expect("valid currency");
/// let rent = Money::new("AED", -4_550).expect("valid currency");
/// let left = salary.try_add(&rent).expect("same currency");
/// assert_eq!(left.to_string(), "AED 54.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money {
    currency: Currency,
    minor_units: i64,
    overflowed: bool,
}

impl Money {
    /// Build an amount from a currency code and minor units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::currency_invalid_code`] for unknown currencies.
    pub fn new(code: &str, minor_units: i64) -> Result<Self, Error> {
        Currency::from_code(code).map(|currency| Self::of(currency, minor_units))
    }

    /// Build an amount from an already validated currency.
    #[must_use]
    pub const fn of(currency: Currency, minor_units: i64) -> Self {
        Self {
            currency,
            minor_units,
            overflowed: false,
        }
    }

    /// An amount clamped to `minor_units` that already overflowed.
    #[must_use]
    pub const fn saturated(currency: Currency, minor_units: i64) -> Self {
        Self {
            currency,
            minor_units,
            overflowed: true,
        }
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::of(currency, 0)
    }

    /// Currency of the amount.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Minor units, unless an earlier operation overflowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::amount_overflow`] when the value saturated.
    pub fn minor_units(&self) -> Result<i64, Error> {
        if self.overflowed {
            return Err(Error::amount_overflow(format!(
                "{} {} overflowed 64-bit minor units",
                self.currency, self.minor_units
            )));
        }
        Ok(self.minor_units)
    }

    /// Whether a previous operation saturated.
    #[must_use]
    pub const fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    /// Whether the amount is strictly negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Absolute value in the same currency.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self {
            currency: self.currency,
            minor_units: self.minor_units.saturating_abs(),
            overflowed: self.overflowed || self.minor_units == i64::MIN,
        }
    }

    /// Negated value in the same currency.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            currency: self.currency,
            minor_units: self.minor_units.saturating_neg(),
            overflowed: self.overflowed || self.minor_units == i64::MIN,
        }
    }

    /// Add two amounts of the same currency, saturating on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::amount_mismatching_currencies`] when the currencies
    /// differ.
    pub fn try_add(&self, other: &Self) -> Result<Self, Error> {
        self.ensure_same_currency(other)?;
        let (minor_units, overflowed) = match self.minor_units.checked_add(other.minor_units) {
            Some(sum) => (sum, false),
            None => (self.minor_units.saturating_add(other.minor_units), true),
        };
        Ok(Self {
            currency: self.currency,
            minor_units,
            overflowed: overflowed || self.overflowed || other.overflowed,
        })
    }

    /// Whether `self` is strictly greater than `other`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::amount_mismatching_currencies`] when the currencies
    /// differ.
    pub fn exceeds(&self, other: &Self) -> Result<bool, Error> {
        self.ensure_same_currency(other)?;
        Ok(self.minor_units > other.minor_units)
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<(), Error> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(Error::amount_mismatching_currencies(format!(
                "cannot combine {} with {}",
                self.currency, other.currency
            )))
        }
    }
}

impl PartialOrd for Money {
    /// Amounts of different currencies are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.currency == other.currency).then(|| self.minor_units.cmp(&other.minor_units))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        let exponent = self.currency.exponent();
        let Some(scale) = 10_u64.checked_pow(exponent).filter(|scale| *scale > 1) else {
            return write!(f, "{} {sign}{abs}", self.currency);
        };
        let major = abs.checked_div(scale).unwrap_or_default();
        let minor = abs.checked_rem(scale).unwrap_or_default();
        write!(
            f,
            "{} {sign}{major}.{minor:0width$}",
            self.currency,
            width = usize::try_from(exponent).unwrap_or_default()
        )
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
