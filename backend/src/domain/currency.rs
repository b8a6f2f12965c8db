//! ISO-4217 currencies.
//!
//! The table lists active currency codes with their minor-unit exponents.
//! Codes without a meaningful exponent (precious metals, testing and "no
//! currency" codes, special drawing rights) are absent, so
//! `XXX` and `XTS` are rejected like any unknown code.

use std::fmt;
use std::str::FromStr;

use crate::domain::Error;

/// A valid ISO-4217 currency and its minor-unit exponent.
///
/// # Examples
/// ```
/// use backend::domain::Currency;
///
/// let jpy = Currency::from_code("JPY").expect("known currency");
/// assert_eq!(jpy.exponent(), 0);
/// assert!(Currency::from_code("XXX").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    code: &'static str,
    exponent: u32,
}

impl Currency {
    /// Look a currency up by its three-letter code. Lower-case input is
    /// accepted and normalised.
    ///
    /// # Errors
    ///
    /// Returns [`Error::currency_invalid_code`] when the code is unknown.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        let normalised = code.trim().to_ascii_uppercase();
        ISO_4217
            .binary_search_by(|(candidate, _)| (*candidate).cmp(normalised.as_str()))
            .ok()
            .and_then(|index| ISO_4217.get(index))
            .map(|&(code, exponent)| Self { code, exponent })
            .ok_or_else(|| {
                Error::currency_invalid_code(format!("No such currency '{}'", code.trim()))
                    .with_field("currency", format!("No such currency '{}'", code.trim()))
            })
    }

    /// Whether `code` names a known currency.
    #[must_use]
    pub fn is_valid(code: &str) -> bool {
        Self::from_code(code).is_ok()
    }

    /// Three-letter code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Number of minor-unit digits (2 for AED, 0 for JPY, 3 for KWD).
    #[must_use]
    pub const fn exponent(&self) -> u32 {
        self.exponent
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

/// Sorted by code for binary search.
const ISO_4217: &[(&str, u32)] = &[
    ("AED", 2),
    ("AFN", 2),
    ("ALL", 2),
    ("AMD", 2),
    ("ANG", 2),
    ("AOA", 2),
    ("ARS", 2),
    ("AUD", 2),
    ("AWG", 2),
    ("AZN", 2),
    ("BAM", 2),
    ("BBD", 2),
    ("BDT", 2),
    ("BGN", 2),
    ("BHD", 3),
    ("BIF", 0),
    ("BMD", 2),
    ("BND", 2),
    ("BOB", 2),
    ("BOV", 2),
    ("BRL", 2),
    ("BSD", 2),
    ("BTN", 2),
    ("BWP", 2),
    ("BYN", 2),
    ("BZD", 2),
    ("CAD", 2),
    ("CDF", 2),
    ("CHE", 2),
    ("CHF", 2),
    ("CHW", 2),
    ("CLF", 4),
    ("CLP", 0),
    ("CNY", 2),
    ("COP", 2),
    ("COU", 2),
    ("CRC", 2),
    ("CUP", 2),
    ("CVE", 2),
    ("CZK", 2),
    ("DJF", 0),
    ("DKK", 2),
    ("DOP", 2),
    ("DZD", 2),
    ("EGP", 2),
    ("ERN", 2),
    ("ETB", 2),
    ("EUR", 2),
    ("FJD", 2),
    ("FKP", 2),
    ("GBP", 2),
    ("GEL", 2),
    ("GHS", 2),
    ("GIP", 2),
    ("GMD", 2),
    ("GNF", 0),
    ("GTQ", 2),
    ("GYD", 2),
    ("HKD", 2),
    ("HNL", 2),
    ("HTG", 2),
    ("HUF", 2),
    ("IDR", 2),
    ("ILS", 2),
    ("INR", 2),
    ("IQD", 3),
    ("IRR", 2),
    ("ISK", 0),
    ("JMD", 2),
    ("JOD", 3),
    ("JPY", 0),
    ("KES", 2),
    ("KGS", 2),
    ("KHR", 2),
    ("KMF", 0),
    ("KPW", 2),
    ("KRW", 0),
    ("KWD", 3),
    ("KYD", 2),
    ("KZT", 2),
    ("LAK", 2),
    ("LBP", 2),
    ("LKR", 2),
    ("LRD", 2),
    ("LSL", 2),
    ("LYD", 3),
    ("MAD", 2),
    ("MDL", 2),
    ("MGA", 2),
    ("MKD", 2),
    ("MMK", 2),
    ("MNT", 2),
    ("MOP", 2),
    ("MRU", 2),
    ("MUR", 2),
    ("MVR", 2),
    ("MWK", 2),
    ("MXN", 2),
    ("MXV", 2),
    ("MYR", 2),
    ("MZN", 2),
    ("NAD", 2),
    ("NGN", 2),
    ("NIO", 2),
    ("NOK", 2),
    ("NPR", 2),
    ("NZD", 2),
    ("OMR", 3),
    ("PAB", 2),
    ("PEN", 2),
    ("PGK", 2),
    ("PHP", 2),
    ("PKR", 2),
    ("PLN", 2),
    ("PYG", 0),
    ("QAR", 2),
    ("RON", 2),
    ("RSD", 2),
    ("RUB", 2),
    ("RWF", 0),
    ("SAR", 2),
    ("SBD", 2),
    ("SCR", 2),
    ("SDG", 2),
    ("SEK", 2),
    ("SGD", 2),
    ("SHP", 2),
    ("SLE", 2),
    ("SLL", 2),
    ("SOS", 2),
    ("SRD", 2),
    ("SSP", 2),
    ("STN", 2),
    ("SVC", 2),
    ("SYP", 2),
    ("SZL", 2),
    ("THB", 2),
    ("TJS", 2),
    ("TMT", 2),
    ("TND", 3),
    ("TOP", 2),
    ("TRY", 2),
    ("TTD", 2),
    ("TWD", 2),
    ("TZS", 2),
    ("UAH", 2),
    ("UGX", 0),
    ("USD", 2),
    ("USN", 2),
    ("UYI", 0),
    ("UYU", 2),
    ("UYW", 4),
    ("UZS", 2),
    ("VED", 2),
    ("VES", 2),
    ("VND", 0),
    ("VUV", 0),
    ("WST", 2),
    ("XAF", 0),
    ("XCD", 2),
    ("XCG", 2),
    ("XOF", 0),
    ("XPF", 0),
    ("YER", 2),
    ("ZAR", 2),
    ("ZMW", 2),
    ("ZWG", 2),
    ("ZWL", 2),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn table_is_sorted_and_unique() {
        assert!(ISO_4217.windows(2).all(|pair| match pair {
            [(left, _), (right, _)] => left < right,
            _ => false,
        }));
    }

    #[rstest]
    #[case("AED", 2)]
    #[case("JPY", 0)]
    #[case("KWD", 3)]
    #[case("CLF", 4)]
    #[case("usd", 2)]
    fn known_codes_carry_their_exponent(#[case] code: &str, #[case] exponent: u32) {
        let currency = Currency::from_code(code).expect("known code");
        assert_eq!(currency.exponent(), exponent);
        assert_eq!(currency.code(), code.to_ascii_uppercase());
    }

    #[rstest]
    #[case("XXX")]
    #[case("XTS")]
    #[case("XAU")]
    #[case("")]
    #[case("EURO")]
    fn unknown_codes_are_rejected(#[case] code: &str) {
        let err = Currency::from_code(code).expect_err("unknown code");
        assert_eq!(err.code(), ErrorCode::CurrencyInvalidCode);
        assert_eq!(err.detail(), format!("No such currency '{code}'"));
        assert!(!Currency::is_valid(code));
    }
}
