//! Record search filters.
//!
//! A filter is the single definition of which records a listing returns.
//! The in-memory store evaluates [`RecordFilter::matches`] directly; the
//! SQL store translates the same fields into predicates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::domain::{CalendarMonth, Record, RecordType};

/// Characters removed from search keywords before they reach a query.
const STRIPPED: [char; 2] = ['"', ';'];

/// Conjunctive keyword search over record notes.
///
/// # Examples
/// ```
/// use backend::domain::SearchTerm;
///
/// let term = SearchTerm::parse(r#"coffee "beans";"#);
/// assert_eq!(term.keywords(), ["coffee", "beans"]);
/// assert!(term.matches("Bought Coffee beans"));
/// assert!(!term.matches("Bought coffee"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm {
    keywords: Vec<String>,
}

impl SearchTerm {
    /// Split on whitespace, strip quote and semicolon characters, and drop
    /// empty keywords. Keywords are lower-cased.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let keywords = raw
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|ch| !STRIPPED.contains(ch))
                    .flat_map(char::to_lowercase)
                    .collect::<String>()
            })
            .filter(|word| !word.is_empty())
            .collect();
        Self { keywords }
    }

    /// Sanitised keywords.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether every keyword occurs in `note`, ignoring case.
    #[must_use]
    pub fn matches(&self, note: &str) -> bool {
        let note = note.to_lowercase();
        self.keywords.iter().all(|keyword| note.contains(keyword.as_str()))
    }
}

/// Which records of an account a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    /// Inclusive lower date bound.
    pub from: DateTime<Utc>,
    /// Exclusive upper date bound.
    pub to: DateTime<Utc>,
    /// Category names to keep; empty keeps all.
    pub categories: BTreeSet<String>,
    /// Record types to keep; empty keeps all.
    pub types: BTreeSet<RecordType>,
    /// Keywords every note must contain.
    pub term: SearchTerm,
}

impl RecordFilter {
    /// Every record dated within `[from, to)`.
    #[must_use]
    pub const fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            categories: BTreeSet::new(),
            types: BTreeSet::new(),
            term: SearchTerm {
                keywords: Vec::new(),
            },
        }
    }

    /// Every record dated within `month`.
    #[must_use]
    pub fn month(month: CalendarMonth) -> Self {
        Self::between(month.first_day(), month.end_exclusive())
    }

    /// Whether `record` passes every criterion.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let date = record.date();
        date >= self.from
            && date < self.to
            && (self.categories.is_empty() || self.categories.contains(&record.category().name))
            && (self.types.is_empty() || self.types.contains(&record.record_type()))
            && self.term.matches(record.note())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("  milk   bread ", &["milk", "bread"])]
    #[case(r#"x"; DROP TABLE records;"#, &["x", "drop", "table", "records"])]
    #[case(r#"";"#, &[])]
    fn strips_injection_characters(#[case] raw: &str, #[case] expected: &[&str]) {
        assert_eq!(SearchTerm::parse(raw).keywords(), expected);
    }

    #[rstest]
    #[case("milk bread", "Bread and MILK", true)]
    #[case("milk bread", "milk", false)]
    #[case("", "anything", true)]
    fn keywords_are_conjunctive(#[case] raw: &str, #[case] note: &str, #[case] expected: bool) {
        assert_eq!(SearchTerm::parse(raw).matches(note), expected);
    }
}
