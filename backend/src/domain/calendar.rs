//! Calendar periods used to bucket records.
//!
//! All periods are UTC. A month starts at midnight of day 1; a week starts
//! at midnight of Monday (ISO-8601).

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use mockable::Clock;

/// A `(year, month)` pair with no time of day.
///
/// # Examples
/// ```
/// use backend::domain::CalendarMonth;
///
/// let feb = CalendarMonth::new(2024, 2).expect("valid month");
/// assert_eq!(feb.last_day().to_rfc3339(), "2024-02-29T00:00:00+00:00");
/// assert_eq!(feb.next_month().map(|m| m.month()), Some(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    /// Month `month` (1-12) of `year`; `None` outside the supported range.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: DateTime<Utc>) -> Self {
        let day = date.date_naive();
        Self {
            first: day - Days::new(u64::from(day.day0())),
        }
    }

    /// The month containing the clock's current UTC time.
    #[must_use]
    pub fn current(clock: &dyn Clock) -> Self {
        Self::of(clock.utc())
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.first.year()
    }

    /// Month of the year, 1-12.
    #[must_use]
    pub fn month(self) -> u32 {
        self.first.month()
    }

    /// Number of days in the month.
    #[must_use]
    pub fn days(self) -> u32 {
        match self.month() {
            4 | 6 | 9 | 11 => 30,
            2 if NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some() => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// Midnight UTC of day 1.
    #[must_use]
    pub fn first_day(self) -> DateTime<Utc> {
        midnight(self.first)
    }

    /// Midnight UTC of the last day (`first_day + 1 month - 1 day`).
    #[must_use]
    pub fn last_day(self) -> DateTime<Utc> {
        midnight(self.first + Days::new(u64::from(self.days() - 1)))
    }

    /// First instant after the month.
    #[must_use]
    pub fn end_exclusive(self) -> DateTime<Utc> {
        midnight(
            self.first
                .checked_add_days(Days::new(u64::from(self.days())))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    /// Whether `date` falls inside the month.
    #[must_use]
    pub fn contains(self, date: DateTime<Utc>) -> bool {
        Self::of(date) == self
    }

    /// The following month, rolling over the year.
    #[must_use]
    pub fn next_month(self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    /// The preceding month, rolling back the year.
    #[must_use]
    pub fn previous_month(self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }
}

/// An ISO week starting on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarWeek {
    monday: NaiveDate,
}

impl CalendarWeek {
    /// The week containing `date`.
    #[must_use]
    pub fn of(date: DateTime<Utc>) -> Self {
        let day = date.date_naive();
        Self {
            monday: day - Days::new(u64::from(day.weekday().num_days_from_monday())),
        }
    }

    /// Midnight UTC of Monday.
    #[must_use]
    pub fn first_day(self) -> DateTime<Utc> {
        midnight(self.monday)
    }

    /// First instant after Sunday.
    #[must_use]
    pub fn end_exclusive(self) -> DateTime<Utc> {
        midnight(
            self.monday
                .checked_add_days(Days::new(7))
                .unwrap_or(NaiveDate::MAX),
        )
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
