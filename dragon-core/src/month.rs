//! Calendar-month arithmetic for the crawl window.
//!
//! A [`YearMonth`] is always stored as the first day of its month, so ordering
//! and comparison against arbitrary dates come for free from [`NaiveDate`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DocumentError;

/// A calendar month, serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// First month the analytics site has data for (August 2015).
    pub fn epoch() -> Self {
        Self::containing(NaiveDate::from_ymd_opt(2015, 8, 1).unwrap_or(NaiveDate::MIN))
    }

    /// Build a month from its year and 1-based month number.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// The following month, or `None` past the end of the supported calendar.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// English month name in lowercase, e.g. `march`.
    pub fn month_name(&self) -> String {
        self.0.format("%B").to_string().to_lowercase()
    }

    /// Path segment the analytics site uses for a month, e.g. `2021march`.
    pub fn url_segment(&self) -> String {
        format!("{}{}", self.year(), self.month_name())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DocumentError::invalid_month(s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Exclusive upper bound for crawling, relative to `today`.
///
/// The site reports placeholder data for the month in progress, so a month is
/// only crawled once its first day lies strictly before `today` minus one
/// month.
pub fn crawl_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(1))
        .unwrap_or(NaiveDate::MIN)
}

/// Iterator over consecutive months from a start month while the month's
/// first day is before `cutoff`.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<YearMonth>,
    cutoff: NaiveDate,
}

impl MonthRange {
    pub fn new(start: YearMonth, cutoff: NaiveDate) -> Self {
        Self {
            next: Some(start),
            cutoff,
        }
    }

    /// Months from [`YearMonth::epoch`] up to the crawl cutoff for `today`.
    pub fn for_crawl(today: NaiveDate) -> Self {
        Self::new(YearMonth::epoch(), crawl_cutoff(today))
    }
}

impl Iterator for MonthRange {
    type Item = YearMonth;

    fn next(&mut self) -> Option<YearMonth> {
        let current = self.next?;
        if current.first_day() >= self.cutoff {
            self.next = None;
            return None;
        }
        self.next = current.next();
        Some(current)
    }
}

#[cfg(test)]
#[path = "tests/month_tests.rs"]
mod tests;
