use crate::error::{FarescopeError, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// Longest date range a single request may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// A validated origin/destination pair over an inclusive date range.
///
/// Construction enforces three-letter airport codes, distinct endpoints and
/// `date_from <= date_to`. Reversed ranges are rejected, never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteQuery {
    origin: String,
    destination: String,
    date_from: NaiveDate,
    date_to: NaiveDate,
}

impl RouteQuery {
    pub fn new(
        origin: &str,
        destination: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Self> {
        let origin = parse_airport_code(origin)?;
        let destination = parse_airport_code(destination)?;

        if origin == destination {
            return Err(FarescopeError::Validation(format!(
                "origin and destination must differ (both {})",
                origin
            )));
        }

        if date_from > date_to {
            return Err(FarescopeError::Validation(format!(
                "date_from {} is after date_to {}",
                date_from, date_to
            )));
        }

        let days = (date_to - date_from).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(FarescopeError::Validation(format!(
                "date range covers {} days, at most {} allowed",
                days, MAX_RANGE_DAYS
            )));
        }

        Ok(Self {
            origin,
            destination,
            date_from,
            date_to,
        })
    }

    /// Like [`RouteQuery::new`] but parses `YYYY-MM-DD` dates.
    pub fn parse(origin: &str, destination: &str, date_from: &str, date_to: &str) -> Result<Self> {
        Self::new(origin, destination, parse_date(date_from)?, parse_date(date_to)?)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn date_from(&self) -> NaiveDate {
        self.date_from
    }

    pub fn date_to(&self) -> NaiveDate {
        self.date_to
    }

    pub fn route_label(&self) -> String {
        crate::types::route_label(&self.origin, &self.destination)
    }

    /// Number of calendar dates in the range.
    pub fn day_count(&self) -> usize {
        ((self.date_to - self.date_from).num_days() + 1) as usize
    }

    /// Every date in the range, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.date_from.iter_days().take(self.day_count())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.date_from && date <= self.date_to
    }
}

/// Three ASCII letters, case-insensitive; returned upper-cased.
pub fn parse_airport_code(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(FarescopeError::Validation(format!(
            "malformed airport code {:?}: expected three letters",
            code
        )))
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
        FarescopeError::Validation(format!("malformed date {:?}: {} (expected YYYY-MM-DD)", s, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_codes() {
        let q = RouteQuery::parse("syd", " mel ", "2025-07-19", "2025-07-21").unwrap();
        assert_eq!(q.origin(), "SYD");
        assert_eq!(q.destination(), "MEL");
        assert_eq!(q.day_count(), 3);
        assert_eq!(q.route_label(), "SYD-MEL");
        let dates: Vec<_> = q.dates().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2025-07-19", "2025-07-20", "2025-07-21"]);
    }

    #[test]
    fn reversed_range_is_a_validation_error() {
        let err = RouteQuery::parse("SYD", "MEL", "2025-07-21", "2025-07-19").unwrap_err();
        assert!(matches!(err, FarescopeError::Validation(_)));
    }

    #[test]
    fn single_day_range_is_valid() {
        let q = RouteQuery::parse("SYD", "MEL", "2025-07-19", "2025-07-19").unwrap();
        assert_eq!(q.day_count(), 1);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(RouteQuery::parse("SY", "MEL", "2025-07-19", "2025-07-21").is_err());
        assert!(RouteQuery::parse("SYD1", "MEL", "2025-07-19", "2025-07-21").is_err());
        assert!(RouteQuery::parse("SYD", "syd", "2025-07-19", "2025-07-21").is_err());
        assert!(RouteQuery::parse("SYD", "MEL", "19/07/2025", "2025-07-21").is_err());
        assert!(RouteQuery::parse("SYD", "MEL", "2025-01-01", "2026-12-31").is_err());
    }
}
