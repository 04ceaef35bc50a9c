//! Calendar month arithmetic used by history snapshots and projections.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PortfolioError;

/// A calendar month (`YYYY-MM`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, PortfolioError> {
        if !(1..=12).contains(&month) {
            return Err(PortfolioError::ParseError(format!(
                "month must be between 1 and 12 (got {})",
                month
            )));
        }
        // Keep every month representable as a NaiveDate
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(PortfolioError::ParseError(format!(
                "year {} out of range",
                year
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.succ()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// The following month
    pub fn succ(&self) -> Self {
        self.plus_months(1)
    }

    /// The preceding month
    pub fn pred(&self) -> Self {
        self.plus_months(-1)
    }

    /// Shift by `n` months (negative moves backwards)
    pub fn plus_months(&self, n: i64) -> Self {
        let index = self.index() + n;
        let year = index.div_euclid(12) as i32;
        let month = index.rem_euclid(12) as u32 + 1;
        Self { year, month }
    }

    /// Number of months from `self` to `other` (negative when `other` is earlier)
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.index() - self.index()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed.split_once('-').ok_or_else(|| {
            PortfolioError::ParseError(format!("Invalid month '{}'. Use YYYY-MM", s))
        })?;
        let year = year
            .parse::<i32>()
            .map_err(|_| PortfolioError::ParseError(format!("Invalid year in '{}'", s)))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| PortfolioError::ParseError(format!("Invalid month in '{}'", s)))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = PortfolioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Inclusive range of months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    start: YearMonth,
    end: YearMonth,
}

impl MonthRange {
    pub fn new(start: YearMonth, end: YearMonth) -> Result<Self, PortfolioError> {
        if start > end {
            return Err(PortfolioError::ValidationError(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(month: YearMonth) -> Self {
        Self {
            start: month,
            end: month,
        }
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn end(&self) -> YearMonth {
        self.end
    }

    /// Number of months in the range (always at least 1)
    pub fn len(&self) -> usize {
        (self.start.months_until(self.end) + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.includes(YearMonth::from_date(date))
    }

    pub fn includes(&self, month: YearMonth) -> bool {
        month >= self.start && month <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = YearMonth> {
        let start = self.start;
        (0..self.len() as i64).map(move |offset| start.plus_months(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let month = ym("2024-03");
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2024-03");
        assert_eq!(ym(" 2024-3 ").to_string(), "2024-03");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2024".parse::<YearMonth>().is_err());
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024-00".parse::<YearMonth>().is_err());
        assert!("abcd-01".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_month_arithmetic_crosses_years() {
        assert_eq!(ym("2024-12").succ(), ym("2025-01"));
        assert_eq!(ym("2025-01").pred(), ym("2024-12"));
        assert_eq!(ym("2024-01").plus_months(25), ym("2026-02"));
        assert_eq!(ym("2024-01").plus_months(-13), ym("2022-12"));
        assert_eq!(ym("2024-01").months_until(ym("2025-03")), 14);
        assert_eq!(ym("2025-03").months_until(ym("2024-01")), -14);
    }

    #[test]
    fn test_first_and_last_day() {
        let feb = ym("2024-02");
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(
            ym("2023-12").last_day(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_serde_uses_text_form() {
        let json = serde_json::to_string(&ym("2024-07")).unwrap();
        assert_eq!(json, "\"2024-07\"");
        let parsed: YearMonth = serde_json::from_str("\"2023-11\"").unwrap();
        assert_eq!(parsed, ym("2023-11"));
        assert!(serde_json::from_str::<YearMonth>("\"2023-99\"").is_err());
    }

    #[test]
    fn test_range_iteration_and_membership() {
        let range = MonthRange::new(ym("2024-11"), ym("2025-02")).unwrap();
        assert_eq!(range.len(), 4);
        let months: Vec<String> = range.iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(MonthRange::new(ym("2025-01"), ym("2024-12")).is_err());
        assert_eq!(MonthRange::single(ym("2025-01")).len(), 1);
    }
}
