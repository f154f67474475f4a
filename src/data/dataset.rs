//! Normalized sales dataset, the `YYYY-MM` period key and period views.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One row of the sales file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub city: String,
    pub product_line: String,
    pub total: f64,
    pub payment: String,
    pub rating: f64,
}

impl SalesRecord {
    /// Period is always derived from `date`, never stored.
    pub fn period(&self) -> Period {
        Period::of(self.date)
    }
}

/// Year-month key, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn of(date: NaiveDate) -> Self {
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
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid period '{0}', expected YYYY-MM")]
pub struct ParsePeriodError(String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePeriodError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sales records sorted ascending by date. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
}

impl SalesDataset {
    /// Build a dataset, sorting by date. The sort is stable so rows sharing a
    /// date keep their input order.
    pub fn from_records(mut records: Vec<SalesRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct periods in the order they first appear.
    pub fn periods(&self) -> Vec<Period> {
        let mut periods: Vec<Period> = Vec::new();
        for record in &self.records {
            let period = record.period();
            // Records are date-sorted, so duplicates are always adjacent.
            if periods.last() != Some(&period) {
                periods.push(period);
            }
        }
        periods
    }

    /// Rows whose period equals `period`. Unknown or malformed periods give an
    /// empty view.
    pub fn select_period(&self, period: &str) -> PeriodView<'_> {
        let rows = match period.parse::<Period>() {
            Ok(p) => self.records.iter().filter(|r| r.period() == p).collect(),
            Err(_) => Vec::new(),
        };
        PeriodView {
            label: period.to_string(),
            rows,
        }
    }
}

/// Read-only selection of one period's records, borrowed from the dataset.
#[derive(Debug, Clone)]
pub struct PeriodView<'a> {
    label: String,
    rows: Vec<&'a SalesRecord>,
}

impl<'a> PeriodView<'a> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rows(&self) -> &[&'a SalesRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
