//! CSV Data Loader Module
//! Reads the sales CSV with Polars and normalizes it into a `SalesDataset`.
//!
//! The file format is fixed: `;` separates fields and `,` is the decimal
//! separator. Every column is read as text and numbers are parsed per cell,
//! so an error names the exact file line. Any malformed row fails the whole
//! load.

use crate::data::dataset::{SalesDataset, SalesRecord};
use crate::error::LoadError;
use chrono::NaiveDate;
use polars::prelude::{CsvReadOptions, DataFrame, DataType, SerReader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

pub const COL_DATE: &str = "Date";
pub const COL_CITY: &str = "City";
pub const COL_PRODUCT_LINE: &str = "Product line";
pub const COL_TOTAL: &str = "Total";
pub const COL_PAYMENT: &str = "Payment";
pub const COL_RATING: &str = "Rating";

const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_CITY,
    COL_PRODUCT_LINE,
    COL_TOTAL,
    COL_PAYMENT,
    COL_RATING,
];

/// Month-first is the convention of the sample dataset (`1/27/2019`).
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

const RATING_MAX: f64 = 10.0;

/// Load and normalize a sales CSV file.
pub fn load(path: &Path) -> Result<SalesDataset, LoadError> {
    info!(path = %path.display(), "loading sales data");
    let bytes = std::fs::read(path)?;
    let dataset = load_from_bytes(bytes)?;
    info!(
        rows = dataset.len(),
        periods = dataset.periods().len(),
        "sales data loaded"
    );
    Ok(dataset)
}

/// Load and normalize sales CSV content held in memory.
pub fn load_from_bytes(bytes: Vec<u8>) -> Result<SalesDataset, LoadError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(b';'))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    debug!(height = df.height(), width = df.width(), "csv parsed");
    records_from_frame(&df).map(SalesDataset::from_records)
}

fn records_from_frame(df: &DataFrame) -> Result<Vec<SalesRecord>, LoadError> {
    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            return Err(LoadError::MissingColumn(name));
        }
    }

    let dates = text_column(df, COL_DATE)?;
    let cities = text_column(df, COL_CITY)?;
    let products = text_column(df, COL_PRODUCT_LINE)?;
    let totals = number_column(df, COL_TOTAL)?;
    let payments = text_column(df, COL_PAYMENT)?;
    let ratings = number_column(df, COL_RATING)?;

    let mut records = Vec::with_capacity(df.height());
    for (idx, raw_date) in dates.into_iter().enumerate() {
        let line = idx + 2;
        let date = parse_date(&raw_date).ok_or_else(|| LoadError::InvalidDate {
            line,
            value: raw_date.clone(),
        })?;

        let total = totals[idx];
        if !total.is_finite() || total < 0.0 {
            return Err(LoadError::OutOfRange {
                line,
                column: COL_TOTAL,
                value: total,
            });
        }
        let rating = ratings[idx];
        if !(0.0..=RATING_MAX).contains(&rating) {
            return Err(LoadError::OutOfRange {
                line,
                column: COL_RATING,
                value: rating,
            });
        }

        records.push(SalesRecord {
            date,
            city: cities[idx].clone(),
            product_line: products[idx].clone(),
            total,
            payment: payments[idx].clone(),
            rating,
        });
    }

    Ok(records)
}

/// Extract a column as owned strings, rejecting nulls and blanks.
fn text_column(df: &DataFrame, name: &'static str) -> Result<Vec<String>, LoadError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;

    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(LoadError::InvalidValue {
                line: idx + 2,
                column: name,
            }),
        })
        .collect()
}

/// Extract a decimal-comma column as f64, reporting the first cell that is
/// not a number.
fn number_column(df: &DataFrame, name: &'static str) -> Result<Vec<f64>, LoadError> {
    text_column(df, name)?
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            parse_decimal(raw).ok_or(LoadError::InvalidValue {
                line: idx + 2,
                column: name,
            })
        })
        .collect()
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Invoice ID;Branch;City;Customer type;Gender;Product line;Unit price;Quantity;Tax 5%;Total;Date;Time;Payment;cogs;gross margin percentage;gross income;Rating";

    fn row(city: &str, product: &str, total: &str, date: &str, payment: &str, rating: &str) -> String {
        format!(
            "750-67-8428;A;{city};Member;Female;{product};74,69;7;26,1415;{total};{date};13:08;{payment};522,83;4,761904762;26,1415;{rating}"
        )
    }

    fn csv(rows: &[String]) -> Vec<u8> {
        let mut text = String::from(HEADER);
        for r in rows {
            text.push('\n');
            text.push_str(r);
        }
        text.push('\n');
        text.into_bytes()
    }

    #[test]
    fn loads_semicolon_comma_decimal_file() {
        let bytes = csv(&[
            row("Yangon", "Health and beauty", "548,9715", "1/5/2019", "Ewallet", "9,1"),
            row("Naypyitaw", "Electronic accessories", "80,22", "3/8/2019", "Cash", "9,6"),
            row("Yangon", "Home and lifestyle", "340,5255", "1/27/2019", "Credit card", "7,4"),
        ]);

        let ds = load_from_bytes(bytes).unwrap();
        assert_eq!(ds.len(), 3);

        let first = &ds.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2019, 1, 5).unwrap());
        assert_eq!(first.city, "Yangon");
        assert_eq!(first.product_line, "Health and beauty");
        assert!((first.total - 548.9715).abs() < 1e-9);
        assert_eq!(first.payment, "Ewallet");
        assert!((first.rating - 9.1).abs() < 1e-9);
    }

    #[test]
    fn output_is_sorted_by_date() {
        let bytes = csv(&[
            row("Yangon", "A", "10,0", "3/8/2019", "Cash", "5,0"),
            row("Yangon", "A", "10,0", "1/27/2019", "Cash", "5,0"),
            row("Yangon", "A", "10,0", "2/1/2019", "Cash", "5,0"),
            row("Yangon", "A", "10,0", "1/5/2019", "Cash", "5,0"),
        ]);

        let ds = load_from_bytes(bytes).unwrap();
        let dates: Vec<_> = ds.records().iter().map(|r| r.date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        let periods: Vec<String> = ds.periods().iter().map(|p| p.to_string()).collect();
        assert_eq!(periods, vec!["2019-01", "2019-02", "2019-03"]);
    }

    #[test]
    fn accepts_iso_dates() {
        let bytes = csv(&[row("Mandalay", "A", "1,5", "2019-02-14", "Cash", "6,0")]);
        let ds = load_from_bytes(bytes).unwrap();
        assert_eq!(
            ds.records()[0].date,
            NaiveDate::from_ymd_opt(2019, 2, 14).unwrap()
        );
    }

    #[test]
    fn missing_column_fails() {
        let bytes = b"Date;City;Product line;Total;Payment\n1/5/2019;Yangon;A;1,0;Cash\n".to_vec();
        let err = load_from_bytes(bytes).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Rating")));
    }

    #[test]
    fn bad_date_fails_whole_load() {
        let bytes = csv(&[
            row("Yangon", "A", "10,0", "1/5/2019", "Cash", "5,0"),
            row("Yangon", "A", "10,0", "not a date", "Cash", "5,0"),
        ]);
        match load_from_bytes(bytes).unwrap_err() {
            LoadError::InvalidDate { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparseable_total_fails() {
        let bytes = csv(&[
            row("Yangon", "A", "10,0", "1/5/2019", "Cash", "5,0"),
            row("Yangon", "A", "lots", "1/6/2019", "Cash", "5,0"),
        ]);
        let err = load_from_bytes(bytes).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue {
                line: 3,
                column: "Total",
            }
        ));
    }

    #[test]
    fn unparseable_rating_names_its_line() {
        let bytes = csv(&[
            row("Yangon", "A", "10,0", "1/5/2019", "Cash", "5,0"),
            row("Yangon", "A", "10,0", "1/6/2019", "Cash", "4,5"),
            row("Yangon", "A", "10,0", "1/7/2019", "Cash", "good"),
        ]);
        let err = load_from_bytes(bytes).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue {
                line: 4,
                column: "Rating",
            }
        ));
    }

    #[test]
    fn negative_total_is_out_of_range() {
        let bytes = csv(&[
            row("Yangon", "A", "10,0", "1/5/2019", "Cash", "5,0"),
            row("Yangon", "A", "-3,5", "1/6/2019", "Cash", "5,0"),
        ]);
        match load_from_bytes(bytes).unwrap_err() {
            LoadError::OutOfRange { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Total");
                assert_eq!(value, -3.5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_total_is_out_of_range() {
        let bytes = csv(&[row("Yangon", "A", "NaN", "1/5/2019", "Cash", "5,0")]);
        let err = load_from_bytes(bytes).unwrap_err();
        assert!(matches!(
            err,
            LoadError::OutOfRange {
                line: 2,
                column: "Total",
                ..
            }
        ));
    }

    #[test]
    fn blank_city_is_invalid() {
        let bytes = csv(&[
            row("Yangon", "A", "10,0", "1/5/2019", "Cash", "5,0"),
            row("", "A", "10,0", "1/6/2019", "Cash", "5,0"),
        ]);
        let err = load_from_bytes(bytes).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue {
                line: 3,
                column: "City",
            }
        ));
    }

    #[test]
    fn rating_out_of_range_fails() {
        let bytes = csv(&[row("Yangon", "A", "10,0", "1/5/2019", "Cash", "11,5")]);
        let err = load_from_bytes(bytes).unwrap_err();
        assert!(matches!(
            err,
            LoadError::OutOfRange {
                line: 2,
                column: "Rating",
                ..
            }
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&csv(&[row("Yangon", "A", "10,0", "1/5/2019", "Cash", "5,0")]))
            .unwrap();
        let ds = load(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
