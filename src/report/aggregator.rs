//! Report Aggregator Module
//! Group-by-reduce operations over a single period's rows.
//!
//! Every operation is a pure function of the `PeriodView`, so they can be
//! evaluated in any order or in parallel.

use crate::data::{PeriodView, SalesRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One group of a keyed aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub value: f64,
}

/// One row of the day/city projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCityPoint {
    pub date: NaiveDate,
    pub city: String,
    pub total: f64,
}

/// Dense day × city matrix of summed totals, used for stacked bars.
///
/// `values[c][d]` is the total of `cities[c]` on `dates[d]`, zero when the
/// city had no sales that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyCityGrid {
    pub dates: Vec<NaiveDate>,
    pub cities: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl DailyCityGrid {
    pub fn from_points(points: &[DailyCityPoint]) -> Self {
        let dates: Vec<NaiveDate> = points
            .iter()
            .map(|p| p.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let cities: Vec<String> = points
            .iter()
            .map(|p| p.city.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut values = vec![vec![0.0; dates.len()]; cities.len()];
        for point in points {
            // Both lookups succeed: the key sets were built from `points`.
            if let (Ok(c), Ok(d)) = (
                cities.binary_search(&point.city),
                dates.binary_search(&point.date),
            ) {
                values[c][d] += point.total;
            }
        }

        Self {
            dates,
            cities,
            values,
        }
    }

    /// Highest stacked day total.
    pub fn max_stacked(&self) -> f64 {
        (0..self.dates.len())
            .map(|d| self.values.iter().map(|series| series[d]).sum::<f64>())
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Reduce {
    Sum,
    Mean,
}

/// Group rows by `key`, reduce `value` per group. Output is in key order.
fn group_reduce<K, V>(view: &PeriodView<'_>, key: K, value: V, reduce: Reduce) -> Vec<AggregateRow>
where
    K: Fn(&SalesRecord) -> &str,
    V: Fn(&SalesRecord) -> f64,
{
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &record in view.rows() {
        let entry = groups.entry(key(record)).or_insert((0.0, 0));
        entry.0 += value(record);
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(k, (sum, count))| AggregateRow {
            key: k.to_string(),
            value: match reduce {
                Reduce::Sum => sum,
                // Groups only exist for keys seen at least once.
                Reduce::Mean => sum / count as f64,
            },
        })
        .collect()
}

/// Handles the five report aggregates.
pub struct Aggregator;

impl Aggregator {
    /// Project each row to `(date, city, total)`, keeping view order.
    pub fn daily_city_totals(view: &PeriodView<'_>) -> Vec<DailyCityPoint> {
        view.rows()
            .iter()
            .map(|r| DailyCityPoint {
                date: r.date,
                city: r.city.clone(),
                total: r.total,
            })
            .collect()
    }

    /// Revenue per product line, ascending by total, ties by name.
    pub fn product_line_totals(view: &PeriodView<'_>) -> Vec<AggregateRow> {
        let mut rows = group_reduce(view, |r| r.product_line.as_str(), |r| r.total, Reduce::Sum);
        // Stable sort on value keeps the name order from the grouping for ties.
        rows.sort_by(|a, b| a.value.total_cmp(&b.value));
        rows
    }

    /// Revenue per city.
    pub fn city_totals(view: &PeriodView<'_>) -> Vec<AggregateRow> {
        group_reduce(view, |r| r.city.as_str(), |r| r.total, Reduce::Sum)
    }

    /// Revenue per payment method.
    pub fn payment_totals(view: &PeriodView<'_>) -> Vec<AggregateRow> {
        group_reduce(view, |r| r.payment.as_str(), |r| r.total, Reduce::Sum)
    }

    /// Mean rating per city.
    pub fn city_avg_rating(view: &PeriodView<'_>) -> Vec<AggregateRow> {
        group_reduce(view, |r| r.city.as_str(), |r| r.rating, Reduce::Mean)
    }
}

/// Each row's fraction of the summed values. Empty when the sum is not
/// positive, since a share of nothing is meaningless.
pub fn shares(rows: &[AggregateRow]) -> Vec<f64> {
    let sum: f64 = rows.iter().map(|r| r.value).sum();
    if sum <= 0.0 {
        return Vec::new();
    }
    rows.iter().map(|r| r.value / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{record, SalesDataset};

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            record("2019-01-05", "Yangon", "Health and beauty", 100.0, "Cash", 7.0),
            record("2019-01-05", "Mandalay", "Sports and travel", 40.0, "Ewallet", 6.0),
            record("2019-01-06", "Yangon", "Sports and travel", 60.0, "Ewallet", 9.0),
            record("2019-01-20", "Naypyitaw", "Food and beverages", 25.0, "Credit card", 8.5),
            record("2019-01-20", "Mandalay", "Health and beauty", 10.0, "Cash", 4.0),
            record("2019-02-02", "Yangon", "Electronic accessories", 999.0, "Cash", 1.0),
            record("2019-02-10", "Bago", "Food and beverages", 500.0, "Ewallet", 10.0),
        ])
    }

    fn value_of(rows: &[AggregateRow], key: &str) -> Option<f64> {
        rows.iter().find(|r| r.key == key).map(|r| r.value)
    }

    #[test]
    fn daily_city_totals_is_a_projection() {
        let ds = dataset();
        let view = ds.select_period("2019-01");
        let points = Aggregator::daily_city_totals(&view);
        assert_eq!(points.len(), view.len());
        assert_eq!(points[0].city, "Yangon");
        assert_eq!(points[1].city, "Mandalay");
        assert!((points[2].total - 60.0).abs() < 1e-9);
    }

    #[test]
    fn daily_city_grid_fills_missing_cells_with_zero() {
        let ds = dataset();
        let view = ds.select_period("2019-01");
        let grid = DailyCityGrid::from_points(&Aggregator::daily_city_totals(&view));
        assert_eq!(grid.dates.len(), 3);
        assert_eq!(grid.cities, vec!["Mandalay", "Naypyitaw", "Yangon"]);
        // Mandalay: 40 on the 5th, nothing on the 6th, 10 on the 20th.
        assert_eq!(grid.values[0], vec![40.0, 0.0, 10.0]);
        assert!((grid.max_stacked() - 140.0).abs() < 1e-9);
    }

    #[test]
    fn product_line_totals_ascending() {
        let ds = dataset();
        let view = ds.select_period("2019-01");
        let rows = Aggregator::product_line_totals(&view);
        assert!(rows.windows(2).all(|w| w[0].value <= w[1].value));
        assert_eq!(value_of(&rows, "Health and beauty"), Some(110.0));
        assert_eq!(value_of(&rows, "Sports and travel"), Some(100.0));
        assert_eq!(rows[0].key, "Food and beverages");
    }

    #[test]
    fn product_line_ties_break_by_name() {
        let ds = SalesDataset::from_records(vec![
            record("2019-03-01", "Yangon", "Zeta", 50.0, "Cash", 5.0),
            record("2019-03-02", "Yangon", "Alpha", 50.0, "Cash", 5.0),
            record("2019-03-03", "Yangon", "Mid", 10.0, "Cash", 5.0),
        ]);
        let view = ds.select_period("2019-03");
        let keys: Vec<_> = Aggregator::product_line_totals(&view)
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn city_totals_conserve_period_revenue() {
        let ds = dataset();
        let view = ds.select_period("2019-01");
        let rows = Aggregator::city_totals(&view);
        let by_city: f64 = rows.iter().map(|r| r.value).sum();
        let raw: f64 = view.rows().iter().map(|r| r.total).sum();
        assert!((by_city - raw).abs() < 1e-9);
        assert_eq!(value_of(&rows, "Yangon"), Some(160.0));
    }

    #[test]
    fn payment_totals_and_shares() {
        let ds = dataset();
        let view = ds.select_period("2019-01");
        let rows = Aggregator::payment_totals(&view);
        assert_eq!(value_of(&rows, "Cash"), Some(110.0));
        assert_eq!(value_of(&rows, "Ewallet"), Some(100.0));
        assert_eq!(value_of(&rows, "Credit card"), Some(25.0));

        let s = shares(&rows);
        assert!((s.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(shares(&[]).is_empty());
    }

    #[test]
    fn city_avg_rating_is_arithmetic_mean() {
        let ds = dataset();
        let view = ds.select_period("2019-01");
        let rows = Aggregator::city_avg_rating(&view);
        assert_eq!(value_of(&rows, "Yangon"), Some(8.0));
        assert_eq!(value_of(&rows, "Mandalay"), Some(5.0));
        assert_eq!(value_of(&rows, "Bago"), None);
    }

    #[test]
    fn selected_period_excludes_other_months_everywhere() {
        let ds = dataset();
        let view = ds.select_period("2019-01");

        assert!(Aggregator::daily_city_totals(&view)
            .iter()
            .all(|p| p.date < chrono::NaiveDate::from_ymd_opt(2019, 2, 1).unwrap()));
        assert_eq!(
            value_of(&Aggregator::product_line_totals(&view), "Electronic accessories"),
            None
        );
        assert_eq!(value_of(&Aggregator::city_totals(&view), "Bago"), None);
        assert!(Aggregator::payment_totals(&view)
            .iter()
            .map(|r| r.value)
            .sum::<f64>()
            < 999.0);
        assert_eq!(value_of(&Aggregator::city_avg_rating(&view), "Bago"), None);
    }

    #[test]
    fn empty_view_yields_empty_aggregates() {
        let ds = dataset();
        let view = ds.select_period("2030-01");
        assert!(Aggregator::daily_city_totals(&view).is_empty());
        assert!(Aggregator::product_line_totals(&view).is_empty());
        assert!(Aggregator::city_totals(&view).is_empty());
        assert!(Aggregator::payment_totals(&view).is_empty());
        assert!(Aggregator::city_avg_rating(&view).is_empty());
    }
}
