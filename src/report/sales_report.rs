//! The five titled result sets for one period.

use crate::data::PeriodView;
use crate::report::aggregator::{AggregateRow, Aggregator, DailyCityGrid, DailyCityPoint};
use serde::Serialize;

/// How a result set is meant to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartShape {
    StackedBars,
    HorizontalBars,
    Bars,
    Pie,
}

/// The five charts of the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    DailyCity,
    ProductLine,
    City,
    Payment,
    CityRating,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::DailyCity,
        ChartKind::ProductLine,
        ChartKind::City,
        ChartKind::Payment,
        ChartKind::CityRating,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::DailyCity => "Revenue by day",
            ChartKind::ProductLine => "Revenue by product line",
            ChartKind::City => "Revenue by city",
            ChartKind::Payment => "Revenue by payment method",
            ChartKind::CityRating => "Average rating by city",
        }
    }

    pub fn shape(&self) -> ChartShape {
        match self {
            ChartKind::DailyCity => ChartShape::StackedBars,
            ChartKind::ProductLine => ChartShape::HorizontalBars,
            ChartKind::City | ChartKind::CityRating => ChartShape::Bars,
            ChartKind::Payment => ChartShape::Pie,
        }
    }

    /// Axis captions as (category axis, value axis).
    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            ChartKind::DailyCity => ("Date", "Total"),
            ChartKind::ProductLine => ("Product line", "Total"),
            ChartKind::City => ("City", "Total"),
            ChartKind::Payment => ("Payment", "Total"),
            ChartKind::CityRating => ("City", "Rating"),
        }
    }

    /// Whether a plain bar chart gets one colour per bar instead of the base
    /// colour. Stacked bars and the pie always colour by series.
    pub fn colored_by_category(&self) -> bool {
        matches!(self, ChartKind::CityRating)
    }
}

/// Aggregates of one period, ready for presentation or export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesReport {
    pub period: String,
    pub row_count: usize,
    pub daily_city: Vec<DailyCityPoint>,
    #[serde(skip)]
    pub daily_grid: DailyCityGrid,
    pub product_lines: Vec<AggregateRow>,
    pub cities: Vec<AggregateRow>,
    pub payments: Vec<AggregateRow>,
    pub city_ratings: Vec<AggregateRow>,
}

impl SalesReport {
    /// Compute every aggregate of `view`. The operations are independent and
    /// run on the rayon pool.
    pub fn build(view: &PeriodView<'_>) -> Self {
        let ((daily_city, product_lines), ((cities, payments), city_ratings)) = rayon::join(
            || {
                rayon::join(
                    || Aggregator::daily_city_totals(view),
                    || Aggregator::product_line_totals(view),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || Aggregator::city_totals(view),
                            || Aggregator::payment_totals(view),
                        )
                    },
                    || Aggregator::city_avg_rating(view),
                )
            },
        );

        let daily_grid = DailyCityGrid::from_points(&daily_city);

        Self {
            period: view.label().to_string(),
            row_count: view.len(),
            daily_city,
            daily_grid,
            product_lines,
            cities,
            payments,
            city_ratings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Keyed rows behind a chart. `DailyCity` has none; use `daily_grid`.
    pub fn rows(&self, kind: ChartKind) -> &[AggregateRow] {
        match kind {
            ChartKind::DailyCity => &[],
            ChartKind::ProductLine => &self.product_lines,
            ChartKind::City => &self.cities,
            ChartKind::Payment => &self.payments,
            ChartKind::CityRating => &self.city_ratings,
        }
    }

    pub fn total_revenue(&self) -> f64 {
        self.cities.iter().map(|r| r.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{record, SalesDataset};

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            record("2019-01-03", "Yangon", "Food and beverages", 30.0, "Cash", 7.0),
            record("2019-01-09", "Yangon", "Home and lifestyle", 70.0, "Ewallet", 9.0),
            record("2019-01-09", "Mandalay", "Food and beverages", 15.0, "Cash", 6.5),
            record("2019-02-11", "Naypyitaw", "Fashion accessories", 400.0, "Credit card", 3.0),
        ])
    }

    #[test]
    fn build_matches_individual_aggregates() {
        let ds = dataset();
        let view = ds.select_period("2019-01");
        let report = SalesReport::build(&view);

        assert_eq!(report.period, "2019-01");
        assert_eq!(report.row_count, 3);
        assert_eq!(report.daily_city, Aggregator::daily_city_totals(&view));
        assert_eq!(report.product_lines, Aggregator::product_line_totals(&view));
        assert_eq!(report.cities, Aggregator::city_totals(&view));
        assert_eq!(report.payments, Aggregator::payment_totals(&view));
        assert_eq!(report.city_ratings, Aggregator::city_avg_rating(&view));
        assert!((report.total_revenue() - 115.0).abs() < 1e-9);
    }

    #[test]
    fn january_report_has_no_february_rows() {
        let ds = dataset();
        let report = SalesReport::build(&ds.select_period("2019-01"));
        for kind in ChartKind::ALL {
            assert!(report.rows(kind).iter().all(|r| r.key != "Naypyitaw"
                && r.key != "Fashion accessories"
                && r.key != "Credit card"));
        }
        assert!(report.daily_city.iter().all(|p| p.city != "Naypyitaw"));
    }

    #[test]
    fn unknown_period_builds_empty_report() {
        let ds = dataset();
        let report = SalesReport::build(&ds.select_period("1999-12"));
        assert!(report.is_empty());
        assert!(report.daily_grid.is_empty());
        for kind in ChartKind::ALL {
            assert!(report.rows(kind).is_empty());
        }
    }

    #[test]
    fn chart_kinds_have_fixed_titles_and_shapes() {
        assert_eq!(ChartKind::ProductLine.shape(), ChartShape::HorizontalBars);
        assert_eq!(ChartKind::Payment.shape(), ChartShape::Pie);
        assert_eq!(ChartKind::CityRating.title(), "Average rating by city");
        assert_eq!(ChartKind::CityRating.axis_labels(), ("City", "Rating"));
    }

    #[test]
    fn only_plain_bar_charts_colour_by_category() {
        let coloured: Vec<ChartKind> = ChartKind::ALL
            .into_iter()
            .filter(|k| k.colored_by_category())
            .collect();
        assert_eq!(coloured, vec![ChartKind::CityRating]);
        assert!(coloured
            .iter()
            .all(|k| matches!(k.shape(), ChartShape::Bars | ChartShape::HorizontalBars)));
    }
}
