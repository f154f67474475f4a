//! Dashboard session: the loaded dataset plus the current month's report.

use crate::data::{Period, SalesDataset};
use crate::report::SalesReport;
use tracing::debug;

/// Owns the dataset for the life of the dashboard and re-derives the report
/// only when the selected period changes.
pub struct DashboardSession {
    dataset: SalesDataset,
    periods: Vec<Period>,
    selected: Option<String>,
    report: SalesReport,
}

impl DashboardSession {
    /// Start a session with the first available period selected.
    pub fn new(dataset: SalesDataset) -> Self {
        let periods = dataset.periods();
        let mut session = Self {
            dataset,
            periods,
            selected: None,
            report: SalesReport::default(),
        };
        if let Some(first) = session.periods.first().map(Period::to_string) {
            session.select(&first);
        }
        session
    }

    pub fn dataset(&self) -> &SalesDataset {
        &self.dataset
    }

    /// Distinct periods in date order, for the month selector.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn report(&self) -> &SalesReport {
        &self.report
    }

    pub fn has_period(&self, period: &str) -> bool {
        self.periods.iter().any(|p| p.to_string() == period)
    }

    /// Switch to `period` and rebuild the report. Reselecting the current
    /// period is a no-op. Unknown periods give an empty report.
    pub fn select(&mut self, period: &str) {
        if self.selected.as_deref() == Some(period) {
            return;
        }
        let view = self.dataset.select_period(period);
        self.report = SalesReport::build(&view);
        self.selected = Some(period.to_string());
        debug!(period, rows = self.report.row_count, "report rebuilt");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record;

    fn session() -> DashboardSession {
        DashboardSession::new(SalesDataset::from_records(vec![
            record("2019-02-01", "Yangon", "A", 20.0, "Cash", 5.0),
            record("2019-01-10", "Yangon", "A", 10.0, "Cash", 7.0),
            record("2019-03-30", "Mandalay", "B", 5.0, "Ewallet", 9.0),
        ]))
    }

    #[test]
    fn defaults_to_first_period() {
        let s = session();
        assert_eq!(s.selected(), Some("2019-01"));
        assert_eq!(s.report().period, "2019-01");
        assert_eq!(s.report().row_count, 1);
        let labels: Vec<String> = s.periods().iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, vec!["2019-01", "2019-02", "2019-03"]);
    }

    #[test]
    fn select_rebuilds_report() {
        let mut s = session();
        s.select("2019-03");
        assert_eq!(s.selected(), Some("2019-03"));
        assert_eq!(s.report().cities.len(), 1);
        assert_eq!(s.report().cities[0].key, "Mandalay");
        assert_eq!(s.dataset().len(), 3);
    }

    #[test]
    fn unknown_period_gives_empty_report() {
        let mut s = session();
        assert!(!s.has_period("2020-01"));
        s.select("2020-01");
        assert!(s.report().is_empty());
    }

    #[test]
    fn empty_dataset_has_no_selection() {
        let s = DashboardSession::new(SalesDataset::default());
        assert!(s.periods().is_empty());
        assert_eq!(s.selected(), None);
        assert!(s.report().is_empty());
    }
}
