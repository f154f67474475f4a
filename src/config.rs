//! Command line and environment configuration.

use crate::data::Period;
use clap::Parser;
use std::path::PathBuf;

pub const DATA_ENV: &str = "SALES_DASHBOARD_DATA";

#[derive(Parser, Debug, Clone)]
#[command(name = "sales_dashboard", version, about = "Monthly retail sales dashboard")]
pub struct DashboardConfig {
    /// Sales CSV (`;` separated, `,` decimal separator)
    #[arg(env = DATA_ENV, default_value = "supermarket_sales.csv")]
    pub data: PathBuf,

    /// Month to show first, as YYYY-MM (defaults to the earliest month)
    #[arg(long)]
    pub period: Option<Period>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_and_period() {
        let config =
            DashboardConfig::try_parse_from(["sales_dashboard", "sales.csv", "--period", "2019-02"])
                .unwrap();
        assert_eq!(config.data, PathBuf::from("sales.csv"));
        assert_eq!(config.period.map(|p| p.to_string()).as_deref(), Some("2019-02"));
    }

    #[test]
    fn rejects_malformed_period() {
        let result =
            DashboardConfig::try_parse_from(["sales_dashboard", "sales.csv", "--period", "Feb"]);
        assert!(result.is_err());
    }
}
