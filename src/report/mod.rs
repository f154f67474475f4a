//! Report module - period aggregates, session state and JSON export

mod aggregator;
pub mod export;
mod sales_report;
mod session;

pub use aggregator::{shares, AggregateRow, DailyCityGrid};
pub use sales_report::{ChartKind, ChartShape, SalesReport};
pub use session::DashboardSession;
