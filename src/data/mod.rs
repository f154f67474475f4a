//! Data module - CSV loading and the normalized sales dataset

mod dataset;
mod loader;

pub use dataset::{Period, PeriodView, SalesDataset, SalesRecord};
pub use loader::load;

#[cfg(test)]
pub(crate) use dataset::tests::record;
