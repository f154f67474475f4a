//! Sales Dashboard - Monthly Retail Sales Charts
//!
//! Loads a sales CSV once, then shows revenue and rating charts for the
//! selected month.

mod charts;
mod config;
mod data;
mod error;
mod gui;
mod ppt;
mod report;

use anyhow::Context;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;
use gui::DashboardApp;
use report::DashboardSession;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let config = DashboardConfig::parse();

    let dataset = data::load(&config.data)
        .with_context(|| format!("cannot load sales data from {}", config.data.display()))?;

    let mut session = DashboardSession::new(dataset);
    if let Some(period) = config.period {
        let period = period.to_string();
        if session.has_period(&period) {
            session.select(&period);
        } else {
            warn!(period = %period, "requested month not in data, showing the first month");
        }
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Sales Dashboard"),
        ..Default::default()
    };

    let source = config.data.clone();
    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, session, &source)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
