//! Chart Viewer Widget
//! Central scrollable panel with the five report charts: two cards in the
//! first row, three in the second.

use crate::charts::ChartPlotter;
use crate::report::{ChartKind, SalesReport};
use egui::{RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 320.0;

/// Rows of the dashboard grid.
pub const LAYOUT: [&[ChartKind]; 2] = [
    &[ChartKind::DailyCity, ChartKind::ProductLine],
    &[ChartKind::City, ChartKind::Payment, ChartKind::CityRating],
];

#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&self, ui: &mut egui::Ui, report: &SalesReport) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(format!("Month {}", report.period));
                    ui.label(
                        RichText::new(format!(
                            "{} sales, revenue {:.2}",
                            report.row_count,
                            report.total_revenue()
                        ))
                        .size(13.0),
                    );
                });
                ui.add_space(CHART_SPACING);

                for row in LAYOUT {
                    ui.columns(row.len(), |columns| {
                        for (column, &kind) in columns.iter_mut().zip(row.iter()) {
                            Self::draw_card(column, kind, report);
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    fn draw_card(ui: &mut egui::Ui, kind: ChartKind, report: &SalesReport) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(kind.title()).size(16.0).strong());
                ui.add_space(6.0);
                ChartPlotter::draw_chart(ui, kind, report, CHART_HEIGHT);
            });
    }
}
