//! Sales Dashboard Main Application
//! Main window with the month selector on the left and the charts in the
//! center. The dataset is loaded once before the window opens; a month change
//! only re-runs selection and aggregation.

use crate::charts::StaticChartRenderer;
use crate::error::ExportError;
use crate::gui::chart_viewer::LAYOUT;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::ppt::{PptGenerator, Slide};
use crate::report::{export, ChartKind, DashboardSession, SalesReport};
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info};

const IMAGE_WIDTH: u32 = 1200;
const IMAGE_HEIGHT: u32 = 900;

/// Export result from background thread
enum ExportResult {
    Complete(PathBuf),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    session: DashboardSession,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async PPT export
    export_rx: Option<Receiver<ExportResult>>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, session: DashboardSession, source: &Path) -> Self {
        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());
        let periods = session.periods().iter().map(|p| p.to_string()).collect();
        let control_panel = ControlPanel::new(
            source_name,
            session.dataset().len(),
            periods,
            session.selected(),
        );

        Self {
            session,
            control_panel,
            chart_viewer: ChartViewer::new(),
            export_rx: None,
        }
    }

    fn handle_period_changed(&mut self, period: &str) {
        info!(period, "month selected");
        self.session.select(period);
        self.control_panel.set_status(format!(
            "{} sales in {}",
            self.session.report().row_count,
            period
        ));
    }

    fn handle_export_json(&mut self) {
        let report = self.session.report();
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(format!("sales_report_{}.json", report.period))
            .save_file()
        else {
            return; // User cancelled
        };

        match export::write_report_json(&path, report) {
            Ok(()) => self
                .control_panel
                .set_status(format!("Exported {}", path.display())),
            Err(e) => {
                error!(error = %e, "JSON export failed");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Render charts and write the deck on a background thread.
    fn handle_export_ppt(&mut self) {
        if self.control_panel.is_exporting {
            return;
        }

        let report = self.session.report().clone();
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PowerPoint", &["pptx"])
            .set_file_name(format!("sales_report_{}.pptx", report.period))
            .save_file()
        else {
            return; // User cancelled
        };

        let (tx, rx) = channel();
        self.export_rx = Some(rx);
        self.control_panel.is_exporting = true;
        self.control_panel.set_status("Rendering charts...");

        thread::spawn(move || {
            let result = match write_deck(&report, &path) {
                Ok(()) => ExportResult::Complete(path),
                Err(e) => ExportResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for export results
    fn check_export_results(&mut self) {
        let Some(rx) = self.export_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(ExportResult::Complete(path)) => {
                self.control_panel.is_exporting = false;
                self.control_panel
                    .set_status(format!("Exported {}", path.display()));
                if let Err(e) = open::that(&path) {
                    error!(error = %e, path = %path.display(), "could not open exported deck");
                }
            }
            Ok(ExportResult::Error(message)) => {
                error!(error = %message, "PPT export failed");
                self.control_panel.is_exporting = false;
                self.control_panel.set_status(format!("Error: {message}"));
            }
            Err(_) => {
                // Still running
                self.export_rx = Some(rx);
            }
        }
    }
}

/// One slide per dashboard row, headed by the month.
fn deck_slides<F>(report: &SalesReport, mut render: F) -> Result<Vec<Slide>, ExportError>
where
    F: FnMut(ChartKind) -> Result<Vec<u8>, ExportError>,
{
    LAYOUT
        .iter()
        .map(|row| {
            let images = row
                .iter()
                .map(|&kind| render(kind))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Slide {
                heading: format!("Sales {}", report.period),
                images,
            })
        })
        .collect()
}

fn write_deck(report: &SalesReport, path: &Path) -> Result<(), ExportError> {
    let slides = deck_slides(report, |kind| {
        StaticChartRenderer::render_to_png(kind, report, IMAGE_WIDTH, IMAGE_HEIGHT)
    })?;
    PptGenerator::generate(&slides, path, &format!("Sales report {}", report.period))
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_export_results();

        if self.control_panel.is_exporting {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::PeriodChanged(period) => {
                            self.handle_period_changed(&period)
                        }
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::ExportPpt => self.handle_export_ppt(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Charts
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, self.session.report());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{record, SalesDataset};

    #[test]
    fn deck_has_one_slide_per_dashboard_row() {
        let dataset = SalesDataset::from_records(vec![
            record("2019-01-05", "Yangon", "Food", 10.0, "Cash", 8.0),
            record("2019-01-06", "Mandalay", "Sports", 20.0, "Ewallet", 6.0),
        ]);
        let report = SalesReport::build(&dataset.select_period("2019-01"));

        let mut rendered = Vec::new();
        let slides = deck_slides(&report, |kind| {
            rendered.push(kind);
            Ok(kind.title().as_bytes().to_vec())
        })
        .unwrap();

        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].images.len(), 2);
        assert_eq!(slides[1].images.len(), 3);
        assert!(slides.iter().all(|s| s.heading == "Sales 2019-01"));
        assert_eq!(rendered, LAYOUT.concat());
        assert_eq!(slides[1].images[2], b"Average rating by city".to_vec());
    }

    #[test]
    fn deck_stops_at_first_render_error() {
        let report = SalesReport::build(&SalesDataset::from_records(Vec::new()).select_period("2019-01"));
        let err = deck_slides(&report, |_| Err(ExportError::Render("no font".into()))).unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));
    }
}
