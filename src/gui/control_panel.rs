//! Control Panel Widget
//! Left side panel with the data source summary, month selector and exports.

use egui::{Color32, ComboBox, RichText};

/// Left side control panel.
pub struct ControlPanel {
    pub source_name: String,
    pub row_count: usize,
    pub periods: Vec<String>,
    pub selected: String,
    pub status: String,
    pub is_exporting: bool,
}

impl ControlPanel {
    pub fn new(source_name: String, row_count: usize, periods: Vec<String>, selected: Option<&str>) -> Self {
        Self {
            source_name,
            row_count,
            selected: selected.unwrap_or_default().to_string(),
            periods,
            status: "Ready".to_string(),
            is_exporting: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Sales Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("Monthly view").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.source_name).size(12.0));
                ui.label(
                    RichText::new(format!("{} sales, {} months", self.row_count, self.periods.len()))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Month Section =====
        ui.label(RichText::new("📅 Month").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(!self.periods.is_empty(), |ui| {
            ComboBox::from_id_salt("month")
                .width(150.0)
                .selected_text(&self.selected)
                .show_ui(ui, |ui| {
                    for period in &self.periods {
                        if ui
                            .selectable_label(self.selected == *period, period)
                            .clicked()
                            && self.selected != *period
                        {
                            self.selected = period.clone();
                            action = ControlPanelAction::PeriodChanged(period.clone());
                        }
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            let can_export = !self.selected.is_empty() && !self.is_exporting;
            ui.add_enabled_ui(can_export, |ui| {
                let json_button = egui::Button::new(RichText::new("🗎 Export JSON").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(json_button).clicked() {
                    action = ControlPanelAction::ExportJson;
                }

                ui.add_space(8.0);

                let ppt_button = egui::Button::new(RichText::new("📄 Export PPT").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(ppt_button).clicked() {
                    action = ControlPanelAction::ExportPpt;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        if self.is_exporting {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Exporting...").size(11.0));
            });
        }

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    PeriodChanged(String),
    ExportJson,
    ExportPpt,
}
