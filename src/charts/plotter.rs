//! Chart Plotter Module
//! Draws the five report charts interactively using egui_plot.

use crate::charts::{palette_rgb, BASE_COLOR};
use crate::report::{shares, AggregateRow, ChartKind, ChartShape, DailyCityGrid, SalesReport};
use egui::{Color32, RichText, Sense, Shape, Stroke};
use egui_plot::{Bar, BarChart, Legend, Plot};
use std::f32::consts::TAU;

const EMPTY_TEXT: &str = "No sales in this month";

fn color32(rgb: (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

pub fn category_color(index: usize) -> Color32 {
    color32(palette_rgb(index))
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one chart of `report`, dispatching on its shape hint.
    pub fn draw_chart(ui: &mut egui::Ui, kind: ChartKind, report: &SalesReport, height: f32) {
        if report.is_empty() {
            Self::draw_placeholder(ui, height);
            return;
        }

        match kind.shape() {
            ChartShape::StackedBars => Self::draw_stacked_bars(ui, kind, &report.daily_grid, height),
            ChartShape::HorizontalBars => {
                Self::draw_bars(ui, kind, report.rows(kind), height, true)
            }
            ChartShape::Bars => Self::draw_bars(ui, kind, report.rows(kind), height, false),
            ChartShape::Pie => Self::draw_pie(ui, report.rows(kind), height),
        }
    }

    fn draw_placeholder(ui: &mut egui::Ui, height: f32) {
        ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(EMPTY_TEXT).size(14.0).color(Color32::GRAY));
            });
        });
    }

    /// One bar series per city stacked on the previous ones, x = day.
    fn draw_stacked_bars(ui: &mut egui::Ui, kind: ChartKind, grid: &DailyCityGrid, height: f32) {
        let (x_label, y_label) = kind.axis_labels();
        let day_labels: Vec<String> = grid
            .dates
            .iter()
            .map(|d| d.format("%m-%d").to_string())
            .collect();

        Plot::new(format!("chart_{:?}", kind))
            .height(height)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| index_label(&day_labels, mark.value))
            .show(ui, |plot_ui| {
                let mut stacked: Vec<BarChart> = Vec::with_capacity(grid.cities.len());
                for (c, city) in grid.cities.iter().enumerate() {
                    let color = category_color(c);
                    let bars: Vec<Bar> = grid.values[c]
                        .iter()
                        .enumerate()
                        .map(|(d, &v)| Bar::new(d as f64, v).width(0.7).fill(color))
                        .collect();

                    let below: Vec<&BarChart> = stacked.iter().collect();
                    let chart = BarChart::new(bars)
                        .name(city)
                        .color(color)
                        .stack_on(&below);
                    stacked.push(chart);
                }
                for chart in stacked {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Keyed bars; vertical with categories on x, or horizontal with
    /// categories on y.
    fn draw_bars(
        ui: &mut egui::Ui,
        kind: ChartKind,
        rows: &[AggregateRow],
        height: f32,
        horizontal: bool,
    ) {
        let (category_label, value_label) = kind.axis_labels();
        let keys: Vec<String> = rows.iter().map(|r| r.key.clone()).collect();
        let per_category = kind.colored_by_category();

        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let color = if per_category {
                    category_color(i)
                } else {
                    color32(BASE_COLOR)
                };
                Bar::new(i as f64, row.value)
                    .width(0.6)
                    .name(&row.key)
                    .fill(color)
            })
            .collect();

        let mut chart = BarChart::new(bars).color(color32(BASE_COLOR));
        if horizontal {
            chart = chart.horizontal();
        }

        let mut plot = Plot::new(format!("chart_{:?}", kind))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false);

        plot = if horizontal {
            plot.include_x(0.0)
                .x_axis_label(value_label)
                .y_axis_label(category_label)
                .y_axis_formatter(move |mark, _range| index_label(&keys, mark.value))
        } else {
            plot.include_y(0.0)
                .x_axis_label(category_label)
                .y_axis_label(value_label)
                .x_axis_formatter(move |mark, _range| index_label(&keys, mark.value))
        };

        plot.show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
    }

    /// Pie of each row's share, with a legend of percentages beside it.
    fn draw_pie(ui: &mut egui::Ui, rows: &[AggregateRow], height: f32) {
        let fractions = shares(rows);
        if fractions.is_empty() {
            Self::draw_placeholder(ui, height);
            return;
        }

        ui.horizontal(|ui| {
            let (response, painter) = ui.allocate_painter(egui::vec2(height, height), Sense::hover());
            let center = response.rect.center();
            let radius = height * 0.45;

            let mut start = -TAU / 4.0;
            for (i, fraction) in fractions.iter().enumerate() {
                let sweep = *fraction as f32 * TAU;
                let color = category_color(i);
                // Thin triangles keep every piece convex, whatever the sweep.
                let steps = ((sweep / 0.05).ceil() as usize).max(1);
                for s in 0..steps {
                    let a0 = start + sweep * s as f32 / steps as f32;
                    let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                    painter.add(Shape::convex_polygon(
                        vec![
                            center,
                            center + radius * egui::vec2(a0.cos(), a0.sin()),
                            center + radius * egui::vec2(a1.cos(), a1.sin()),
                        ],
                        color,
                        Stroke::NONE,
                    ));
                }
                start += sweep;
            }

            ui.vertical(|ui| {
                for (i, (row, fraction)) in rows.iter().zip(fractions.iter()).enumerate() {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
                        ui.painter().rect_filled(rect, 3.0, category_color(i));
                        ui.label(
                            RichText::new(format!("{}: {:.1}%", row.key, fraction * 100.0))
                                .size(13.0),
                        );
                    });
                }
            });
        });
    }
}

/// Category name for an axis tick, blank between categories.
fn index_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}
