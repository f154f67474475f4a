//! Static Chart Renderer
//! Draws report charts to PNG images with plotters, for slide export.
//!
//! Layout of every image:
//! 1. Title centered at the top
//! 2. Chart area (bars, stacked bars or pie with legend)
//! 3. A centered placeholder message when the month has no sales

use crate::charts::{palette_rgb, BASE_COLOR};
use crate::error::ExportError;
use crate::report::{shares, AggregateRow, ChartKind, ChartShape, DailyCityGrid, SalesReport};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::TAU;
use std::io::Cursor;

const FONT: &str = "sans-serif";
const EMPTY_TEXT: &str = "No sales in this month";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn render_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::Render(err.to_string())
}

fn rgb(color: (u8, u8, u8)) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one chart of `report` to PNG bytes.
    pub fn render_to_png(
        kind: ChartKind,
        report: &SalesReport,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ExportError> {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            let title = format!("{} ({})", kind.title(), report.period);
            let area = root.titled(&title, (FONT, 28)).map_err(render_err)?;

            if report.is_empty() {
                Self::draw_placeholder(&area)?;
            } else {
                match kind.shape() {
                    ChartShape::StackedBars => {
                        Self::draw_stacked_bars(&area, kind, &report.daily_grid)?
                    }
                    ChartShape::HorizontalBars => {
                        Self::draw_horizontal_bars(&area, kind, report.rows(kind))?
                    }
                    ChartShape::Bars => Self::draw_bars(&area, kind, report.rows(kind))?,
                    ChartShape::Pie => Self::draw_pie(&area, report.rows(kind))?,
                }
            }
            root.present().map_err(render_err)?;
        }
        encode_png(buffer, width, height)
    }

    /// Render all five charts in display order.
    pub fn render_all(
        report: &SalesReport,
        width: u32,
        height: u32,
    ) -> Result<Vec<Vec<u8>>, ExportError> {
        ChartKind::ALL
            .iter()
            .map(|&kind| Self::render_to_png(kind, report, width, height))
            .collect()
    }

    fn draw_placeholder(area: &Area<'_>) -> Result<(), ExportError> {
        let (w, h) = area.dim_in_pixel();
        let style: TextStyle = (FONT, 22).into();
        let style = style.pos(Pos::new(HPos::Center, VPos::Center));
        area.draw_text(EMPTY_TEXT, &style, (w as i32 / 2, h as i32 / 2))
            .map_err(render_err)
    }

    fn draw_bars(area: &Area<'_>, kind: ChartKind, rows: &[AggregateRow]) -> Result<(), ExportError> {
        let (x_desc, y_desc) = kind.axis_labels();
        let keys: Vec<String> = rows.iter().map(|r| r.key.clone()).collect();
        let n = rows.len() as u32;
        let max = rows.iter().map(|r| r.value).fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..headroom(max))
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len())
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_label_formatter(&|v| segment_label(&keys, v))
            .draw()
            .map_err(render_err)?;

        let per_category = kind.colored_by_category();
        chart
            .draw_series(rows.iter().enumerate().map(|(i, row)| {
                let color = if per_category {
                    rgb(palette_rgb(i))
                } else {
                    rgb(BASE_COLOR)
                };
                let i = i as u32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), row.value),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 15, 15);
                bar
            }))
            .map_err(render_err)?;
        Ok(())
    }

    fn draw_horizontal_bars(
        area: &Area<'_>,
        kind: ChartKind,
        rows: &[AggregateRow],
    ) -> Result<(), ExportError> {
        let (y_desc, x_desc) = kind.axis_labels();
        let keys: Vec<String> = rows.iter().map(|r| r.key.clone()).collect();
        let n = rows.len() as u32;
        let max = rows.iter().map(|r| r.value).fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(180)
            .build_cartesian_2d(0f64..headroom(max), (0u32..n).into_segmented())
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows.len())
            .x_desc(x_desc)
            .y_desc(y_desc)
            .y_label_formatter(&|v| segment_label(&keys, v))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(rows.iter().enumerate().map(|(i, row)| {
                let i = i as u32;
                let mut bar = Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(i)),
                        (row.value, SegmentValue::Exact(i + 1)),
                    ],
                    rgb(BASE_COLOR).filled(),
                );
                bar.set_margin(8, 8, 0, 0);
                bar
            }))
            .map_err(render_err)?;
        Ok(())
    }

    fn draw_stacked_bars(
        area: &Area<'_>,
        kind: ChartKind,
        grid: &DailyCityGrid,
    ) -> Result<(), ExportError> {
        let (x_desc, y_desc) = kind.axis_labels();
        let day_labels: Vec<String> = grid
            .dates
            .iter()
            .map(|d| d.format("%m-%d").to_string())
            .collect();
        let n = grid.dates.len() as u32;

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..headroom(grid.max_stacked()))
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(day_labels.len().min(16))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_label_formatter(&|v| segment_label(&day_labels, v))
            .draw()
            .map_err(render_err)?;

        let mut base = vec![0.0; grid.dates.len()];
        for (c, city) in grid.cities.iter().enumerate() {
            let color = rgb(palette_rgb(c));
            let bars: Vec<Rectangle<(SegmentValue<u32>, f64)>> = grid.values[c]
                .iter()
                .enumerate()
                .map(|(d, &v)| {
                    let x = d as u32;
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(x), base[d]),
                            (SegmentValue::Exact(x + 1), base[d] + v),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 2, 2);
                    bar
                })
                .collect();
            for (b, v) in base.iter_mut().zip(&grid.values[c]) {
                *b += v;
            }

            chart
                .draw_series(bars)
                .map_err(render_err)?
                .label(city.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
        Ok(())
    }

    fn draw_pie(area: &Area<'_>, rows: &[AggregateRow]) -> Result<(), ExportError> {
        let fractions = shares(rows);
        if fractions.is_empty() {
            return Self::draw_placeholder(area);
        }

        let (w, h) = area.dim_in_pixel();
        let radius = (w.min(h) as f64) * 0.38;
        let center = (w as f64 * 0.35, h as f64 * 0.5);

        let mut start = -TAU / 4.0;
        for (i, fraction) in fractions.iter().enumerate() {
            let sweep = fraction * TAU;
            let steps = ((sweep / 0.02).ceil() as usize).max(1);
            let mut points = vec![(center.0 as i32, center.1 as i32)];
            for s in 0..=steps {
                let angle = start + sweep * s as f64 / steps as f64;
                points.push((
                    (center.0 + radius * angle.cos()) as i32,
                    (center.1 + radius * angle.sin()) as i32,
                ));
            }
            area.draw(&Polygon::new(points, rgb(palette_rgb(i)).filled()))
                .map_err(render_err)?;
            start += sweep;
        }

        let legend_x = (w as f64 * 0.72) as i32;
        let mut legend_y = (h as f64 * 0.5) as i32 - rows.len() as i32 * 15;
        for (i, (row, fraction)) in rows.iter().zip(&fractions).enumerate() {
            area.draw(&Rectangle::new(
                [(legend_x, legend_y), (legend_x + 16, legend_y + 16)],
                rgb(palette_rgb(i)).filled(),
            ))
            .map_err(render_err)?;
            area.draw(&Text::new(
                format!("{}: {:.1}%", row.key, fraction * 100.0),
                (legend_x + 24, legend_y),
                (FONT, 18).into_font(),
            ))
            .map_err(render_err)?;
            legend_y += 30;
        }
        Ok(())
    }
}

/// Upper bound of a value axis with room above the tallest bar.
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| ExportError::Render("pixel buffer size mismatch".to_string()))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(render_err)?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headroom_never_collapses_axis() {
        assert_eq!(headroom(0.0), 1.0);
        assert!((headroom(100.0) - 110.0).abs() < 1e-9);
    }

    #[test]
    fn segment_label_uses_centers_only() {
        let labels = vec!["Yangon".to_string(), "Mandalay".to_string()];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "Mandalay");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(1)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(5)), "");
    }

    #[test]
    fn encode_png_writes_png_signature() {
        let png = encode_png(vec![255u8; 4 * 3 * 3], 4, 3).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn encode_png_rejects_short_buffer() {
        assert!(matches!(
            encode_png(vec![0u8; 5], 4, 3),
            Err(ExportError::Render(_))
        ));
    }
}
