//! SVG chart output.
//!
//! Projected rows count up from the bottom edge, so the chart's cartesian
//! y axis is used directly and the lowest reading sits on the baseline.

use crate::output::describe_reason;
use plotters::backend::SVGBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use reading::Field;
use sensorgraph_core::{PipelineResult, RenderableSeries, Renderer, Viewport};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

fn field_color(field: Field) -> RGBColor {
    match field {
        Field::Temperature => RGBColor(220, 50, 47),
        Field::Pressure => RGBColor(38, 139, 210),
        Field::Light => RGBColor(181, 137, 0),
    }
}

pub struct SvgRenderer {
    path: PathBuf,
}

impl SvgRenderer {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Renderer for SvgRenderer {
    type Error = RenderError;

    fn render(&mut self, result: &PipelineResult, viewport: Viewport) -> Result<(), RenderError> {
        let svg = render_svg(result, viewport)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, svg)?;
        Ok(())
    }
}

pub fn render_svg(result: &PipelineResult, viewport: Viewport) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (viewport.width, viewport.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        match result {
            PipelineResult::Ready(series) => draw_series(&root, series, viewport)?,
            PipelineResult::Insufficient { reason } => {
                let message = format!("Insufficient data: {}", describe_reason(reason));
                draw_message(&root, &message, viewport)?
            }
        }
        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}

fn draw_message(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    message: &str,
    viewport: Viewport,
) -> Result<(), RenderError> {
    let style = TextStyle::from(("sans-serif", 24).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let center = (viewport.width as i32 / 2, viewport.height as i32 / 2);
    root.draw_text(message, &style, center).map_err(draw_err)
}

fn draw_series(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &RenderableSeries,
    viewport: Viewport,
) -> Result<(), RenderError> {
    let max_x = series
        .series
        .values()
        .flat_map(|points| points.iter().map(|point| point.x))
        .max()
        .unwrap_or(0);
    let x_range = 0f64..(max_x as f64 + 1.0);
    let y_range = 0f64..f64::from(viewport.height).max(1.0);

    let title = match series.average_temperature_f {
        Some(average) => format!("Sensor readings (avg {average:.1} F)"),
        None => "Sensor readings".to_string(),
    };
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(title, ("sans-serif", 24).into_font())
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("sample")
        .y_desc("scaled value")
        .draw()
        .map_err(draw_err)?;

    for (field, points) in &series.series {
        if points.is_empty() {
            continue;
        }
        let color = field_color(*field);
        let data: Vec<(f64, f64)> = points
            .iter()
            .map(|point| (point.x as f64, point.y))
            .collect();
        chart
            .draw_series(LineSeries::new(data, color.stroke_width(2)))
            .map_err(draw_err)?
            .label(field.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(draw_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorgraph_core::{FieldStats, InsufficientReason, RenderPoint};
    use std::collections::BTreeMap;

    fn ready() -> PipelineResult {
        let points = vec![
            RenderPoint { x: 0, y: 0.0 },
            RenderPoint { x: 1, y: 50.0 },
            RenderPoint { x: 2, y: 100.0 },
        ];
        let mut series = BTreeMap::new();
        series.insert(Field::Temperature, points);
        let mut stats = BTreeMap::new();
        stats.insert(
            Field::Temperature,
            FieldStats::Range {
                min: 10.0,
                max: 20.0,
                mean: 15.0,
                count: 3,
            },
        );
        PipelineResult::Ready(RenderableSeries {
            series,
            stats,
            average_temperature_f: Some(46.4),
            reading_count: 3,
            first_time: 0,
            last_time: 2,
        })
    }

    #[test]
    fn insufficient_result_draws_message() {
        let result = PipelineResult::Insufficient {
            reason: InsufficientReason::NotEnoughData {
                found: 5,
                required: 100,
            },
        };
        let svg = render_svg(&result, Viewport::new(400, 200)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("not enough data (5 of 100 readings)"));
    }

    #[test]
    fn ready_result_draws_lines() {
        let svg = render_svg(&ready(), Viewport::new(400, 300)).unwrap();
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("temperature"));
        assert!(svg.contains("avg 46.4 F"));
    }

    #[test]
    fn renderer_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/chart.svg");
        let mut renderer = SvgRenderer::new(&path);
        renderer.render(&ready(), Viewport::new(320, 240)).unwrap();
        let text = std::fs::read_to_string(renderer.path()).unwrap();
        assert!(text.contains("</svg>"));
    }
}
