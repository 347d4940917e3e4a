//! Figure Module
//! Line plots, histograms and arrow heads rendered to PNG with plotters.

use super::geometry::{ArrowHead, Histogram};
use super::style::{PlotStyle, PALETTE};
use super::ChartError;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;
type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Dash and gap lengths of dashed lines (pixels).
const DASH: u32 = 8;
const GAP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Markers,
}

#[derive(Debug, Clone)]
enum Series {
    Line {
        points: Vec<(f64, f64)>,
        style: LineStyle,
        label: Option<String>,
        color: RGBColor,
    },
    Histogram {
        hist: Histogram,
        label: Option<String>,
        color: RGBColor,
    },
}

/// A single-panel figure, built up series by series and saved as a bitmap.
#[derive(Debug, Clone, Default)]
pub struct Figure {
    style: PlotStyle,
    title: Option<String>,
    xlabel: String,
    ylabel: String,
    grid: bool,
    legend: bool,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    series: Vec<Series>,
    arrows: Vec<ArrowHead>,
}

impl Figure {
    pub fn new(style: PlotStyle) -> Self {
        Self {
            style,
            grid: true,
            ..Default::default()
        }
    }

    pub fn title(&mut self, title: &str) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn labels(&mut self, xlabel: &str, ylabel: &str) -> &mut Self {
        self.xlabel = xlabel.to_string();
        self.ylabel = ylabel.to_string();
        self
    }

    pub fn grid(&mut self, grid: bool) -> &mut Self {
        self.grid = grid;
        self
    }

    pub fn legend(&mut self, legend: bool) -> &mut Self {
        self.legend = legend;
        self
    }

    pub fn x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Add a line or marker series; colours cycle through the palette.
    pub fn line(
        &mut self,
        x: &[f64],
        y: &[f64],
        style: LineStyle,
        label: Option<&str>,
    ) -> Result<&mut Self, ChartError> {
        if x.len() != y.len() {
            return Err(ChartError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        let color = self.next_color();
        self.series.push(Series::Line {
            points: x.iter().copied().zip(y.iter().copied()).collect(),
            style,
            label: label.map(str::to_string),
            color,
        });
        Ok(self)
    }

    pub fn histogram(&mut self, hist: Histogram, label: Option<&str>) -> &mut Self {
        let color = self.next_color();
        self.series.push(Series::Histogram {
            hist,
            label: label.map(str::to_string),
            color,
        });
        self
    }

    pub fn arrow(&mut self, head: ArrowHead) -> &mut Self {
        self.arrows.push(head);
        self
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    fn next_color(&self) -> RGBColor {
        PALETTE[self.series.len() % PALETTE.len()]
    }

    /// Axis ranges: explicit limits, or the data extent plus a 5% margin.
    pub fn ranges(&self) -> ((f64, f64), (f64, f64)) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for series in &self.series {
            match series {
                Series::Line { points, .. } => {
                    for &(x, y) in points {
                        xs.push(x);
                        ys.push(y);
                    }
                }
                Series::Histogram { hist, .. } => {
                    xs.extend_from_slice(&hist.edges);
                    ys.push(0.0);
                    ys.extend_from_slice(&hist.counts);
                }
            }
        }
        for arrow in &self.arrows {
            xs.push(arrow.x);
            ys.push(arrow.y);
        }

        (
            self.x_range.unwrap_or_else(|| padded_extent(&xs)),
            self.y_range.unwrap_or_else(|| padded_extent(&ys)),
        )
    }

    /// Render the figure to a bitmap file; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), ChartError> {
        let (width, height) = self.style.pixels();
        debug!("Saving {}x{} figure to {}", width, height, path.display());

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&self.style.background()).map_err(drawing)?;

        let ((x0, x1), (y0, y1)) = self.ranges();
        let font = self.style.font_size;
        let fg = self.style.foreground();
        let text = ("sans-serif", font as f64).into_font().color(&fg);

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(font * 2)
            .x_label_area_size(font * 3)
            .y_label_area_size(font * 5);
        if let Some(title) = &self.title {
            builder.caption(title, ("sans-serif", font as f64 * 1.25).into_font().color(&fg));
        }
        let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1).map_err(drawing)?;

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(self.xlabel.as_str())
            .y_desc(self.ylabel.as_str())
            .label_style(text.clone())
            .axis_desc_style(text.clone())
            .axis_style(fg)
            .bold_line_style(fg.mix(0.2))
            .light_line_style(fg.mix(0.05));
        if !self.grid {
            mesh.disable_mesh();
        }
        mesh.draw().map_err(drawing)?;

        let lw = self.style.line_width;
        for series in &self.series {
            draw_series(&mut chart, series, lw)?;
        }
        for arrow in &self.arrows {
            draw_arrow(&root, &chart, arrow, fg)?;
        }

        let labelled = self.series.iter().any(|s| match s {
            Series::Line { label, .. } | Series::Histogram { label, .. } => label.is_some(),
        });
        if self.legend && labelled {
            chart
                .configure_series_labels()
                .background_style(self.style.background().mix(0.8))
                .border_style(fg)
                .label_font(text)
                .draw()
                .map_err(drawing)?;
        }

        root.present().map_err(drawing)?;
        Ok(())
    }
}

fn draw_series(
    chart: &mut Chart,
    series: &Series,
    lw: u32,
) -> Result<(), ChartError> {
    match series {
        Series::Line {
            points,
            style,
            label,
            color,
        } => {
            let stroke = color.stroke_width(lw);
            let anno = match style {
                LineStyle::Solid => chart
                    .draw_series(LineSeries::new(points.iter().copied(), stroke))
                    .map_err(drawing)?,
                LineStyle::Markers => chart
                    .draw_series(
                        points
                            .iter()
                            .map(|&p| Circle::new(p, lw + 2, color.filled())),
                    )
                    .map_err(drawing)?,
                LineStyle::Dashed => chart
                    .draw_series(DashedLineSeries::new(
                        points.iter().copied(),
                        DASH,
                        GAP,
                        stroke,
                    ))
                    .map_err(drawing)?,
            };
            if let Some(label) = label {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], stroke)
                });
            }
        }
        Series::Histogram { hist, label, color } => {
            let fill = color.mix(0.6).filled();
            let anno = chart
                .draw_series(
                    hist.edges
                        .windows(2)
                        .zip(hist.counts.iter())
                        .map(|(e, &c)| Rectangle::new([(e[0], 0.0), (e[1], c)], fill)),
                )
                .map_err(drawing)?;
            if let Some(label) = label {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill)
                });
            }
        }
    }
    Ok(())
}

fn draw_arrow(root: &Root, chart: &Chart, arrow: &ArrowHead, color: RGBColor) -> Result<(), ChartError> {
    let area = chart.plotting_area();
    let map = |p: (f64, f64)| {
        let (x, y) = area.map_coordinate(&p);
        (x as f64, y as f64)
    };
    let centre = map((arrow.x, arrow.y));
    let from = map(arrow.from);
    let to = map(arrow.to);
    let plot_width = area.dim_in_pixel().0 as f64;

    if let Some(tri) = arrow.polygon(centre, (to.0 - from.0, to.1 - from.1), plot_width) {
        let corners: Vec<(i32, i32)> = tri
            .iter()
            .map(|&(x, y)| (x.round() as i32, y.round() as i32))
            .collect();
        root.draw(&Polygon::new(corners, color.filled()))
            .map_err(drawing)?;
    }
    Ok(())
}

fn drawing<E: std::error::Error>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

/// Minimum and maximum of the finite values, widened by 5% on either side.
fn padded_extent(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let margin = 0.05 * (hi - lo);
    (lo - margin, hi + margin)
}
