use crate::model::{DayLabel, PriceBounds, PricePoint};
use crate::window::find_minimal_sum_window;
use crate::Error;
use chrono::{DateTime, Duration, TimeZone, Timelike};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Length of the highlighted cheapest window, in hours.
pub const CHEAPEST_WINDOW_HOURS: usize = 4;

/// Size of the rendered image in pixels.
pub const CHART_SIZE: (u32, u32) = (1900, 500);

/// Colour stops of the price gradient, cheapest first.
const GRADIENT: [RGBColor; 4] = [
    RGBColor(0, 128, 0),
    RGBColor(255, 255, 0),
    RGBColor(255, 0, 0),
    RGBColor(128, 0, 0),
];

const CHEAPEST_OUTLINE: RGBColor = BLUE;
const CURRENT_OUTLINE: RGBColor = BLACK;
const GRID_COLOR: RGBColor = RGBColor(211, 211, 211);
const BAR_HALF_WIDTH: f64 = 0.4;

/// Returns the gradient colour at `position` (`0.0` cheapest, `1.0` most expensive).
pub fn gradient_color(position: f64) -> RGBColor {
    let scaled = position.clamp(0.0, 1.0) * (GRADIENT.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(GRADIENT.len() - 2);
    let t = scaled - index as f64;

    let RGBColor(r0, g0, b0) = GRADIENT[index];
    let RGBColor(r1, g1, b1) = GRADIENT[index + 1];
    let mix = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;

    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Everything needed to draw the chart of one day.
#[derive(Debug, Clone)]
pub struct DayChart {
    pub label: DayLabel,
    pub points: Vec<PricePoint>,
    /// Bounds the bar colours are normalized against
    pub bounds: PriceBounds,
    /// Hours of the cheapest window
    pub cheapest: Range<usize>,
    /// Hour containing `now`, only set for today
    pub current: Option<usize>,
}

impl DayChart {
    pub fn new<TZ: TimeZone>(
        label: DayLabel,
        points: &[PricePoint],
        bounds: PriceBounds,
        now: &DateTime<TZ>,
    ) -> Result<Self, Error> {
        let totals = points.iter().map(|point| point.total).collect::<Vec<_>>();
        let cheapest = find_minimal_sum_window(&totals, CHEAPEST_WINDOW_HOURS)?;

        let current = match label {
            DayLabel::Today => points.iter().position(|point| point.contains(now)),
            DayLabel::Tomorrow => None,
        };

        Ok(Self {
            label,
            points: points.to_vec(),
            bounds,
            cheapest,
            current,
        })
    }

    pub fn stats(&self) -> DayStats {
        let (min, max, sum) = self.points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), point| (min.min(point.total), max.max(point.total), sum + point.total),
        );

        DayStats {
            min,
            max,
            average: sum / self.points.len() as f64,
        }
    }

    /// Average price of the cheapest window.
    pub fn cheapest_average(&self) -> f64 {
        let window = &self.points[self.cheapest.clone()];
        window.iter().map(|point| point.total).sum::<f64>() / window.len() as f64
    }

    /// Start and end time of the cheapest window.
    pub fn cheapest_span(&self) -> (DateTime<chrono::FixedOffset>, DateTime<chrono::FixedOffset>) {
        let first = &self.points[self.cheapest.start];
        let last = &self.points[self.cheapest.end - 1];
        (first.starts_at, last.starts_at + Duration::hours(1))
    }

    /// Chart title with min, max and average in cents.
    pub fn title(&self) -> String {
        let stats = self.stats();
        format!(
            "Stündliche Strompreise {} (Min: {:.1}, Max: {:.1}, Durchschnitt: {:.1})",
            self.label,
            100.0 * stats.min,
            100.0 * stats.max,
            100.0 * stats.average
        )
    }

    pub fn bar_color(&self, price: f64) -> RGBColor {
        gradient_color(self.bounds.position(price))
    }

    /// Visible price range, a little below the cheapest and above the most
    /// expensive hour.
    pub fn y_range(&self) -> Range<f64> {
        let stats = self.stats();
        let low = stats.min - 0.1 * stats.min.abs();
        let mut high = stats.max + 0.025 * stats.max.abs();
        if high <= low {
            high = low + 0.01;
        }
        low..high
    }

    /// Axis label of the bar at `x`: the hour it starts at.
    pub fn hour_label(&self, x: f64) -> String {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        self.points
            .get(index as usize)
            .map(|point| point.starts_at.hour().to_string())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> String {
        format!("strompreise_diagramm_{}.png", self.label)
    }

    fn bar(&self, index: usize, bottom: f64, style: ShapeStyle) -> Rectangle<(f64, f64)> {
        let x = index as f64;
        Rectangle::new(
            [
                (x - BAR_HALF_WIDTH, bottom),
                (x + BAR_HALF_WIDTH, self.points[index].total),
            ],
            style,
        )
    }

    /// Draws the chart as PNG to `path`.
    pub fn render(&self, path: &Path) -> Result<(), Error> {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let y_range = self.y_range();
        let bottom = y_range.start;
        let x_range = -0.5..self.points.len() as f64 - 0.5;

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title(), ("sans-serif", 24).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(GRID_COLOR.stroke_width(1))
            .light_line_style(TRANSPARENT)
            .x_labels(self.points.len())
            .x_label_formatter(&|x| self.hour_label(*x))
            .x_desc("Stunde")
            .y_desc("Strompreis")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(
                (0..self.points.len())
                    .map(|index| self.bar(index, bottom, self.bar_color(self.points[index].total).filled())),
            )
            .map_err(chart_error)?;

        chart
            .draw_series(
                self.cheapest
                    .clone()
                    .map(|index| self.bar(index, bottom, CHEAPEST_OUTLINE.stroke_width(4))),
            )
            .map_err(chart_error)?;

        if let Some(index) = self.current {
            chart
                .draw_series(std::iter::once(self.bar(
                    index,
                    bottom,
                    CURRENT_OUTLINE.stroke_width(2),
                )))
                .map_err(chart_error)?;
        }

        root.present().map_err(chart_error)?;
        Ok(())
    }
}

fn chart_error<E: std::fmt::Display>(error: E) -> Error {
    Error::Chart(error.to_string())
}
