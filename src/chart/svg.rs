//! Built-in SVG renderer
//!
//! Draws grouped vertical bars with plotters: one group per label along the
//! x axis, one bar per dataset inside each group. Raster output is left to
//! external renderers, since drawing text into a bitmap needs a font backend.

use async_trait::async_trait;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;

use super::color::Rgb;
use super::render::{ChartRenderer, OutputFormat, RenderOptions};
use super::spec::{Axis, ChartSpec, Ticks};
use crate::error::RenderError;

/// Share of each label's band covered by bars
const GROUP_FILL: f64 = 0.8;

/// Values beyond this magnitude are drawn clipped
const VALUE_LIMIT: f64 = 1e300;

#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

#[async_trait]
impl ChartRenderer for SvgRenderer {
    async fn render(&self, spec: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        if options.format != OutputFormat::Svg {
            return Err(RenderError::UnsupportedFormat(options.format));
        }
        render_svg(spec, options.width, options.height).map(String::into_bytes)
    }
}

/// Text look of one axis
struct AxisText {
    size: u32,
    color: RGBColor,
}

impl AxisText {
    fn of(axes: &[Axis]) -> Result<Self, RenderError> {
        match axes.first().map(|axis| &axis.ticks) {
            Some(Ticks {
                font_size,
                font_color,
                ..
            }) => Ok(Self {
                size: *font_size,
                color: parse_color(font_color)?,
            }),
            None => Ok(Self { size: 12, color: BLACK }),
        }
    }

    fn style(&self) -> TextStyle<'static> {
        FontDesc::new(FontFamily::SansSerif, f64::from(self.size), FontStyle::Normal).color(&self.color)
    }
}

/// Render `spec` to an SVG document of the given size
pub fn render_svg(spec: &ChartSpec, width: u32, height: u32) -> Result<String, RenderError> {
    if spec.data.labels.is_empty() {
        return Err(RenderError::InvalidSpec("chart has no labels".into()));
    }
    if spec.data.datasets.is_empty() {
        return Err(RenderError::InvalidSpec("chart has no datasets".into()));
    }

    let x_text = AxisText::of(&spec.options.scales.x_axes)?;
    let y_text = AxisText::of(&spec.options.scales.y_axes)?;
    let padding = spec.options.layout.padding;
    let x_area = x_text.size * 2;
    let y_area = y_text.size * 3 + 10;
    if width <= 2 * padding + y_area + 10 || height <= 2 * padding + x_area + 10 {
        return Err(RenderError::InvalidSpec(format!("canvas {width}x{height} too small for chart")));
    }

    let background = spec.background().map(parse_color).transpose()?;

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, (width, height)).into_drawing_area();
        if let Some(color) = background {
            root.fill(&color).map_err(backend_error)?;
        }
        draw_bars(&root, spec, &x_text, &y_text, padding, x_area, y_area)?;
        root.present().map_err(backend_error)?;
    }
    Ok(buffer)
}

fn draw_bars(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    spec: &ChartSpec,
    x_text: &AxisText,
    y_text: &AxisText,
    padding: u32,
    x_area: u32,
    y_area: u32,
) -> Result<(), RenderError> {
    let labels = &spec.data.labels;
    let begin_at_zero = spec
        .options
        .scales
        .y_axes
        .first()
        .is_some_and(|axis| axis.ticks.begin_at_zero);
    let (y_low, y_high) = y_range(spec, begin_at_zero);
    let groups = labels.len() as f64;

    let plot = root.margin(padding, padding, padding, padding);
    let mut chart = ChartBuilder::on(&plot)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(0.0..groups, y_low..y_high)
        .map_err(backend_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_labels(6)
        .y_label_formatter(&|v| format_tick(*v))
        .y_label_style(y_text.style())
        .axis_style(&BLACK)
        .draw()
        .map_err(backend_error)?;

    let bar_width = GROUP_FILL / spec.data.datasets.len() as f64;
    let base = 0.0_f64.clamp(y_low, y_high);
    for (index, dataset) in spec.data.datasets.iter().enumerate() {
        let color = to_rgb_color(dataset.background_color);
        let offset = (1.0 - GROUP_FILL) / 2.0 + bar_width * index as f64;
        let bars = dataset
            .data
            .iter()
            .take(labels.len())
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(group, v)| {
                let x = group as f64 + offset;
                Rectangle::new(
                    [(x, base), (x + bar_width, v.clamp(y_low, y_high))],
                    color.filled(),
                )
            });
        chart.draw_series(bars).map_err(backend_error)?;
    }

    // Category names sit centered under each group
    let label_style = x_text.style().pos(Pos::new(HPos::Center, VPos::Top));
    for (group, label) in labels.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(group as f64 + 0.5, y_low));
        root.draw(&Text::new(label.as_str(), (x, y + 8), label_style.clone()))
            .map_err(backend_error)?;
    }

    Ok(())
}

/// Y axis bounds covering every finite value, never empty
fn y_range(spec: &ChartSpec, begin_at_zero: bool) -> (f64, f64) {
    let (mut low, mut high) = spec
        .data
        .datasets
        .iter()
        .flat_map(|d| d.data.iter().copied())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(-VALUE_LIMIT, VALUE_LIMIT))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if low > high {
        // Nothing finite to plot
        low = 0.0;
        high = 1.0;
    }
    if begin_at_zero {
        low = low.min(0.0);
        high = high.max(0.0);
    }

    let magnitude = low.abs().max(high.abs());
    let span = high - low;
    if span < f64::MIN_POSITIVE || span <= magnitude * 1e-9 {
        let pad = (magnitude * 0.1).max(1.0);
        if !(begin_at_zero && low == 0.0) {
            low -= pad;
        }
        high += pad;
    }
    (low, high)
}

fn format_tick(value: f64) -> String {
    let abs = value.abs();
    if abs != 0.0 && !(1e-3..1e6).contains(&abs) {
        return format!("{value:e}");
    }
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn to_rgb_color(color: Rgb) -> RGBColor {
    let value = color.value();
    RGBColor((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

/// `#rrggbb` or a basic color name
fn parse_color(name: &str) -> Result<RGBColor, RenderError> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        return u32::from_str_radix(hex, 16)
            .ok()
            .filter(|_| hex.len() == 6)
            .and_then(Rgb::new)
            .map(to_rgb_color)
            .ok_or_else(|| RenderError::InvalidSpec(format!("invalid color {name:?}")));
    }

    match name.to_ascii_lowercase().as_str() {
        "black" => Ok(BLACK),
        "white" => Ok(WHITE),
        "red" => Ok(RED),
        "green" => Ok(GREEN),
        "blue" => Ok(BLUE),
        "yellow" => Ok(YELLOW),
        "cyan" => Ok(CYAN),
        "magenta" => Ok(MAGENTA),
        "gray" | "grey" => Ok(RGBColor(128, 128, 128)),
        _ => Err(RenderError::InvalidSpec(format!("unknown color {name:?}"))),
    }
}

fn backend_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}
