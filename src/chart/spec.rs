//! Declarative bar chart specification
//!
//! The serialized form follows the Chart.js configuration layout, so a spec
//! can be handed to an external Chart.js-based renderer as-is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::color::{ColorSource, RandomColors, Rgb};
use super::render::{ChartRenderer, RenderOptions};
use crate::error::ChartError;
use crate::series::ChartSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: ChartData,
    pub options: ChartOptions,
    /// Drawing steps composed into the render request
    pub plugins: Vec<Plugin>,
}

impl ChartSpec {
    /// Color painted behind the chart, if a background step is present
    pub fn background(&self) -> Option<&str> {
        self.plugins.iter().find_map(|plugin| match plugin {
            Plugin::BackgroundFill { color } => Some(color.as_str()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSpec {
    pub data: Vec<f64>,
    pub background_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub layout: Layout,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scales {
    pub x_axes: Vec<Axis>,
    pub y_axes: Vec<Axis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub ticks: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub begin_at_zero: bool,
    pub font_color: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "id", rename_all = "camelCase")]
pub enum Plugin {
    /// Fill the canvas behind all chart elements
    BackgroundFill { color: String },
}

/// Static look of every chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartStyle {
    pub padding: u32,
    pub tick_font_size: u32,
    pub tick_color: String,
    /// Force the y axis to start at zero
    pub begin_at_zero: bool,
    pub background: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            padding: 30,
            tick_font_size: 30,
            tick_color: "black".to_string(),
            begin_at_zero: true,
            background: "white".to_string(),
        }
    }
}

/// Builds chart specs from series and drives the renderer
pub struct ChartSpecAssembler {
    style: ChartStyle,
    colors: Box<dyn ColorSource>,
}

impl Default for ChartSpecAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSpecAssembler {
    /// Default style, random dataset colors
    pub fn new() -> Self {
        Self {
            style: ChartStyle::default(),
            colors: Box::new(RandomColors),
        }
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_colors(mut self, colors: impl ColorSource + 'static) -> Self {
        self.colors = Box::new(colors);
        self
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    /// Build a fresh bar chart spec. Each dataset draws its own color.
    pub fn assemble(&self, series: &ChartSeries) -> ChartSpec {
        let datasets = series
            .datasets
            .iter()
            .map(|data| DatasetSpec {
                data: data.clone(),
                background_color: self.colors.next_color(),
            })
            .collect();

        let ticks = |begin_at_zero| Ticks {
            begin_at_zero,
            font_color: self.style.tick_color.clone(),
            font_size: self.style.tick_font_size,
        };

        ChartSpec {
            chart_type: ChartType::Bar,
            data: ChartData {
                labels: series.labels.clone(),
                datasets,
            },
            options: ChartOptions {
                layout: Layout {
                    padding: self.style.padding,
                },
                scales: Scales {
                    x_axes: vec![Axis { ticks: ticks(false) }],
                    y_axes: vec![Axis {
                        ticks: ticks(self.style.begin_at_zero),
                    }],
                },
            },
            plugins: vec![Plugin::BackgroundFill {
                color: self.style.background.clone(),
            }],
        }
    }

    /// Assemble and render one series.
    ///
    /// Fails with [`ChartError::NoNumericData`] when the table produced no
    /// series; renderer failures pass through as [`ChartError::Render`].
    pub async fn chart(
        &self,
        series: Option<&ChartSeries>,
        renderer: &dyn ChartRenderer,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, ChartError> {
        let series = series.ok_or(ChartError::NoNumericData)?;
        let spec = self.assemble(series);
        debug!(
            labels = spec.data.labels.len(),
            datasets = spec.data.datasets.len(),
            format = %options.format,
            "rendering chart"
        );
        Ok(renderer.render(&spec, options).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::color::Palette;
    use crate::error::RenderError;
    use async_trait::async_trait;

    fn series() -> ChartSeries {
        ChartSeries {
            labels: vec!["Height".into(), "Year".into()],
            datasets: vec![vec![2.1, 1987.0], vec![2.11, 1988.0]],
        }
    }

    struct JsonRenderer;

    #[async_trait]
    impl ChartRenderer for JsonRenderer {
        async fn render(&self, spec: &ChartSpec, _options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
            serde_json::to_vec(spec).map_err(|e| RenderError::InvalidSpec(e.to_string()))
        }
    }

    struct BrokenRenderer;

    #[async_trait]
    impl ChartRenderer for BrokenRenderer {
        async fn render(&self, _spec: &ChartSpec, _options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Backend("out of memory".into()))
        }
    }

    #[test]
    fn test_assemble_bar_chart() {
        let red = Rgb::new(0xff0000).unwrap();
        let green = Rgb::new(0x00ff00).unwrap();
        let assembler = ChartSpecAssembler::new().with_colors(Palette::new([red, green]));
        let spec = assembler.assemble(&series());

        assert_eq!(spec.chart_type, ChartType::Bar);
        assert_eq!(spec.data.labels, ["Height", "Year"]);
        assert_eq!(spec.data.datasets.len(), 2);
        assert_eq!(spec.data.datasets[0].data, vec![2.1, 1987.0]);
        assert_eq!(spec.data.datasets[0].background_color, red);
        assert_eq!(spec.data.datasets[1].background_color, green);
        assert_eq!(spec.options.layout.padding, 30);
        assert!(spec.options.scales.y_axes[0].ticks.begin_at_zero);
        assert!(!spec.options.scales.x_axes[0].ticks.begin_at_zero);
        assert_eq!(spec.options.scales.x_axes[0].ticks.font_size, 30);
        assert_eq!(spec.options.scales.y_axes[0].ticks.font_color, "black");
        assert_eq!(spec.background(), Some("white"));
    }

    #[test]
    fn test_random_colors_are_hex() {
        let spec = ChartSpecAssembler::new().assemble(&series());
        for dataset in &spec.data.datasets {
            let color = dataset.background_color.to_string();
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_spec_json_layout() {
        let assembler = ChartSpecAssembler::new().with_colors(Palette::new([Rgb::new(0xabcdef).unwrap()]));
        let json = serde_json::to_value(assembler.assemble(&series())).unwrap();

        assert_eq!(json["type"], "bar");
        assert_eq!(json["data"]["labels"][1], "Year");
        assert_eq!(json["data"]["datasets"][0]["backgroundColor"], "#abcdef");
        assert_eq!(json["options"]["layout"]["padding"], 30);
        assert_eq!(json["options"]["scales"]["yAxes"][0]["ticks"]["beginAtZero"], true);
        assert_eq!(json["options"]["scales"]["xAxes"][0]["ticks"]["fontSize"], 30);
        assert!(json["options"]["scales"]["xAxes"][0]["ticks"].get("beginAtZero").is_none());
        assert_eq!(json["plugins"][0]["id"], "backgroundFill");
        assert_eq!(json["plugins"][0]["color"], "white");
    }

    #[test]
    fn test_style_from_json() {
        let style: ChartStyle = serde_json::from_str(r#"{"tickColor": "gray", "padding": 10}"#).unwrap();
        assert_eq!(style.tick_color, "gray");
        assert_eq!(style.padding, 10);
        assert_eq!(style.tick_font_size, 30);

        let spec = ChartSpecAssembler::new().with_style(style).assemble(&series());
        assert_eq!(spec.options.layout.padding, 10);
        assert_eq!(spec.options.scales.x_axes[0].ticks.font_color, "gray");
    }

    #[tokio::test]
    async fn test_chart_without_series_fails() {
        let assembler = ChartSpecAssembler::new();
        let result = assembler.chart(None, &JsonRenderer, &RenderOptions::default()).await;
        assert!(matches!(result, Err(ChartError::NoNumericData)));
    }

    #[tokio::test]
    async fn test_chart_renders_spec() {
        let assembler = ChartSpecAssembler::new();
        let series = series();
        let bytes = assembler
            .chart(Some(&series), &JsonRenderer, &RenderOptions::default())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["datasets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_renderer_failure_propagates() {
        let assembler = ChartSpecAssembler::new();
        let series = series();
        let result = assembler
            .chart(Some(&series), &BrokenRenderer, &RenderOptions::default())
            .await;
        match result {
            Err(ChartError::Render(RenderError::Backend(msg))) => assert_eq!(msg, "out of memory"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
