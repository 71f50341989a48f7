//! Renderer seam
//!
//! Painting pixels or vectors belongs to whatever implements
//! [`ChartRenderer`]; this crate only hands over a [`ChartSpec`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ChartSpec;
use crate::error::RenderError;

/// Output encoding requested from a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Svg => "image/svg+xml",
            OutputFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Canvas size and encoding for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1000,
            format: OutputFormat::Svg,
        }
    }
}

/// Turns a chart specification into an encoded image
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, spec: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>, RenderError>;
}
