//! Chart specification and rendering
//!
//! [`ChartSpecAssembler`] turns a [`ChartSeries`](crate::series::ChartSeries)
//! into a renderer-agnostic [`ChartSpec`]; any [`ChartRenderer`] turns that
//! into image bytes.

mod color;
mod render;
mod spec;
mod svg;

pub use color::*;
pub use render::*;
pub use spec::*;
pub use svg::*;
