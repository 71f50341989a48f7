//! HTML tables to bar charts
//!
//! Two-stage pipeline:
//! - [`tables`]: HTML document -> header-keyed rows, one dataset per `table`
//! - [`series`]: rows -> numeric chart series (numeric columns inferred)
//! - [`chart`]: series -> declarative bar chart spec -> rendered image
//!
//! Page retrieval ([`page`]) and rendering ([`chart::ChartRenderer`]) are
//! injected capabilities. [`pipeline`] runs whole batches, [`ffi`] exposes
//! the pipeline to C/C++ hosts.

pub mod chart;
pub mod error;
pub mod ffi;
pub mod page;
pub mod pipeline;
pub mod series;
pub mod tables;

pub use chart::{ChartRenderer, ChartSpec, ChartSpecAssembler, RenderOptions, SvgRenderer};
pub use error::{ChartError, FetchError, RenderError};
pub use series::{build_series, ChartSeries};
pub use tables::{extract_tables, Row, SelectionConfig, TablesResult, TabularDataset};
