//! Error types
//!
//! Extraction never fails: odd markup simply yields empty tables. Failures
//! start at charting, where a table without numeric columns must be
//! reported so batch callers can skip it and keep going.

use thiserror::Error;

use crate::chart::OutputFormat;

/// Failure to turn one table into a chart image
#[derive(Debug, Error)]
pub enum ChartError {
    /// No column in the table ever coerced to a nonzero number
    #[error("no numeric data in table, nothing to chart")]
    NoNumericData,

    #[error("chart rendering failed: {0}")]
    Render(#[from] RenderError),
}

/// Failure reported by a chart renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("output format {0} is not supported by this renderer")]
    UnsupportedFormat(OutputFormat),

    #[error("invalid chart specification: {0}")]
    InvalidSpec(String),

    #[error("renderer backend failed: {0}")]
    Backend(String),
}

/// Failure to retrieve a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] ureq::Error),
}
