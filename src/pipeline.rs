//! Batch orchestration
//!
//! Each table goes through extraction, series building and rendering on its
//! own. A table that cannot be charted yields an error at its position in the
//! results while the others still render.

use futures::future::join_all;
use tracing::{debug, warn};
use url::Url;

use crate::chart::{ChartRenderer, ChartSpecAssembler, RenderOptions};
use crate::error::{ChartError, FetchError};
use crate::page::PageSource;
use crate::series::build_series;
use crate::tables::{extract_tables, SelectionConfig, TablesResult, TabularDataset};

/// Retrieve a page and extract its tables
pub fn fetch_tables(
    source: &dyn PageSource,
    url: &str,
    config: &SelectionConfig,
) -> Result<TablesResult, FetchError> {
    let url = Url::parse(url)?;
    let html = source.fetch(&url)?;
    Ok(extract_tables(&html, config))
}

/// Chart every table concurrently.
///
/// Result `i` belongs to table `i`, whatever order the renders finish in.
pub async fn chart_tables(
    tables: &[TabularDataset],
    assembler: &ChartSpecAssembler,
    renderer: &dyn ChartRenderer,
    options: &RenderOptions,
) -> Vec<Result<Vec<u8>, ChartError>> {
    let renders = tables.iter().enumerate().map(|(index, table)| async move {
        let series = build_series(table);
        let result = assembler.chart(series.as_ref(), renderer, options).await;
        match &result {
            Ok(bytes) => debug!(table = index, bytes = bytes.len(), "chart rendered"),
            Err(e) => warn!(table = index, error = %e, "skipping table"),
        }
        result
    });

    join_all(renders).await
}

/// Extract tables from `html` and chart each of them
pub async fn chart_html(
    html: &str,
    config: &SelectionConfig,
    assembler: &ChartSpecAssembler,
    renderer: &dyn ChartRenderer,
    options: &RenderOptions,
) -> Vec<Result<Vec<u8>, ChartError>> {
    let tables = extract_tables(html, config);
    chart_tables(&tables, assembler, renderer, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartSpec, SvgRenderer};
    use crate::error::RenderError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const PAGE: &str = r#"
    <html><body>
        <table class="wikitable sortable">
            <thead><tr><th>State</th><th>Population</th><th>Area</th></tr></thead>
            <tbody>
                <tr><td>New South Wales</td><td>8,166,369</td><td>800,642</td></tr>
                <tr><td>Victoria</td><td>6,680,648</td><td>227,416</td></tr>
            </tbody>
        </table>
        <table class="wikitable sortable">
            <thead><tr><th>Capital</th><th>Founded by</th></tr></thead>
            <tbody><tr><td>Sydney</td><td>Phillip</td></tr></tbody>
        </table>
        <table class="wikitable sortable">
            <thead><tr><th>Year</th><th>Mark</th><th>Wind</th></tr></thead>
            <tbody><tr><td>1987</td><td>2.09</td><td>1.2</td></tr></tbody>
        </table>
    </body></html>
    "#;

    struct FakePages(HashMap<String, String>);

    impl PageSource for FakePages {
        fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            Ok(self.0.get(url.as_str()).cloned().unwrap_or_default())
        }
    }

    /// Charts with fewer columns take longer, and finished charts are recorded
    #[derive(Default)]
    struct SlowFirstRenderer {
        finished: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChartRenderer for SlowFirstRenderer {
        async fn render(&self, spec: &ChartSpec, _options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
            let delay = 40u64.saturating_sub(spec.data.labels.len() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let labels = spec.data.labels.join(",");
            self.finished.lock().unwrap().push(labels.clone());
            Ok(labels.into_bytes())
        }
    }

    #[test]
    fn test_fetch_tables() {
        let url = "https://example.org/wiki/States";
        let pages = FakePages(HashMap::from([(url.to_string(), PAGE.to_string())]));
        let config = SelectionConfig::with_classes(["wikitable", "sortable"]);

        let tables = fetch_tables(&pages, url, &config).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0][1].get("State"), Some("Victoria"));

        let empty = fetch_tables(&pages, "https://example.org/other", &config).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_fetch_tables_invalid_url() {
        let pages = FakePages(HashMap::new());
        let result = fetch_tables(&pages, "not a url", &SelectionConfig::default());
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_non_numeric_table_does_not_stop_batch() {
        let results = chart_html(
            PAGE,
            &SelectionConfig::default(),
            &ChartSpecAssembler::new(),
            &SvgRenderer,
            &RenderOptions::default(),
        )
        .await;

        assert_eq!(results.len(), 3);
        let svg = String::from_utf8(results[0].as_ref().unwrap().clone()).unwrap();
        assert!(svg.contains("Population"));
        assert!(svg.contains("Area"));
        assert!(matches!(results[1], Err(ChartError::NoNumericData)));
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn test_results_follow_table_order() {
        let tables = extract_tables(PAGE, &SelectionConfig::default());
        let renderer = SlowFirstRenderer::default();
        let results = chart_tables(
            &tables,
            &ChartSpecAssembler::new(),
            &renderer,
            &RenderOptions::default(),
        )
        .await;

        // The first table finished last
        assert_eq!(*renderer.finished.lock().unwrap(), ["Year,Mark,Wind", "Population,Area"]);

        assert_eq!(results[0].as_ref().unwrap(), b"Population,Area");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), b"Year,Mark,Wind");
    }

    #[tokio::test]
    async fn test_subnormal_cell_still_charts() {
        let html = "<table><thead><tr><th>V</th></tr></thead><tbody><tr><td>5e-324</td></tr></tbody></table>";
        let results = chart_html(
            html,
            &SelectionConfig::default(),
            &ChartSpecAssembler::new(),
            &SvgRenderer,
            &RenderOptions::default(),
        )
        .await;

        assert_eq!(results.len(), 1);
        let svg = String::from_utf8(results[0].as_ref().unwrap().clone()).unwrap();
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[tokio::test]
    async fn test_no_tables_no_charts() {
        let results = chart_html(
            "<p>no tables</p>",
            &SelectionConfig::default(),
            &ChartSpecAssembler::new(),
            &SvgRenderer,
            &RenderOptions::default(),
        )
        .await;
        assert!(results.is_empty());
    }
}
