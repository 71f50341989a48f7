//! Page retrieval
//!
//! Where HTML comes from is a capability handed to the pipeline, so tests
//! and hosts with their own browser automation can supply documents directly.

use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Provides the HTML document behind a URL
pub trait PageSource {
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Plain HTTP GET of the raw document (no script execution)
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    agent: ureq::Agent,
}

impl HttpPageSource {
    pub fn new() -> Self {
        Self::with_agent(ureq::Agent::new_with_defaults())
    }

    /// Use a preconfigured agent (timeouts, proxies, user agent)
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for HttpPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.agent.get(url.as_str()).call()?;
        let body = response.into_body().read_to_string()?;
        debug!(%url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
