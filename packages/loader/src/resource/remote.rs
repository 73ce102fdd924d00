//! Resources fetched over HTTP(S).

use std::sync::Arc;

use reqwest::blocking::Client;
use url::Url;

use super::http::{download_text, head_succeeds};
use super::Resource;
use crate::error::Result;

/// A definition document served over HTTP or HTTPS.
#[derive(Debug, Clone)]
pub struct UrlResource {
    url: Url,
    client: Client,
}

impl UrlResource {
    #[must_use]
    pub fn new(url: Url, client: Client) -> Self {
        Self { url, client }
    }

    /// Parse a location and wrap it.
    pub fn parse(location: &str, client: Client) -> Result<Self> {
        Ok(Self::new(Url::parse(location)?, client))
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Resource for UrlResource {
    /// Issues a HEAD request; any non-success status or transport error means absent.
    fn exists(&self) -> bool {
        head_succeeds(&self.client, self.url.as_str())
    }

    fn absolute_location(&self) -> Result<String> {
        Ok(self.url.to_string())
    }

    fn create_relative(&self, relative_path: &str) -> Result<Arc<dyn Resource>> {
        let relative = relative_path.strip_prefix('/').unwrap_or(relative_path);
        let url = self.url.join(relative)?;
        Ok(Arc::new(Self::new(url, self.client.clone())))
    }

    fn read_to_string(&self) -> Result<String> {
        tracing::debug!(url = %self.url, "Downloading definition document");
        download_text(&self.client, self.url.as_str())
    }

    fn description(&self) -> String {
        format!("URL [{}]", self.url)
    }
}
