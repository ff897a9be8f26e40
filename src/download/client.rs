use reqwest::blocking::Client;
use std::time::Duration;
use tracing::info;

use super::scrape::{parse_country_table, parse_members};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::reference::{CodeRecord, ReferenceSource};

/// Scrapes the reference tables from their public web pages
pub struct HttpSource {
    client: Client,
    country_codes_url: String,
    members_url: String,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent("oecd-life-expectancy");
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::fetch("http client", e.to_string()))?;

        Ok(Self {
            client,
            country_codes_url: config.country_codes_url.clone(),
            members_url: config.members_url.clone(),
        })
    }

    /// Fetch a page body, treating non-2xx statuses as failures
    fn fetch_page(&self, url: &str) -> Result<String> {
        info!(url, "fetching reference page");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        response
            .text()
            .map_err(|e| Error::fetch(url, format!("failed to read response: {e}")))
    }
}

impl ReferenceSource for HttpSource {
    fn fetch_code_table(&self) -> Result<Vec<CodeRecord>> {
        let html = self.fetch_page(&self.country_codes_url)?;
        parse_country_table(&html, &self.country_codes_url)
    }

    fn fetch_members(&self) -> Result<Vec<String>> {
        let html = self.fetch_page(&self.members_url)?;
        parse_members(&html, &self.members_url)
    }
}
