//! Total-value-locked scrape.
//!
//! The TVL figure is not available over RPC; the original service scraped it
//! from a known DOM element on the EigenLayer app page and extracted the
//! leading digits. The contract preserved here: return the numeric-prefix
//! string, or the [`TVL_SENTINEL`] when the element or its number is absent.
//! Transport failures are errors; the KPI aggregator converts them to the
//! sentinel instead of aborting a snapshot.

use crate::error::IndexerError;
use async_trait::async_trait;
use log::info;

/// Sentinel stored when no TVL figure could be extracted.
pub const TVL_SENTINEL: &str = "Element not found";

/// Page the figure is scraped from.
pub const DEFAULT_TVL_URL: &str = "https://app.eigenlayer.xyz";

/// Class marker of the span carrying the TVL figure.
const ELEMENT_MARKER: &str = "text-ShortTextL font-ibmPlexMono";

#[async_trait]
pub trait TvlSource: Send + Sync {
    /// Current TVL as a numeric-prefix string (e.g. `"3,421,009.12"`), or
    /// [`TVL_SENTINEL`] when the page renders without the element.
    async fn fetch_tvl(&self) -> Result<String, IndexerError>;
}

/// HTTP scrape of the app page.
pub struct TvlScraper {
    http: reqwest::Client,
    url: String,
}

impl TvlScraper {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl TvlSource for TvlScraper {
    async fn fetch_tvl(&self) -> Result<String, IndexerError> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| IndexerError::provider("tvl scrape", e))?
            .text()
            .await
            .map_err(|e| IndexerError::provider("tvl scrape", e))?;

        let tvl = extract_tvl(&body);
        if tvl != TVL_SENTINEL {
            info!("💰 [TVL] Scraped figure: {}", tvl);
        }
        Ok(tvl)
    }
}

/// Pull the numeric prefix out of the marked element's text, or the sentinel
/// when the element or its digits are missing.
fn extract_tvl(html: &str) -> String {
    let Some(marker_at) = html.find(ELEMENT_MARKER) else {
        return TVL_SENTINEL.to_string();
    };
    // Skip to the element's text: past the closing '>' of the opening tag.
    let Some(text_at) = html[marker_at..].find('>').map(|i| marker_at + i + 1) else {
        return TVL_SENTINEL.to_string();
    };

    let prefix: String = html[text_at..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if prefix.chars().any(|c| c.is_ascii_digit()) {
        prefix
    } else {
        TVL_SENTINEL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numeric_prefix_from_marked_element() {
        let html = format!(
            "<div><span class=\"{} items-center\">3,421,009.12 ETH</span></div>",
            ELEMENT_MARKER
        );
        assert_eq!(extract_tvl(&html), "3,421,009.12");
    }

    #[test]
    fn missing_element_yields_sentinel() {
        assert_eq!(extract_tvl("<html><body>nothing here</body></html>"), TVL_SENTINEL);
    }

    #[test]
    fn element_without_digits_yields_sentinel() {
        let html = format!("<span class=\"{}\">loading...</span>", ELEMENT_MARKER);
        assert_eq!(extract_tvl(&html), TVL_SENTINEL);
    }
}
