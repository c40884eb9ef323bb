use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use super::{FallbackError, FallbackSource, NOT_FOUND_MESSAGE, SUMMARY_CHAR_LIMIT};

pub const DEFAULT_WIKI_BASE_URL: &str = "https://en.wikipedia.org/wiki/";

const USER_AGENT: &str = "Mozilla/5.0";

/// Disambiguation pages open with this phrase
const DISAMBIGUATION_PREFIX: &str = "may refer to:";

/// Scrapes the first usable paragraph of a Wikipedia article
pub struct WikipediaScraper {
    http_client: Client,
    base_url: String,
}

impl WikipediaScraper {
    /// `base_url` is the article prefix the title is appended to,
    /// e.g. `https://en.wikipedia.org/wiki/`
    pub fn new(base_url: impl Into<String>) -> Result<Self, FallbackError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Article URL for a condition; spaces become underscores
    pub fn article_url(&self, condition: &str) -> String {
        format!("{}{}", self.base_url, condition.replace(' ', "_"))
    }

    async fn fetch(&self, condition: &str) -> Result<Option<String>, FallbackError> {
        let url = self.article_url(condition);
        debug!(%url, "fetching fallback article");

        // Status is not checked; error pages are parsed like any other page.
        let body = self.http_client.get(&url).send().await?.text().await?;
        first_paragraph(&body)
    }
}

#[async_trait]
impl FallbackSource for WikipediaScraper {
    async fn summary(&self, condition: &str) -> String {
        match self.fetch(condition).await {
            Ok(Some(paragraph)) => truncate_summary(&paragraph),
            Ok(None) => NOT_FOUND_MESSAGE.to_string(),
            Err(e) => {
                warn!(error = %e, condition, "fallback fetch failed");
                format!("⚠️ Error fetching info: {}", e)
            }
        }
    }
}

/// First `<p>` whose trimmed text is non-empty and is not a disambiguation line
pub fn first_paragraph(html: &str) -> Result<Option<String>, FallbackError> {
    let selector = Selector::parse("p").map_err(|e| FallbackError::Selector(e.to_string()))?;
    let document = Html::parse_document(html);

    let paragraph = document
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty() && !text.to_lowercase().starts_with(DISAMBIGUATION_PREFIX));

    Ok(paragraph)
}

/// Keep the first [`SUMMARY_CHAR_LIMIT`] characters and mark the cut with "..."
pub fn truncate_summary(text: &str) -> String {
    let mut summary: String = text.chars().take(SUMMARY_CHAR_LIMIT).collect();
    summary.push_str("...");
    summary
}
