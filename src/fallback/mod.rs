//! Encyclopedia fallback used when the model gives no usable answer

mod wikipedia;

pub use wikipedia::{WikipediaScraper, DEFAULT_WIKI_BASE_URL};

use async_trait::async_trait;

/// Reply shown when a page has no usable paragraph
pub const NOT_FOUND_MESSAGE: &str = "❌ No relevant Wikipedia information found.";

/// Characters kept from the chosen paragraph
pub const SUMMARY_CHAR_LIMIT: usize = 1000;

/// Errors raised while fetching a page. They never reach the user as errors:
/// [`FallbackSource::summary`] turns them into display text.
#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid selector: {0}")]
    Selector(String),
}

/// A best-effort source of a short plain-text summary for a condition
#[async_trait]
pub trait FallbackSource: Send + Sync {
    /// Summary for `condition`. Always returns display text: a paragraph,
    /// the not-found notice, or an error notice.
    async fn summary(&self, condition: &str) -> String;
}
