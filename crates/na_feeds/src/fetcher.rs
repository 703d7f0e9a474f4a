use std::sync::Arc;
use std::time::Duration;

use feed_rs::model::Entry;
use futures_util::future::join_all;
use na_core::text::truncate_chars;
use na_core::{Article, Error, Result};
use tracing::{debug, info, warn};

use crate::clean::{clean_html, paragraph_text};
use crate::loader::{FeedLoader, HttpLoader};
use crate::sources::{default_sources, FeedSource};

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub sources: Vec<FeedSource>,
    /// Entries taken from the top of each feed.
    pub per_source: usize,
    pub summary_limit: usize,
    pub text_limit: usize,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            per_source: 3,
            summary_limit: 300,
            text_limit: 1000,
            user_agent: concat!("na-feeds/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

pub struct FeedFetcher {
    loader: Arc<dyn FeedLoader>,
    config: FeedConfig,
}

impl FeedFetcher {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let loader = HttpLoader::new(&config.user_agent, config.timeout)?;
        Ok(Self::with_loader(Arc::new(loader), config))
    }

    pub fn with_loader(loader: Arc<dyn FeedLoader>, config: FeedConfig) -> Self {
        Self { loader, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Top entries of every configured source, in source order. A source
    /// that cannot be fetched or parsed contributes nothing.
    pub async fn fetch_sample(&self) -> Vec<Article> {
        let results = join_all(self.config.sources.iter().map(|s| self.fetch_source(s))).await;

        let mut articles = Vec::new();
        for (source, result) in self.config.sources.iter().zip(results) {
            match result {
                Ok(found) => {
                    debug!("📰 {} articles from {}", found.len(), source.name);
                    articles.extend(found);
                }
                Err(e) => warn!("⚠️ Skipping feed {} ({}): {}", source.name, source.url, e),
            }
        }
        info!("Fetched {} sample articles from {} feeds", articles.len(), self.config.sources.len());
        articles
    }

    pub async fn fetch_source(&self, source: &FeedSource) -> Result<Vec<Article>> {
        let body = self.loader.load(&source.url).await?;
        let feed = feed_rs::parser::parse(body.as_slice())
            .map_err(|e| Error::Feed(format!("Failed to parse feed: {}", e)))?;

        Ok(feed
            .entries
            .into_iter()
            .take(self.config.per_source)
            .map(|entry| self.to_article(&source.name, entry))
            .collect())
    }

    fn to_article(&self, source: &str, entry: Entry) -> Article {
        let summary = entry
            .summary
            .map(|s| clean_html(&s.content))
            .unwrap_or_default();
        let text = entry
            .content
            .and_then(|c| c.body)
            .map(|body| clean_html(&body))
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| summary.clone());

        Article {
            source: source.to_string(),
            title: entry.title.map(|t| clean_html(&t.content)).unwrap_or_default(),
            summary: truncate_chars(&summary, self.config.summary_limit).to_string(),
            text: truncate_chars(&text, self.config.text_limit).to_string(),
            link: entry.links.first().map(|l| l.href.clone()).unwrap_or_default(),
            published: entry.published.or(entry.updated),
        }
    }

    /// Replaces each article's text with the paragraphs of the linked page.
    /// Articles whose page cannot be fetched keep their feed text.
    pub async fn expand_full_text(&self, articles: &mut [Article]) {
        for article in articles.iter_mut().filter(|a| !a.link.is_empty()) {
            match self.load_page_text(&article.link).await {
                Ok(text) if !text.is_empty() => article.text = text,
                Ok(_) => debug!("No paragraphs found at {}", article.link),
                Err(e) => warn!("⚠️ Failed to fetch {}: {}", article.link, e),
            }
        }
    }

    async fn load_page_text(&self, url: &str) -> Result<String> {
        let body = self.loader.load(url).await?;
        paragraph_text(&String::from_utf8_lossy(&body))
    }
}
