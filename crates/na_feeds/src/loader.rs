use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use na_core::{Error, Result};
use reqwest::Client;

/// Fetches the raw bytes of a feed or page.
#[async_trait]
pub trait FeedLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedLoader for HttpLoader {
    async fn load(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Feed(format!("{} returned HTTP {}", url, status)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Serves canned documents by URL. Unknown URLs are feed errors.
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    documents: HashMap<String, Vec<u8>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl FeedLoader for StaticLoader {
    async fn load(&self, url: &str) -> Result<Vec<u8>> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Feed(format!("no document for {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_loader_reports_unreachable_host() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let loader = HttpLoader::new("na-test/1.0", Duration::from_secs(2)).unwrap();
        assert!(loader.load(&format!("http://{}/rss", addr)).await.is_err());
    }

    #[tokio::test]
    async fn test_static_loader_serves_known_documents() {
        let loader = StaticLoader::new().with_document("https://wire.example.com/rss", "<rss/>");
        assert_eq!(loader.load("https://wire.example.com/rss").await.unwrap(), b"<rss/>");

        let error = loader.load("https://other.example.com/rss").await.unwrap_err();
        assert_eq!(error.kind(), "feed");
    }
}
