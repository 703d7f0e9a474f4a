use std::str::FromStr;

use na_core::Error;
use url::Url;

/// A named RSS or Atom endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("BBC", "http://feeds.bbci.co.uk/news/rss.xml"),
        FeedSource::new("Reuters", "http://feeds.reuters.com/reuters/topNews"),
        FeedSource::new("TechCrunch", "https://techcrunch.com/feed/"),
    ]
}

/// Parses `Name=https://host/feed`. Without a name the host is used.
impl FromStr for FeedSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, url) = match s.split_once('=') {
            Some((name, url)) if !name.contains("://") => (Some(name.trim()), url.trim()),
            _ => (None, s.trim()),
        };

        let parsed = Url::parse(url).map_err(|e| Error::Config(format!("invalid feed url {}: {}", url, e)))?;
        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => parsed
                .host_str()
                .map(|h| h.trim_start_matches("www.").to_string())
                .ok_or_else(|| Error::Config(format!("feed url {} has no host", url)))?,
        };

        Ok(Self::new(name, url))
    }
}
