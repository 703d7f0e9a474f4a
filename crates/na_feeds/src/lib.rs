pub mod clean;
pub mod fetcher;
pub mod loader;
pub mod sources;

pub use clean::clean_html;
pub use fetcher::{FeedConfig, FeedFetcher};
pub use loader::{FeedLoader, HttpLoader, StaticLoader};
pub use sources::{default_sources, FeedSource};

pub mod prelude {
    pub use super::{FeedConfig, FeedFetcher, FeedSource};
    pub use na_core::{Article, Error, Result};
}
