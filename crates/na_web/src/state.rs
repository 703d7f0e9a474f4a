use std::sync::Arc;

use na_feeds::FeedFetcher;
use na_inference::InferenceContext;

pub struct AppState {
    pub inference: Arc<InferenceContext>,
    pub feeds: Arc<FeedFetcher>,
}

impl AppState {
    pub fn new(inference: Arc<InferenceContext>, feeds: Arc<FeedFetcher>) -> Self {
        Self { inference, feeds }
    }
}
