use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use na_core::{AnalysisResult, Article};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::{session_store, Session, SessionStore};
use tracing::{debug, warn};

pub const SESSION_COOKIE: &str = "na_session";

/// Session key the feed state is stored under.
pub const FEED_KEY: &str = "feed";

pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

/// Feed tab state of one browser session.
///
/// `generation` moves forward whenever the article list is replaced or
/// cleared, so an analysis started against an older list can be recognised
/// and dropped instead of being cached against whatever sits at its index now.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedState {
    pub generation: u64,
    pub articles: Vec<Article>,
    /// Last analysis per article index.
    pub results: BTreeMap<usize, AnalysisResult>,
}

impl FeedState {
    /// Swaps in a freshly fetched article list. Cached results refer to the
    /// old indices and are dropped.
    pub fn replace_articles(&mut self, articles: Vec<Article>) {
        self.generation += 1;
        self.articles = articles;
        self.results.clear();
    }

    pub fn clear(&mut self) {
        self.replace_articles(Vec::new());
    }

    pub fn article(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    pub fn forget_result(&mut self, generation: u64, index: usize) {
        if generation == self.generation {
            self.results.remove(&index);
        }
    }

    /// Caches `result` for `index`, unless the list changed since `generation`.
    pub fn store_result(&mut self, generation: u64, index: usize, result: AnalysisResult) -> bool {
        if generation != self.generation || index >= self.articles.len() {
            return false;
        }
        self.results.insert(index, result);
        true
    }
}

pub async fn load_feed(session: &Session) -> Result<FeedState, tower_sessions::session::Error> {
    Ok(session.get::<FeedState>(FEED_KEY).await?.unwrap_or_default())
}

pub async fn save_feed(session: &Session, feed: &FeedState) -> Result<(), tower_sessions::session::Error> {
    session.insert(FEED_KEY, feed).await
}

/// In-memory session records, bounded in number.
///
/// Expired records are purged whenever a new one has to fit; past that the
/// record closest to expiry is evicted.
#[derive(Debug, Clone)]
pub struct FeedSessionStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
    capacity: usize,
}

impl Default for FeedSessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl FeedSessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Id, Record>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The feed state as last saved for `id`, bypassing any per-request
    /// cache. Unknown or expired sessions read as empty.
    pub fn current_feed(&self, id: Option<Id>) -> FeedState {
        let Some(id) = id else {
            return FeedState::default();
        };
        let value = self
            .lock()
            .get(&id)
            .filter(|record| is_active(record))
            .and_then(|record| record.data.get(FEED_KEY).cloned());
        match value.map(serde_json::from_value::<FeedState>) {
            Some(Ok(feed)) => feed,
            Some(Err(e)) => {
                warn!("⚠️ Dropping unreadable feed state for session {}: {}", id, e);
                FeedState::default()
            }
            None => FeedState::default(),
        }
    }

    fn insert(&self, records: &mut HashMap<Id, Record>, record: Record) {
        if !records.contains_key(&record.id) && records.len() >= self.capacity {
            let before = records.len();
            records.retain(|_, record| is_active(record));
            if records.len() < before {
                debug!("🧹 Purged {} expired sessions", before - records.len());
            }
            if records.len() >= self.capacity {
                let oldest = records
                    .values()
                    .min_by_key(|record| record.expiry_date)
                    .map(|record| record.id);
                if let Some(oldest) = oldest {
                    debug!("🧹 Evicting session {} to stay within {} sessions", oldest, self.capacity);
                    records.remove(&oldest);
                }
            }
        }
        records.insert(record.id, record);
    }
}

fn is_active(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}

#[async_trait]
impl SessionStore for FeedSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.lock();
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.insert(&mut records, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut records = self.lock();
        self.insert(&mut records, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .lock()
            .get(session_id)
            .filter(|record| is_active(record))
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.lock().remove(session_id);
        Ok(())
    }
}
