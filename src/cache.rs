use std::future::Future;

use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};

use crate::error::Error;

/// A cache entry with expiration time
pub struct CacheEntry<T> {
    pub data: T,
    pub expires_at: Instant,
}

/// Single value cache with a fixed TTL.
///
/// Refreshes are serialised by the mutex: concurrent readers of an expired
/// value wait for one recompute instead of each running their own.
pub struct TimedValue<T> {
    entry: Mutex<Option<CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone + Send> TimedValue<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            ttl,
        }
    }

    /// Cached value if present and not expired.
    pub async fn get(&self) -> Option<T> {
        let entry = self.entry.lock().await;
        match entry.as_ref() {
            Some(item) if Instant::now() < item.expires_at => {
                Some(item.data.clone())
            },
            _ => None,
        }
    }

    /// Returns the cached value, or runs `fetch` and stores its result when
    /// the value is missing or expired. Errors are returned and not cached.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut entry = self.entry.lock().await;

        if let Some(item) = entry.as_ref() {
            if Instant::now() < item.expires_at {
                return Ok(item.data.clone());
            }
        }

        let data = fetch().await?;
        *entry = Some(CacheEntry {
            data: data.clone(),
            expires_at: Instant::now() + self.ttl,
        });

        Ok(data)
    }
}

impl<T> std::fmt::Debug for TimedValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedValue").field("ttl", &self.ttl).finish()
    }
}
