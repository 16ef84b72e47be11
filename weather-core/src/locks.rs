use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One mutex per key, so at most one job runs for a request id while
/// different ids proceed independently.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held for as long as the caller owns the key.
#[derive(Debug)]
pub struct KeyGuard {
    _guard: OwnedMutexGuard<()>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` without waiting. `None` means someone else holds it.
    pub fn try_lock(&self, key: &str) -> Option<KeyGuard> {
        let mutex = {
            let mut map = self.inner.lock();
            // Drop entries nobody holds.
            map.retain(|_, m| Arc::strong_count(m) > 1);
            map.entry(key.to_string()).or_default().clone()
        };

        mutex.try_lock_owned().ok().map(|guard| KeyGuard { _guard: guard })
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().len()
    }
}
