use crate::model::{UserId, UserProfile};
use moka::sync::Cache;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Keyed storage for derived user profiles. Writes replace; reads racing a
/// write for the same user see either version.
pub trait ProfileStore: Send + Sync {
    fn get(&self, user_id: &str) -> Option<Arc<UserProfile>>;
    fn put(&self, profile: UserProfile) -> Arc<UserProfile>;
    fn remove(&self, user_id: &str) -> Option<Arc<UserProfile>>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Unbounded map; grows with every distinct user.
#[derive(Default)]
pub struct MemoryProfileStore {
    inner: RwLock<HashMap<UserId, Arc<UserProfile>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self { Self::default() }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> Option<Arc<UserProfile>> {
        self.inner.read().get(user_id).cloned()
    }

    fn put(&self, profile: UserProfile) -> Arc<UserProfile> {
        let profile = Arc::new(profile);
        self.inner.write().insert(profile.user_id.clone(), Arc::clone(&profile));
        profile
    }

    fn remove(&self, user_id: &str) -> Option<Arc<UserProfile>> {
        self.inner.write().remove(user_id)
    }

    fn len(&self) -> usize { self.inner.read().len() }
}

/// Capacity-bounded store with optional idle expiry.
pub struct BoundedProfileStore {
    cache: Cache<UserId, Arc<UserProfile>>,
}

impl BoundedProfileStore {
    pub fn new(max_profiles: u64, idle: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_profiles);
        if let Some(idle) = idle {
            builder = builder.time_to_idle(idle);
        }
        Self { cache: builder.build() }
    }

    /// Apply pending evictions so `len` reflects the capacity bound.
    pub fn sync(&self) { self.cache.run_pending_tasks(); }
}

impl ProfileStore for BoundedProfileStore {
    fn get(&self, user_id: &str) -> Option<Arc<UserProfile>> { self.cache.get(user_id) }

    fn put(&self, profile: UserProfile) -> Arc<UserProfile> {
        let profile = Arc::new(profile);
        self.cache.insert(profile.user_id.clone(), Arc::clone(&profile));
        profile
    }

    fn remove(&self, user_id: &str) -> Option<Arc<UserProfile>> { self.cache.remove(user_id) }

    fn len(&self) -> usize { self.cache.entry_count() as usize }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Unbounded when absent.
    pub max_profiles: Option<u64>,
    pub idle_secs: Option<u64>,
}

impl StoreConfig {
    pub fn build(&self) -> Arc<dyn ProfileStore> {
        match self.max_profiles {
            Some(max) => {
                tracing::debug!(max, idle_secs = ?self.idle_secs, "using bounded profile store");
                Arc::new(BoundedProfileStore::new(max, self.idle_secs.map(Duration::from_secs)))
            }
            None => Arc::new(MemoryProfileStore::new()),
        }
    }
}
