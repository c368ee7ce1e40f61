use std::collections::{HashMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Opaque resource identifier. Freshly generated v4 UUIDs, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Uuid);

impl ResourceId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ResourceId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

#[derive(Debug, Clone)]
pub struct StoredResource {
    pub id: ResourceId,
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
    pub created_at: Instant,
}

impl StoredResource {
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCacheConfig {
    pub max_entries: usize,
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for ResourceCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<ResourceId, StoredResource>,
    insertion_order: VecDeque<ResourceId>,
}

/// Insertion-ordered cache: at capacity the oldest stored entry is evicted,
/// and entries older than the TTL are dropped by [`ResourceCache::sweep_expired`].
#[derive(Debug)]
pub struct ResourceCache {
    config: ResourceCacheConfig,
    entries: Mutex<Entries>,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new(ResourceCacheConfig::default())
    }
}

impl ResourceCache {
    pub fn new(config: ResourceCacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn config(&self) -> ResourceCacheConfig {
        self.config
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self, bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> ResourceId {
        let resource = StoredResource {
            id: ResourceId::generate(),
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            created_at: Instant::now(),
        };
        let id = resource.id;

        let mut entries = self.lock();
        while entries.by_id.len() >= self.config.max_entries.max(1) {
            let Some(oldest) = entries.insertion_order.pop_front() else {
                break;
            };
            if entries.by_id.remove(&oldest).is_some() {
                tracing::debug!(resource_id = %oldest, "evicted oldest resource at capacity");
            }
        }
        entries.insertion_order.push_back(id);
        entries.by_id.insert(id, resource);
        id
    }

    pub fn get(&self, id: &ResourceId) -> Option<StoredResource> {
        self.lock().by_id.get(id).cloned()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.lock().by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().by_id.is_empty()
    }

    /// Removes every entry older than the TTL and returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let ttl = self.config.ttl;
        let mut entries = self.lock();
        let Entries {
            by_id,
            insertion_order,
        } = &mut *entries;

        let before = by_id.len();
        by_id.retain(|_, resource| resource.created_at.elapsed() <= ttl);
        insertion_order.retain(|id| by_id.contains_key(id));
        let removed = before - by_id.len();

        if removed > 0 {
            tracing::debug!(removed, remaining = by_id.len(), "swept expired resources");
        }
        removed
    }
}
