use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::ResourceCache;

/// Handle to the periodic expiry sweep. The task is aborted when the handle
/// is shut down or dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn shutdown(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("resource sweeper stopped");
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

impl ResourceCache {
    /// Starts the periodic sweep on the current tokio runtime.
    pub fn spawn_sweeper(cache: Arc<Self>) -> SweeperHandle {
        let period = cache.config().sweep_interval;
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                cache.sweep_expired();
            }
        });

        SweeperHandle { task: Some(task) }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ResourceCacheConfig;

    #[tokio::test]
    async fn sweeper_drops_expired_entries_in_background() {
        let cache = Arc::new(ResourceCache::new(ResourceCacheConfig {
            max_entries: 10,
            ttl: Duration::from_millis(20),
            sweep_interval: Duration::from_millis(25),
        }));
        cache.store(vec![1], "image/png");

        let handle = ResourceCache::spawn_sweeper(Arc::clone(&cache));
        assert!(handle.is_running());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.is_empty());
        handle.shutdown();
    }

    #[tokio::test]
    async fn dropping_handle_stops_the_task() {
        let cache = Arc::new(ResourceCache::default());
        let handle = ResourceCache::spawn_sweeper(Arc::clone(&cache));
        drop(handle);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(Arc::strong_count(&cache), 1);
    }
}
