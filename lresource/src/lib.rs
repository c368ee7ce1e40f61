//! Bounded, expiring in-memory store for binary resources (images returned
//! by tools) plus the URLs that address them.
//!
//! ```rust
//! use lresource::{ResourceCache, ResourceUrls};
//!
//! let cache = ResourceCache::default();
//! let id = cache.store(vec![0x89, 0x50, 0x4e, 0x47], "image/png");
//!
//! let urls = ResourceUrls::new("https://chat.example.com/");
//! let url = urls.url_for(&id);
//! assert_eq!(url, format!("https://chat.example.com/api/images/{id}"));
//! assert_eq!(urls.resolve(&url), Some(id));
//!
//! let stored = cache.get(&id).expect("just stored");
//! assert_eq!(stored.mime_type, "image/png");
//! ```

mod cache;
mod sweeper;
mod urls;

pub use cache::{ResourceCache, ResourceCacheConfig, ResourceId, StoredResource};
pub use sweeper::SweeperHandle;
pub use urls::{API_BASE_URL_ENV, DEFAULT_API_BASE_URL, ResourceUrls};
