//! Shared primitives for the lattice workspace crates.
//!
//! ```rust
//! use lcommon::{GenerationOptions, MetadataMap, SessionId, TraceId, UserId};
//!
//! let session = SessionId::from("session-1");
//! let trace = TraceId::new("req-7f3a");
//! let user = UserId::from("alice");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("activity".to_string(), "trivia".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.6);
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(trace.to_string(), "req-7f3a");
//! assert_eq!(user.as_str(), "alice");
//! assert_eq!(options.temperature, Some(0.6));
//! ```

pub mod future {
    //! Boxed future alias used at every async trait seam.
    //!
    //! ```rust
    //! use lcommon::BoxFuture;
    //!
    //! fn byte_len<'a>(value: &'a [u8]) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = byte_len(b"png");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Identifier newtypes that cross crate boundaries.
    //!
    //! `TraceId` doubles as the correlation id surfaced to end users so
    //! operators can find full diagnostics out of band.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }

                pub fn into_inner(self) -> String {
                    self.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        };
    }

    string_id!(
        /// Identifies one chat turn's tool execution scope.
        SessionId
    );
    string_id!(
        /// Correlation id attached to logs and user-facing error messages.
        TraceId
    );
    string_id!(UserId);
}

pub mod model {
    //! Generation settings carried on model requests.

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }
    }
}

pub mod registry {
    //! Keyed map wrapper shared by the tool registry and activity catalog.
    //!
    //! ```rust
    //! use lcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("web_fetch".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("web_fetch"), Some(&1));
    //! assert!(registry.contains_key("web_fetch"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::BTreeMap;

    /// Ordered by key so listings are deterministic across runs.
    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: BTreeMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Ord,
    {
        fn default() -> Self {
            Self {
                items: BTreeMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Ord,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
            self.items.iter()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }

    impl<K, V> FromIterator<(K, V)> for Registry<K, V>
    where
        K: Ord,
    {
        fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
            Self {
                items: iter.into_iter().collect(),
            }
        }
    }
}

pub use context::{MetadataMap, SessionId, TraceId, UserId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{GenerationOptions, Registry, SessionId, TraceId, UserId};

    #[test]
    fn id_newtypes_expose_inner_strings() {
        let session = SessionId::new("session-1");
        let trace = TraceId::from("trace-1");
        let user = UserId::from(String::from("bob"));

        assert_eq!(session.as_str(), "session-1");
        assert_eq!(trace.to_string(), "trace-1");
        assert_eq!(user.into_inner(), "bob");
    }

    #[test]
    fn generation_options_builder_helpers_set_values() {
        let options = GenerationOptions::default()
            .with_temperature(0.3)
            .with_max_tokens(123);

        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.max_tokens, Some(123));
    }

    #[test]
    fn registry_lists_keys_in_order() {
        let mut registry = Registry::new();
        registry.insert("web".to_string(), 2_u32);
        registry.insert("ama".to_string(), 1_u32);

        let keys: Vec<_> = registry.keys().cloned().collect();
        assert_eq!(keys, vec!["ama".to_string(), "web".to_string()]);

        assert_eq!(registry.remove("ama"), Some(1));
        assert_eq!(registry.len(), 1);
    }
}
