//! Process-wide pool of provider sessions keyed by provider name.
//!
//! Each provider slot is absent, connecting or established. The first
//! caller to find a slot absent claims it and installs a shared connect
//! future; concurrent callers await that same future, so one provider is
//! never handshaken twice at once. A failed attempt clears the slot, leaving
//! the next caller free to retry.
//!
//! Every claim carries an attempt number. A finishing handshake only
//! transitions the slot it claimed: if the pool was shut down or the slot
//! re-claimed meanwhile, the fresh session is closed instead of installed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Instant;

use futures_util::FutureExt;
use futures_util::future::{Shared, join_all};
use lcommon::BoxFuture;
use lresource::ResourceCache;
use ltooling::Tool;

use crate::{
    AdapterConfig, NoopPoolHooks, PoolError, PoolHooks, ProtocolError, ProviderConnector,
    ProviderIdentity, ProviderSession, RemoteTool, RemoteToolSpec,
};

type ConnectOutcome = Result<Arc<EstablishedConnection>, PoolError>;
type SharedConnect = Shared<BoxFuture<'static, ConnectOutcome>>;

/// A live session together with the tools it advertised at connect time.
pub struct EstablishedConnection {
    identity: ProviderIdentity,
    session: Arc<dyn ProviderSession>,
    specs: Vec<RemoteToolSpec>,
    tools: OnceLock<Vec<Arc<dyn Tool>>>,
}

impl EstablishedConnection {
    pub fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    pub fn specs(&self) -> &[RemoteToolSpec] {
        &self.specs
    }

    fn tools(&self, resources: &Arc<ResourceCache>, config: &Arc<AdapterConfig>) -> &[Arc<dyn Tool>] {
        self.tools.get_or_init(|| {
            self.specs
                .iter()
                .cloned()
                .map(|spec| {
                    Arc::new(RemoteTool::new(
                        &self.identity,
                        spec,
                        Arc::clone(&self.session),
                        Arc::clone(resources),
                        Arc::clone(config),
                    )) as Arc<dyn Tool>
                })
                .collect()
        })
    }
}

enum Slot {
    Connecting { attempt: u64, pending: SharedConnect },
    Established(Arc<EstablishedConnection>),
}

struct PoolInner {
    connector: Arc<dyn ProviderConnector>,
    resources: Arc<ResourceCache>,
    config: Arc<AdapterConfig>,
    hooks: Arc<dyn PoolHooks>,
    slots: Mutex<HashMap<String, Slot>>,
    next_attempt: AtomicU64,
}

impl PoolInner {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn holds_claim(slots: &HashMap<String, Slot>, name: &str, attempt: u64) -> bool {
    matches!(slots.get(name), Some(Slot::Connecting { attempt: current, .. }) if *current == attempt)
}

/// Shared, cheaply cloneable handle to the pool.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

pub struct ConnectionPoolBuilder {
    connector: Arc<dyn ProviderConnector>,
    resources: Arc<ResourceCache>,
    config: AdapterConfig,
    hooks: Arc<dyn PoolHooks>,
}

impl ConnectionPoolBuilder {
    pub fn adapter_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn PoolHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> ConnectionPool {
        ConnectionPool {
            inner: Arc::new(PoolInner {
                connector: self.connector,
                resources: self.resources,
                config: Arc::new(self.config),
                hooks: self.hooks,
                slots: Mutex::new(HashMap::new()),
                next_attempt: AtomicU64::new(1),
            }),
        }
    }
}

impl ConnectionPool {
    pub fn new(connector: Arc<dyn ProviderConnector>, resources: Arc<ResourceCache>) -> Self {
        Self::builder(connector, resources).build()
    }

    pub fn builder(
        connector: Arc<dyn ProviderConnector>,
        resources: Arc<ResourceCache>,
    ) -> ConnectionPoolBuilder {
        ConnectionPoolBuilder {
            connector,
            resources,
            config: AdapterConfig::default(),
            hooks: Arc::new(NoopPoolHooks),
        }
    }

    pub fn resources(&self) -> Arc<ResourceCache> {
        Arc::clone(&self.inner.resources)
    }

    pub fn adapter_config(&self) -> &AdapterConfig {
        &self.inner.config
    }

    /// Makes sure every listed provider is established. Providers are
    /// handled concurrently; the first failure in request order is returned.
    pub async fn ensure_connected(&self, providers: &[ProviderIdentity]) -> Result<(), PoolError> {
        let outcomes = join_all(providers.iter().map(|identity| self.ensure_one(identity))).await;
        outcomes.into_iter().collect()
    }

    async fn ensure_one(&self, identity: &ProviderIdentity) -> Result<(), PoolError> {
        let pending = {
            let mut slots = self.inner.slots();
            match slots.get(&identity.name) {
                Some(Slot::Established(_)) => {
                    drop(slots);
                    self.inner.hooks.on_connection_reused(&identity.name);
                    return Ok(());
                }
                Some(Slot::Connecting { pending, .. }) => {
                    tracing::debug!(provider = %identity.name, "connection in progress, awaiting it");
                    pending.clone()
                }
                None => {
                    let attempt = self.inner.next_attempt.fetch_add(1, Ordering::Relaxed);
                    let pending =
                        Self::connect_and_install(Arc::clone(&self.inner), identity.clone(), attempt)
                            .boxed()
                            .shared();
                    slots.insert(
                        identity.name.clone(),
                        Slot::Connecting {
                            attempt,
                            pending: pending.clone(),
                        },
                    );
                    pending
                }
            }
        };

        pending.await.map(|_| ())
    }

    async fn connect_and_install(
        inner: Arc<PoolInner>,
        identity: ProviderIdentity,
        attempt: u64,
    ) -> ConnectOutcome {
        let name = identity.name.clone();
        inner.hooks.on_connect_start(&name);
        tracing::info!(provider = %name, endpoint = %identity.endpoint, "connecting to tool provider");
        let started = Instant::now();

        let outcome = match Self::handshake(&inner, identity).await {
            Ok(connection) => {
                let installed = {
                    let mut slots = inner.slots();
                    let claimed = holds_claim(&slots, &name, attempt);
                    if claimed {
                        slots.insert(name.clone(), Slot::Established(Arc::clone(&connection)));
                    }
                    claimed
                };
                if installed {
                    Ok(connection)
                } else {
                    tracing::warn!(provider = %name, "connect claim released while connecting; closing session");
                    connection.session.close().await;
                    Err(PoolError::connect(
                        &name,
                        ProtocolError::closed("connection pool was shut down while connecting"),
                    ))
                }
            }
            Err(error) => {
                let mut slots = inner.slots();
                if holds_claim(&slots, &name, attempt) {
                    slots.remove(&name);
                }
                Err(error)
            }
        };

        match &outcome {
            Ok(connection) => {
                tracing::info!(provider = %name, tools = connection.specs.len(), "tool provider connected");
                inner
                    .hooks
                    .on_connect_success(&name, connection.specs.len(), started.elapsed());
            }
            Err(error) => {
                tracing::error!(provider = %name, error = %error, "tool provider connection failed");
                inner.hooks.on_connect_failure(&name, error, started.elapsed());
            }
        }

        outcome
    }

    async fn handshake(inner: &PoolInner, identity: ProviderIdentity) -> ConnectOutcome {
        let session = inner
            .connector
            .connect(&identity)
            .await
            .map_err(|source| PoolError::connect(&identity.name, source))?;

        let specs = match session.list_tools().await {
            Ok(specs) => specs,
            Err(source) => {
                session.close().await;
                return Err(PoolError::list_tools(&identity.name, source));
            }
        };

        Ok(Arc::new(EstablishedConnection {
            identity,
            session,
            specs,
            tools: OnceLock::new(),
        }))
    }

    /// Tools of established providers whose name is in `allowed`, in the
    /// order the providers are listed there.
    pub fn list_tools(&self, allowed: &[String]) -> Vec<Arc<dyn Tool>> {
        let connections: Vec<Arc<EstablishedConnection>> = {
            let slots = self.inner.slots();
            allowed
                .iter()
                .filter_map(|name| match slots.get(name) {
                    Some(Slot::Established(connection)) => Some(Arc::clone(connection)),
                    _ => None,
                })
                .collect()
        };

        connections
            .iter()
            .flat_map(|connection| {
                connection
                    .tools(&self.inner.resources, &self.inner.config)
                    .iter()
                    .cloned()
            })
            .collect()
    }

    pub fn is_connected(&self, name: &str) -> bool {
        matches!(self.inner.slots().get(name), Some(Slot::Established(_)))
    }

    pub fn connected_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .slots()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Established(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Drops one established provider and closes its session. Returns
    /// whether anything was disconnected.
    pub async fn disconnect(&self, name: &str) -> bool {
        let removed = {
            let mut slots = self.inner.slots();
            match slots.get(name) {
                Some(Slot::Established(_)) => slots.remove(name),
                _ => None,
            }
        };

        match removed {
            Some(Slot::Established(connection)) => {
                connection.session.close().await;
                tracing::info!(provider = %name, "tool provider disconnected");
                self.inner.hooks.on_disconnect(name);
                true
            }
            _ => false,
        }
    }

    /// Closes every established session and empties the pool.
    pub async fn shutdown(&self) {
        let drained: Vec<(String, Slot)> = self.inner.slots().drain().collect();
        let closing = drained.into_iter().filter_map(|(name, slot)| match slot {
            Slot::Established(connection) => Some((name, connection)),
            Slot::Connecting { .. } => None,
        });

        for (name, connection) in closing {
            connection.session.close().await;
            self.inner.hooks.on_disconnect(&name);
        }
        tracing::info!("connection pool shut down");
    }
}
