//! DataLoader utilities for batch loading
//!
//! Implements the DataLoader pattern for preventing N+1 query problems.
//! See: <https://github.com/graphql/dataloader>
//!
//! Every `load` issued before the batching window closes joins the same
//! pending batch. The first caller to poll the batch waits out the window,
//! seals the batch and performs a single backend call for the union of keys;
//! every waiter then reads its own key from the shared result. Loaders and
//! their caches live in a [`LoaderRegistry`] that is built for one inbound
//! request and dropped with it.

use async_trait::async_trait;
use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::LoaderConfig;
use crate::errors::{ServiceError, ServiceResult};
use crate::gid::ModelType;

/// Batch loader trait for loading multiple items at once
#[async_trait]
pub trait BatchLoader<K, V>: Send + Sync
where
    K: Send + Sync + Clone + Eq + Hash,
    V: Send + Sync + Clone,
{
    /// Load batch of items by keys
    ///
    /// This method should fetch all items for the given keys in a single
    /// database query or API call to avoid N+1 problems. Keys missing from
    /// the returned map are treated as not found.
    async fn load_batch(&self, keys: &[K]) -> ServiceResult<HashMap<K, V>>;
}

type BatchResult<K, V> = ServiceResult<Arc<HashMap<K, V>>>;
type SharedBatch<K, V> = Shared<BoxFuture<'static, BatchResult<K, V>>>;

struct BatchKeys<K> {
    keys: Vec<K>,
    sealed: bool,
}

struct PendingBatch<K, V> {
    keys: Arc<Mutex<BatchKeys<K>>>,
    future: SharedBatch<K, V>,
}

struct LoaderState<K, V> {
    /// Batch responsible for each key requested so far
    requested: HashMap<K, SharedBatch<K, V>>,
    pending: Option<PendingBatch<K, V>>,
}

/// DataLoader with caching and batching
///
/// Automatically batches requests within a single GraphQL query and caches
/// results to prevent duplicate loads.
pub struct DataLoader<K, V>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    loader: Arc<dyn BatchLoader<K, V>>,
    state: Arc<Mutex<LoaderState<K, V>>>,
    delay: Duration,
    max_batch_size: usize,
}

impl<K, V> DataLoader<K, V>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    /// Create new DataLoader with a batch loader
    pub fn new(loader: impl BatchLoader<K, V> + 'static) -> Self {
        Self::with_config(loader, &LoaderConfig::default())
    }

    pub fn with_config(loader: impl BatchLoader<K, V> + 'static, config: &LoaderConfig) -> Self {
        Self {
            loader: Arc::new(loader),
            state: Arc::new(Mutex::new(LoaderState {
                requested: HashMap::new(),
                pending: None,
            })),
            delay: config.batch_delay(),
            max_batch_size: config.max_batch_size.max(1),
        }
    }

    /// Load a single item by key
    ///
    /// Resolves to `Ok(None)` when the backend returned nothing for `key`,
    /// and to the batch error when the whole batch failed.
    pub async fn load(&self, key: K) -> ServiceResult<Option<V>> {
        let batch = self.enqueue(key.clone()).await;
        let values = batch.await?;
        Ok(values.get(&key).cloned())
    }

    /// Load multiple items by keys
    ///
    /// Keys not found are absent from the returned map.
    pub async fn load_many(&self, keys: Vec<K>) -> ServiceResult<HashMap<K, V>> {
        let mut batches = Vec::with_capacity(keys.len());
        for key in keys {
            let batch = self.enqueue(key.clone()).await;
            batches.push((key, batch));
        }

        let mut result = HashMap::new();
        for (key, batch) in batches {
            let values = batch.await?;
            if let Some(value) = values.get(&key) {
                result.insert(key, value.clone());
            }
        }
        Ok(result)
    }

    /// Prime the cache with a value
    ///
    /// Useful for seeding the cache with data you already have.
    pub async fn prime(&self, key: K, value: V) {
        let values = Arc::new(HashMap::from([(key.clone(), value)]));
        let ready = future::ready(Ok(values)).boxed().shared();
        let mut state = self.state.lock().await;
        state.requested.insert(key, ready);
    }

    async fn enqueue(&self, key: K) -> SharedBatch<K, V> {
        let mut state = self.state.lock().await;

        if let Some(batch) = state.requested.get(&key) {
            return batch.clone();
        }

        let joined = match &state.pending {
            Some(pending) => {
                let mut batch = pending.keys.lock().await;
                if !batch.sealed && batch.keys.len() < self.max_batch_size {
                    batch.keys.push(key.clone());
                    Some(pending.future.clone())
                } else {
                    None
                }
            }
            None => None,
        };

        let future = match joined {
            Some(future) => future,
            None => {
                let keys = Arc::new(Mutex::new(BatchKeys {
                    keys: vec![key.clone()],
                    sealed: false,
                }));
                let future = dispatch(self.loader.clone(), keys.clone(), self.delay);
                state.pending = Some(PendingBatch {
                    keys,
                    future: future.clone(),
                });
                future
            }
        };

        state.requested.insert(key, future.clone());
        future
    }
}

fn dispatch<K, V>(
    loader: Arc<dyn BatchLoader<K, V>>,
    keys: Arc<Mutex<BatchKeys<K>>>,
    delay: Duration,
) -> SharedBatch<K, V>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    async move {
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        let batch = {
            let mut keys = keys.lock().await;
            keys.sealed = true;
            std::mem::take(&mut keys.keys)
        };

        tracing::debug!(keys = batch.len(), "dispatching loader batch");
        match loader.load_batch(&batch).await {
            Ok(values) => Ok(Arc::new(values)),
            Err(err) => {
                tracing::debug!(keys = batch.len(), error = %err, "loader batch failed");
                Err(err)
            }
        }
    }
    .boxed()
    .shared()
}

impl<K, V> Clone for DataLoader<K, V>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            loader: self.loader.clone(),
            state: self.state.clone(),
            delay: self.delay,
            max_batch_size: self.max_batch_size,
        }
    }
}

/// Request-scoped set of loaders keyed by entity kind
///
/// Never share a registry between requests: its caches would leak entities
/// across callers and go stale.
pub struct LoaderRegistry {
    loaders: HashMap<ModelType, Box<dyn Any + Send + Sync>>,
    config: LoaderConfig,
}

impl LoaderRegistry {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            loaders: HashMap::new(),
            config,
        }
    }

    /// Register the batch function for an entity kind
    pub fn register<V, L>(&mut self, kind: ModelType, loader: L)
    where
        V: Send + Sync + Clone + 'static,
        L: BatchLoader<String, V> + 'static,
    {
        let loader: DataLoader<String, V> = DataLoader::with_config(loader, &self.config);
        self.loaders.insert(kind, Box::new(loader));
    }

    pub fn loader<V>(&self, kind: ModelType) -> ServiceResult<&DataLoader<String, V>>
    where
        V: Send + Sync + Clone + 'static,
    {
        let loader = self.loaders.get(&kind).ok_or_else(|| {
            tracing::error!(%kind, "no loader registered");
            ServiceError::internal(format!("no loader registered for {}", kind))
        })?;

        loader.downcast_ref::<DataLoader<String, V>>().ok_or_else(|| {
            tracing::error!(%kind, expected = std::any::type_name::<V>(), "loader value type mismatch");
            ServiceError::internal(format!("loader for {} does not produce the requested type", kind))
        })
    }

    /// Load one entity; `Ok(None)` when it does not exist
    pub async fn load<V>(&self, kind: ModelType, id: &str) -> ServiceResult<Option<V>>
    where
        V: Send + Sync + Clone + 'static,
    {
        self.loader::<V>(kind)?.load(id.to_string()).await
    }

    /// Load one entity that must exist
    pub async fn require<V>(&self, kind: ModelType, id: &str) -> ServiceResult<V>
    where
        V: Send + Sync + Clone + 'static,
    {
        self.load(kind, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("{} with id {} not found", kind, id)))
    }

    pub async fn prime<V>(&self, kind: ModelType, id: &str, value: V) -> ServiceResult<()>
    where
        V: Send + Sync + Clone + 'static,
    {
        self.loader::<V>(kind)?.prime(id.to_string(), value).await;
        Ok(())
    }
}
