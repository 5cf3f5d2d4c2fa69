//! Registration of models into a host server's lifecycle.
//!
//! A [`Registry`] owns the connected [`ModelStore`], exposes registered models by name and
//! implements [`Lifecycle`] so a host can create indexes before it starts accepting work and
//! close the connection once it has stopped.
//!
//! # Example
//!
//! ```ignore
//! use mongo_models::prelude::*;
//!
//! let mut registry = Registry::register(InMemoryStore::builder(), RegistryOptions::default()).await?;
//! registry
//!     .add_model::<Customer>("Customer")
//!     .add_model::<Order>("Order");
//!
//! registry.on_pre_start().await?;
//! let customers = registry.model::<Customer>()?;
//! // ...
//! registry.on_post_stop().await?;
//! ```

use async_trait::async_trait;
use std::{any::TypeId, collections::BTreeMap};
use tracing::{debug, warn};

use crate::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::ModelCollection,
    config::RegistryOptions,
    error::{ModelError, ModelResult},
    index::IndexSpec,
    model::Model,
    store::ModelStore,
};

/// Hooks a host server calls around its start and stop.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Runs before the host starts.
    async fn on_pre_start(&self) -> ModelResult<()>;

    /// Runs after the host has stopped.
    async fn on_post_stop(&self) -> ModelResult<()>;
}

/// What the registry knows about a registered model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Name the model is exposed under.
    pub name: String,
    /// Collection the model is bound to.
    pub collection: &'static str,
    /// Rust type name of the model.
    pub type_name: &'static str,
    /// Indexes declared by the model.
    pub indexes: Option<Vec<IndexSpec>>,
    type_id: TypeId,
}

impl ModelInfo {
    fn of<D: Model>(name: String) -> Self {
        Self {
            name,
            collection: D::collection_name(),
            type_name: std::any::type_name::<D>(),
            indexes: D::indexes(),
            type_id: TypeId::of::<D>(),
        }
    }
}

/// Registered models and the connection they share.
#[derive(Debug)]
pub struct Registry<B: StoreBackend> {
    store: ModelStore<B>,
    options: RegistryOptions,
    models: BTreeMap<String, ModelInfo>,
}

impl<B: StoreBackend> Registry<B> {
    /// Connects and creates an empty registry.
    ///
    /// # Errors
    ///
    /// Returns the connection error; nothing is registered in that case.
    pub async fn register<T>(builder: T, options: RegistryOptions) -> ModelResult<Self>
    where
        T: StoreBackendBuilder<Backend = B>,
    {
        match ModelStore::connect(builder).await {
            Ok(store) => Ok(Self::new(store, options)),
            Err(err) => {
                warn!(error = %err, "failed to connect to the store, nothing registered");
                Err(err)
            }
        }
    }

    /// Creates a registry around an already connected store.
    pub fn new(store: ModelStore<B>, options: RegistryOptions) -> Self {
        Self {
            store,
            options,
            models: BTreeMap::new(),
        }
    }

    /// Registers model `D` under `name`, replacing any model registered under the same name.
    ///
    /// Can be called at any time, including after the host has started.
    pub fn add_model<D: Model>(&mut self, name: impl Into<String>) -> &mut Self {
        let info = ModelInfo::of::<D>(name.into());
        debug!(model = %info.name, collection = info.collection, "model registered");

        self.models.insert(info.name.clone(), info);
        self
    }

    /// Looks up a registered model by name.
    pub fn get(&self, name: &str) -> Option<&ModelInfo> {
        self.models.get(name)
    }

    /// Iterates over registered models in name order.
    pub fn models(&self) -> impl Iterator<Item = &ModelInfo> {
        self.models.values()
    }

    /// Returns the CRUD surface of a registered model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ModelNotRegistered`] if `D` was never added.
    pub fn model<D: Model>(&self) -> ModelResult<ModelCollection<'_, B, D>> {
        let type_id = TypeId::of::<D>();

        if self
            .models
            .values()
            .any(|info| info.type_id == type_id)
        {
            Ok(self.store.model::<D>())
        } else {
            Err(ModelError::ModelNotRegistered(std::any::type_name::<D>().to_string()))
        }
    }

    /// Returns the shared store.
    pub fn store(&self) -> &ModelStore<B> {
        &self.store
    }

    /// Returns the options the registry was created with.
    pub fn options(&self) -> RegistryOptions {
        self.options
    }
}

#[async_trait]
impl<B: StoreBackend> Lifecycle for Registry<B> {
    /// Creates the indexes of every registered model that declares some, unless auto-indexing
    /// is disabled.
    async fn on_pre_start(&self) -> ModelResult<()> {
        if !self.options.auto_index {
            debug!("auto indexing disabled");
            return Ok(());
        }

        for info in self.models.values() {
            let Some(indexes) = info.indexes.clone().filter(|indexes| !indexes.is_empty()) else {
                continue;
            };

            let names = self
                .store
                .backend()
                .create_indexes(info.collection, indexes)
                .await?;

            debug!(model = %info.name, collection = info.collection, ?names, "indexes created");
        }

        Ok(())
    }

    async fn on_post_stop(&self) -> ModelResult<()> {
        self.store.disconnect().await
    }
}
