//! The connection object shared by every model.
//!
//! A [`ModelStore`] owns one backend instance. Model types borrow it through
//! [`ModelStore::model`], so all models share a single connection.
//!
//! # Example
//!
//! ```ignore
//! use mongo_models::store::ModelStore;
//! use mongo_models::mongodb::MongoDbStore;
//!
//! let store = ModelStore::connect(MongoDbStore::builder("mongodb://localhost:27017", "app")).await?;
//! let customers = store.model::<Customer>();
//!
//! store.disconnect().await?;
//! ```

use tracing::debug;

use crate::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::ModelCollection,
    error::ModelResult,
    model::Model,
};

/// A connected store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct ModelStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> ModelStore<B> {
    /// Wraps an already connected backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Connects using a backend builder.
    ///
    /// # Errors
    ///
    /// Returns the builder's error, typically
    /// [`ModelError::Initialization`](crate::error::ModelError::Initialization).
    pub async fn connect<T>(builder: T) -> ModelResult<Self>
    where
        T: StoreBackendBuilder<Backend = B>,
    {
        let backend = builder.build().await?;
        debug!(backend = std::any::type_name::<B>(), "store connected");

        Ok(Self::new(backend))
    }

    /// Returns the CRUD surface of model `D`, bound to its collection.
    pub fn model<D: Model>(&self) -> ModelCollection<'_, B, D> {
        ModelCollection::new(&self.backend)
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Closes the backend's connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to shut down.
    pub async fn disconnect(&self) -> ModelResult<()> {
        self.backend.shutdown().await?;
        debug!("store disconnected");

        Ok(())
    }
}
