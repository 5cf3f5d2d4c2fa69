//! Typed, schema-validated models over MongoDB collections.
//!
//! This crate is the primary entry point for users of the mongo-models project. It re-exports
//! the core types from the sub-crates and provides access to the storage backends.
//!
//! # Features
//!
//! - **Typed models** - Bind serde types to collections with `#[derive(Model)]`
//! - **Normalized results** - Driver responses come back as model instances
//! - **Paged queries** - One call for a page of data plus page and item metadata
//! - **Schemas and indexes** - Declared per model, validated and created for you
//! - **Host lifecycle** - A registry that indexes before start and disconnects after stop
//!
//! # Quick Start
//!
//! ```ignore
//! use mongo_models::{prelude::*, memory::InMemoryStore};
//! use mongo_models::bson::{doc, oid::ObjectId};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Model)]
//! #[model(collection = "users")]
//! pub struct User {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> ModelResult<()> {
//!     let store = ModelStore::connect(InMemoryStore::builder()).await?;
//!     let users = store.model::<User>();
//!
//!     let inserted = users.insert_one(&User { id: None, name: "Alice".into() }).await?;
//!     let alice = users
//!         .find_by_id(inserted[0].id.unwrap(), FindOneOptions::default())
//!         .await?
//!         .instance();
//!
//!     let page = users.paged_find(doc! {}, "name", "-name", 10, 1).await?;
//!     println!("{} of {} users", page.data.len(), page.items.total);
//!
//!     store.disconnect().await
//! }
//! ```
//!
//! # Registration
//!
//! A host server wires models in through a [`Registry`](registry::Registry):
//!
//! ```ignore
//! use mongo_models::{prelude::*, mongodb::MongoDbStoreBuilder};
//!
//! let config = PluginConfig::from_json(&std::fs::read_to_string("models.json")?)?;
//! let mut registry = Registry::register(
//!     MongoDbStoreBuilder::from_config(&config.mongodb),
//!     config.registry_options(),
//! )
//! .await?;
//!
//! registry.add_model::<User>("User");
//!
//! registry.on_pre_start().await?;
//! // serve ...
//! registry.on_post_stop().await?;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as mongo_models;

pub mod prelude;

pub use mongo_models_core::{
    adapter, backend, collection, config, error, index, model, normalize, page, query, raw, registry,
    schema, store,
};
pub use mongo_models_macros::Model;

// Re-exported for backend implementations and generated code
pub use async_trait::async_trait;
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use mongo_models_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use mongo_models_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
