//! MongoDB backend implementation for mongo-models.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait on top of the
//! official async driver. Filters, updates, projections and sorts are passed to the server as
//! they are, so the full MongoDB query language is available to models.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mongo-models = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! Connecting pings the server, so an unreachable deployment fails at startup instead of on
//! the first query. Pool size and application name come from the builder or from a
//! [`ConnectionConfig`](mongo_models_core::config::ConnectionConfig).
//!
//! # Example
//!
//! ```ignore
//! use mongo_models::{prelude::*, mongodb::MongoDbStoreBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::from_env();
//!     let store = ModelStore::connect(MongoDbStoreBuilder::from_config(&config)).await?;
//!
//!     store.disconnect().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as mongo_models_mongodb;

pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
