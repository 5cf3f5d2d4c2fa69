//! In-memory storage backend for mongo-models.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It evaluates MongoDB-style filters, updates, projections and sorts over BSON documents,
//! which makes it a drop-in store for development and tests.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **MongoDB filters** - Comparison, membership, existence and logical operators, dotted paths
//! - **Updates** - `$set`, `$unset`, `$inc` and `$setOnInsert`, with upserts
//! - **Natural order** - Documents come back in insertion order unless sorted
//!
//! # Quick Start
//!
//! ```ignore
//! use mongo_models::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ModelStore::connect(InMemoryStore::builder()).await?;
//!     let customers = store.model::<Customer>();
//!
//!     customers.insert_one(&Customer::new("Alice")).await?;
//!     assert_eq!(customers.count(doc! {}).await?, 1);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as mongo_models_memory;

pub mod store;
mod evaluator;
mod projection;
mod update;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
