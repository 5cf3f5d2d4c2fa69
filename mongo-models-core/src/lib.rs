//! A thin object-document mapping layer over a document database.
//!
//! This crate is the core of the mongo-models project and provides:
//!
//! - **Model traits** ([`model`]) - Binding a Rust type to a collection, schema and indexes
//! - **Raw results** ([`raw`]) - Tagged responses produced by store backends
//! - **Result normalization** ([`normalize`]) - Turning raw results into model instances
//! - **Store backend abstraction** ([`backend`]) - The collection primitives a backend provides
//! - **Model collections** ([`collection`]) - The CRUD surface and paged queries of a model
//! - **Field and sort adapters** ([`adapter`]) - `"name -age"` shorthands for projections and sorts
//! - **Operation options** ([`query`]) - Projection, sort, limit, upsert and return-mode knobs
//! - **Pagination** ([`page`]) - Page results with navigation metadata
//! - **Schemas** ([`schema`]) - Document validation
//! - **Registration** ([`registry`]) - Wiring models into a host's start and stop hooks
//! - **Configuration** ([`config`]) - Connection and registration settings
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use mongo_models::model::Model;
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub name: String,
//! }
//!
//! impl Model for User {
//!     fn collection_name() -> &'static str {
//!         "users"
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as mongo_models_core;

pub mod adapter;
pub mod backend;
pub mod collection;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod normalize;
pub mod page;
pub mod query;
pub mod raw;
pub mod registry;
pub mod schema;
pub mod store;
