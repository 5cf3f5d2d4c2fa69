//! Convenient re-exports of commonly used types from mongo-models.
//!
//! ```ignore
//! use mongo_models::prelude::*;
//! ```
//!
//! This provides access to:
//! - The `Model` trait and derive, instance conversion and ID coercion
//! - Stores, backends and builders
//! - Operation options, adapters and page results
//! - Schemas, indexes and the registration lifecycle
//! - Configuration and error types

pub use mongo_models_core::{
    adapter::{Fields, SortSpec},
    backend::{StoreBackend, StoreBackendBuilder},
    collection::ModelCollection,
    config::{ConnectionConfig, PluginConfig, RegistryOptions},
    error::{ModelError, ModelResult},
    index::IndexSpec,
    model::{Model, ModelExt, coerce_object_id},
    normalize::{Normalized, normalize},
    page::{Items, PageResult, Pages, PaginationParams},
    query::{
        FindOneAndDeleteOptions, FindOneAndModifyOptions, FindOneOptions, FindOptions, ReturnDocument,
        UpdateOptions,
    },
    raw::{DeleteOutcome, RawResult, UpdateOutcome},
    registry::{Lifecycle, ModelInfo, Registry},
    schema::{FieldRule, FieldType, Schema, Validation, Violation, ViolationKind},
    store::ModelStore,
};
pub use mongo_models_macros::Model;
