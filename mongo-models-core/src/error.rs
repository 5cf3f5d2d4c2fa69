//! Error types and result types for model operations.
//!
//! Every fallible operation in this crate returns [`ModelResult<T>`]. Errors reported by the
//! underlying store are carried verbatim in [`ModelError::Backend`]; this layer never retries
//! and never swallows them.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working with models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Serialization/deserialization error when converting between documents and model instances.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The supplied identifier could not be coerced into the store's native ID type.
    #[error("Invalid id: {0}")]
    InvalidId(String),
    /// A document with the given ID already exists in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The document has an invalid structure for the requested operation.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An argument was outside the range the operation can work with.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The store produced a result shape the operation cannot return.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
    /// No model is registered under the given name.
    #[error("Model not registered: {0}")]
    ModelNotRegistered(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

impl From<BsonError> for ModelError {
    fn from(err: BsonError) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for ModelError {
    fn from(err: SerdeJsonError) -> Self {
        ModelError::Serialization(err.to_string())
    }
}
