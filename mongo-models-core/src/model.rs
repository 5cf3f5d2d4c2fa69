//! Core traits for model types and their instances.
//!
//! A model type is bound to exactly one collection and optionally declares a [`Schema`] and a set
//! of indexes. Instances are plain serde values converted to and from BSON documents.

use bson::{
    Bson, Document,
    de::deserialize_from_document,
    oid::ObjectId,
    ser::serialize_to_document,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{ModelError, ModelResult},
    index::IndexSpec,
    schema::{Schema, Validation},
};

/// Core trait that every model type must implement.
///
/// Implement it by hand or derive it with `#[derive(Model)]` from the `mongo-models` crate.
///
/// # Example
///
/// ```ignore
/// use mongo_models::prelude::*;
/// use bson::oid::ObjectId;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Customer {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<ObjectId>,
///     pub name: String,
/// }
///
/// impl Model for Customer {
///     fn collection_name() -> &'static str {
///         "customers"
///     }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this model is bound to.
    fn collection_name() -> &'static str;

    /// Returns the schema instances of this model are validated against.
    ///
    /// The default schema accepts any document.
    fn schema() -> Schema {
        Schema::any()
    }

    /// Returns the indexes to create for this model's collection.
    ///
    /// `None` means the collection is never auto-indexed.
    fn indexes() -> Option<Vec<IndexSpec>> {
        None
    }

    /// Coerces a caller-supplied identifier into the store's native ID type.
    ///
    /// The default accepts `ObjectId` values and 24-character hex strings.
    fn coerce_id(id: Bson) -> ModelResult<Bson> {
        coerce_object_id(id)
    }

    /// Validates a raw document against this model's schema.
    fn validate(input: &Document) -> Validation {
        Self::schema().validate(input)
    }
}

/// Coerces `ObjectId` values and their hex string form into [`Bson::ObjectId`].
///
/// # Errors
///
/// Returns [`ModelError::InvalidId`] for malformed strings and for any other BSON type.
pub fn coerce_object_id(id: Bson) -> ModelResult<Bson> {
    match id {
        Bson::ObjectId(oid) => Ok(Bson::ObjectId(oid)),
        Bson::String(hex) => ObjectId::parse_str(&hex)
            .map(Bson::ObjectId)
            .map_err(|e| ModelError::InvalidId(format!("{hex:?}: {e}"))),
        other => Err(ModelError::InvalidId(format!("cannot use {other} as an ObjectId"))),
    }
}

/// Extension trait providing document conversion and validation for model instances.
///
/// Automatically implemented for every [`Model`].
pub trait ModelExt: Model {
    /// Converts this instance into a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the model does not serialize to a document.
    fn to_document(&self) -> ModelResult<Document>;

    /// Builds an instance from a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the model's shape.
    fn from_document(document: Document) -> ModelResult<Self>;

    /// Validates this instance against the model's schema.
    ///
    /// # Errors
    ///
    /// Returns an error only if the instance cannot be serialized; schema violations are
    /// reported in the returned [`Validation`].
    fn validate_instance(&self) -> ModelResult<Validation>;
}

impl<D: Model> ModelExt for D {
    fn to_document(&self) -> ModelResult<Document> {
        Ok(serialize_to_document(self)?)
    }

    fn from_document(document: Document) -> ModelResult<Self> {
        Ok(deserialize_from_document(document)?)
    }

    fn validate_instance(&self) -> ModelResult<Validation> {
        Ok(D::validate(&self.to_document()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_hex_strings() {
        let oid = ObjectId::new();
        assert_eq!(coerce_object_id(Bson::String(oid.to_hex())).unwrap(), Bson::ObjectId(oid));
        assert_eq!(coerce_object_id(Bson::ObjectId(oid)).unwrap(), Bson::ObjectId(oid));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(matches!(
            coerce_object_id(Bson::String("not-an-id".into())),
            Err(ModelError::InvalidId(_))
        ));
        assert!(matches!(coerce_object_id(Bson::Int32(12)), Err(ModelError::InvalidId(_))));
    }
}
