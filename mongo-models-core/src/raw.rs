//! Raw results produced by store backends.
//!
//! Backends tag every document-shaped response with a [`RawResult`] variant so that the
//! [normalizer](crate::normalize) can pattern-match on the shape instead of inspecting an
//! untyped value. Mutation counts are reported through [`UpdateOutcome`] and [`DeleteOutcome`].

use bson::{Bson, Document, oid::ObjectId};

use crate::error::{ModelError, ModelResult};

/// Name of the identifier field carried by every stored document.
pub const ID_FIELD: &str = "_id";

/// A document-shaped response from a store primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// Nothing was returned (for example `find_one` without a match).
    Null,
    /// A single record.
    Document(Document),
    /// An ordered sequence of records.
    Documents(Vec<Document>),
    /// A write result carrying the inserted documents.
    Write {
        /// The inserted documents, in insertion order, with their `_id` assigned.
        ops: Vec<Document>,
    },
    /// A find-and-modify result. `value` is `None` when no document matched.
    FindAndModify {
        /// The original or modified document, depending on the requested return mode.
        value: Option<Document>,
    },
}

impl RawResult {
    /// Tags an untyped value the way a loosely typed driver response would be read.
    ///
    /// Arrays become [`RawResult::Documents`]. A record carrying `value` but no `_id` becomes
    /// [`RawResult::FindAndModify`] (a null, `false` or missing `value` means no match). A record
    /// carrying an array `ops` becomes [`RawResult::Write`]. Any other record is a
    /// [`RawResult::Document`], and null becomes [`RawResult::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidDocument`] for values that are not document shaped, such
    /// as scalars or arrays holding scalars.
    pub fn classify(value: Bson) -> ModelResult<Self> {
        match value {
            Bson::Null | Bson::Undefined => Ok(RawResult::Null),
            Bson::Array(items) => Ok(RawResult::Documents(into_documents(items)?)),
            Bson::Document(mut record) => {
                if record.contains_key("value") && !record.contains_key(ID_FIELD) {
                    return match record.remove("value") {
                        Some(Bson::Document(value)) => Ok(RawResult::FindAndModify { value: Some(value) }),
                        Some(Bson::Null) | Some(Bson::Undefined) | Some(Bson::Boolean(false)) | None => {
                            Ok(RawResult::FindAndModify { value: None })
                        }
                        Some(other) => Err(ModelError::InvalidDocument(format!(
                            "find-and-modify value must be a document, got {other}"
                        ))),
                    };
                }

                if let Some(Bson::Array(_)) = record.get("ops") {
                    if let Some(Bson::Array(ops)) = record.remove("ops") {
                        return Ok(RawResult::Write { ops: into_documents(ops)? });
                    }
                }

                Ok(RawResult::Document(record))
            }
            other => Err(ModelError::InvalidDocument(format!(
                "expected a document or an array of documents, got {other}"
            ))),
        }
    }
}

fn into_documents(items: Vec<Bson>) -> ModelResult<Vec<Document>> {
    items
        .into_iter()
        .map(|item| match item {
            Bson::Document(doc) => Ok(doc),
            other => Err(ModelError::InvalidDocument(format!("expected a document, got {other}"))),
        })
        .collect()
}

/// Assigns a fresh `ObjectId` to a document that has no `_id`, returning the document's id.
pub fn ensure_id(document: &mut Document) -> Bson {
    match document.get(ID_FIELD) {
        Some(id) => id.clone(),
        None => {
            let id = Bson::ObjectId(ObjectId::new());
            document.insert(ID_FIELD, id.clone());
            id
        }
    }
}

/// Counts reported by an update or replace primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    /// Number of documents matching the filter.
    pub matched_count: u64,
    /// Number of documents actually modified.
    pub modified_count: u64,
    /// Identifier of the upserted document, if the operation inserted one.
    pub upserted_id: Option<Bson>,
}

/// Counts reported by a delete primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    /// Number of documents deleted.
    pub deleted_count: u64,
}
