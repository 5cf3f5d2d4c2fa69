//! Conversion of raw store results into model instances.
//!
//! Every document-returning operation routes its outcome through [`normalize`]:
//!
//! | raw shape | normalized |
//! |---|---|
//! | error | the same error, value untouched |
//! | [`RawResult::Documents`] | [`Normalized::Instances`], one per element, same order |
//! | [`RawResult::FindAndModify`] with a value | [`Normalized::Instance`] |
//! | [`RawResult::FindAndModify`] without a value | [`Normalized::Absent`] |
//! | [`RawResult::Write`] | [`Normalized::Instances`] built from `ops` |
//! | [`RawResult::Document`] with `_id` | [`Normalized::Instance`] |
//! | [`RawResult::Document`] without `_id` | [`Normalized::Plain`], untouched |
//! | [`RawResult::Null`] | [`Normalized::Absent`] |
//!
//! Records without an `_id` are left untyped on purpose: only records recognizably belonging
//! to the collection become instances, which keeps projections that exclude `_id` usable.

use bson::Document;

use crate::{
    error::{ModelError, ModelResult},
    model::{Model, ModelExt},
    raw::{ID_FIELD, RawResult},
};

/// A raw result after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<D> {
    /// A single model instance.
    Instance(D),
    /// An ordered sequence of model instances.
    Instances(Vec<D>),
    /// No document: a missed lookup or a find-and-modify that matched nothing.
    Absent,
    /// A record without an identifier, left as a plain document.
    Plain(Document),
}

impl<D> Normalized<D> {
    /// Returns the instance, if this is a single instance.
    pub fn instance(self) -> Option<D> {
        match self {
            Normalized::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Returns the plain record, if the result was left untyped.
    pub fn plain(self) -> Option<Document> {
        match self {
            Normalized::Plain(document) => Some(document),
            _ => None,
        }
    }

    /// Returns `true` when no document was produced.
    pub fn is_absent(&self) -> bool {
        matches!(self, Normalized::Absent)
    }

    /// Converts a single-document result into an `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnexpectedResult`] for sequences and plain records.
    pub fn into_option(self) -> ModelResult<Option<D>> {
        match self {
            Normalized::Instance(instance) => Ok(Some(instance)),
            Normalized::Absent => Ok(None),
            Normalized::Instances(_) => Err(ModelError::UnexpectedResult(
                "expected a single document, got a sequence".into(),
            )),
            Normalized::Plain(_) => Err(ModelError::UnexpectedResult(
                "expected a model instance, got a record without an _id".into(),
            )),
        }
    }

    /// Converts a sequence result into a `Vec`. A single instance becomes a one-element vector
    /// and an absent result an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnexpectedResult`] for plain records.
    pub fn into_instances(self) -> ModelResult<Vec<D>> {
        match self {
            Normalized::Instances(instances) => Ok(instances),
            Normalized::Instance(instance) => Ok(vec![instance]),
            Normalized::Absent => Ok(Vec::new()),
            Normalized::Plain(_) => Err(ModelError::UnexpectedResult(
                "expected model instances, got a record without an _id".into(),
            )),
        }
    }
}

/// Normalizes the outcome of a store primitive into instances of `D`.
///
/// An error passes through unchanged and the raw value is never inspected. Conversion failures
/// surface as [`ModelError::Serialization`] through `E`.
pub fn normalize<D, E>(outcome: Result<RawResult, E>) -> Result<Normalized<D>, E>
where
    D: Model,
    E: From<ModelError>,
{
    let raw = outcome?;

    Ok(match raw {
        RawResult::Null => Normalized::Absent,
        RawResult::Documents(documents) | RawResult::Write { ops: documents } => {
            Normalized::Instances(instances(documents)?)
        }
        RawResult::FindAndModify { value: Some(document) } => Normalized::Instance(D::from_document(document)?),
        RawResult::FindAndModify { value: None } => Normalized::Absent,
        RawResult::Document(document) if document.contains_key(ID_FIELD) => {
            Normalized::Instance(D::from_document(document)?)
        }
        RawResult::Document(document) => Normalized::Plain(document),
    })
}

fn instances<D: Model>(documents: Vec<Document>) -> ModelResult<Vec<D>> {
    documents
        .into_iter()
        .map(D::from_document)
        .collect()
}

#[cfg(test)]
mod tests {
    use bson::{Bson, doc};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Dummy {
        #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
        id: Option<i32>,
        name: String,
    }

    impl Model for Dummy {
        fn collection_name() -> &'static str {
            "dummies"
        }
    }

    fn dummy(id: i32, name: &str) -> Dummy {
        Dummy { id: Some(id), name: name.into() }
    }

    #[test]
    fn errors_pass_through_untouched() {
        let outcome: ModelResult<RawResult> = Err(ModelError::Backend("boom".into()));
        assert_eq!(normalize::<Dummy, _>(outcome), Err(ModelError::Backend("boom".into())));
    }

    #[test]
    fn custom_error_types_pass_through() {
        #[derive(Debug, PartialEq)]
        enum HostError {
            Store(&'static str),
            Model(ModelError),
        }

        impl From<ModelError> for HostError {
            fn from(err: ModelError) -> Self {
                HostError::Model(err)
            }
        }

        let outcome: Result<RawResult, HostError> = Err(HostError::Store("offline"));
        assert_eq!(normalize::<Dummy, _>(outcome), Err(HostError::Store("offline")));
    }

    #[test]
    fn single_documents_with_ids_become_instances() {
        let normalized = normalize::<Dummy, ModelError>(Ok(RawResult::Document(doc! { "_id": 1, "name": "Ren" })));
        assert_eq!(normalized, Ok(Normalized::Instance(dummy(1, "Ren"))));
    }

    #[test]
    fn sequences_become_instances_in_order() {
        let normalized = normalize::<Dummy, ModelError>(Ok(RawResult::Documents(vec![
            doc! { "_id": 2, "name": "Stimpy" },
            doc! { "_id": 1, "name": "Ren" },
        ])));

        assert_eq!(normalized, Ok(Normalized::Instances(vec![dummy(2, "Stimpy"), dummy(1, "Ren")])));
    }

    #[test]
    fn sequence_elements_are_wrapped_without_ids() {
        let normalized = normalize::<Dummy, ModelError>(Ok(RawResult::Documents(vec![doc! { "name": "Ren" }])));
        assert_eq!(normalized, Ok(Normalized::Instances(vec![Dummy { id: None, name: "Ren".into() }])));
    }

    #[test]
    fn write_results_become_their_ops() {
        let normalized = normalize::<Dummy, ModelError>(Ok(RawResult::Write {
            ops: vec![doc! { "_id": 1, "name": "Ren" }, doc! { "_id": 2, "name": "Stimpy" }],
        }));

        assert_eq!(normalized, Ok(Normalized::Instances(vec![dummy(1, "Ren"), dummy(2, "Stimpy")])));
    }

    #[test]
    fn find_and_modify_hits_and_misses() {
        let hit = normalize::<Dummy, ModelError>(Ok(RawResult::FindAndModify {
            value: Some(doc! { "_id": 1, "name": "Ren" }),
        }));
        assert_eq!(hit, Ok(Normalized::Instance(dummy(1, "Ren"))));

        let miss = normalize::<Dummy, ModelError>(Ok(RawResult::FindAndModify { value: None }));
        assert_eq!(miss, Ok(Normalized::Absent));
    }

    #[test]
    fn records_without_ids_stay_plain() {
        let record = doc! { "name": "Ren", "hasHat": false };
        let normalized = normalize::<Dummy, ModelError>(Ok(RawResult::Document(record.clone())));

        assert_eq!(normalized, Ok(Normalized::Plain(record)));
    }

    #[test]
    fn classified_values_normalize_like_driver_responses() {
        let raw = RawResult::classify(Bson::Document(doc! { "value": { "_id": 3, "name": "Kowalski" } })).unwrap();
        assert_eq!(normalize::<Dummy, ModelError>(Ok(raw)), Ok(Normalized::Instance(dummy(3, "Kowalski"))));

        let raw = RawResult::classify(Bson::Document(doc! { "ops": [{ "_id": 4, "name": "Rico" }] })).unwrap();
        assert_eq!(normalize::<Dummy, ModelError>(Ok(raw)), Ok(Normalized::Instances(vec![dummy(4, "Rico")])));
    }

    #[test]
    fn mismatched_documents_are_serialization_errors() {
        let normalized = normalize::<Dummy, ModelError>(Ok(RawResult::Document(doc! { "_id": 1, "name": 5 })));
        assert!(matches!(normalized, Err(ModelError::Serialization(_))));
    }

    #[test]
    fn option_and_vec_accessors() {
        assert_eq!(Normalized::Instance(dummy(1, "Ren")).into_option(), Ok(Some(dummy(1, "Ren"))));
        assert_eq!(Normalized::<Dummy>::Absent.into_option(), Ok(None));
        assert!(Normalized::<Dummy>::Plain(doc! {}).into_option().is_err());
        assert_eq!(Normalized::<Dummy>::Absent.into_instances(), Ok(vec![]));
    }
}
