//! Update and replacement application for in-memory documents.
//!
//! Supported update operators: `$set`, `$unset`, `$inc` and `$setOnInsert` (applied only when
//! upserting). Dotted paths create intermediate documents as needed.

use bson::{Bson, Document};

use mongo_models_core::{
    error::{ModelError, ModelResult},
    raw::ID_FIELD,
};

/// Applies an operator update document in place.
///
/// # Errors
///
/// Returns [`ModelError::InvalidArgument`] when the update has no operators, uses an
/// unsupported one, increments a non-numeric field, or would change `_id`.
pub(crate) fn apply_update(document: &mut Document, update: &Document, inserting: bool) -> ModelResult<()> {
    if update.is_empty() || update.keys().any(|key| !key.starts_with('$')) {
        return Err(ModelError::InvalidArgument("update documents may only contain operators".into()));
    }

    let original_id = document.get(ID_FIELD).cloned();

    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(ModelError::InvalidArgument(format!("{op} takes a document of fields")));
        };

        for (path, value) in fields {
            match op.as_str() {
                "$set" => set_path(document, path, value.clone())?,
                "$setOnInsert" if inserting => set_path(document, path, value.clone())?,
                "$setOnInsert" => {}
                "$unset" => unset_path(document, path),
                "$inc" => {
                    let current = get_path(document, path).cloned();
                    set_path(document, path, increment(path, current, value)?)?;
                }
                other => {
                    return Err(ModelError::InvalidArgument(format!("unsupported update operator {other}")));
                }
            }
        }
    }

    if original_id.is_some() && document.get(ID_FIELD) != original_id.as_ref() {
        return Err(ModelError::InvalidArgument("the _id field is immutable".into()));
    }

    Ok(())
}

/// Builds the replacement for `existing`, keeping its `_id`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidArgument`] when the replacement holds operators or a different
/// `_id`.
pub(crate) fn apply_replacement(existing: &Document, replacement: &Document) -> ModelResult<Document> {
    ensure_replacement(replacement)?;

    let mut replaced = Document::new();
    if let Some(id) = existing.get(ID_FIELD) {
        if replacement.get(ID_FIELD).is_some_and(|new_id| new_id != id) {
            return Err(ModelError::InvalidArgument("the _id field is immutable".into()));
        }
        replaced.insert(ID_FIELD, id.clone());
    }

    for (key, value) in replacement {
        if key != ID_FIELD {
            replaced.insert(key.clone(), value.clone());
        }
    }

    Ok(replaced)
}

pub(crate) fn ensure_replacement(replacement: &Document) -> ModelResult<()> {
    if replacement.keys().any(|key| key.starts_with('$')) {
        return Err(ModelError::InvalidArgument("replacement documents may not contain operators".into()));
    }

    Ok(())
}

/// Seeds an upserted document with the plain equality fields of a filter.
pub(crate) fn upsert_seed(filter: &Document) -> ModelResult<Document> {
    let mut seed = Document::new();

    for (key, value) in filter {
        if key.starts_with('$') {
            continue;
        }

        match value {
            Bson::Document(doc) if doc.keys().next().is_some_and(|k| k.starts_with('$')) => {
                if let Some(eq) = doc.get("$eq") {
                    set_path(&mut seed, key, eq.clone())?;
                }
            }
            _ => set_path(&mut seed, key, value.clone())?,
        }
    }

    Ok(seed)
}

fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(doc) => doc.get(segment)?,
            _ => return None,
        };
    }

    Some(current)
}

fn set_path(document: &mut Document, path: &str, value: Bson) -> ModelResult<()> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }

            match document.get_mut(head) {
                Some(Bson::Document(child)) => set_path(child, rest, value),
                other => Err(ModelError::InvalidArgument(format!(
                    "cannot create field {rest} inside non-document {head} ({other:?})"
                ))),
            }
        }
    }
}

fn unset_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(child)) = document.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}

fn increment(path: &str, current: Option<Bson>, by: &Bson) -> ModelResult<Bson> {
    let current = current.unwrap_or(Bson::Int32(0));

    Ok(match (&current, by) {
        (Bson::Int32(a), Bson::Int32(b)) => match a.checked_add(*b) {
            Some(sum) => Bson::Int32(sum),
            None => Bson::Int64(i64::from(*a) + i64::from(*b)),
        },
        (Bson::Int32(a), Bson::Int64(b)) => Bson::Int64(i64::from(*a).saturating_add(*b)),
        (Bson::Int64(a), Bson::Int32(b)) => Bson::Int64(a.saturating_add(i64::from(*b))),
        (Bson::Int64(a), Bson::Int64(b)) => Bson::Int64(a.saturating_add(*b)),
        (a, b) => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => {
                return Err(ModelError::InvalidArgument(format!(
                    "cannot increment {path} ({current}) by {by}"
                )));
            }
        },
    })
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn set_unset_and_inc() {
        let mut document = doc! { "_id": 1, "name": "Ren", "visits": 1, "old": true };

        apply_update(
            &mut document,
            &doc! {
                "$set": { "name": "Stimpy", "address.city": "Springfield" },
                "$unset": { "old": "" },
                "$inc": { "visits": 2, "score": 1.5 },
            },
            false,
        )
        .unwrap();

        assert_eq!(
            document,
            doc! {
                "_id": 1,
                "name": "Stimpy",
                "visits": 3,
                "address": { "city": "Springfield" },
                "score": 1.5,
            }
        );
    }

    #[test]
    fn set_on_insert_only_applies_when_inserting() {
        let mut existing = doc! { "_id": 1 };
        apply_update(&mut existing, &doc! { "$setOnInsert": { "created": true } }, false).unwrap();
        assert_eq!(existing, doc! { "_id": 1 });

        let mut inserted = doc! { "_id": 2 };
        apply_update(&mut inserted, &doc! { "$setOnInsert": { "created": true } }, true).unwrap();
        assert_eq!(inserted, doc! { "_id": 2, "created": true });
    }

    #[test]
    fn rejects_plain_documents_and_id_changes() {
        let mut document = doc! { "_id": 1, "name": "Ren" };

        assert!(apply_update(&mut document, &doc! { "name": "Stimpy" }, false).is_err());
        assert!(apply_update(&mut document, &doc! { "$set": { "_id": 2 } }, false).is_err());
        assert!(apply_update(&mut document, &doc! { "$inc": { "name": 1 } }, false).is_err());
        assert!(apply_update(&mut document, &doc! { "$push": { "tags": "a" } }, false).is_err());
    }

    #[test]
    fn replacements_keep_the_original_id() {
        let replaced = apply_replacement(&doc! { "_id": 1, "name": "Ren" }, &doc! { "name": "Stimpy" }).unwrap();
        assert_eq!(replaced, doc! { "_id": 1, "name": "Stimpy" });

        assert!(apply_replacement(&doc! { "_id": 1 }, &doc! { "_id": 2 }).is_err());
        assert!(apply_replacement(&doc! { "_id": 1 }, &doc! { "$set": { "a": 1 } }).is_err());
    }

    #[test]
    fn upsert_seeds_come_from_equality_fields() {
        let seed = upsert_seed(&doc! {
            "name": "Ren",
            "age": { "$gt": 3 },
            "role": { "$eq": "admin" },
            "$or": [{ "a": 1 }],
        })
        .unwrap();

        assert_eq!(seed, doc! { "name": "Ren", "role": "admin" });
    }
}
