//! Projection and sorting for in-memory results.

use std::cmp::Ordering;
use bson::{Bson, Document};

use mongo_models_core::{
    error::{ModelError, ModelResult},
    raw::ID_FIELD,
};

use crate::evaluator::{Comparable, lookup, truthy};

/// Applies a projection to a document.
///
/// Inclusion and exclusion cannot be mixed, except for `_id`, which is kept unless explicitly
/// excluded. Dotted keys such as `address.city` reach into embedded documents and into the
/// documents held by arrays. An empty projection returns the document unchanged.
///
/// # Errors
///
/// Returns [`ModelError::InvalidArgument`] when inclusion and exclusion are mixed.
pub(crate) fn project(document: Document, projection: &Document) -> ModelResult<Document> {
    let keep_id = projection.get(ID_FIELD).is_none_or(truthy);
    let fields = projection
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD)
        .map(|(key, value)| (key.as_str(), truthy(value)))
        .collect::<Vec<_>>();

    let including = fields.iter().any(|(_, on)| *on);
    if including && fields.iter().any(|(_, on)| !*on) {
        return Err(ModelError::InvalidArgument(
            "cannot mix inclusion and exclusion in a projection".into(),
        ));
    }

    let paths = fields.iter().map(|(path, _)| *path).collect::<Vec<_>>();
    let mut projected = Document::new();

    for (key, value) in document {
        if key == ID_FIELD {
            if keep_id {
                projected.insert(key, value);
            }
            continue;
        }

        let kept = if including {
            include(value, &children(&paths, &key))
        } else {
            exclude(value, &children(&paths, &key))
        };

        if let Some(value) = kept {
            projected.insert(key, value);
        }
    }

    Ok(projected)
}

/// The remainders of the paths that start at `key`. An empty remainder names `key` itself.
fn children<'p>(paths: &[&'p str], key: &str) -> Vec<&'p str> {
    paths
        .iter()
        .copied()
        .filter_map(|path| match path.split_once('.') {
            Some((head, rest)) if head == key => Some(rest),
            None if path == key => Some(""),
            _ => None,
        })
        .collect()
}

fn include(value: Bson, paths: &[&str]) -> Option<Bson> {
    if paths.is_empty() {
        return None;
    }
    if paths.contains(&"") {
        return Some(value);
    }

    match value {
        Bson::Document(document) => Some(Bson::Document(include_fields(document, paths))),
        Bson::Array(items) => Some(Bson::Array(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Bson::Document(document) => Some(Bson::Document(include_fields(document, paths))),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    }
}

fn include_fields(document: Document, paths: &[&str]) -> Document {
    document
        .into_iter()
        .filter_map(|(key, value)| include(value, &children(paths, &key)).map(|value| (key, value)))
        .collect()
}

fn exclude(value: Bson, paths: &[&str]) -> Option<Bson> {
    if paths.contains(&"") {
        return None;
    }
    if paths.is_empty() {
        return Some(value);
    }

    Some(match value {
        Bson::Document(document) => Bson::Document(exclude_fields(document, paths)),
        Bson::Array(items) => Bson::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Bson::Document(document) => Bson::Document(exclude_fields(document, paths)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    })
}

fn exclude_fields(document: Document, paths: &[&str]) -> Document {
    document
        .into_iter()
        .filter_map(|(key, value)| exclude(value, &children(paths, &key)).map(|value| (key, value)))
        .collect()
}

/// Sorts documents by a multi-key sort document (`1` ascending, `-1` descending).
///
/// The sort is stable, so documents with equal keys keep their natural order.
pub(crate) fn sort_documents(documents: &mut [Document], sort: &Document) {
    if sort.is_empty() {
        return;
    }

    documents.sort_by(|a, b| compare(a, b, sort));
}

/// Orders two documents by a sort document. Missing keys sort before present ones.
pub(crate) fn compare(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (field, direction) in sort {
        let ordering = match (sort_key(a, field), sort_key(b, field)) {
            (Some(l), Some(r)) => Comparable::from(l).sort_cmp(&Comparable::from(r)),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        let ordering = if descending(direction) { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

fn sort_key<'a>(document: &'a Document, field: &str) -> Option<&'a Bson> {
    lookup(document, field).into_iter().next()
}

fn descending(direction: &Bson) -> bool {
    match direction {
        Bson::Int32(n) => *n < 0,
        Bson::Int64(n) => *n < 0,
        Bson::Double(n) => *n < 0.0,
        Bson::String(s) => s.eq_ignore_ascii_case("desc") || s.eq_ignore_ascii_case("descending"),
        _ => false,
    }
}
