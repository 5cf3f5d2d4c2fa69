//! Filter evaluation for in-memory documents.
//!
//! Supports the MongoDB query operators models commonly use: `$and`, `$or`, `$nor`, `$eq`,
//! `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists` and `$not`. Field names may be
//! dotted paths; arrays along a path are traversed, and equality against an array field matches
//! when any element matches.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use mongo_models_core::error::{ModelError, ModelResult};


/// Comparable view of a BSON value. Integers and doubles share one numeric representation.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    ObjectId(ObjectId),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null,
        }
    }
}

impl Comparable<'_> {
    /// Position of the value's type in MongoDB's cross-type sort order.
    fn rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Number(_) => 1,
            Comparable::String(_) => 2,
            Comparable::Map(_) => 3,
            Comparable::Array(_) => 4,
            Comparable::ObjectId(_) => 5,
            Comparable::Bool(_) => 6,
            Comparable::DateTime(_) => 7,
        }
    }

    /// Total order used for sorting: type rank first, then value.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.partial_cmp(other).unwrap_or(Ordering::Equal))
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Collects every value reachable through a dotted path, traversing arrays along the way.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Vec<&'a Bson> {
    let segments = path.split('.').collect::<Vec<_>>();
    let mut found = Vec::new();

    if let Some((head, rest)) = segments.split_first() {
        if let Some(value) = document.get(*head) {
            descend(value, rest, &mut found);
        }
    }

    found
}

fn descend<'a>(value: &'a Bson, segments: &[&str], found: &mut Vec<&'a Bson>) {
    let Some((head, rest)) = segments.split_first() else {
        found.push(value);
        return;
    };

    match value {
        Bson::Document(doc) => {
            if let Some(next) = doc.get(*head) {
                descend(next, rest, found);
            }
        }
        Bson::Array(items) => match head.parse::<usize>() {
            Ok(index) => {
                if let Some(next) = items.get(index) {
                    descend(next, rest, found);
                }
            }
            Err(_) => {
                for item in items {
                    if matches!(item, Bson::Document(_)) {
                        descend(item, segments, found);
                    }
                }
            }
        },
        _ => {}
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Returns whether the document satisfies `filter`. An empty filter matches everything.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for unsupported or malformed operators.
    pub fn matches(&self, filter: &Document) -> ModelResult<bool> {
        for (key, condition) in filter {
            let satisfied = match key.as_str() {
                "$and" => self.all(condition)?,
                "$or" => self.any(condition)?,
                "$nor" => !self.any(condition)?,
                op if op.starts_with('$') => {
                    return Err(ModelError::InvalidArgument(format!("unsupported query operator {op}")));
                }
                field => field_matches(&lookup(self.document, field), condition)?,
            };

            if !satisfied {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn all(&self, clauses: &Bson) -> ModelResult<bool> {
        for clause in clause_list(clauses)? {
            if !self.matches(clause)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn any(&self, clauses: &Bson) -> ModelResult<bool> {
        for clause in clause_list(clauses)? {
            if self.matches(clause)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Returns clones of the documents matching `filter`, in their original order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        filter: &Document,
    ) -> ModelResult<Vec<Document>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).matches(filter)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }
}

fn clause_list(clauses: &Bson) -> ModelResult<Vec<&Document>> {
    match clauses {
        Bson::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Bson::Document(clause) => Ok(clause),
                other => Err(ModelError::InvalidArgument(format!("expected a filter document, got {other}"))),
            })
            .collect(),
        other => Err(ModelError::InvalidArgument(format!(
            "logical operators take a non-empty array of filters, got {other}"
        ))),
    }
}

fn is_operator_document(condition: &Bson) -> bool {
    match condition {
        Bson::Document(doc) => doc
            .keys()
            .next()
            .is_some_and(|key| key.starts_with('$')),
        _ => false,
    }
}

fn field_matches(values: &[&Bson], condition: &Bson) -> ModelResult<bool> {
    let Bson::Document(operators) = condition else {
        return Ok(equals(values, condition));
    };

    if !is_operator_document(condition) {
        return Ok(equals(values, condition));
    }

    for (op, operand) in operators {
        let satisfied = match op.as_str() {
            "$eq" => equals(values, operand),
            "$ne" => !equals(values, operand),
            "$gt" => compares(values, operand, |o| o == Ordering::Greater),
            "$gte" => compares(values, operand, |o| o != Ordering::Less),
            "$lt" => compares(values, operand, |o| o == Ordering::Less),
            "$lte" => compares(values, operand, |o| o != Ordering::Greater),
            "$in" => one_of(values, operand)?,
            "$nin" => !one_of(values, operand)?,
            "$exists" => values.is_empty() != truthy(operand),
            "$not" => {
                if !is_operator_document(operand) {
                    return Err(ModelError::InvalidArgument("$not needs an operator document".into()));
                }
                !field_matches(values, operand)?
            }
            other => {
                return Err(ModelError::InvalidArgument(format!("unsupported query operator {other}")));
            }
        };

        if !satisfied {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Equality with array-contains semantics; a missing field equals `null`.
fn equals(values: &[&Bson], expected: &Bson) -> bool {
    let expected = Comparable::from(expected);

    if values.is_empty() {
        return expected == Comparable::Null;
    }

    values.iter().any(|value| {
        let actual = Comparable::from(*value);

        match &actual {
            Comparable::Array(items) => actual == expected || items.iter().any(|item| *item == expected),
            _ => actual == expected,
        }
    })
}

fn compares(values: &[&Bson], operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let operand = Comparable::from(operand);

    values.iter().any(|value| {
        let actual = Comparable::from(*value);
        let candidates = match actual {
            Comparable::Array(items) => items,
            single => vec![single],
        };

        candidates
            .iter()
            .any(|candidate| candidate.partial_cmp(&operand).is_some_and(&accept))
    })
}

fn one_of(values: &[&Bson], operand: &Bson) -> ModelResult<bool> {
    match operand {
        Bson::Array(options) => Ok(options.iter().any(|option| equals(values, option))),
        other => Err(ModelError::InvalidArgument(format!("$in and $nin take an array, got {other}"))),
    }
}

pub(crate) fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}
