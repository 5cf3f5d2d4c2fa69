//! Schema description and validation for model documents.
//!
//! A [`Schema`] lists the fields a document may carry, their types and whether they are
//! required. Validation never fails as an error: it returns a [`Validation`] that carries the
//! validated value alongside every [`Violation`] found, and the caller decides what to do.
//!
//! # Example
//!
//! ```ignore
//! use mongo_models::schema::{Schema, FieldRule};
//! use bson::doc;
//!
//! let schema = Schema::object()
//!     .field("name", FieldRule::string().required())
//!     .field("hasHat", FieldRule::boolean());
//!
//! let validation = schema.validate(&doc! { "name": "Stimpy" });
//! assert!(validation.is_valid());
//! ```

use std::fmt;

use bson::{Bson, Document};
use serde::Serialize;

/// The BSON type a field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Any value.
    Any,
    /// A UTF-8 string.
    String,
    /// A boolean.
    Boolean,
    /// A 32 or 64-bit integer, or a double without a fractional part.
    Integer,
    /// Any numeric value.
    Number,
    /// An `ObjectId`.
    ObjectId,
    /// An embedded document.
    Document,
    /// An array.
    Array,
    /// A UTC datetime.
    DateTime,
}

impl FieldType {
    fn accepts(&self, value: &Bson) -> bool {
        match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::String, Bson::String(_)) => true,
            (FieldType::Boolean, Bson::Boolean(_)) => true,
            (FieldType::Integer, Bson::Int32(_) | Bson::Int64(_)) => true,
            (FieldType::Integer, Bson::Double(n)) => n.fract() == 0.0,
            (FieldType::Number, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => true,
            (FieldType::ObjectId, Bson::ObjectId(_)) => true,
            (FieldType::Document, Bson::Document(_)) => true,
            (FieldType::Array, Bson::Array(_)) => true,
            (FieldType::DateTime, Bson::DateTime(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Any => "any",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::ObjectId => "objectId",
            FieldType::Document => "document",
            FieldType::Array => "array",
            FieldType::DateTime => "dateTime",
        };

        f.write_str(name)
    }
}

/// Constraints on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    kind: FieldType,
    required: bool,
    nullable: bool,
}

impl FieldRule {
    /// Creates an optional rule for the given type.
    pub fn new(kind: FieldType) -> Self {
        Self { kind, required: false, nullable: false }
    }

    pub fn any() -> Self {
        Self::new(FieldType::Any)
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(FieldType::Integer)
    }

    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    pub fn object_id() -> Self {
        Self::new(FieldType::ObjectId)
    }

    pub fn document() -> Self {
        Self::new(FieldType::Document)
    }

    pub fn array() -> Self {
        Self::new(FieldType::Array)
    }

    pub fn date_time() -> Self {
        Self::new(FieldType::DateTime)
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accepts an explicit `null` in place of a value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// What went wrong with a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViolationKind {
    /// A required field is missing.
    Required,
    /// The field holds a value of the wrong type.
    InvalidType {
        /// The type the schema expects.
        expected: FieldType,
    },
    /// The field is not declared by the schema.
    Unknown,
}

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// The offending field.
    pub path: String,
    /// The kind of violation.
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Required => write!(f, "\"{}\" is required", self.path),
            ViolationKind::InvalidType { expected } => write!(f, "\"{}\" must be a {}", self.path, expected),
            ViolationKind::Unknown => write!(f, "\"{}\" is not allowed", self.path),
        }
    }
}

/// The outcome of validating a document: the value plus any violations.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// The document that was validated.
    pub value: Document,
    /// Every violation found, in schema order followed by unknown fields.
    pub violations: Vec<Violation>,
}

impl Validation {
    /// Returns `true` when no violations were found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Splits the validation into the value or the violations.
    pub fn into_result(self) -> Result<Document, Vec<Violation>> {
        if self.violations.is_empty() {
            Ok(self.value)
        } else {
            Err(self.violations)
        }
    }
}

/// An object schema describing the fields of a model document.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
    allow_unknown: bool,
}

impl Schema {
    /// A schema that accepts any document.
    pub fn any() -> Self {
        Self { fields: Vec::new(), allow_unknown: true }
    }

    /// An object schema that rejects undeclared fields unless [`Schema::allow_unknown`] is set.
    pub fn object() -> Self {
        Self { fields: Vec::new(), allow_unknown: false }
    }

    /// Declares a field.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push((name.into(), rule));
        self
    }

    /// Sets whether undeclared fields are accepted.
    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    /// Validates a document against this schema.
    pub fn validate(&self, input: &Document) -> Validation {
        let mut violations = Vec::new();

        for (name, rule) in &self.fields {
            match input.get(name) {
                None => {
                    if rule.required {
                        violations.push(Violation { path: name.clone(), kind: ViolationKind::Required });
                    }
                }
                Some(Bson::Null) if rule.nullable => {}
                Some(value) => {
                    if !rule.kind.accepts(value) {
                        violations.push(Violation {
                            path: name.clone(),
                            kind: ViolationKind::InvalidType { expected: rule.kind },
                        });
                    }
                }
            }
        }

        if !self.allow_unknown {
            for key in input.keys() {
                if !self.fields.iter().any(|(name, _)| name == key) {
                    violations.push(Violation { path: key.clone(), kind: ViolationKind::Unknown });
                }
            }
        }

        Validation { value: input.clone(), violations }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::any()
    }
}
