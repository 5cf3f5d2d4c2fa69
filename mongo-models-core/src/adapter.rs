//! Projection and sort shorthands.
//!
//! Both adapters accept either a structured document, which passes through unchanged, or a
//! whitespace-separated list of field names where a leading `-` flips the field:
//!
//! - [`Fields`]: `"name -secret"` becomes `{ name: true, secret: false }`
//! - [`SortSpec`]: `"name -age"` becomes `{ name: 1, age: -1 }`
//!
//! An empty string yields an empty document.

use bson::{Bson, Document};

/// A projection, given either as a document or as a field list string.
#[derive(Debug, Clone, PartialEq)]
pub enum Fields {
    /// An already structured projection.
    Document(Document),
    /// A whitespace-separated field list.
    List(String),
}

impl Fields {
    /// Resolves the projection into a document.
    pub fn into_document(self) -> Document {
        match self {
            Fields::Document(document) => document,
            Fields::List(list) => adapt(&list, Bson::Boolean),
        }
    }
}

impl From<Document> for Fields {
    fn from(document: Document) -> Self {
        Fields::Document(document)
    }
}

impl From<&str> for Fields {
    fn from(list: &str) -> Self {
        Fields::List(list.to_string())
    }
}

impl From<String> for Fields {
    fn from(list: String) -> Self {
        Fields::List(list)
    }
}

/// A sort order, given either as a document or as a field list string.
#[derive(Debug, Clone, PartialEq)]
pub enum SortSpec {
    /// An already structured sort document.
    Document(Document),
    /// A whitespace-separated field list.
    List(String),
}

impl SortSpec {
    /// Resolves the sort order into a document.
    pub fn into_document(self) -> Document {
        match self {
            SortSpec::Document(document) => document,
            SortSpec::List(list) => adapt(&list, |ascending| Bson::Int32(if ascending { 1 } else { -1 })),
        }
    }
}

impl From<Document> for SortSpec {
    fn from(document: Document) -> Self {
        SortSpec::Document(document)
    }
}

impl From<&str> for SortSpec {
    fn from(list: &str) -> Self {
        SortSpec::List(list.to_string())
    }
}

impl From<String> for SortSpec {
    fn from(list: String) -> Self {
        SortSpec::List(list)
    }
}

fn adapt(list: &str, value: impl Fn(bool) -> Bson) -> Document {
    let mut document = Document::new();

    for token in list.split_whitespace() {
        match token.strip_prefix('-') {
            Some(field) => document.insert(field, value(false)),
            None => document.insert(token, value(true)),
        };
    }

    document
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn fields_adapter_builds_a_projection() {
        assert_eq!(
            Fields::from("one -two three").into_document(),
            doc! { "one": true, "two": false, "three": true },
        );
    }

    #[test]
    fn sort_adapter_builds_a_sort_document() {
        assert_eq!(
            SortSpec::from("one -two three").into_document(),
            doc! { "one": 1, "two": -1, "three": 1 },
        );
    }

    #[test]
    fn empty_lists_yield_empty_documents() {
        assert_eq!(Fields::from("").into_document(), Document::new());
        assert_eq!(SortSpec::from("   ").into_document(), Document::new());
    }

    #[test]
    fn documents_pass_through() {
        let projection = doc! { "name": 1, "_id": 0 };
        assert_eq!(Fields::from(projection.clone()).into_document(), projection);

        let sort = doc! { "created": -1 };
        assert_eq!(SortSpec::from(sort.clone()).into_document(), sort);
    }

    #[test]
    fn irregular_whitespace_is_ignored() {
        assert_eq!(
            SortSpec::from("  name\t-age\n").into_document(),
            doc! { "name": 1, "age": -1 },
        );
    }
}
