//! Document-shaped source records and identifier extraction.

use crate::error::{MigrateError, Result};
use serde_json::Value;

/// A source record: an arbitrary field -> value mapping.
pub type Document = serde_json::Map<String, Value>;

/// The original document identifier field.
pub const SOURCE_ID_FIELD: &str = "_id";

/// The destination's native identity column, assigned on insert.
pub const TARGET_ID_COLUMN: &str = "id";

/// String form of a scalar value used as an identifier-map key.
///
/// Strings pass through, numbers and booleans use their display form, and
/// the mongoexport extended-JSON wrapper `{"$oid": "..."}` is unwrapped.
/// Null, arrays and other objects have no key form.
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => {
            if obj.len() == 1 {
                obj.get("$oid").and_then(Value::as_str).map(str::to_string)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Remove the record's original identifier and return its string form.
///
/// The identifier is never part of the inserted row; it becomes the
/// `old_id` of the map entry recorded on commit.
pub fn take_source_id(record: &mut Document, collection: &str) -> Result<String> {
    record
        .remove(SOURCE_ID_FIELD)
        .as_ref()
        .and_then(scalar_key)
        .ok_or_else(|| MigrateError::MissingId {
            collection: collection.to_string(),
        })
}

/// One element of a many-to-many relation field.
///
/// The shape is decided by the data model in this single conversion point:
/// a bare identifier is a `Reference`, an object with fields is an
/// `Embedded` relation that needs a declared extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkElement {
    /// A raw reference identifier into the related collection.
    Reference(String),

    /// An embedded relation object carrying extra junction attributes.
    Embedded(Document),
}

impl LinkElement {
    /// Classify a JSON value as a link element.
    ///
    /// Returns `None` for values that are neither an identifier nor an
    /// object (e.g. bare numbers or nested arrays).
    pub fn from_value(value: &Value) -> Option<LinkElement> {
        match value {
            Value::String(s) => Some(LinkElement::Reference(s.clone())),
            Value::Object(obj) => {
                // The $oid wrapper is still a bare reference.
                if let Some(id) = scalar_key(value) {
                    Some(LinkElement::Reference(id))
                } else {
                    Some(LinkElement::Embedded(obj.clone()))
                }
            }
            _ => None,
        }
    }
}
