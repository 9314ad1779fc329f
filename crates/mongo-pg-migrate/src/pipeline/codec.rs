//! Substructure codec: decides per field whether non-scalar values are
//! dropped, encoded to JSON text, or have their nested identifiers
//! translated before encoding.

use crate::config::{CollectionConfig, JsonField};
use crate::core::{scalar_key, Document, SqlRow, SqlValue, TARGET_ID_COLUMN};
use crate::error::{MigrateError, Result};
use crate::session::MigrationSession;
use serde_json::Value;

/// Encode a normalized, FK-resolved record into the row to insert.
///
/// The original identifier has already been removed. The destination's
/// native identity column and all `ignore_fields` are dropped. Arrays and
/// objects survive only when declared in `json_fields`, encoded as JSON
/// text; everything else passes through as a scalar.
pub(crate) fn encode_row(
    record: &Document,
    descriptor: &CollectionConfig,
    session: &MigrationSession,
) -> Result<SqlRow> {
    let mut row = SqlRow::new();

    for (field, value) in record {
        // Would collide with the identifier assigned on insert.
        if field == TARGET_ID_COLUMN {
            continue;
        }
        if descriptor.ignore_fields.contains(field) {
            continue;
        }

        match value {
            Value::Array(items) => {
                if let Some(declared) = descriptor.json_field(field) {
                    let text = encode_array(items, declared, session)?;
                    row.push(field.clone(), SqlValue::Text(text));
                }
                // Undeclared arrays: the destination has no room for them.
            }
            Value::Object(_) => {
                if descriptor.json_field(field).is_some() {
                    row.push(field.clone(), SqlValue::Text(serde_json::to_string(value)?));
                }
            }
            _ => {
                // Null, Bool, Number and String always convert.
                let scalar = SqlValue::from_scalar(value).unwrap_or(SqlValue::Null);
                row.push(field.clone(), scalar);
            }
        }
    }

    Ok(row)
}

/// Encode one declared array field, applying its translation variant.
fn encode_array(
    items: &[Value],
    declared: &JsonField,
    session: &MigrationSession,
) -> Result<String> {
    if let Some(collection) = &declared.substitute_id_to {
        // Every element is a raw identifier into `collection`; unlike the
        // scalar resolver, a miss here is a hard failure.
        let mut translated = Vec::with_capacity(items.len());
        for item in items {
            let old_id = scalar_key(item).ok_or_else(|| MigrateError::UnmappedReference {
                collection: collection.clone(),
                old_id: item.to_string(),
            })?;
            let new_id =
                session
                    .resolve(collection, &old_id)
                    .ok_or_else(|| MigrateError::UnmappedReference {
                        collection: collection.clone(),
                        old_id: old_id.clone(),
                    })?;
            translated.push(Value::String(new_id.to_string()));
        }
        return Ok(serde_json::to_string(&translated)?);
    }

    if let Some(nested) = &declared.foreign_keys {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(obj) => {
                    let mut mapped = Document::new();
                    for (key, value) in obj {
                        let mapped_value = match nested.get(key) {
                            Some(collection) => value
                                .as_str()
                                .and_then(|old_id| session.resolve(collection, old_id))
                                .map(|new_id| Value::String(new_id.to_string()))
                                // A miss keeps the original raw value.
                                .unwrap_or_else(|| value.clone()),
                            None => value.clone(),
                        };
                        mapped.insert(key.clone(), mapped_value);
                    }
                    out.push(Value::Object(mapped));
                }
                other => out.push(other.clone()),
            }
        }
        return Ok(serde_json::to_string(&out)?);
    }

    // Declared with neither variant: stored as-is.
    Ok(serde_json::to_string(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn descriptor() -> CollectionConfig {
        CollectionConfig {
            collection: "posts".to_string(),
            table: "posts".to_string(),
            foreign_keys: Default::default(),
            renames: Vec::new(),
            redefines: Vec::new(),
            json_fields: vec![
                JsonField {
                    field: "likes".to_string(),
                    substitute_id_to: Some("users".to_string()),
                    foreign_keys: None,
                },
                JsonField {
                    field: "comments".to_string(),
                    substitute_id_to: None,
                    foreign_keys: Some(BTreeMap::from([(
                        "user".to_string(),
                        "users".to_string(),
                    )])),
                },
                JsonField {
                    field: "meta".to_string(),
                    substitute_id_to: None,
                    foreign_keys: None,
                },
            ],
            ignore_fields: std::iter::once("secret".to_string()).collect(),
            links: Default::default(),
        }
    }

    fn session_with_users() -> MigrationSession {
        let mut session = MigrationSession::new();
        let map = session.map_mut("users");
        map.insert("users", "a".to_string(), 1).unwrap();
        map.insert("users", "b".to_string(), 2).unwrap();
        session
    }

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_scalars_pass_through() {
        let record = doc(json!({"title": "hi", "views": 3, "draft": false, "note": null}));
        let row = encode_row(&record, &descriptor(), &MigrationSession::new()).unwrap();
        assert_eq!(row.get("title"), Some(&SqlValue::Text("hi".to_string())));
        assert_eq!(row.get("views"), Some(&SqlValue::I64(3)));
        assert_eq!(row.get("draft"), Some(&SqlValue::Bool(false)));
        assert_eq!(row.get("note"), Some(&SqlValue::Null));
    }

    #[test]
    fn test_identity_and_ignored_fields_dropped() {
        let record = doc(json!({"id": 99, "secret": "x", "title": "t"}));
        let row = encode_row(&record, &descriptor(), &MigrationSession::new()).unwrap();
        assert!(row.get("id").is_none());
        assert!(row.get("secret").is_none());
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_undeclared_array_dropped() {
        let record = doc(json!({"stray": [1, 2, 3]}));
        let row = encode_row(&record, &descriptor(), &MigrationSession::new()).unwrap();
        assert!(row.is_empty());
    }

    #[test]
    fn test_substitute_id_to_translates_and_stringifies() {
        let record = doc(json!({"likes": ["a", "b"]}));
        let row = encode_row(&record, &descriptor(), &session_with_users()).unwrap();
        assert_eq!(
            row.get("likes"),
            Some(&SqlValue::Text(r#"["1","2"]"#.to_string()))
        );
    }

    #[test]
    fn test_substitute_id_to_miss_is_hard_failure() {
        let record = doc(json!({"likes": ["a", "zzz"]}));
        let err = encode_row(&record, &descriptor(), &session_with_users()).unwrap_err();
        assert!(matches!(err, MigrateError::UnmappedReference { .. }));
    }

    #[test]
    fn test_nested_foreign_keys_resolve_and_keep_on_miss() {
        let record = doc(json!({
            "comments": [
                {"user": "a", "text": "first"},
                {"user": "zzz", "text": "orphan"},
                {"text": "anonymous"}
            ]
        }));
        let row = encode_row(&record, &descriptor(), &session_with_users()).unwrap();
        let text = match row.get("comments").unwrap() {
            SqlValue::Text(t) => t,
            other => panic!("expected text, got {:?}", other),
        };
        let decoded: Vec<Value> = serde_json::from_str(text).unwrap();
        assert_eq!(decoded[0]["user"], json!("1"));
        // Miss keeps the original raw value, not null
        assert_eq!(decoded[1]["user"], json!("zzz"));
        assert_eq!(decoded[2], json!({"text": "anonymous"}));
    }

    #[test]
    fn test_plain_json_field_encoded_as_is() {
        let record = doc(json!({"meta": [{"k": 1}, "x"]}));
        let row = encode_row(&record, &descriptor(), &MigrationSession::new()).unwrap();
        assert_eq!(
            row.get("meta"),
            Some(&SqlValue::Text(r#"[{"k":1},"x"]"#.to_string()))
        );
    }

    #[test]
    fn test_declared_object_encoded_undeclared_dropped() {
        let record = doc(json!({"meta": {"k": 1}, "stray": {"x": 2}}));
        let row = encode_row(&record, &descriptor(), &MigrationSession::new()).unwrap();
        assert_eq!(
            row.get("meta"),
            Some(&SqlValue::Text(r#"{"k":1}"#.to_string()))
        );
        assert!(row.get("stray").is_none());
    }
}
