//! The per-collection migration pipeline.
//!
//! One record flows strictly forward through five stages:
//!
//! 1. **Shape normalization** — declarative renames and constant overrides,
//!    producing a fresh record (inputs are never mutated).
//! 2. **Foreign key resolution** — scalar reference fields are rewritten to
//!    destination identifiers; a missing mapping resolves to null.
//! 3. **Substructure encoding** — arrays/objects are dropped or encoded to
//!    JSON text, translating nested identifiers where declared ([`codec`]).
//! 4. **Commit** — the row is inserted, and the old -> new identifier pair
//!    is appended to the session map before the next record, so
//!    self-referencing collections observe all prior mappings.
//! 5. **Link materialization** — declared many-to-many relations emit one
//!    junction row per related element.
//!
//! Records are processed one at a time, in input order; every sink call is
//! awaited before the pipeline continues. A failure at any stage halts the
//! collection; rows committed before the failure stay committed.

mod codec;

use crate::config::{CollectionConfig, Config};
use crate::core::{scalar_key, take_source_id, Document, LinkElement, SqlRow, SqlValue};
use crate::error::{MigrateError, Result};
use crate::session::{IdEntry, MigrationSession};
use crate::sink::RelationalSink;
use serde_json::Value;
use tracing::{info, warn};

/// Migrate one collection's records into its destination table.
///
/// Returns the identifier-map entries produced for `rows`, in input order;
/// the same entries are appended to the session map for the collection.
pub async fn migrate_collection(
    sink: &dyn RelationalSink,
    config: &Config,
    session: &mut MigrationSession,
    table_name: &str,
    rows: &[Document],
) -> Result<Vec<IdEntry>> {
    let descriptor = config
        .collection_for_table(table_name)
        .ok_or_else(|| MigrateError::UnknownTable(table_name.to_string()))?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let mut record = normalize(row, descriptor);
        resolve_foreign_keys(&mut record, descriptor, session);
        let old_id = take_source_id(&mut record, &descriptor.collection)?;

        let encoded = codec::encode_row(&record, descriptor, session)?;
        let new_id = sink.insert_row(&descriptor.table, &encoded).await?;

        session
            .map_mut(&descriptor.collection)
            .insert(&descriptor.collection, old_id.clone(), new_id)?;
        entries.push(IdEntry { old_id, new_id });

        materialize_links(sink, descriptor, session, &record, new_id).await?;
    }

    info!(
        "Inserted {} rows into \"{}\" table",
        rows.len(),
        table_name
    );
    Ok(entries)
}

/// Apply renames and constant overrides, producing a new record.
fn normalize(record: &Document, descriptor: &CollectionConfig) -> Document {
    let mut out = record.clone();

    for rename in &descriptor.renames {
        let value = out.remove(&rename.from);
        if let (Some(to), Some(value)) = (&rename.to, value) {
            out.insert(to.clone(), value);
        }
    }

    for redefine in &descriptor.redefines {
        out.insert(redefine.field.clone(), redefine.value.clone());
    }

    out
}

/// Rewrite scalar foreign-key fields against previously built maps.
///
/// A missing mapping deliberately resolves to null rather than failing;
/// the field is written even when it was absent from the record. Array
/// values are left for the link materializer.
fn resolve_foreign_keys(
    record: &mut Document,
    descriptor: &CollectionConfig,
    session: &MigrationSession,
) {
    for (field, collection) in &descriptor.foreign_keys {
        if matches!(record.get(field), Some(Value::Array(_))) {
            continue;
        }

        let resolved = record
            .get(field)
            .and_then(scalar_key)
            .and_then(|key| session.resolve(collection, &key));

        let value = match resolved {
            Some(new_id) => Value::from(new_id),
            None => Value::Null,
        };
        record.insert(field.clone(), value);
    }
}

/// Emit one junction row per related element of each declared link field.
async fn materialize_links(
    sink: &dyn RelationalSink,
    descriptor: &CollectionConfig,
    session: &MigrationSession,
    record: &Document,
    new_id: i64,
) -> Result<()> {
    for (field, link) in &descriptor.links {
        // Validation guarantees the foreign_keys entry naming the related
        // collection exists for every link field.
        let collection = descriptor.foreign_keys.get(field).ok_or_else(|| {
            MigrateError::link(field, "no foreign_keys entry names the related collection")
        })?;

        let items = match record.get(field) {
            Some(Value::Array(items)) => items,
            _ => {
                warn!(
                    "Link field \"{}\" absent or not an array; no junction rows emitted",
                    field
                );
                continue;
            }
        };

        for item in items {
            let element = LinkElement::from_value(item).ok_or_else(|| {
                MigrateError::link(
                    field,
                    format!("element {} is neither an identifier nor an object", item),
                )
            })?;

            let mut junction = SqlRow::new();
            let foreign_old = match element {
                LinkElement::Reference(id) => id,
                LinkElement::Embedded(obj) => {
                    let extractor = link.extractor.as_ref().ok_or_else(|| {
                        MigrateError::link(field, "embedded relation element but no extractor declared")
                    })?;

                    for (source, column) in &extractor.attribute_columns {
                        if let Some(value) = obj.get(source) {
                            let value = SqlValue::from_scalar(value)
                                .unwrap_or_else(|| SqlValue::Text(value.to_string()));
                            junction.push(column.clone(), value);
                        }
                    }

                    obj.get(&extractor.foreign_key_field)
                        .and_then(scalar_key)
                        .ok_or_else(|| {
                            MigrateError::link(
                                field,
                                format!(
                                    "element has no usable \"{}\" identifier",
                                    extractor.foreign_key_field
                                ),
                            )
                        })?
                }
            };

            // Hard miss: an unmapped related identifier aborts the table.
            let foreign_new = session.resolve(collection, &foreign_old).ok_or_else(|| {
                MigrateError::UnmappedReference {
                    collection: collection.clone(),
                    old_id: foreign_old.clone(),
                }
            })?;

            junction.push(link.own_column.clone(), SqlValue::I64(new_id));
            junction.push(link.foreign_column.clone(), SqlValue::I64(foreign_new));
            sink.insert_link(&link.table, &junction).await?;
        }
    }

    Ok(())
}
