//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};
use std::collections::BTreeSet;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Target validation
    if config.target.host.is_empty() {
        return Err(MigrateError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(MigrateError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(MigrateError::Config("target.user is required".into()));
    }
    if config.target.r#type != "postgres" {
        return Err(MigrateError::Config(format!(
            "target.type must be 'postgres', got '{}'",
            config.target.r#type
        )));
    }
    if config.target.max_connections == 0 {
        return Err(MigrateError::Config(
            "target.max_connections must be at least 1".into(),
        ));
    }

    // Source validation
    if config.source.r#type != "jsondir" {
        return Err(MigrateError::Config(format!(
            "source.type must be 'jsondir', got '{}'",
            config.source.r#type
        )));
    }

    if config.collections.is_empty() {
        return Err(MigrateError::Config(
            "at least one collection is required".into(),
        ));
    }

    let known: BTreeSet<&str> = config
        .collections
        .iter()
        .map(|c| c.collection.as_str())
        .collect();

    let mut seen_collections = BTreeSet::new();
    let mut seen_tables = BTreeSet::new();

    for col in &config.collections {
        let ctx = &col.collection;

        if col.collection.is_empty() {
            return Err(MigrateError::Config("collection name is required".into()));
        }
        if col.table.is_empty() {
            return Err(MigrateError::Config(format!(
                "collection '{}': table name is required",
                ctx
            )));
        }
        if !seen_collections.insert(col.collection.as_str()) {
            return Err(MigrateError::Config(format!(
                "duplicate collection '{}'",
                ctx
            )));
        }
        if !seen_tables.insert(col.table.as_str()) {
            return Err(MigrateError::Config(format!(
                "duplicate table '{}'",
                col.table
            )));
        }

        for (field, target) in &col.foreign_keys {
            if !known.contains(target.as_str()) {
                return Err(MigrateError::Config(format!(
                    "collection '{}': foreign key field '{}' references unknown collection '{}'",
                    ctx, field, target
                )));
            }
        }

        for rename in &col.renames {
            if rename.from.is_empty() {
                return Err(MigrateError::Config(format!(
                    "collection '{}': rename with empty 'from' field",
                    ctx
                )));
            }
        }

        for json_field in &col.json_fields {
            if json_field.substitute_id_to.is_some() && json_field.foreign_keys.is_some() {
                return Err(MigrateError::Config(format!(
                    "collection '{}': json field '{}' declares both substitute_id_to and foreign_keys",
                    ctx, json_field.field
                )));
            }
            if let Some(target) = &json_field.substitute_id_to {
                if !known.contains(target.as_str()) {
                    return Err(MigrateError::Config(format!(
                        "collection '{}': json field '{}' substitutes ids to unknown collection '{}'",
                        ctx, json_field.field, target
                    )));
                }
            }
            if let Some(fks) = &json_field.foreign_keys {
                for (key, target) in fks {
                    if !known.contains(target.as_str()) {
                        return Err(MigrateError::Config(format!(
                            "collection '{}': json field '{}' key '{}' references unknown collection '{}'",
                            ctx, json_field.field, key, target
                        )));
                    }
                }
            }
        }

        for (field, link) in &col.links {
            if link.table.is_empty() {
                return Err(MigrateError::Config(format!(
                    "collection '{}': link '{}' has no junction table",
                    ctx, field
                )));
            }
            if link.own_column.is_empty() || link.foreign_column.is_empty() {
                return Err(MigrateError::Config(format!(
                    "collection '{}': link '{}' needs own_column and foreign_column",
                    ctx, field
                )));
            }
            // The referenced collection comes from the foreign_keys entry
            // for the same field, as the link resolver relies on it.
            if !col.foreign_keys.contains_key(field) {
                return Err(MigrateError::Config(format!(
                    "collection '{}': link field '{}' must also appear in foreign_keys \
                     to name the referenced collection",
                    ctx, field
                )));
            }
            if let Some(extractor) = &link.extractor {
                if extractor.foreign_key_field.is_empty() {
                    return Err(MigrateError::Config(format!(
                        "collection '{}': link '{}' extractor needs foreign_key_field",
                        ctx, field
                    )));
                }
            }
        }
    }

    Ok(())
}
