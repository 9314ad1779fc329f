//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source document export configuration.
    pub source: SourceConfig,

    /// Target database configuration (PostgreSQL).
    pub target: TargetConfig,

    /// Per-collection migration descriptors.
    pub collections: Vec<CollectionConfig>,
}

impl Config {
    /// Find the descriptor for a destination table.
    pub fn collection_for_table(&self, table: &str) -> Option<&CollectionConfig> {
        self.collections.iter().find(|c| c.table == table)
    }

    /// Find the descriptor for a source collection.
    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.iter().find(|c| c.collection == name)
    }
}

/// Source document export configuration.
///
/// Points at a directory of `mongoexport` dumps, one `<collection>.json`
/// file per collection (JSON lines or a single top-level array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Export format (always "jsondir" for now).
    #[serde(default = "default_jsondir")]
    pub r#type: String,

    /// Directory containing the per-collection export files.
    pub dir: PathBuf,
}

/// Target database (PostgreSQL) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database type (always "postgres" for now).
    #[serde(default = "default_postgres")]
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Target schema (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,

    /// Maximum pooled connections (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// One source-collection to destination-table mapping.
///
/// Everything here is read-only input to the pipeline; identifier maps
/// accumulated during migration live in [`crate::MigrationSession`], not on
/// the descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Source collection name.
    pub collection: String,

    /// Destination table name.
    pub table: String,

    /// Scalar foreign-key fields: field name -> referenced collection.
    ///
    /// Array-valued fields listed here are not rewritten in place; they
    /// name the referenced collection for the matching `links` entry.
    #[serde(default)]
    pub foreign_keys: BTreeMap<String, String>,

    /// Ordered field renames, applied before anything else.
    #[serde(default)]
    pub renames: Vec<FieldRename>,

    /// Unconditional constant overrides, applied after renames.
    #[serde(default)]
    pub redefines: Vec<FieldRedefine>,

    /// Array/object fields kept as JSON text instead of being dropped.
    #[serde(default)]
    pub json_fields: Vec<JsonField>,

    /// Fields always dropped from the inserted row.
    #[serde(default)]
    pub ignore_fields: BTreeSet<String>,

    /// Many-to-many relations materialized into junction tables:
    /// field name -> junction description.
    #[serde(default)]
    pub links: BTreeMap<String, LinkConfig>,
}

impl CollectionConfig {
    /// Look up the json-field declaration for a field, if any.
    pub fn json_field(&self, field: &str) -> Option<&JsonField> {
        self.json_fields.iter().find(|j| j.field == field)
    }
}

/// A field rename. Omitting `to` deletes the field outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRename {
    /// Source field name (removed from the record).
    pub from: String,

    /// Destination field name; `None` means pure deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// An unconditional constant override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRedefine {
    /// Field to overwrite (created if absent).
    pub field: String,

    /// Constant value to store.
    pub value: serde_json::Value,
}

/// A field whose non-scalar value is kept as JSON text.
///
/// Exactly one encoding variant applies:
/// - `substitute_id_to` set: the value is an array of raw identifiers into
///   the named collection; each is translated before encoding.
/// - `foreign_keys` set: the value is an array of objects; the named keys
///   are translated against their collections before encoding.
/// - neither: the value is encoded as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonField {
    /// Field name.
    pub field: String,

    /// Treat every array element as an identifier into this collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute_id_to: Option<String>,

    /// Per-key identifier translation for arrays of nested objects:
    /// nested field name -> referenced collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<BTreeMap<String, String>>,
}

/// A many-to-many relation materialized into a junction table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Junction table name.
    pub table: String,

    /// Junction column holding the current record's new identifier.
    pub own_column: String,

    /// Junction column holding the related record's new identifier.
    pub foreign_column: String,

    /// How to split embedded relation objects into a junction row plus a
    /// foreign identifier. Required when link elements carry extra fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<ElementExtractor>,
}

/// Declarative element extraction for embedded link elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementExtractor {
    /// Element field holding the related record's original identifier.
    pub foreign_key_field: String,

    /// Element fields copied into the junction row:
    /// element field name -> junction column name.
    #[serde(default)]
    pub attribute_columns: BTreeMap<String, String>,
}

// Default value functions for serde
fn default_jsondir() -> String {
    "jsondir".to_string()
}

fn default_postgres() -> String {
    "postgres".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_public_schema() -> String {
    "public".to_string()
}

fn default_max_connections() -> usize {
    4
}
