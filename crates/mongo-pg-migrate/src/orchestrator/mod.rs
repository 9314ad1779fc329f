//! Migration orchestrator - main workflow coordinator.
//!
//! Computes a dependency-respecting migration order across collections and
//! runs the pipeline once per collection. A collection's identifier map is
//! fully populated before any collection referencing it is migrated, which
//! is the ordering invariant the pipeline itself relies on but does not
//! compute.

use crate::config::{CollectionConfig, Config};
use crate::error::{MigrateError, Result};
use crate::pipeline;
use crate::session::MigrationSession;
use crate::sink::{PgSink, RelationalSink};
use crate::source::{DocumentSource, JsonDirSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;

/// Migration orchestrator.
pub struct Orchestrator {
    config: Config,
    source: Arc<dyn DocumentSource>,
    sink: Arc<dyn RelationalSink>,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Collections migrated.
    pub collections_total: usize,

    /// Total rows inserted across all collections.
    pub rows_migrated: usize,

    /// Per-collection outcome, in migration order.
    pub collections: Vec<CollectionResult>,
}

/// Outcome for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    /// Source collection name.
    pub collection: String,

    /// Destination table name.
    pub table: String,

    /// Rows inserted.
    pub rows: usize,
}

impl MigrationResult {
    /// Serialize the result to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Orchestrator {
    /// Create a new orchestrator with the real source and sink.
    pub async fn new(config: Config) -> Result<Self> {
        let sink = PgSink::new(&config.target).await?;
        let source = JsonDirSource::new(config.source.dir.clone());
        Ok(Self {
            config,
            source: Arc::new(source),
            sink: Arc::new(sink),
        })
    }

    /// Create an orchestrator over explicit source and sink implementations.
    pub fn with_parts(
        config: Config,
        source: Arc<dyn DocumentSource>,
        sink: Arc<dyn RelationalSink>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// The collection migration order, without running anything.
    pub fn plan(&self) -> Result<Vec<String>> {
        migration_plan(&self.config)
    }

    /// Run the migration.
    pub async fn run(&self) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting migration run: {}", run_id);

        let order = migration_order(&self.config.collections)?;
        info!("Migrating {} collections", order.len());

        let mut session = MigrationSession::new();
        let mut results = Vec::with_capacity(order.len());
        let mut rows_migrated = 0;

        for index in order {
            let descriptor = &self.config.collections[index];
            info!(
                "Migrating collection \"{}\" into table \"{}\"",
                descriptor.collection, descriptor.table
            );

            let rows = self.source.read_collection(&descriptor.collection).await?;
            let entries = pipeline::migrate_collection(
                self.sink.as_ref(),
                &self.config,
                &mut session,
                &descriptor.table,
                &rows,
            )
            .await?;

            rows_migrated += entries.len();
            results.push(CollectionResult {
                collection: descriptor.collection.clone(),
                table: descriptor.table.clone(),
                rows: entries.len(),
            });
        }

        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        info!(
            "Migration run {} finished: {} rows in {:.2}s",
            run_id, rows_migrated, duration_seconds
        );

        Ok(MigrationResult {
            run_id,
            started_at,
            completed_at,
            duration_seconds,
            collections_total: results.len(),
            rows_migrated,
            collections: results,
        })
    }
}

/// The collection migration order for a configuration, by name.
///
/// Needs neither source files nor a database connection; used for dry runs.
pub fn migration_plan(config: &Config) -> Result<Vec<String>> {
    let order = migration_order(&config.collections)?;
    Ok(order
        .into_iter()
        .map(|i| config.collections[i].collection.clone())
        .collect())
}

/// Collections a descriptor depends on: scalar foreign keys, identifier
/// substitutions and nested json foreign keys. Self-references impose no
/// ordering (the pipeline handles them record by record).
fn dependencies(descriptor: &CollectionConfig) -> BTreeSet<&str> {
    let mut deps: BTreeSet<&str> = BTreeSet::new();
    deps.extend(descriptor.foreign_keys.values().map(String::as_str));
    for json_field in &descriptor.json_fields {
        if let Some(collection) = &json_field.substitute_id_to {
            deps.insert(collection);
        }
        if let Some(nested) = &json_field.foreign_keys {
            deps.extend(nested.values().map(String::as_str));
        }
    }
    deps.remove(descriptor.collection.as_str());
    deps
}

/// Topological order over the descriptor dependency graph (Kahn's
/// algorithm, stable with respect to configuration order).
fn migration_order(collections: &[CollectionConfig]) -> Result<Vec<usize>> {
    let index_of: HashMap<&str, usize> = collections
        .iter()
        .enumerate()
        .map(|(i, c)| (c.collection.as_str(), i))
        .collect();

    let deps: Vec<BTreeSet<usize>> = collections
        .iter()
        .map(|c| {
            dependencies(c)
                .into_iter()
                .filter_map(|name| index_of.get(name).copied())
                .collect()
        })
        .collect();

    let mut remaining: Vec<usize> = (0..collections.len()).collect();
    let mut done: BTreeSet<usize> = BTreeSet::new();
    let mut order = Vec::with_capacity(collections.len());

    while !remaining.is_empty() {
        let ready: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| deps[i].iter().all(|d| done.contains(d)))
            .collect();

        if ready.is_empty() {
            let stuck: Vec<&str> = remaining
                .iter()
                .map(|&i| collections[i].collection.as_str())
                .collect();
            return Err(MigrateError::DependencyCycle(stuck.join(", ")));
        }

        for i in &ready {
            done.insert(*i);
            order.push(*i);
        }
        remaining.retain(|i| !done.contains(i));
    }

    Ok(order)
}
