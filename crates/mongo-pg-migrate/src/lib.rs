//! # mongo-pg-migrate
//!
//! MongoDB export to PostgreSQL migration library.
//!
//! This library migrates document-shaped records (MongoDB JSON exports) into
//! normalized relational rows while translating document identifiers into the
//! identifiers PostgreSQL assigns on insert:
//!
//! - **Shape normalization** via declarative renames and constant overrides
//! - **Foreign key translation** through per-collection identifier maps
//! - **Substructure encoding** of arrays/objects into text columns
//! - **Junction table materialization** for many-to-many relations
//! - **Dependency-ordered migration** across collections
//!
//! ## Example
//!
//! ```rust,no_run
//! use mongo_pg_migrate::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> mongo_pg_migrate::Result<()> {
//!     let config = Config::load("migration.yaml")?;
//!     let orchestrator = Orchestrator::new(config).await?;
//!     let result = orchestrator.run().await?;
//!     println!("Migrated {} rows", result.rows_migrated);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod source;

// Re-exports for convenient access
pub use config::{CollectionConfig, Config, LinkConfig, SourceConfig, TargetConfig};
pub use core::{Document, LinkElement, SqlRow, SqlValue};
pub use error::{MigrateError, Result};
pub use orchestrator::{migration_plan, CollectionResult, MigrationResult, Orchestrator};
pub use pipeline::migrate_collection;
pub use session::{IdEntry, IdMap, MigrationSession};
pub use sink::{PgSink, RelationalSink};
pub use source::{DocumentSource, JsonDirSource};
