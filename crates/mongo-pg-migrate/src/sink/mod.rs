//! Relational sink abstraction.

mod postgres;

pub use postgres::PgSink;

use crate::core::SqlRow;
use crate::error::Result;
use async_trait::async_trait;

/// Destination for normalized rows and junction rows.
///
/// Implementations perform the actual parameterized inserts. The pipeline
/// awaits every call before continuing, so implementations need no internal
/// ordering guarantees beyond completing each insert.
#[async_trait]
pub trait RelationalSink: Send + Sync {
    /// Insert a single row and return the identifier the destination
    /// assigned to it.
    async fn insert_row(&self, table: &str, row: &SqlRow) -> Result<i64>;

    /// Insert a junction-table row. No identifier is returned.
    async fn insert_link(&self, table: &str, row: &SqlRow) -> Result<()>;
}
