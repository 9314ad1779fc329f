//! PostgreSQL sink implementation.

use crate::config::TargetConfig;
use crate::core::SqlRow;
use crate::error::{MigrateError, Result};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{types::ToSql, NoTls};
use tracing::{debug, info};

use super::RelationalSink;

/// PostgreSQL sink backed by a connection pool.
pub struct PgSink {
    pool: Pool,
    schema: String,
}

impl PgSink {
    /// Create a new PostgreSQL sink and verify connectivity.
    pub async fn new(config: &TargetConfig) -> Result<Self> {
        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = Manager::from_config(config.pg_config(), NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(config.max_connections)
            .build()
            .map_err(|e| MigrateError::Pool(format!("Failed to create pool: {}", e)))?;

        // Test connection
        let client = pool
            .get()
            .await
            .map_err(|e| MigrateError::Pool(format!("Failed to get connection: {}", e)))?;
        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            pool,
            schema: config.schema.clone(),
        })
    }

    /// Quote a PostgreSQL identifier.
    fn quote_ident(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Fully qualify a table name.
    fn qualified(&self, table: &str) -> String {
        format!("{}.{}", Self::quote_ident(&self.schema), Self::quote_ident(table))
    }

    /// Build an INSERT statement with string parameters and SQL casts.
    ///
    /// All values travel as text and are cast in SQL, which sidesteps
    /// per-column wire-type negotiation for dynamically shaped rows.
    fn build_insert_sql(
        &self,
        table: &str,
        row: &SqlRow,
        returning_id: bool,
    ) -> (String, Vec<Option<String>>) {
        let col_list: String = row
            .columns()
            .map(Self::quote_ident)
            .collect::<Vec<_>>()
            .join(", ");

        let mut placeholders = Vec::new();
        let mut params: Vec<Option<String>> = Vec::new();
        for (idx, (_, value)) in row.iter().enumerate() {
            placeholders.push(format!("${}{}", idx + 1, value.sql_cast()));
            params.push(value.to_param());
        }

        let mut sql = if row.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.qualified(table))
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.qualified(table),
                col_list,
                placeholders.join(", ")
            )
        };

        if returning_id {
            // int8 covers both serial and bigserial identity columns.
            sql.push_str(" RETURNING \"id\"::int8");
        }

        (sql, params)
    }
}

#[async_trait]
impl RelationalSink for PgSink {
    async fn insert_row(&self, table: &str, row: &SqlRow) -> Result<i64> {
        let (sql, params) = self.build_insert_sql(table, row, true);
        debug!("insert_row: {}", sql);

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| MigrateError::Pool(format!("Failed to get connection: {}", e)))?;

        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let result = client.query_one(&sql, &refs).await?;
        Ok(result.get(0))
    }

    async fn insert_link(&self, table: &str, row: &SqlRow) -> Result<()> {
        let (sql, params) = self.build_insert_sql(table, row, false);
        debug!("insert_link: {}", sql);

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| MigrateError::Pool(format!("Failed to get connection: {}", e)))?;

        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        client.execute(&sql, &refs).await?;
        Ok(())
    }
}
