//! Document sources.

use crate::core::Document;
use crate::error::{MigrateError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Provides the records of a source collection, in input order.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Read all records of a collection.
    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>>;
}

/// Reads `mongoexport` dumps from a directory: one `<collection>.json`
/// file per collection, either JSON lines (mongoexport default) or a
/// single top-level JSON array (`--jsonArray`).
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    /// Create a source over an export directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn parse(collection: &str, content: &str) -> Result<Vec<Document>> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') {
            return Ok(serde_json::from_str(trimmed)?);
        }

        // JSON lines: one document per non-empty line
        let mut docs = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let doc: Document = serde_json::from_str(line).map_err(|e| {
                MigrateError::Config(format!(
                    "invalid JSON line in export for collection '{}': {}",
                    collection, e
                ))
            })?;
            docs.push(doc);
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentSource for JsonDirSource {
    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>> {
        let path = self.dir.join(format!("{}.json", collection));
        debug!("Reading collection export: {:?}", path);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            MigrateError::Config(format!(
                "cannot read export file {:?} for collection '{}': {}",
                path, collection, e
            ))
        })?;
        Self::parse(collection, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_json_array_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("users.json"),
            r#"[{"_id": "a", "name": "Ann"}, {"_id": "b", "name": "Bob"}]"#,
        )
        .unwrap();

        let source = JsonDirSource::new(dir.path());
        let docs = source.read_collection("users").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get("name").unwrap(), "Ann");
    }

    #[tokio::test]
    async fn test_reads_json_lines_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("users.json"),
            "{\"_id\": \"a\"}\n\n{\"_id\": \"b\"}\n",
        )
        .unwrap();

        let source = JsonDirSource::new(dir.path());
        let docs = source.read_collection("users").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].get("_id").unwrap(), "b");
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonDirSource::new(dir.path());
        assert!(matches!(
            source.read_collection("missing").await,
            Err(MigrateError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_json_line_reported_with_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.json"), "{not json}\n").unwrap();

        let source = JsonDirSource::new(dir.path());
        let err = source.read_collection("users").await.unwrap_err();
        assert!(err.to_string().contains("users"));
    }
}
