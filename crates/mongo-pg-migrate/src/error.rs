//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target database connection or query error
    #[error("Target database error: {0}")]
    Sink(#[from] tokio_postgres::Error),

    /// Connection pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// No descriptor configured for the requested destination table
    #[error("No collection is configured for table \"{0}\"")]
    UnknownTable(String),

    /// A descriptor references a collection that does not exist
    #[error("Unknown collection \"{0}\" referenced in configuration")]
    UnknownCollection(String),

    /// A source record has no usable original identifier
    #[error("Record in collection \"{collection}\" has no usable \"_id\" field")]
    MissingId { collection: String },

    /// Two records in one collection carried the same original identifier
    #[error("Duplicate source identifier \"{old_id}\" in collection \"{collection}\"")]
    DuplicateId { collection: String, old_id: String },

    /// A required identifier lookup found no mapping (hard miss)
    #[error("No identifier mapping for \"{old_id}\" in collection \"{collection}\"")]
    UnmappedReference { collection: String, old_id: String },

    /// A link element could not be processed
    #[error("Link field \"{field}\": {message}")]
    Link { field: String, message: String },

    /// Collection dependencies form a cycle
    #[error("Collection dependencies form a cycle involving: {0}")]
    DependencyCycle(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Link error.
    pub fn link(field: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Link {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Map the error to a process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_)
            | MigrateError::UnknownTable(_)
            | MigrateError::UnknownCollection(_)
            | MigrateError::DependencyCycle(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
