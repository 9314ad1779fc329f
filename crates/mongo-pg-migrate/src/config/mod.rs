//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl TargetConfig {
    /// Build a tokio-postgres configuration.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.dbname(&self.database);
        config.user(&self.user);
        config.password(&self.password);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
source:
  dir: ./export

target:
  host: localhost
  database: blog
  user: postgres
  password: secret

collections:
  - collection: users
    table: users
    renames:
      - from: fullName
        to: full_name
      - from: legacyFlags
    redefines:
      - field: migrated
        value: true
    ignore_fields: [sessionTokens]

  - collection: posts
    table: posts
    foreign_keys:
      author: users
      reviewers: users
    json_fields:
      - field: likes
        substitute_id_to: users
      - field: comments
        foreign_keys:
          user: users
      - field: meta
    links:
      reviewers:
        table: post_reviewers
        own_column: post_id
        foreign_column: user_id
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.collections.len(), 2);
        assert_eq!(config.target.port, 5432);
        assert_eq!(config.target.schema, "public");

        let users = config.collection("users").unwrap();
        assert_eq!(users.renames.len(), 2);
        assert_eq!(users.renames[0].to.as_deref(), Some("full_name"));
        assert!(users.renames[1].to.is_none());
        assert!(users.ignore_fields.contains("sessionTokens"));

        let posts = config.collection_for_table("posts").unwrap();
        assert_eq!(posts.foreign_keys.get("author").unwrap(), "users");
        assert_eq!(
            posts.json_field("likes").unwrap().substitute_id_to.as_deref(),
            Some("users")
        );
        assert!(posts.json_field("meta").unwrap().substitute_id_to.is_none());
        assert_eq!(posts.links.get("reviewers").unwrap().table, "post_reviewers");
    }

    #[test]
    fn test_unknown_table_lookup() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert!(config.collection_for_table("missing").is_none());
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(Config::from_yaml("source: [").is_err());
    }
}
