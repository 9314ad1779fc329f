//! Core value and document types shared across the migration engine.

mod document;
mod value;

pub use document::{scalar_key, take_source_id, Document, LinkElement, SOURCE_ID_FIELD, TARGET_ID_COLUMN};
pub use value::{SqlRow, SqlValue};
