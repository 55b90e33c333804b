//! Load/save of the target document.
//!
//! The document is always handled as a whole value: one full read at the
//! start of a procedure, one full write at the end. Nothing is streamed or
//! patched in place, and there is no locking; concurrent writers get
//! last-writer-wins semantics.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::StoreError;
use crate::model::Database;

impl Database {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let db: Database = serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(
            target = "quizbank::store",
            path = %path.display(),
            categories = db.quiz_categories.len(),
            topics = db.topics.len(),
            "loaded database"
        );
        Ok(db)
    }

    /// Serialize with two-space indentation (non-ASCII written literally)
    /// and rewrite the whole file.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(self).map_err(StoreError::Serialize)?;
        fs::write(path, text).map_err(|source| StoreError::Write {
            path: path.display().to_string(),
            source,
        })?;
        info!(
            target = "quizbank::store",
            path = %path.display(),
            categories = self.quiz_categories.len(),
            "database written"
        );
        Ok(())
    }
}
