//! Serde types for the quiz content database document.
//!
//! The on-disk document carries more fields than the ones these procedures
//! touch; everything unknown is kept in a flattened map so a load→save round
//! trip never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A quiz question. Opaque to this crate: copied wholesale, never validated.
pub type Question = Value;

/// A quiz topic entry holding an ordered list of questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Absent in some exports; absent counts as zero questions.
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lightweight reference entry used to select which category to update
/// during question replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole target document. Loaded fully, mutated in memory, rewritten
/// fully in one write at the end of a procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Database {
    #[serde(rename = "quizCategories", default)]
    pub quiz_categories: Vec<Category>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
