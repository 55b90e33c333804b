//! Question replacement: a declarative mapping table routes replacement
//! question lists from source files into the matching categories.
//!
//! Each mapping entry names a topic id, the source file backing it, and the
//! key to extract from that file (defaulting to the topic id). Sources are
//! plain JSON objects of `{ key: [question, ...] }`. The map is validated
//! against the target document before anything is overwritten, so missing
//! and unused entries surface as explicit warnings instead of silent no-ops.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::error::ReplaceError;
use crate::model::{Database, Question};

/// One row of the mapping table: topic id → source file → extraction key.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MappingEntry {
    pub topic: String,
    pub source: PathBuf,
    /// Key to look up in the source file; defaults to the topic id.
    #[serde(default)]
    pub key: Option<String>,
}

impl MappingEntry {
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.topic)
    }
}

/// Read the mapping table (a JSON array of [`MappingEntry`]) from disk.
pub fn load_mapping(path: &Path) -> Result<Vec<MappingEntry>, ReplaceError> {
    let text = fs::read_to_string(path).map_err(|source| ReplaceError::MappingRead {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ReplaceError::MappingParse {
        path: path.display().to_string(),
        source,
    })
}

/// Replacement question lists keyed by topic id, with every source file
/// already read and extracted.
#[derive(Debug, Default, Clone)]
pub struct ReplacementMap {
    by_topic: HashMap<String, Vec<Question>>,
}

impl ReplacementMap {
    /// Resolve every mapping entry against its source file. Source paths
    /// are taken relative to `base`, and each file is read once even when
    /// several entries share it. A key missing from its source, or a key
    /// whose value is not a list, is a hard error.
    #[instrument(target = "quizbank::replace", skip(entries), fields(entry_count = entries.len()))]
    pub fn load(entries: &[MappingEntry], base: &Path) -> Result<Self, ReplaceError> {
        let mut sources: HashMap<PathBuf, Map<String, Value>> = HashMap::new();
        let mut by_topic: HashMap<String, Vec<Question>> = HashMap::new();

        for entry in entries {
            let path = base.join(&entry.source);
            if !sources.contains_key(&path) {
                let object = read_source(&path)?;
                debug!(
                    target = "quizbank::replace",
                    path = %path.display(),
                    keys = object.len(),
                    "loaded question source"
                );
                sources.insert(path.clone(), object);
            }
            let object = &sources[&path];

            let value = object.get(entry.key()).ok_or_else(|| ReplaceError::MissingKey {
                key: entry.key().to_string(),
                path: path.display().to_string(),
            })?;
            let questions = value
                .as_array()
                .cloned()
                .ok_or_else(|| ReplaceError::KeyNotList {
                    key: entry.key().to_string(),
                    path: path.display().to_string(),
                })?;

            if by_topic.insert(entry.topic.clone(), questions).is_some() {
                warn!(
                    target = "quizbank::replace",
                    topic = %entry.topic,
                    "duplicate mapping entry for topic, later entry wins"
                );
            }
        }

        Ok(Self { by_topic })
    }

    pub fn get(&self, topic_id: &str) -> Option<&Vec<Question>> {
        self.by_topic.get(topic_id)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_topic.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_topic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_topic.is_empty()
    }
}

fn read_source(path: &Path) -> Result<Map<String, Value>, ReplaceError> {
    let text = fs::read_to_string(path).map_err(|source| ReplaceError::SourceRead {
        path: path.display().to_string(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ReplaceError::SourceParse {
        path: path.display().to_string(),
        source,
    })?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(ReplaceError::SourceShape {
            path: path.display().to_string(),
        }),
    }
}

/// A problem found when checking the map against the target document.
/// These are warnings: the replacement still runs, skipping what it cannot
/// resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingIssue {
    /// The map names a topic the document's `topics` list does not have.
    UnusedMapping { topic: String },
    /// A mapped topic exists but no category carries its id.
    MissingCategory { topic: String },
    /// More than one category carries the id; only the first is updated.
    DuplicateCategory { topic: String, matches: usize },
}

/// Validate the map against the document, logging each issue.
pub fn validate(db: &Database, map: &ReplacementMap) -> Vec<MappingIssue> {
    let mut issues = Vec::new();

    for topic in map.topics() {
        if !db.topics.iter().any(|t| t.id == topic) {
            warn!(target = "quizbank::replace", topic, "mapping entry matches no topic in the document");
            issues.push(MappingIssue::UnusedMapping {
                topic: topic.to_string(),
            });
            continue;
        }
        let matches = db.quiz_categories.iter().filter(|c| c.id == topic).count();
        match matches {
            0 => {
                warn!(target = "quizbank::replace", topic, "mapped topic has no matching category");
                issues.push(MappingIssue::MissingCategory {
                    topic: topic.to_string(),
                });
            }
            1 => {}
            n => {
                warn!(
                    target = "quizbank::replace",
                    topic,
                    matches = n,
                    "duplicate category ids, first match wins"
                );
                issues.push(MappingIssue::DuplicateCategory {
                    topic: topic.to_string(),
                    matches: n,
                });
            }
        }
    }

    issues
}

/// What a replacement pass did: which topics got new questions, and how
/// many topics the map did not cover.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub replaced: Vec<String>,
    pub untouched: usize,
}

/// Walk the document's topics in order and overwrite the questions of the
/// first category matching each mapped topic id. Topics outside the map are
/// left untouched. Idempotent: a second run with the same map is a no-op.
#[instrument(target = "quizbank::replace", skip(db, map), fields(topics = db.topics.len(), mapped = map.len()))]
pub fn apply_replacements(db: &mut Database, map: &ReplacementMap) -> ReplaceSummary {
    let mut summary = ReplaceSummary::default();

    for topic in &db.topics {
        let Some(questions) = map.get(&topic.id) else {
            summary.untouched += 1;
            continue;
        };
        // first-match-wins on duplicate category ids
        match db.quiz_categories.iter_mut().find(|c| c.id == topic.id) {
            Some(category) => {
                category.questions = questions.clone();
                summary.replaced.push(topic.id.clone());
            }
            None => {
                warn!(
                    target = "quizbank::replace",
                    topic = %topic.id,
                    "no category for mapped topic, skipping"
                );
            }
        }
    }

    info!(
        target = "quizbank::replace",
        replaced = summary.replaced.len(),
        untouched = summary.untouched,
        "replacement pass complete"
    );
    summary
}
