//! Repair → parse → report → replace pipeline for category exports.

use tracing::{debug, info, instrument, warn};

use crate::error::RepairError;
use crate::model::{Category, Database};
use crate::repair::{repair, root_spans, RepairPass};

/// How much of the repaired text is quoted back when it still fails to
/// parse.
pub const DIAGNOSTIC_PREFIX_LEN: usize = 1000;

fn diagnostic_prefix(text: &str) -> String {
    text.chars().take(DIAGNOSTIC_PREFIX_LEN).collect()
}

/// Per-category question counts plus the grand total, reported after a
/// successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// `(category id, question count)` in document order.
    pub counts: Vec<(String, usize)>,
    pub total: usize,
}

impl ImportReport {
    pub fn new(categories: &[Category]) -> Self {
        let counts: Vec<(String, usize)> = categories
            .iter()
            .map(|c| (c.id.clone(), c.questions.len()))
            .collect();
        let total = counts.iter().map(|(_, n)| n).sum();
        Self { counts, total }
    }
}

/// Repair a near-JSON category export and parse it into category records.
///
/// The broad repair pass runs first; if the result does not parse, the
/// narrow pass reworks it and we retry once. A repaired export is sometimes
/// a bare sequence of objects with no enclosing array, so the final attempt
/// collects each root-level structure individually. If that also fails, the
/// error carries the parse failure and a prefix of the repaired text for
/// diagnosis, and the caller must leave the target document untouched.
#[instrument(target = "quizbank::import", skip(raw), fields(raw_len = raw.len()))]
pub fn parse_categories(raw: &str) -> Result<Vec<Category>, RepairError> {
    let broad = repair(raw, RepairPass::Broad);
    debug!(
        target = "quizbank::import",
        commas = broad.commas_inserted(),
        "broad repair pass applied"
    );
    let first_err = match serde_json::from_str::<Vec<Category>>(&broad.text) {
        Ok(categories) => return Ok(categories),
        Err(err) => err,
    };
    warn!(
        target = "quizbank::import",
        error = %first_err,
        "first parse attempt failed, applying narrow pass"
    );

    let narrow = repair(&broad.text, RepairPass::Narrow);
    let second_err = match serde_json::from_str::<Vec<Category>>(&narrow.text) {
        Ok(categories) => return Ok(categories),
        Err(err) => err,
    };

    collect_bare_roots(&narrow.text)
        .map_err(|err| RepairError::Unparseable(err, diagnostic_prefix(&narrow.text)))
        .and_then(|categories| {
            if categories.is_empty() {
                Err(RepairError::Unparseable(
                    second_err,
                    diagnostic_prefix(&narrow.text),
                ))
            } else {
                Ok(categories)
            }
        })
}

/// Parse each root-level JSON structure on its own, accepting either a
/// single category or an array of them per root. Any root that is neither
/// fails the whole import.
fn collect_bare_roots(text: &str) -> Result<Vec<Category>, serde_json::Error> {
    let mut categories = Vec::new();
    for (start, end) in root_spans(text) {
        let slice = &text[start..=end];
        match serde_json::from_str::<Vec<Category>>(slice) {
            Ok(list) => categories.extend(list),
            Err(_) => categories.push(serde_json::from_str::<Category>(slice)?),
        }
    }
    debug!(
        target = "quizbank::import",
        roots = categories.len(),
        "collected bare root structures"
    );
    Ok(categories)
}

// Coarse validation (id present, questions a sequence) is enforced by the
// Category serde shape itself: a record without an id fails the parse, and
// an absent questions field deserializes as an empty list.

/// Replace the document's categories wholesale and bump its metadata.
///
/// Full-replace semantics: categories absent from the new data are gone
/// after this call.
pub fn apply_import(
    db: &mut Database,
    categories: Vec<Category>,
    version: &str,
    last_updated: &str,
) {
    info!(
        target = "quizbank::import",
        categories = categories.len(),
        version,
        last_updated,
        "replacing quiz categories"
    );
    db.quiz_categories = categories;
    db.version = version.to_string();
    db.last_updated = last_updated.to_string();
}
