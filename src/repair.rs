//! Tokenizer-based repair of structurally broken JSON exports.
//!
//! The upstream exporter drops separators at structural boundaries (a `}`
//! followed on the next line by `{`, sibling strings split across lines, and
//! so on). Instead of chained regex rewrites, a string-aware scanner walks
//! the text and classifies every whitespace gap between two significant
//! tokens; each rewrite is one of a small set of [`Boundary`] variants, so
//! the decision points are enumerable and testable.
//!
//! This is a heuristic tuned to one known exporter, not a general JSON
//! fixer: it can produce wrong-but-valid JSON, which is why callers always
//! verify the result with a real parse afterwards.

use tracing::{debug, instrument};

/// Which rewrite rules are active. `Broad` is the first attempt; `Narrow`
/// is the retry pass, limited to numeric-token-then-bracket normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPass {
    Broad,
    Narrow,
}

/// A structural boundary where a gap gets rewritten. The first three insert
/// a missing comma; the rest only normalize the whitespace to a single
/// newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// `}` gap `{` — two sibling objects.
    ObjectThenObject,
    /// `]` gap `[` — two sibling arrays.
    ArrayThenArray,
    /// closing `"` gap opening `"` — two sibling string properties.
    StringThenString,
    /// bare word/number token, gap, `]` or `}`.
    ScalarThenClose,
    /// `[` gap `{`.
    OpenThenObject,
    /// `}` gap `]`.
    ObjectThenArrayClose,
}

impl Boundary {
    pub fn inserts_comma(&self) -> bool {
        matches!(
            self,
            Boundary::ObjectThenObject | Boundary::ArrayThenArray | Boundary::StringThenString
        )
    }
}

/// One gap rewrite: the byte offset (in the trimmed input) of the token that
/// follows the gap, and the boundary that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairEdit {
    pub offset: usize,
    pub boundary: Boundary,
}

/// Repaired text plus the full list of rewrites that produced it.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub text: String,
    pub edits: Vec<RepairEdit>,
}

impl RepairOutcome {
    pub fn commas_inserted(&self) -> usize {
        self.edits.iter().filter(|e| e.boundary.inserts_comma()).count()
    }
}

/// The last significant token seen by the scanner, outside string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    None,
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    StringEnd,
    /// Bare token; `word`/`digit` describe its final character, which is
    /// what decides the scalar-then-close rules.
    Scalar { word: bool, digit: bool },
    /// `,` or `:`.
    Separator,
}

fn classify(prev: Prev, next: char, pass: RepairPass) -> Option<Boundary> {
    match pass {
        RepairPass::Broad => match (prev, next) {
            (Prev::ObjectClose, '{') => Some(Boundary::ObjectThenObject),
            (Prev::ArrayClose, '[') => Some(Boundary::ArrayThenArray),
            (Prev::StringEnd, '"') => Some(Boundary::StringThenString),
            (Prev::Scalar { word: true, .. }, ']' | '}') => Some(Boundary::ScalarThenClose),
            (Prev::ArrayOpen, '{') => Some(Boundary::OpenThenObject),
            (Prev::ObjectClose, ']') => Some(Boundary::ObjectThenArrayClose),
            _ => None,
        },
        RepairPass::Narrow => match (prev, next) {
            (Prev::Scalar { digit: true, .. }, ']' | '}') => Some(Boundary::ScalarThenClose),
            _ => None,
        },
    }
}

/// Run one repair pass over the text. Leading BOM and surrounding whitespace
/// are trimmed first. Gaps inside string literals are never touched, and a
/// gap is only eligible for rewriting when it spans a newline.
#[instrument(target = "quizbank::repair", skip(input), fields(input_len = input.len(), pass = ?pass))]
pub fn repair(input: &str, pass: RepairPass) -> RepairOutcome {
    let trimmed = input.trim_start_matches('\u{feff}').trim();
    let mut out = String::with_capacity(trimmed.len() + 16);
    let mut edits: Vec<RepairEdit> = Vec::new();

    let mut in_string = false;
    let mut escape = false;
    let mut prev = Prev::None;
    let mut gap = String::new();

    for (i, ch) in trimmed.char_indices() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
                '"' => {
                    in_string = false;
                    prev = Prev::StringEnd;
                }
                _ => {}
            }
            continue;
        }

        if ch.is_whitespace() {
            gap.push(ch);
            continue;
        }

        if !gap.is_empty() {
            let eligible = gap.contains('\n');
            match (eligible, classify(prev, ch, pass)) {
                (true, Some(boundary)) => {
                    edits.push(RepairEdit { offset: i, boundary });
                    if boundary.inserts_comma() {
                        out.push_str(",\n");
                    } else {
                        out.push('\n');
                    }
                }
                _ => out.push_str(&gap),
            }
            gap.clear();
        }

        out.push(ch);
        prev = match ch {
            '"' => {
                in_string = true;
                escape = false;
                // placeholder until the literal closes
                Prev::None
            }
            '{' => Prev::ObjectOpen,
            '}' => Prev::ObjectClose,
            '[' => Prev::ArrayOpen,
            ']' => Prev::ArrayClose,
            ',' | ':' => Prev::Separator,
            c => Prev::Scalar {
                word: c.is_ascii_alphanumeric() || c == '_',
                digit: c.is_ascii_digit(),
            },
        };
    }
    // the input was trimmed, so no trailing gap remains

    debug!(
        target = "quizbank::repair",
        edits = edits.len(),
        commas = edits.iter().filter(|e| e.boundary.inserts_comma()).count(),
        "repair pass complete"
    );
    RepairOutcome { text: out, edits }
}

/// Byte spans (start, inclusive end) of every root-level JSON object or
/// array in the text, found with a string-aware bracket stack. Used as the
/// last resort when a repaired export turns out to be a bare sequence of
/// objects with no enclosing array.
pub fn root_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut stack: Vec<(usize, u8)> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => stack.push((i, b)),
            b'}' | b']' => {
                let expected = if b == b'}' { b'{' } else { b'[' };
                if let Some((start, open)) = stack.pop() {
                    if open == expected && stack.is_empty() {
                        spans.push((start, i));
                    }
                    // mismatched close: drop the frame, keep scanning
                }
            }
            _ => {}
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_one_comma_edit_per_sibling_object_pair() {
        let outcome = repair("{\"x\":1}\n{\"x\":2}\n{\"x\":3}", RepairPass::Broad);
        assert_eq!(outcome.edits.len(), 2);
        assert!(outcome
            .edits
            .iter()
            .all(|e| e.boundary == Boundary::ObjectThenObject));
        assert_eq!(outcome.commas_inserted(), 2);
    }

    #[test]
    fn same_line_gap_is_not_rewritten() {
        let outcome = repair("{\"x\":1} {\"x\":2}", RepairPass::Broad);
        assert!(outcome.edits.is_empty());
        assert_eq!(outcome.text, "{\"x\":1} {\"x\":2}");
    }

    #[test]
    fn normalization_edits_do_not_count_as_commas() {
        let outcome = repair("[\n  {\"x\": 1   \n}\n]", RepairPass::Broad);
        assert_eq!(outcome.commas_inserted(), 0);
        assert!(outcome
            .edits
            .iter()
            .any(|e| e.boundary == Boundary::OpenThenObject));
    }

    #[test]
    fn narrow_pass_ignores_non_numeric_tokens() {
        let unchanged = repair("[true  \n ]", RepairPass::Narrow);
        assert!(unchanged.edits.is_empty());

        let fixed = repair("[12  \n ]", RepairPass::Narrow);
        assert_eq!(fixed.text, "[12\n]");
        assert_eq!(fixed.edits[0].boundary, Boundary::ScalarThenClose);
    }

    #[test]
    fn root_spans_skips_brackets_inside_strings() {
        let text = r#"{"a":"}{"} [1,2]"#;
        let spans = root_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].0, 0);
        assert_eq!(&text[spans[1].0..=spans[1].1], "[1,2]");
    }
}
