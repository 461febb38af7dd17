//! Corrections reported by the external linter.
//!
//! A [`Correction`] is immutable once produced. The overlay shares each one
//! behind an [`Arc`] and matches hover state to popup content by pointer
//! identity, never by structural equality: two corrections with identical
//! fields reported for different occurrences are still different corrections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The rule a correction was produced by.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rule {
    /// Human-readable explanation. Multi-line descriptions render one popup
    /// row per line.
    pub description: String,
}

/// One candidate replacement value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub value: String,
}

impl Replacement {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A suggested fix for a span of text.
///
/// `offset` and `length` count characters (Unicode scalar values), not bytes.
///
/// # Example
///
/// ```
/// use korrect::Correction;
///
/// let c = Correction::new(2, 3, "Subject-verb agreement").with_replacement("have");
/// assert_eq!(c.end(), 5);
/// assert_eq!(c.replacements[0].value, "have");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub rule: Rule,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

impl Correction {
    /// Create a correction with a rule description and no replacements.
    pub fn new(offset: usize, length: usize, description: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            rule: Rule {
                description: description.into(),
            },
            replacements: Vec::new(),
        }
    }

    /// Append a replacement candidate.
    pub fn with_replacement(mut self, value: impl Into<String>) -> Self {
        self.replacements.push(Replacement::new(value));
        self
    }

    /// Character offset one past the end of the span.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Description lines, one per popup row.
    pub fn description_lines(&self) -> impl Iterator<Item = &str> {
        self.rule.description.lines().filter(|line| !line.is_empty())
    }
}

/// Parse a JSON array of corrections as emitted by linter services.
pub fn corrections_from_json(json: &str) -> serde_json::Result<Vec<Correction>> {
    serde_json::from_str(json)
}

/// Merge corrections reported for the same span.
///
/// Corrections with equal `offset` and `length` collapse into the first one
/// reported: its description gains every other message on its own line and
/// its replacements become the ordered union without duplicates. Source order
/// of first occurrences is preserved.
pub fn merge_duplicates(corrections: Vec<Correction>) -> Vec<Correction> {
    let mut merged: Vec<Correction> = Vec::with_capacity(corrections.len());

    for correction in corrections {
        let existing = merged
            .iter_mut()
            .find(|c| c.offset == correction.offset && c.length == correction.length);

        match existing {
            Some(target) => {
                let description = correction.rule.description;
                let known = target
                    .description_lines()
                    .any(|line| line == description.as_str());
                if !description.is_empty() && !known {
                    if !target.rule.description.is_empty() {
                        target.rule.description.push('\n');
                    }
                    target.rule.description.push_str(&description);
                }
                for replacement in correction.replacements {
                    if !target.replacements.contains(&replacement) {
                        target.replacements.push(replacement);
                    }
                }
            }
            None => merged.push(correction),
        }
    }

    merged
}

/// Whether two shared corrections are the same correction.
#[inline]
pub(crate) fn same_correction(a: &Arc<Correction>, b: &Arc<Correction>) -> bool {
    Arc::ptr_eq(a, b)
}
