//! Pure patch application over document text.
//!
//! The primary rule targets a structural region: a routine anchored at its
//! declaration text, bounded by its balanced closing brace, and containing a
//! marker sub-expression. Matching is textual, never syntax-aware; a marker
//! inside a comment or string literal still counts. The region is bounded by
//! delimiter balancing from the anchor, not by an unbounded greedy span, so a
//! match can never swallow a sibling routine.

use crate::spec::PatchSpec;
use crate::spec::StructuralRule;

/// Result of applying a [`PatchSpec`] to document text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome should be checked for Changed/NoMatch"]
pub enum PatchOutcome {
    /// The primary rule matched; `content` is the fully reconstructed text.
    Changed {
        content: String,
        /// Number of structural regions replaced (normally 1)
        primary_matches: usize,
        /// Number of auxiliary rules that found their target
        auxiliary_applied: usize,
    },
    /// The primary rule matched nothing; the document is unchanged.
    NoMatch,
}

impl PatchOutcome {
    /// True when the primary rule matched.
    pub fn is_changed(&self) -> bool {
        matches!(self, PatchOutcome::Changed { .. })
    }
}

/// Apply a patch spec to document text.
///
/// Pure and deterministic: same input always yields same output, no I/O.
/// If the primary rule matches more than one region, all are replaced
/// uniformly. Auxiliary rules are attempted afterwards on the rebuilt text;
/// a missing auxiliary target is not a failure.
pub fn apply_patch(content: &str, spec: &PatchSpec) -> PatchOutcome {
    let regions = primary_regions(content, &spec.primary);
    if regions.is_empty() {
        return PatchOutcome::NoMatch;
    }

    // Regions are ascending and non-overlapping; splice front to back.
    let mut out = String::with_capacity(content.len() + spec.primary.replacement.len());
    let mut cursor = 0;
    for &(start, end) in &regions {
        out.push_str(&content[cursor..start]);
        out.push_str(&spec.primary.replacement);
        cursor = end;
    }
    out.push_str(&content[cursor..]);

    let mut auxiliary_applied = 0;
    for rule in &spec.auxiliary {
        if out.contains(&rule.find) {
            out = out.replace(&rule.find, &rule.replace);
            auxiliary_applied += 1;
        }
    }

    PatchOutcome::Changed {
        content: out,
        primary_matches: regions.len(),
        auxiliary_applied,
    }
}

/// Byte spans of every region the primary rule matches, ascending.
///
/// A region runs from the anchor's first byte through the brace balancing
/// the first `{` at or after the anchor, and only counts when the marker
/// occurs inside it. Anchors with no balanced brace are skipped.
pub fn primary_regions(content: &str, rule: &StructuralRule) -> Vec<(usize, usize)> {
    let mut regions = Vec::new();
    if rule.anchor.is_empty() {
        return regions;
    }

    let mut from = 0;
    while let Some(rel) = content[from..].find(&rule.anchor) {
        let start = from + rel;
        match balanced_end(content, start) {
            Some(end) => {
                if content[start..end].contains(&rule.marker) {
                    regions.push((start, end));
                }
                from = end;
            }
            None => from = start + rule.anchor.len(),
        }
    }

    regions
}

/// Exclusive end offset of the brace-balanced region opened by the first `{`
/// at or after `start`. `None` when there is no opening brace or the braces
/// never balance.
fn balanced_end(content: &str, start: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let open = bytes[start..].iter().position(|&b| b == b'{')? + start;

    let mut depth = 0usize;
    for (idx, &byte) in bytes.iter().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }

    None
}
