//! Line-oriented locator for the bug's signature fragment.
//!
//! The locator is diagnostic only: it tells the user where the problematic
//! construct sits, with 1-based line numbers and trimmed line text. The
//! patcher performs its own independent structural match.

/// A located occurrence of the problematic construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// 1-based line number
    pub line: usize,
    /// The matched line, trimmed
    pub text: String,
    /// Byte offset of the fragment within the document (inclusive)
    pub byte_start: usize,
    /// Byte offset of the fragment's end (exclusive)
    pub byte_end: usize,
}

/// Lazy iterator over fragment occurrences, in ascending line order.
///
/// Cloning restarts the scan from wherever the clone was taken, so a
/// freshly-created `Matches` can be re-walked any number of times.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    content: &'a str,
    fragment: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Iterator for Matches<'a> {
    type Item = PatternMatch;

    fn next(&mut self) -> Option<PatternMatch> {
        if self.fragment.is_empty() {
            return None;
        }

        while self.pos < self.content.len() {
            let rest = &self.content[self.pos..];
            let (line, advance) = match rest.find('\n') {
                Some(idx) => (&rest[..idx], idx + 1),
                None => (rest, rest.len()),
            };
            let line_start = self.pos;
            self.pos += advance;
            self.line += 1;

            if let Some(col) = line.find(self.fragment) {
                return Some(PatternMatch {
                    line: self.line,
                    text: line.trim().to_string(),
                    byte_start: line_start + col,
                    byte_end: line_start + col + self.fragment.len(),
                });
            }
        }

        None
    }
}

/// Scan `content` line by line for every line containing `fragment`.
///
/// Exact substring containment only: no false negatives, but a fragment
/// sitting inside a comment or string literal still matches. Returns an
/// empty sequence when nothing matches; absence of matches is not an error.
pub fn locate<'a>(content: &'a str, fragment: &'a str) -> Matches<'a> {
    Matches {
        content,
        fragment,
        pos: 0,
        line: 0,
    }
}

/// The line closest to the fragment when no exact match exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NearMiss {
    /// 1-based line number
    pub line: usize,
    /// The candidate line, trimmed
    pub text: String,
    /// Normalized Levenshtein similarity in [0, 1]
    pub score: f64,
}

/// Similarity floor below which a near-miss is not worth reporting.
const NEAR_MISS_THRESHOLD: f64 = 0.5;

/// Find the line most similar to `fragment`, for "pattern not found"
/// diagnostics. Returns `None` when nothing clears the similarity floor.
pub fn nearest_line(content: &str, fragment: &str) -> Option<NearMiss> {
    let mut best: Option<NearMiss> = None;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let score = strsim::normalized_levenshtein(trimmed, fragment);
        if score >= NEAR_MISS_THRESHOLD && best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(NearMiss {
                line: idx + 1,
                text: trimmed.to_string(),
                score,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_reports_line_numbers_and_trimmed_text() {
        let content = "first\n    iconPath: this.getAgentIcon(config.name),\nlast\n";
        let matches: Vec<_> = locate(content, "iconPath: this.getAgentIcon(").collect();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 2);
        assert_eq!(matches[0].text, "iconPath: this.getAgentIcon(config.name),");
    }

    #[test]
    fn locate_byte_span_covers_fragment() {
        let content = "ab\nxNEEDLEy\n";
        let m = locate(content, "NEEDLE").next().unwrap();
        assert_eq!(&content[m.byte_start..m.byte_end], "NEEDLE");
    }

    #[test]
    fn locate_emits_all_occurrences_in_order() {
        let content = "hit\nmiss\nhit\nhit\n";
        let lines: Vec<_> = locate(content, "hit").map(|m| m.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
    }

    #[test]
    fn locate_empty_when_absent() {
        assert_eq!(locate("nothing here", "needle").count(), 0);
    }

    #[test]
    fn locate_is_restartable_via_clone() {
        let content = "hit\nmiss\nhit\n";
        let matches = locate(content, "hit");
        let first_pass: Vec<_> = matches.clone().collect();
        let second_pass: Vec<_> = matches.collect();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn locate_handles_missing_trailing_newline() {
        let content = "miss\nhit";
        let matches: Vec<_> = locate(content, "hit").collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 2);
    }

    #[test]
    fn locate_empty_fragment_matches_nothing() {
        assert_eq!(locate("a\nb\n", "").count(), 0);
    }

    #[test]
    fn nearest_line_finds_drifted_target() {
        let content = "unrelated\n    iconPath: this.getAgentIcons(config.name),\n";
        let near = nearest_line(content, "iconPath: this.getAgentIcon(config.name),").unwrap();
        assert_eq!(near.line, 2);
        assert!(near.score > 0.9);
    }

    #[test]
    fn nearest_line_none_for_unrelated_content() {
        let content = "zzzz\nqqqq\n";
        assert!(nearest_line(content, "iconPath: this.getAgentIcon(").is_none());
    }
}
