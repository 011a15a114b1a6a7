//! Reporting sinks for transaction diagnostics.
//!
//! The transaction entry point takes its sink as a parameter instead of
//! printing to a global console, so library callers and tests can run
//! silently while the CLI gets the full colored narration.

use crate::locate::{NearMiss, PatternMatch};
use colored::Colorize;
use std::io;
use std::path::Path;

/// Sink for human-readable transaction progress. Informational only; no
/// functional behavior depends on what a reporter does with the calls.
pub trait Reporter {
    /// Locator results, ascending line order. May be empty.
    fn matches(&mut self, matches: &[PatternMatch]);

    /// Locator found nothing; `nearest` is the closest-looking line, if any.
    fn no_matches(&mut self, nearest: Option<&NearMiss>);

    /// The pre-mutation snapshot was written and verified.
    fn backup_created(&mut self, path: &Path);

    /// The patched content was persisted.
    fn committed(&mut self, path: &Path, primary_matches: usize, auxiliary_applied: usize);

    /// The patcher found no match; the file was left untouched.
    fn aborted(&mut self, path: &Path);

    /// The commit write failed and the backup was restored.
    fn rolled_back(&mut self, path: &Path, error: &io::Error);
}

/// Colored console reporter used by the CLI.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn matches(&mut self, matches: &[PatternMatch]) {
        println!(
            "Found problematic code at {} location(s):",
            matches.len().to_string().bold()
        );
        for m in matches {
            println!("  line {}: {}", m.line.to_string().yellow(), m.text.dimmed());
        }
    }

    fn no_matches(&mut self, nearest: Option<&NearMiss>) {
        println!("{}", "No occurrences of the signature fragment found".yellow());
        if let Some(near) = nearest {
            println!(
                "  closest line {} ({:.0}% similar): {}",
                near.line.to_string().yellow(),
                near.score * 100.0,
                near.text.dimmed()
            );
        }
    }

    fn backup_created(&mut self, path: &Path) {
        println!("Backup created: {}", path.display().to_string().dimmed());
    }

    fn committed(&mut self, path: &Path, primary_matches: usize, auxiliary_applied: usize) {
        println!(
            "{} Patch applied to {}",
            "✓".green(),
            path.display().to_string().bold()
        );
        println!("  {} method body region(s) rewritten", primary_matches);
        println!("  {} call site rewrite(s) applied", auxiliary_applied);
    }

    fn aborted(&mut self, path: &Path) {
        println!(
            "{} Pattern not found in {} - nothing written",
            "⊙".yellow(),
            path.display()
        );
    }

    fn rolled_back(&mut self, path: &Path, error: &io::Error) {
        eprintln!(
            "{} Commit failed for {}: {}",
            "✗".red(),
            path.display(),
            error
        );
        eprintln!("  {}", "Backup restored - file is unchanged".yellow());
    }
}

/// Silent reporter for library use and tests.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn matches(&mut self, _matches: &[PatternMatch]) {}
    fn no_matches(&mut self, _nearest: Option<&NearMiss>) {}
    fn backup_created(&mut self, _path: &Path) {}
    fn committed(&mut self, _path: &Path, _primary_matches: usize, _auxiliary_applied: usize) {}
    fn aborted(&mut self, _path: &Path) {}
    fn rolled_back(&mut self, _path: &Path, _error: &io::Error) {}
}
