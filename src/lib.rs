//! Agentfix: one-shot transactional source patcher
//!
//! Fixes the Q CLI agent-manager selection bug, where clicking an active
//! agent (green icon) toggles its active state. The buggy method recomputes
//! the tree-item icon from live terminal state on every call; the fix threads
//! an `isRunning` parameter through the method and its call site so the icon
//! is decided once per list refresh.
//!
//! # Architecture
//!
//! Three components, composed as a linear pipeline per run:
//!
//! - [`locate`] scans the document line by line for the bug's signature
//!   fragment and reports matches with 1-based line numbers. Informational
//!   only; it never gates the patch.
//! - [`apply_patch`] is a pure function from `(content, spec)` to a
//!   [`PatchOutcome`]. The primary rule matches a routine anchored at its
//!   declaration, bounded by balanced braces, and gated on a marker
//!   sub-expression inside the body. Auxiliary find/replace rules (the
//!   call-site rewrite) run afterwards, best-effort.
//! - [`run_transaction`] wraps the file mutation in a backup/apply/commit
//!   sequence: snapshot to `<path>.backup`, patch in memory, then commit via
//!   an atomic tempfile + rename write. A failed commit restores the backup.
//!
//! # Safety
//!
//! - The backup is written and hash-verified before any mutation
//! - Commits are atomic (tempfile + fsync + rename); the target is either
//!   unchanged or fully patched
//! - Re-running against an already-patched file is a no-op abort

pub mod document;
pub mod locate;
pub mod patch;
pub mod report;
pub mod spec;
pub mod transaction;

// Re-exports
pub use document::SourceDocument;
pub use locate::{locate, nearest_line, Matches, NearMiss, PatternMatch};
pub use patch::{apply_patch, primary_regions, PatchOutcome};
pub use report::{ConsoleReporter, NullReporter, Reporter};
pub use spec::{load_from_path, load_from_str, PatchSpec, SpecError, StructuralRule, TextRule};
pub use transaction::{
    backup_path, run_transaction, run_transaction_with, FsPersist, Persist, TransactionError,
    TransactionReport, TransactionState,
};
