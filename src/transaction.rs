//! The patch transaction: backup, apply, commit or roll back.
//!
//! State machine per run:
//!
//! ```text
//! Start -> BackedUp -> Applying -> Committed
//!                               -> Aborted     (no match; file untouched)
//!                               -> RolledBack  (commit failed; backup restored)
//! ```
//!
//! The backup at `<path>.backup` is written and hash-verified before any
//! mutation and kept afterwards as an audit copy. The commit itself goes
//! through a tempfile + fsync + rename in the target's directory, so the
//! original file is never observable in a partially-written state; the
//! backup is the rollback source only when that rename fails.

use crate::document::SourceDocument;
use crate::locate::{locate, nearest_line};
use crate::patch::{apply_patch, PatchOutcome};
use crate::report::Reporter;
use crate::spec::PatchSpec;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Terminal state of a completed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// The patched content was persisted.
    Committed,
    /// The pattern was not found; nothing was written to the target.
    Aborted,
    /// The commit write failed; the backup was restored to the target.
    RolledBack,
}

/// Outcome of a transaction that reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TransactionReport should be checked for applied/state"]
pub struct TransactionReport {
    /// True only in the Committed state
    pub applied: bool,
    /// Where the pre-mutation snapshot lives (never deleted)
    pub backup_path: PathBuf,
    pub state: TransactionState,
    /// Structural regions the primary rule replaced (0 when not applied)
    pub primary_matches: usize,
    /// Auxiliary rewrites that found their target
    pub auxiliary_applied: usize,
}

#[derive(Error, Debug)]
pub enum TransactionError {
    /// Target missing or unreadable; the transaction never began.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    /// The snapshot could not be written; aborted before touching the target.
    #[error("failed to write backup {path}: {source}")]
    Backup {
        path: PathBuf,
        source: io::Error,
    },

    /// The snapshot read back with a different hash than the original.
    #[error("backup verification failed for {path}: snapshot does not match original")]
    BackupMismatch { path: PathBuf },

    /// Commit and restore both failed. The target file's state is
    /// indeterminate; the backup at `backup_path` still holds the original.
    #[error(
        "commit failed for {path} ({commit}) and restoring the backup also failed ({restore}); \
         the file is in an indeterminate state, recover manually from {backup_path}"
    )]
    RestoreFailed {
        path: PathBuf,
        backup_path: PathBuf,
        commit: io::Error,
        restore: io::Error,
    },
}

/// Persistence seam for the transaction. The default [`FsPersist`] hits the
/// real file system; tests substitute a failing commit to drive the
/// RolledBack path.
pub trait Persist {
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Plain full write of the snapshot file.
    fn write_snapshot(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Atomic full write of the patched target.
    fn commit(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Write the original content back over the target after a failed commit.
    fn restore(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// File-system persistence: atomic commits via tempfile + fsync + rename.
#[derive(Debug, Default)]
pub struct FsPersist;

impl Persist for FsPersist {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_snapshot(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(path, content)
    }

    fn commit(&self, path: &Path, content: &str) -> io::Result<()> {
        atomic_write(path, content.as_bytes())?;

        // Refresh mtime so incremental builds of the target notice the change
        filetime::set_file_mtime(path, filetime::FileTime::now())?;

        Ok(())
    }

    fn restore(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(path, content)
    }
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    // A bare filename has an empty parent; tempfiles go in the cwd then.
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Sibling snapshot location: `<path>.backup`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".backup");
    PathBuf::from(os)
}

/// Run the full patch transaction against `path` using the real file system.
pub fn run_transaction(
    path: &Path,
    spec: &PatchSpec,
    reporter: &mut dyn Reporter,
) -> Result<TransactionReport, TransactionError> {
    run_transaction_with(&FsPersist, path, spec, reporter)
}

/// Run the transaction through an explicit persistence seam.
pub fn run_transaction_with(
    persist: &dyn Persist,
    path: &Path,
    spec: &PatchSpec,
    reporter: &mut dyn Reporter,
) -> Result<TransactionReport, TransactionError> {
    // Start: read the document. Failure here is fatal; no backup exists yet.
    let content = persist.read(path).map_err(|source| TransactionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = SourceDocument::new(path, content);

    // Locator pass, for reporting only. It never gates the patcher.
    let found: Vec<_> = locate(&document.content, &spec.fragment).collect();
    if found.is_empty() {
        reporter.no_matches(nearest_line(&document.content, &spec.fragment).as_ref());
    } else {
        reporter.matches(&found);
    }

    // BackedUp: full snapshot before any mutation, verified by hash.
    let backup = backup_path(path);
    persist
        .write_snapshot(&backup, &document.content)
        .map_err(|source| TransactionError::Backup {
            path: backup.clone(),
            source,
        })?;
    let readback = persist
        .read(&backup)
        .map_err(|source| TransactionError::Backup {
            path: backup.clone(),
            source,
        })?;
    if xxh3_64(readback.as_bytes()) != xxh3_64(document.content.as_bytes()) {
        return Err(TransactionError::BackupMismatch { path: backup });
    }
    reporter.backup_created(&backup);

    // Applying: pure patch computation over the in-memory content.
    match apply_patch(&document.content, spec) {
        PatchOutcome::NoMatch => {
            // Aborted: the backup remains on disk as a no-op artifact.
            reporter.aborted(path);
            Ok(TransactionReport {
                applied: false,
                backup_path: backup,
                state: TransactionState::Aborted,
                primary_matches: 0,
                auxiliary_applied: 0,
            })
        }
        PatchOutcome::Changed {
            content: new_content,
            primary_matches,
            auxiliary_applied,
        } => match persist.commit(path, &new_content) {
            Ok(()) => {
                reporter.committed(path, primary_matches, auxiliary_applied);
                Ok(TransactionReport {
                    applied: true,
                    backup_path: backup,
                    state: TransactionState::Committed,
                    primary_matches,
                    auxiliary_applied,
                })
            }
            Err(commit) => match persist.restore(path, &document.content) {
                Ok(()) => {
                    reporter.rolled_back(path, &commit);
                    Ok(TransactionReport {
                        applied: false,
                        backup_path: backup,
                        state: TransactionState::RolledBack,
                        primary_matches,
                        auxiliary_applied,
                    })
                }
                Err(restore) => Err(TransactionError::RestoreFailed {
                    path: path.to_path_buf(),
                    backup_path: backup,
                    commit,
                    restore,
                }),
            },
        },
    }
}
