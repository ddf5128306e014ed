/*!
 * Core types and data structures for codemerge
 */

use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// Kind of a visited filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One item of the depth-bounded tree pass, in pre-order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// An included file or directory
    Entry {
        /// Path relative to the scan root
        path: PathBuf,
        /// Root children have depth 1
        depth: usize,
        kind: EntryKind,
    },
    /// A directory whose children could not be listed; `depth` is the
    /// depth its children would have had
    PermissionDenied { dir: PathBuf, depth: usize },
}

impl TreeEntry {
    pub fn depth(&self) -> usize {
        match self {
            TreeEntry::Entry { depth, .. } | TreeEntry::PermissionDenied { depth, .. } => *depth,
        }
    }
}

/// A file selected by the content pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    /// Absolute (or root-joined) path used for reading
    pub path: PathBuf,
    /// Path relative to the scan root, used for labels
    pub relative_path: PathBuf,
}

/// One serialized unit of the content pass
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Full file text
    Content { language_tag: String, body: String },
    /// Placeholder for a file over the size ceiling
    TooLarge { size_kb: f64, limit_kb: u64 },
}

/// Why a file's content could not be serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadErrorKind {
    PermissionDenied,
    /// The file vanished between enumeration and read
    NotFound,
    Other(String),
}

impl From<&io::Error> for ReadErrorKind {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => ReadErrorKind::PermissionDenied,
            io::ErrorKind::NotFound => ReadErrorKind::NotFound,
            _ => ReadErrorKind::Other(err.to_string()),
        }
    }
}

/// A non-fatal per-file failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: ReadErrorKind,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    /// Rendered folder structure
    pub tree_lines: Vec<String>,
    /// Files written with full content
    pub files_emitted: usize,
    /// Files replaced by the size placeholder
    pub files_skipped_size: usize,
    /// Files that could not be read
    pub files_failed: Vec<FileFailure>,
    /// Subdirectories that could not be listed
    pub unreadable_dirs: Vec<PathBuf>,
    /// Files selected by the content pass
    pub total_candidates: usize,
}

impl RunResult {
    /// Number of warnings the caller should surface
    pub fn warning_count(&self) -> usize {
        self.files_failed.len() + self.unreadable_dirs.len()
    }
}
