/*!
 * Directory walking for the tree pass and the content pass
 *
 * Both passes visit children in lexicographic order, prune excluded
 * entries without descending into them, never descend into hard-pruned
 * dependency directories, and turn unlistable subdirectories into
 * non-fatal results.
 */

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, FilterEntry, WalkDir};

use crate::patterns::PatternMatcher;
use crate::types::{ContentFile, EntryKind, TreeEntry};

type EntryFilter<'a> = Box<dyn FnMut(&DirEntry) -> bool + 'a>;

/// Files found by the content pass
#[derive(Debug, Clone, Default)]
pub struct CollectedFiles {
    /// Candidate files in emission order
    pub files: Vec<ContentFile>,
    /// Subdirectories that could not be listed
    pub unreadable_dirs: Vec<PathBuf>,
}

/// Scanner for one project root
pub struct Scanner<'a> {
    /// Root of the scan
    root: PathBuf,
    /// Pattern matcher for this run
    matcher: &'a PatternMatcher,
    /// Path never visited, usually the output artifact
    skip_path: Option<PathBuf>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner
    pub fn new(root: impl Into<PathBuf>, matcher: &'a PatternMatcher) -> Self {
        Self {
            root: root.into(),
            matcher,
            skip_path: None,
        }
    }

    /// Never visit `path`, e.g. the artifact being written inside the root
    pub fn with_skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip_path = Some(path.into());
        self
    }

    /// Depth-bounded pre-order walk for the folder structure.
    ///
    /// Every child that passes `should_include` is emitted, directories
    /// included. A directory at depth `d` is only descended into when
    /// `d + 1 <= max_depth`.
    pub fn walk_tree(&self, max_depth: usize) -> TreeWalk<'_> {
        let matcher = self.matcher;
        let root = self.root.as_path();
        let skip = self.skip_path.as_deref();

        let filter: EntryFilter<'_> = Box::new(move |entry: &DirEntry| {
            if entry.depth() == 0 {
                return true;
            }
            if is_skip_path(entry.path(), skip) {
                return false;
            }
            matcher.should_include(relative_path(root, entry.path()))
        });

        TreeWalk {
            root,
            inner: WalkDir::new(root)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(filter),
        }
    }

    /// Unbounded walk returning the files whose content is serialized.
    ///
    /// Directories are pruned by exclude rules and hard-pruned names only;
    /// include patterns apply to files.
    pub fn collect_files(&self) -> CollectedFiles {
        let matcher = self.matcher;
        let root = self.root.as_path();
        let skip = self.skip_path.as_deref();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if is_skip_path(entry.path(), skip) {
                    return false;
                }
                let rel = relative_path(root, entry.path());
                if entry.file_type().is_dir() {
                    !PatternMatcher::is_hard_pruned(&file_name(entry))
                        && !matcher.is_excluded(rel)
                } else {
                    matcher.should_include(rel)
                }
            });

        let mut collected = CollectedFiles::default();
        for result in walker {
            match result {
                Ok(entry) => {
                    if entry.depth() == 0 || !is_regular_file(&entry) {
                        continue;
                    }
                    collected.files.push(ContentFile {
                        path: entry.path().to_path_buf(),
                        relative_path: relative_path(root, entry.path()).to_path_buf(),
                    });
                }
                Err(err) => {
                    if let Some(dir) = err.path() {
                        warn!(dir = %dir.display(), error = %err, "Skipping unreadable directory");
                        collected
                            .unreadable_dirs
                            .push(relative_path(root, dir).to_path_buf());
                    }
                }
            }
        }

        debug!(
            files = collected.files.len(),
            unreadable = collected.unreadable_dirs.len(),
            "Content pass finished"
        );
        collected
    }
}

/// Lazy iterator over the tree pass
pub struct TreeWalk<'a> {
    root: &'a Path,
    inner: FilterEntry<walkdir::IntoIter, EntryFilter<'a>>,
}

impl Iterator for TreeWalk<'_> {
    type Item = TreeEntry;

    fn next(&mut self) -> Option<TreeEntry> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if entry.depth() == 0 {
                        continue;
                    }
                    let kind = if entry.file_type().is_dir() {
                        EntryKind::Directory
                    } else {
                        EntryKind::File
                    };
                    if kind == EntryKind::Directory
                        && PatternMatcher::is_hard_pruned(&file_name(&entry))
                    {
                        debug!(
                            dir = %entry.path().display(),
                            "Not descending into hard-pruned directory"
                        );
                        self.inner.skip_current_dir();
                    }
                    return Some(TreeEntry::Entry {
                        path: relative_path(self.root, entry.path()).to_path_buf(),
                        depth: entry.depth(),
                        kind,
                    });
                }
                Err(err) => {
                    let Some(dir) = err.path() else {
                        warn!(error = %err, "Walk error without a path");
                        continue;
                    };
                    warn!(dir = %dir.display(), error = %err, "Cannot list directory");
                    let dir = relative_path(self.root, dir).to_path_buf();
                    let depth = dir.components().count() + 1;
                    return Some(TreeEntry::PermissionDenied { dir, depth });
                }
            }
        }
    }
}

fn relative_path<'p>(root: &Path, path: &'p Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}

fn file_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().to_string()
}

fn is_skip_path(path: &Path, skip: Option<&Path>) -> bool {
    skip.is_some_and(|skip| path == skip)
}

/// Regular files and symlinks that resolve to one
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}
