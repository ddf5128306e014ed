//! Indented text rendering of the tree pass.

use crate::types::TreeEntry;

/// Glyphs prepended once per level below the root's children
pub const INDENT: &str = "│   ";

/// Marker line for a directory whose children could not be listed
pub const PERMISSION_DENIED_MARKER: &str = "[Permission Denied]";

/// Renders tree entries as one line each.
///
/// Stateless; lines come out in the order the entries went in.
pub struct TreeRenderer;

impl TreeRenderer {
    pub fn render<I>(entries: I) -> Vec<String>
    where
        I: IntoIterator<Item = TreeEntry>,
    {
        entries.into_iter().map(|entry| Self::render_line(&entry)).collect()
    }

    pub fn render_line(entry: &TreeEntry) -> String {
        let prefix = INDENT.repeat(entry.depth().saturating_sub(1));
        match entry {
            TreeEntry::Entry { path, .. } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                format!("{prefix}{name}")
            }
            TreeEntry::PermissionDenied { .. } => format!("{prefix}{PERMISSION_DENIED_MARKER}"),
        }
    }
}
