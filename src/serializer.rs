/*!
 * Per-file content serialization
 */

use std::fs;
use std::io;
use std::path::Path;

use crate::types::Section;
use crate::utils::{language_tag, size_in_kb};

/// Decides between full content and the size placeholder for one file
pub struct ContentSerializer;

impl ContentSerializer {
    /// Serialize the file at `path`.
    ///
    /// Files up to and including `max_size_kb` are read as best-effort text:
    /// invalid UTF-8 is replaced rather than rejected. Larger files are not
    /// read at all. Any I/O failure is returned to the caller.
    pub fn serialize(path: &Path, max_size_kb: u64) -> io::Result<Section> {
        let size_kb = size_in_kb(fs::metadata(path)?.len());

        if size_kb > max_size_kb as f64 {
            return Ok(Section::TooLarge {
                size_kb,
                limit_kb: max_size_kb,
            });
        }

        let bytes = fs::read(path)?;
        Ok(Section::Content {
            language_tag: language_tag(path),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
