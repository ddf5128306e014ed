/*!
 * Run orchestration
 *
 * One run validates its inputs, writes the header and the folder structure,
 * then streams every candidate file through the serializer. Fatal problems
 * surface as [`MergeError`]; per-file and per-directory problems end up in
 * the returned [`RunResult`].
 */

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::TraversalConfig;
use crate::error::{MergeError, Result};
use crate::patterns::PatternMatcher;
use crate::progress::{PercentTracker, ProgressSink};
use crate::scanner::Scanner;
use crate::serializer::ContentSerializer;
use crate::tree::TreeRenderer;
use crate::types::{ContentFile, FileFailure, RunResult, Section, TreeEntry};
use crate::writer::MarkdownWriter;

/// Label used in write errors when the caller supplies the sink
const SINK_TARGET: &str = "output sink";

/// Inputs checked before anything is written
struct Prepared {
    root: PathBuf,
    matcher: PatternMatcher,
}

/// Orchestrates a single run
#[derive(Debug, Clone)]
pub struct RunCoordinator {
    config: TraversalConfig,
    ignore_file: Option<PathBuf>,
    threads: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl RunCoordinator {
    pub fn new(config: TraversalConfig) -> Self {
        Self {
            config,
            ignore_file: None,
            threads: 1,
            cancel: None,
        }
    }

    /// Read extra exclude patterns from `path` instead of `<root>/.gitignore`
    pub fn with_ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = Some(path.into());
        self
    }

    /// Read up to `threads` files at once; output order is unaffected
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Stop between files once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run against `root`, writing the artifact to `out`
    pub fn run<W: Write>(
        &self,
        root: &Path,
        out: W,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunResult> {
        let prepared = self.prepare(root)?;
        self.execute(prepared, out, None, SINK_TARGET, progress)
    }

    /// Run against `root`, writing the artifact to the file at `output`.
    ///
    /// The file is only created once the root and configuration are known
    /// to be valid. A file left behind by a failed write is not removed.
    pub fn run_to_file(
        &self,
        root: &Path,
        output: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunResult> {
        let prepared = self.prepare(root)?;

        let target = output.display().to_string();
        let file = File::create(output).map_err(|source| MergeError::Write {
            target: target.clone(),
            source,
        })?;
        let skip = fs::canonicalize(output).ok();

        self.execute(prepared, BufWriter::new(file), skip, &target, progress)
    }

    fn prepare(&self, root: &Path) -> Result<Prepared> {
        self.config.validate()?;
        let root = validate_root(root)?;
        let matcher =
            PatternMatcher::from_config(&root, self.ignore_file.as_deref(), &self.config)?;
        Ok(Prepared { root, matcher })
    }

    fn execute<W: Write>(
        &self,
        prepared: Prepared,
        out: W,
        skip: Option<PathBuf>,
        target: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunResult> {
        let Prepared { root, matcher } = prepared;
        let write_failed = |source: io::Error| MergeError::Write {
            target: target.to_string(),
            source,
        };
        info!(
            root = %root.display(),
            max_depth = self.config.max_depth,
            max_file_size_kb = self.config.max_file_size_kb,
            "Starting run"
        );

        let mut scanner = Scanner::new(&root, &matcher);
        if let Some(skip) = skip {
            scanner = scanner.with_skip_path(skip);
        }

        let mut writer = MarkdownWriter::new(out);
        let mut result = RunResult::default();
        writer.write_header(&self.config).map_err(write_failed)?;

        let mut unreadable = BTreeSet::new();
        let entries = scanner.walk_tree(self.config.max_depth).inspect(|entry| {
            if let TreeEntry::PermissionDenied { dir, .. } = entry {
                unreadable.insert(dir.clone());
            }
        });
        result.tree_lines = TreeRenderer::render(entries);
        writer.write_tree(&result.tree_lines).map_err(write_failed)?;
        writer.write_contents_header().map_err(write_failed)?;
        writer.flush().map_err(write_failed)?;
        debug!(lines = result.tree_lines.len(), "Folder structure written");

        let collected = scanner.collect_files();
        unreadable.extend(collected.unreadable_dirs);
        result.unreadable_dirs = unreadable.into_iter().collect();
        result.total_candidates = collected.files.len();

        let mut tracker = PercentTracker::new(result.total_candidates);
        if result.total_candidates == 0 {
            tracker.update(0, progress);
        }

        let mut completed = 0;
        for batch in collected.files.chunks(self.threads) {
            for (file, section) in batch.iter().zip(self.serialize_batch(batch)) {
                if self.is_cancelled() {
                    writer.flush().map_err(write_failed)?;
                    info!("Run cancelled, keeping partial output");
                    return Err(MergeError::Cancelled);
                }
                match section {
                    Ok(section) => {
                        writer
                            .write_section(&file.relative_path, &section)
                            .map_err(write_failed)?;
                        writer.flush().map_err(write_failed)?;
                        match section {
                            Section::Content { .. } => result.files_emitted += 1,
                            Section::TooLarge { .. } => result.files_skipped_size += 1,
                        }
                    }
                    Err(err) => {
                        warn!(
                            file = %file.relative_path.display(),
                            error = %err,
                            "Could not read file"
                        );
                        result.files_failed.push(FileFailure {
                            path: file.relative_path.clone(),
                            kind: (&err).into(),
                        });
                    }
                }
                completed += 1;
                tracker.update(completed, progress);
            }
        }

        writer.flush().map_err(write_failed)?;
        info!(
            emitted = result.files_emitted,
            too_large = result.files_skipped_size,
            failed = result.files_failed.len(),
            unreadable_dirs = result.unreadable_dirs.len(),
            "Run finished"
        );
        Ok(result)
    }

    fn serialize_batch(&self, batch: &[ContentFile]) -> Vec<io::Result<Section>> {
        let limit = self.config.max_file_size_kb;
        if batch.len() > 1 {
            batch
                .par_iter()
                .map(|file| ContentSerializer::serialize(&file.path, limit))
                .collect()
        } else {
            batch
                .iter()
                .map(|file| ContentSerializer::serialize(&file.path, limit))
                .collect()
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Root must exist, be a directory and be listable
fn validate_root(root: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => {
            MergeError::Permission(format!("Cannot access {}: {}", root.display(), e))
        }
        _ => MergeError::Path(format!(
            "The specified project path '{}' does not exist",
            root.display()
        )),
    })?;
    crate::ensure!(
        metadata.is_dir(),
        Path,
        "The specified project path '{}' is not a directory",
        root.display()
    );
    fs::read_dir(root).map_err(|e| {
        MergeError::Permission(format!("Cannot read {}: {}", root.display(), e))
    })?;
    fs::canonicalize(root)
        .map_err(|e| MergeError::Path(format!("Cannot resolve {}: {}", root.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExcludeMode;
    use crate::types::ReadErrorKind;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn run(coordinator: &RunCoordinator, root: &Path) -> (String, RunResult, Vec<u8>) {
        let mut seen = Vec::new();
        let mut out = Vec::new();
        let result = coordinator
            .run(root, &mut out, &mut |p: u8| seen.push(p))
            .unwrap();
        (String::from_utf8(out).unwrap(), result, seen)
    }

    #[test]
    fn test_include_filter_emits_only_matching_blocks() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.py", "print(1)");
        write(dir.path(), "b.txt", "notes");

        let coordinator = RunCoordinator::new(TraversalConfig {
            include_patterns: vec!["*.py".to_string()],
            exclude_mode: ExcludeMode::Replace,
            ..TraversalConfig::default()
        });
        let (out, result, progress) = run(&coordinator, dir.path());

        assert_eq!(out.matches("## File: ").count(), 1);
        assert!(out.contains("## File: a.py\n\n```py\nprint(1)\n```\n"));
        assert!(!out.contains("b.txt"));
        assert_eq!(result.files_emitted, 1);
        assert_eq!(result.total_candidates, 1);
        assert_eq!(progress, vec![100]);
    }

    #[test]
    fn test_zero_candidates() {
        let dir = tempdir().unwrap();
        let coordinator = RunCoordinator::new(TraversalConfig::default());
        let (out, result, progress) = run(&coordinator, dir.path());

        assert!(out.ends_with("## Project Folder Structure\n\n\n\n## File Contents\n"));
        assert_eq!(result.total_candidates, 0);
        assert_eq!(result.files_emitted, 0);
        assert_eq!(progress, vec![100]);
    }

    #[test]
    fn test_size_placeholder_counts() {
        let dir = tempdir().unwrap();
        write(dir.path(), "big.rs", &"x".repeat(1024 + 11));
        write(dir.path(), "small.rs", &"x".repeat(1024));

        let coordinator = RunCoordinator::new(TraversalConfig {
            max_file_size_kb: 1,
            ..TraversalConfig::default()
        });
        let (out, result, _) = run(&coordinator, dir.path());

        assert!(out.contains(
            "## File: big.rs\n\nFile exceeds size limit (1.01KB > 1KB). Content not included.\n"
        ));
        assert!(out.contains("## File: small.rs\n\n```rs\n"));
        assert_eq!(result.files_emitted, 1);
        assert_eq!(result.files_skipped_size, 1);
    }

    #[test]
    fn test_threads_do_not_change_output() {
        let dir = tempdir().unwrap();
        for i in 0..17 {
            write(dir.path(), &format!("src/m{:02}.rs", i), &format!("// {}", i));
        }

        let sequential = RunCoordinator::new(TraversalConfig::default());
        let parallel = RunCoordinator::new(TraversalConfig::default()).with_threads(4);
        let (a, _, _) = run(&sequential, dir.path());
        let (b, _, progress) = run(&parallel, dir.path());

        assert_eq!(a, b);
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn test_invalid_root() {
        let dir = tempdir().unwrap();
        let coordinator = RunCoordinator::new(TraversalConfig::default());
        let mut out = Vec::new();

        let err = coordinator
            .run(&dir.path().join("missing"), &mut out, &mut |_: u8| {})
            .unwrap_err();
        assert_eq!(err.kind(), "path");

        write(dir.path(), "file.rs", "");
        let err = coordinator
            .run(&dir.path().join("file.rs"), &mut out, &mut |_: u8| {})
            .unwrap_err();
        assert_eq!(err.kind(), "path");
        assert!(out.is_empty());
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.md");
        let coordinator = RunCoordinator::new(TraversalConfig {
            exclude_patterns: vec!["  ".to_string()],
            ..TraversalConfig::default()
        });

        let err = coordinator
            .run_to_file(dir.path(), &output, &mut |_: u8| {})
            .unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(!output.exists());
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failing_sink_is_a_write_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), "main.rs", "fn main() {}");
        let coordinator = RunCoordinator::new(TraversalConfig::default());

        let err = coordinator
            .run(dir.path(), ClosedSink, &mut |_: u8| {})
            .unwrap_err();
        assert_eq!(err.kind(), "write");
        assert!(matches!(
            &err,
            MergeError::Write { target, source }
                if target == "output sink" && source.kind() == io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn test_vanished_candidate_is_recorded() {
        let dir = tempdir().unwrap();
        for name in ["a.rs", "b.rs", "c.rs"] {
            write(dir.path(), name, name);
        }
        let doomed = dir.path().join("b.rs");

        // Progress is reported after each written section, so b.rs is gone
        // by the time it is read
        let coordinator = RunCoordinator::new(TraversalConfig::default());
        let mut seen = Vec::new();
        let mut out = Vec::new();
        let result = coordinator
            .run(dir.path(), &mut out, &mut |p: u8| {
                if seen.is_empty() {
                    fs::remove_file(&doomed).unwrap();
                }
                seen.push(p);
            })
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("## File: ").count(), 2);
        assert!(out.contains("## File: a.rs"));
        assert!(out.contains("## File: c.rs"));
        assert!(!out.contains("## File: b.rs"));
        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.files_emitted, 2);
        assert_eq!(
            result.files_failed,
            vec![FileFailure {
                path: PathBuf::from("b.rs"),
                kind: ReadErrorKind::NotFound,
            }]
        );
        assert_eq!(seen, vec![33, 66, 100]);
    }

    #[test]
    fn test_unwritable_output() {
        let dir = tempdir().unwrap();
        let coordinator = RunCoordinator::new(TraversalConfig::default());
        let err = coordinator
            .run_to_file(dir.path(), &dir.path().join("no/such/dir/out.md"), &mut |_: u8| {})
            .unwrap_err();
        assert_eq!(err.kind(), "write");
    }

    #[test]
    fn test_output_inside_root_is_not_read() {
        let dir = tempdir().unwrap();
        write(dir.path(), "main.rs", "fn main() {}");
        let output = dir.path().join("context.out");

        let coordinator = RunCoordinator::new(TraversalConfig {
            exclude_mode: ExcludeMode::Replace,
            ..TraversalConfig::default()
        });
        let result = coordinator
            .run_to_file(dir.path(), &output, &mut |_: u8| {})
            .unwrap();

        let out = fs::read_to_string(&output).unwrap();
        assert_eq!(result.total_candidates, 1);
        assert!(!out.contains("context.out"));
    }

    #[test]
    fn test_cancel_keeps_partial_output() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.rs", "a");
        write(dir.path(), "b.rs", "b");

        let flag = Arc::new(AtomicBool::new(false));
        let coordinator =
            RunCoordinator::new(TraversalConfig::default()).with_cancel_flag(flag.clone());

        let mut out = Vec::new();
        let err = coordinator
            .run(dir.path(), &mut out, &mut |_: u8| flag.store(true, Ordering::Relaxed))
            .unwrap_err();

        assert!(matches!(err, MergeError::Cancelled));
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("## File: a.rs"));
        assert!(!out.contains("## File: b.rs"));
    }
}
