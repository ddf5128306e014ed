/*!
 * Integration tests driving codemerge through its public API
 */

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use codemerge::config::Args;
use codemerge::{
    Config, ExcludeMode, MergeError, ReportFormat, Reporter, RunCoordinator, RunReport,
    TraversalConfig,
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn config_from(argv: &[&str]) -> Config {
    let mut full = vec!["codemerge"];
    full.extend_from_slice(argv);
    Config::from_args(Args::parse_from(full))
}

#[test]
fn test_cli_arguments_drive_a_full_run() {
    let project = tempdir().unwrap();
    write(project.path(), "app/models.py", "class User: pass");
    write(project.path(), "app/views.py", "def index(): pass");
    write(project.path(), "app/static/site.css", "body {}");
    write(project.path(), "fixtures/seed.py", "DATA = []");

    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("knowledge.md");
    let root = project.path().to_str().unwrap();
    let out = output.to_str().unwrap();
    let config = config_from(&[root, "-p", "*.py", "-e", "fixtures", "-o", out, "-t", "2"]);
    config.validate().unwrap();

    let mut seen = Vec::new();
    let result = RunCoordinator::new(config.traversal.clone())
        .with_threads(config.num_threads)
        .run_to_file(&config.target_dir, config.output_file.as_deref().unwrap(), &mut |p: u8| {
            seen.push(p)
        })
        .unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("- File patterns included: *.py\n"));
    assert!(text.contains("## File: app/models.py\n\n```py\nclass User: pass\n```\n"));
    assert!(text.contains("## File: app/views.py\n\n```py\ndef index(): pass\n```\n"));
    assert!(!text.contains("site.css"));
    assert!(!text.contains("seed.py"));
    assert_eq!(result.files_emitted, 2);
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_replace_mode_drops_builtin_table() {
    let project = tempdir().unwrap();
    write(project.path(), "README.md", "# readme");
    write(project.path(), "lib.rs", "pub fn f() {}");

    let mut out = Vec::new();
    RunCoordinator::new(TraversalConfig::default())
        .run(project.path(), &mut out, &mut |_: u8| {})
        .unwrap();
    let appended = String::from_utf8(out).unwrap();
    assert!(!appended.contains("README.md"));

    let mut out = Vec::new();
    RunCoordinator::new(TraversalConfig {
        exclude_mode: ExcludeMode::Replace,
        ..TraversalConfig::default()
    })
    .run(project.path(), &mut out, &mut |_: u8| {})
    .unwrap();
    let replaced = String::from_utf8(out).unwrap();
    assert!(replaced.contains("## File: README.md\n\n```md\n# readme\n```\n"));
    assert!(replaced.contains("## File: lib.rs"));
}

#[test]
fn test_rejected_configuration() {
    let project = tempdir().unwrap();
    let config = TraversalConfig {
        max_depth: 0,
        ..TraversalConfig::default()
    };
    let mut out = Vec::new();
    let err = RunCoordinator::new(config)
        .run(project.path(), &mut out, &mut |_: u8| {})
        .unwrap_err();

    assert!(matches!(err, MergeError::Config(_)));
    assert!(out.is_empty());
}

#[test]
fn test_report_reflects_run_result() {
    let project = tempdir().unwrap();
    write(project.path(), "big.rs", &"x".repeat(4096));
    write(project.path(), "small.rs", "fn small() {}");

    let mut out = Vec::new();
    let result = RunCoordinator::new(TraversalConfig {
        max_file_size_kb: 2,
        ..TraversalConfig::default()
    })
    .run(project.path(), &mut out, &mut |_: u8| {})
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("File exceeds size limit (4.00KB > 2KB). Content not included."));

    let report = RunReport {
        output_file: "knowledge.md".to_string(),
        duration: Duration::from_millis(5),
        result,
    };
    let json = Reporter::new(ReportFormat::Json).generate_report(&report);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["files_emitted"], 1);
    assert_eq!(value["files_skipped_size"], 1);
    assert_eq!(value["total_candidates"], 2);
}
