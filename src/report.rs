/*!
 * Reporting functionality for codemerge
 *
 * Renders the outcome of a run either as console tables (using the tabled
 * library) or as a JSON document for scripting.
 */

use std::time::Duration;

use serde_json::json;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{ReadErrorKind, RunResult};

/// Summary of one finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Output file path
    pub output_file: String,
    /// Time taken by the run
    pub duration: Duration,
    /// Engine result
    pub result: RunResult,
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// Machine-readable JSON
    Json,
}

/// Report generator for run results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &RunReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
            ReportFormat::Json => self.generate_json_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &RunReport) {
        println!("\n{}", self.generate_report(report));
    }

    // Keep the tail of long paths, cutting at separators where possible
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let parts: Vec<&str> = path.split(&['/', '\\'][..]).collect();
        let mut segments = Vec::new();
        let mut current_len = 3; // "..."
        for part in parts.iter().rev() {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(*part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn describe_failure(kind: &ReadErrorKind) -> String {
        match kind {
            ReadErrorKind::PermissionDenied => "permission denied".to_string(),
            ReadErrorKind::NotFound => "vanished before it could be read".to_string(),
            ReadErrorKind::Other(message) => message.clone(),
        }
    }

    fn create_summary_table(&self, report: &RunReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let result = &report.result;
        let rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "🔎 Candidate Files".to_string(),
                value: self.format_number(result.total_candidates),
            },
            SummaryRow {
                key: "📄 Files Included".to_string(),
                value: self.format_number(result.files_emitted),
            },
            SummaryRow {
                key: "📦 Over Size Limit".to_string(),
                value: self.format_number(result.files_skipped_size),
            },
            SummaryRow {
                key: "⚠️ Warnings".to_string(),
                value: self.format_number(result.warning_count()),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn create_warnings_table(&self, result: &RunResult) -> String {
        #[derive(Tabled)]
        struct WarningRow {
            #[tabled(rename = "Path")]
            path: String,

            #[tabled(rename = "Problem")]
            problem: String,
        }

        let rows = result
            .unreadable_dirs
            .iter()
            .map(|dir| WarningRow {
                path: self.format_path(&dir.display().to_string(), 60),
                problem: "directory could not be listed".to_string(),
            })
            .chain(result.files_failed.iter().map(|failure| WarningRow {
                path: self.format_path(&failure.path.display().to_string(), 60),
                problem: Self::describe_failure(&failure.kind),
            }));

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &RunReport) -> String {
        let summary = format!(
            "✅  MARKDOWN FILE CREATED\n{}",
            self.create_summary_table(report)
        );

        if report.result.warning_count() == 0 {
            return summary;
        }

        format!(
            "⚠️  WARNINGS\n{}\n\n{}",
            self.create_warnings_table(&report.result),
            summary
        )
    }

    fn generate_json_report(&self, report: &RunReport) -> String {
        let result = &report.result;
        let value = json!({
            "output_file": report.output_file,
            "duration_ms": report.duration.as_millis() as u64,
            "total_candidates": result.total_candidates,
            "files_emitted": result.files_emitted,
            "files_skipped_size": result.files_skipped_size,
            "files_failed": result.files_failed,
            "unreadable_dirs": result.unreadable_dirs,
            "tree_lines": result.tree_lines.len(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileFailure;
    use std::path::PathBuf;

    fn sample(failures: bool) -> RunReport {
        let mut result = RunResult {
            tree_lines: vec!["src".to_string(), "│   lib.rs".to_string()],
            files_emitted: 3,
            files_skipped_size: 1,
            total_candidates: 5,
            ..RunResult::default()
        };
        if failures {
            result.files_failed.push(FileFailure {
                path: PathBuf::from("src/locked.rs"),
                kind: ReadErrorKind::PermissionDenied,
            });
            result.unreadable_dirs.push(PathBuf::from("private"));
        }
        RunReport {
            output_file: "proj_20240101_000000.md".to_string(),
            duration: Duration::from_millis(42),
            result,
        }
    }

    #[test]
    fn test_console_report() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        let text = reporter.generate_report(&sample(false));
        assert!(text.contains("proj_20240101_000000.md"));
        assert!(text.contains("Files Included"));
        assert!(!text.contains("WARNINGS"));

        let text = reporter.generate_report(&sample(true));
        assert!(text.contains("WARNINGS"));
        assert!(text.contains("src/locked.rs"));
        assert!(text.contains("permission denied"));
        assert!(text.contains("directory could not be listed"));
    }

    #[test]
    fn test_json_report() {
        let reporter = Reporter::new(ReportFormat::Json);
        let text = reporter.generate_report(&sample(true));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["files_emitted"], 3);
        assert_eq!(value["duration_ms"], 42);
        assert_eq!(value["files_failed"][0]["kind"], "permission_denied");
        assert_eq!(value["files_failed"][0]["path"], "src/locked.rs");
        assert_eq!(value["unreadable_dirs"][0], "private");
    }

    #[test]
    fn test_format_path() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        assert_eq!(reporter.format_path("src/lib.rs", 60), "src/lib.rs");
        assert_eq!(
            reporter.format_path("very/long/nested/path/file.rs", 20),
            ".../path/file.rs"
        );
    }
}
