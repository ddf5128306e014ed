/*!
 * codemerge - Generate a Markdown knowledge file of a project for LLM context
 *
 * This library walks a project directory, renders its folder structure and
 * appends the contents of relevant files as labeled sections of a single
 * Markdown document.
 */

pub mod config;
pub mod error;
pub mod patterns;
pub mod progress;
pub mod report;
pub mod runner;
pub mod scanner;
pub mod serializer;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Config, ExcludeMode, TraversalConfig};
pub use error::{MergeError, Result};
pub use patterns::{PatternMatcher, PatternRule, RuleOrigin};
pub use progress::ProgressSink;
pub use report::{ReportFormat, Reporter, RunReport};
pub use runner::RunCoordinator;
pub use scanner::Scanner;
pub use serializer::ContentSerializer;
pub use tree::TreeRenderer;
pub use types::{EntryKind, FileFailure, ReadErrorKind, RunResult, Section, TreeEntry};
pub use writer::MarkdownWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
