/*!
 * Configuration handling for codemerge
 */

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use serde::Serialize;

use crate::error::Result;
use crate::report::ReportFormat;

/// Default maximum tree depth
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Default size ceiling in KB
pub const DEFAULT_MAX_FILE_SIZE_KB: u64 = 100;

/// How caller exclude patterns combine with the built-in table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ExcludeMode {
    /// Caller patterns are added to the built-in table
    #[default]
    Append,
    /// Caller patterns replace the built-in table
    Replace,
}

/// Command-line arguments for codemerge
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "codemerge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate a Markdown file containing the structure and contents of a project",
    long_about = "Walks a project directory and writes one Markdown file holding its folder structure and the contents of relevant files, ready to hand to a Large Language Model."
)]
pub struct Args {
    /// Path to the project directory
    #[clap(default_value = ".")]
    pub project_path: String,

    /// Maximum depth for the folder structure listing
    #[clap(short = 'd', long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Maximum file size in KB whose content is included
    #[clap(short = 's', long, default_value_t = DEFAULT_MAX_FILE_SIZE_KB)]
    pub max_size: u64,

    /// File patterns to include, comma-separated
    #[clap(short = 'p', long, value_delimiter = ',', default_value = "*")]
    pub patterns: Vec<String>,

    /// Extra exclude patterns, comma-separated
    #[clap(short = 'e', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Use only the given exclude patterns instead of adding them to the built-in table
    #[clap(long)]
    pub no_default_excludes: bool,

    /// Ignore file to read extra exclude patterns from (default: <project>/.gitignore)
    #[clap(long)]
    pub ignore_file: Option<String>,

    /// Output file name (default: PROJECT_NAME_TIMESTAMP.md)
    #[clap(short = 'o', long)]
    pub output: Option<String>,

    /// Number of threads used to read file contents
    #[clap(short = 't', long, default_value = "4")]
    pub threads: usize,

    /// Enable verbose output
    #[clap(short = 'v', long)]
    pub verbose: bool,

    /// Print the run summary as JSON
    #[clap(long)]
    pub json: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Constraints for one traversal; immutable for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalConfig {
    /// Deepest tree level that is listed (root is depth 0)
    pub max_depth: usize,
    /// Files larger than this are replaced by a placeholder
    pub max_file_size_kb: u64,
    /// Globs matched against basenames; at least one must match
    pub include_patterns: Vec<String>,
    /// Caller exclude globs
    pub exclude_patterns: Vec<String>,
    /// Whether `exclude_patterns` extend or replace the built-in table
    pub exclude_mode: ExcludeMode,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE_KB,
            include_patterns: vec!["*".to_string()],
            exclude_patterns: Vec::new(),
            exclude_mode: ExcludeMode::Append,
        }
    }
}

impl TraversalConfig {
    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.max_depth >= 1,
            Config,
            "max depth must be at least 1, got {}",
            self.max_depth
        );
        crate::ensure!(
            self.max_file_size_kb >= 1,
            Config,
            "max file size must be at least 1KB, got {}",
            self.max_file_size_kb
        );
        crate::ensure!(
            !self.include_patterns.is_empty(),
            Config,
            "at least one include pattern is required"
        );
        for pattern in self.include_patterns.iter().chain(&self.exclude_patterns) {
            crate::ensure!(
                !pattern.trim().is_empty(),
                Config,
                "patterns must not be empty"
            );
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Project directory to process
    pub target_dir: PathBuf,

    /// Output file path; derived from the project name when absent
    pub output_file: Option<PathBuf>,

    /// Traversal constraints
    pub traversal: TraversalConfig,

    /// Ignore file override
    pub ignore_file: Option<PathBuf>,

    /// Number of threads to use for reading file contents
    pub num_threads: usize,

    /// Verbose logging
    pub verbose: bool,

    /// Summary format
    pub report_format: ReportFormat,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let exclude_mode = if args.no_default_excludes {
            ExcludeMode::Replace
        } else {
            ExcludeMode::Append
        };

        Self {
            target_dir: PathBuf::from(args.project_path),
            output_file: args.output.map(PathBuf::from),
            traversal: TraversalConfig {
                max_depth: args.max_depth,
                max_file_size_kb: args.max_size,
                include_patterns: args.patterns,
                exclude_patterns: args.exclude,
                exclude_mode,
            },
            ignore_file: args.ignore_file.map(PathBuf::from),
            num_threads: args.threads.max(1),
            verbose: args.verbose,
            report_format: if args.json {
                ReportFormat::Json
            } else {
                ReportFormat::ConsoleTable
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.traversal.validate()?;
        crate::ensure!(
            self.num_threads >= 1,
            Config,
            "thread count must be at least 1"
        );
        Ok(())
    }
}
