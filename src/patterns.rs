/*!
 * Exclude/include pattern handling
 *
 * Exclude rules come from three places: the built-in table, the project's
 * ignore file and the caller. They are OR'd together and always win over
 * include patterns. Matching is shell-glob style where `*` also crosses path
 * separators, so `**` carries no special meaning and collapses to `*`.
 */

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ExcludeMode, TraversalConfig};
use crate::error::{MergeError, Result};
use crate::utils::{DEFAULT_EXCLUDE_PATTERNS, HARD_PRUNED_DIRS};

/// Name of the ignore file looked up at the project root
pub const IGNORE_FILE_NAME: &str = ".gitignore";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Built-in table, compiled once per process
static BUILTIN_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    DEFAULT_EXCLUDE_PATTERNS
        .iter()
        .filter_map(|glob| PatternRule::new(glob, RuleOrigin::BuiltinDefault).ok())
        .collect()
});

/// Where an exclude rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleOrigin {
    BuiltinDefault,
    IgnoreFile,
    CallerOverride,
}

/// A single glob tagged with its origin
#[derive(Debug, Clone)]
pub struct PatternRule {
    glob: String,
    origin: RuleOrigin,
    compiled: Pattern,
}

impl PatternRule {
    /// Compile a shell-style glob
    pub fn new(glob: &str, origin: RuleOrigin) -> std::result::Result<Self, glob::PatternError> {
        let compiled = Pattern::new(&translate(glob))?;
        Ok(Self {
            glob: glob.to_string(),
            origin,
            compiled,
        })
    }

    /// The glob as written
    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn origin(&self) -> RuleOrigin {
        self.origin
    }

    fn matches(&self, text: &str) -> bool {
        self.compiled.matches_with(text, MATCH_OPTIONS)
    }
}

/// Ordered exclude rules; order only matters for diagnostics
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    rules: Vec<PatternRule>,
}

impl ExclusionSet {
    fn len(&self) -> usize {
        self.rules.len()
    }

    /// Number of rules that came from `origin`
    pub fn count_from(&self, origin: RuleOrigin) -> usize {
        self.rules.iter().filter(|r| r.origin == origin).count()
    }

    /// First rule matching either the normalized path or its basename
    pub fn first_match(&self, normalized: &str, basename: &str) -> Option<&PatternRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(normalized) || rule.matches(basename))
    }
}

/// Include globs, tested against basenames only
#[derive(Debug, Clone)]
pub struct InclusionSet {
    rules: Vec<PatternRule>,
}

impl InclusionSet {
    fn matches(&self, basename: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(basename))
    }
}

/// Answers inclusion and exclusion queries for paths relative to the root
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    exclusions: ExclusionSet,
    inclusions: InclusionSet,
}

impl PatternMatcher {
    /// Build the matcher for one run.
    ///
    /// `ignore_file` defaults to `<root>/.gitignore`. A missing ignore file
    /// contributes nothing; blank and `#` lines are skipped. Caller patterns
    /// must be non-empty after trimming and valid globs.
    pub fn build(
        root: &Path,
        ignore_file: Option<&Path>,
        caller_excludes: &[String],
        include_patterns: &[String],
        mode: ExcludeMode,
    ) -> Result<Self> {
        let mut rules = match mode {
            ExcludeMode::Append => BUILTIN_RULES.clone(),
            ExcludeMode::Replace => Vec::new(),
        };

        let ignore_path = ignore_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(IGNORE_FILE_NAME));
        rules.extend(read_ignore_file(&ignore_path));

        for pattern in caller_excludes {
            rules.push(compile_caller(pattern, "exclude", RuleOrigin::CallerOverride)?);
        }

        crate::ensure!(
            !include_patterns.is_empty(),
            Config,
            "at least one include pattern is required"
        );
        let inclusions = include_patterns
            .iter()
            .map(|p| compile_caller(p, "include", RuleOrigin::CallerOverride))
            .collect::<Result<Vec<_>>>()?;

        let exclusions = ExclusionSet { rules };
        debug!(
            rules = exclusions.len(),
            builtin = exclusions.count_from(RuleOrigin::BuiltinDefault),
            ignore_file = exclusions.count_from(RuleOrigin::IgnoreFile),
            caller = exclusions.count_from(RuleOrigin::CallerOverride),
            include = inclusions.len(),
            "Pattern matcher built"
        );

        Ok(Self {
            exclusions,
            inclusions: InclusionSet { rules: inclusions },
        })
    }

    /// Build from a traversal config
    pub fn from_config(
        root: &Path,
        ignore_file: Option<&Path>,
        config: &TraversalConfig,
    ) -> Result<Self> {
        Self::build(
            root,
            ignore_file,
            &config.exclude_patterns,
            &config.include_patterns,
            config.exclude_mode,
        )
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// True if any exclude rule matches the normalized path or its basename
    pub fn is_excluded(&self, path: &Path) -> bool {
        let normalized = normalize(path);
        let basename = basename(path);
        match self.exclusions.first_match(&normalized, &basename) {
            Some(rule) => {
                debug!(path = %normalized, rule = rule.glob(), origin = ?rule.origin(), "Excluded");
                true
            }
            None => false,
        }
    }

    /// True if any include pattern matches the basename
    pub fn is_included(&self, basename: &str) -> bool {
        self.inclusions.matches(basename)
    }

    /// Included by basename and not excluded
    pub fn should_include(&self, path: &Path) -> bool {
        self.is_included(&basename(path)) && !self.is_excluded(path)
    }

    /// Dependency caches that are never descended into
    pub fn is_hard_pruned(name: &str) -> bool {
        HARD_PRUNED_DIRS.contains(&name)
    }
}

/// Rewrite a shell glob into `glob` crate syntax.
///
/// Runs of `*` become a single `*`, and a `[` without a closing `]` is a
/// literal bracket.
fn translate(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `start`; a `]` right after
/// the opening `[` or `[!` is a member, not the end
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars[j..].iter().position(|&c| c == ']').map(|p| j + p)
}

fn compile_caller(pattern: &str, what: &str, origin: RuleOrigin) -> Result<PatternRule> {
    let trimmed = pattern.trim();
    crate::ensure!(!trimmed.is_empty(), Config, "empty {} pattern", what);
    PatternRule::new(trimmed, origin).map_err(|e| {
        MergeError::Config(format!("invalid {} pattern '{}': {}", what, trimmed, e))
    })
}

fn read_ignore_file(path: &Path) -> Vec<PatternRule> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No ignore file");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read ignore file, skipping it");
            return Vec::new();
        }
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match PatternRule::new(line, RuleOrigin::IgnoreFile) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    pattern = line,
                    error = %e,
                    "Skipping invalid ignore pattern"
                );
                None
            }
        })
        .collect()
}

/// Platform-normalized relative form of `path`
fn normalize(path: &Path) -> String {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    cleaned.to_string_lossy().to_string()
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
