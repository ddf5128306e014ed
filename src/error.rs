//! Global error handling for codemerge
//!
//! Only run-level failures live here. Problems with individual files or
//! subdirectories are collected into [`crate::types::RunResult`] instead.

use std::io;

use thiserror::Error;

/// Fatal error for a codemerge run
#[derive(Error, Debug)]
pub enum MergeError {
    /// Root path missing or not a directory
    #[error("Path error: {0}")]
    Path(String),

    /// Root directory exists but cannot be listed
    #[error("Permission error: {0}")]
    Permission(String),

    /// Invalid numeric or pattern configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output destination cannot be opened or written
    #[error("Write error for {target}: {source}")]
    Write {
        /// Output path, or a description of the sink
        target: String,
        #[source]
        source: io::Error,
    },

    /// Run stopped between files by the caller
    #[error("Run cancelled")]
    Cancelled,
}

impl MergeError {
    /// Short stable label for structured reporting
    pub fn kind(&self) -> &'static str {
        match self {
            MergeError::Path(_) => "path",
            MergeError::Permission(_) => "permission",
            MergeError::Config(_) => "config",
            MergeError::Write { .. } => "write",
            MergeError::Cancelled => "cancelled",
        }
    }
}

/// Specialized Result type for codemerge operations
pub type Result<T> = std::result::Result<T, MergeError>;

/// Creates a MergeError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::MergeError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_depth(depth: usize) -> Result<()> {
        crate::ensure!(depth >= 1, Config, "max depth must be at least 1, got {}", depth);
        Ok(())
    }

    #[test]
    fn test_ensure_macro() {
        assert!(check_depth(1).is_ok());
        let err = check_depth(0).unwrap_err();
        assert_eq!(err.kind(), "config");
        assert_eq!(
            err.to_string(),
            "Configuration error: max depth must be at least 1, got 0"
        );
    }

    #[test]
    fn test_write_error_display() {
        let err = MergeError::Write {
            target: "out/context.md".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), "write");
        assert!(err.to_string().contains("out/context.md"));
    }
}
