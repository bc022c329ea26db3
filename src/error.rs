//! Error type shared by every gvm operation.
//!
//! Each variant belongs to one category with its own process exit code, so
//! scripts can tell "you forgot an argument" apart from "that version is not
//! installed" or "the disk refused".

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GvmError {
    /// A required argument was not given.
    #[error("{0}")]
    MissingArgument(&'static str),

    /// The configured root variable is unset or empty.
    #[error("No {var} set. Set a {var} for go installations with `gvm gvmroot <path>`.")]
    RootNotSet { var: String },

    /// No installed directory carries the requested canonical version.
    #[error("Couldn't {action} Go version {version}. Check Go versions with `gvm list`.")]
    VersionNotFound { action: &'static str, version: String },

    /// `install` was asked for a version already present under the root.
    #[error("Go version {version} is already installed in {}", .path.display())]
    AlreadyInstalled { version: String, path: PathBuf },

    #[error("Invalid configuration: {0:#}")]
    Config(anyhow::Error),

    #[error("Failed to download Go version {version}: {source:#}")]
    Fetch {
        version: String,
        #[source]
        source: anyhow::Error,
    },

    /// One or more environment writes failed; the others were still attempted.
    #[error("Could not update environment: {}", .0.join("; "))]
    Environment(Vec<String>),

    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GvmError {
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GvmError::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Map error to its process exit code.
    ///
    /// Codes above 63 follow sysexits.h.
    pub fn exit_code(&self) -> i32 {
        match self {
            GvmError::MissingArgument(_) => 2,
            GvmError::AlreadyInstalled { .. } => 2,
            GvmError::VersionNotFound { .. } => 3,
            GvmError::Fetch { .. } => 69,      // EX_UNAVAILABLE
            GvmError::Environment(_) => 73,    // EX_CANTCREAT
            GvmError::Io { .. } => 74,         // EX_IOERR
            GvmError::RootNotSet { .. } => 78, // EX_CONFIG
            GvmError::Config(_) => 78,
        }
    }
}

pub type Result<T, E = GvmError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_category() {
        let usage = GvmError::MissingArgument("Version not specified.");
        let not_found = GvmError::VersionNotFound {
            action: "use",
            version: "1.20.1".to_string(),
        };
        let root = GvmError::RootNotSet {
            var: "GVMROOT".to_string(),
        };
        assert_eq!(usage.exit_code(), 2);
        assert_eq!(not_found.exit_code(), 3);
        assert_eq!(root.exit_code(), 78);
        assert_ne!(usage.exit_code(), not_found.exit_code());
    }

    #[test]
    fn test_not_found_message_points_to_list() {
        let err = GvmError::VersionNotFound {
            action: "uninstall",
            version: "1.20.1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("uninstall Go version 1.20.1"));
        assert!(msg.contains("gvm list"));
    }
}
