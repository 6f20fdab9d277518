//! Error taxonomy shared by the loader, resolver and dispatcher.
//!
//! Configuration errors abort a run before any tool starts. Every other
//! variant is scoped to a single tool: the run records it as that tool's
//! `Failed` state and moves on to the next tool.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or contradictory configuration
    #[error("invalid configuration at '{key}': {message}")]
    Config { key: String, message: String },

    /// No executable could be located for an enabled tool
    #[error("could not find {tool}: {detail}")]
    ToolNotFound { tool: String, detail: String },

    /// Executables were found but none satisfies the version constraint
    #[error("{tool}: no executable matches version requirement '{required}' (found {found})")]
    VersionMismatch {
        tool: String,
        required: String,
        found: String,
    },

    /// The version flag ran but its output did not contain a version
    #[error("{tool}: could not extract a version from {} output: '{output}'", path.display())]
    VersionProbe {
        tool: String,
        path: PathBuf,
        output: String,
    },

    /// The executable could not be spawned
    #[error("{tool}: failed to execute '{command}': {source}")]
    Execution {
        tool: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool cannot perform what was asked, e.g. a dry run
    #[error("{tool}: {message}")]
    Unsupported { tool: String, message: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
