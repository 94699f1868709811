// External crates
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while aggregating an access log stream.
///
/// Malformed lines are not errors: the parser skips them silently.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A parsed line carried a status code outside the tracked set while the
    /// `fatal` unknown status policy is active.
    #[error("status code {code:?} is not one of the tracked status codes")]
    UnknownStatusCode {
        /// The rejected status code
        code: String,
    },

    /// A configuration file parsed but holds an unusable value.
    #[error("invalid configuration in {path:?}: {reason}")]
    InvalidConfig {
        /// Configuration file path
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// Reading the next line failed.
    #[error("failed to read the input stream")]
    Read(#[source] std::io::Error),

    /// Writing a snapshot to the output failed.
    #[error("failed to write a snapshot")]
    Write(#[source] std::io::Error),
}
