//! Store error types.

use std::path::PathBuf;

/// Errors from the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed
    #[error("snapshot I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The snapshot file could not be encoded or decoded
    #[error("snapshot JSON error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A user with this email is already registered
    #[error("User already exists")]
    DuplicateEmail,
}
