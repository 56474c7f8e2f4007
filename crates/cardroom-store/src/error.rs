//! Error types for the storage layer.

/// Errors that can occur while reading or writing snapshots.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading a stored value failed.
    #[error("read failed for key {key:?}: {source}")]
    ReadFailed {
        /// The key being read.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing a value failed.
    #[error("write failed for key {key:?}: {source}")]
    WriteFailed {
        /// The key being written.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
