//! Durable snapshot storage for Cardroom.
//!
//! Rooms need exactly one thing from persistence: a key/value get/put
//! contract. [`SnapshotStore`] is that contract; the room layer is
//! generic over it and never learns what sits behind it.
//!
//! Two implementations ship here:
//!
//! - [`MemoryStore`] — a HashMap behind a mutex. For tests and
//!   ephemeral deployments where restarts may lose state.
//! - [`JsonFileStore`] — one file per key in a data directory, written
//!   atomically (temp file, then rename). The plain-file analogue of
//!   the key/value storage the room design assumes.

use std::future::Future;

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Key/value persistence for room snapshots.
///
/// Keys are validated room names; values are opaque serialized
/// snapshots. `get` of a key that was never `put` returns `Ok(None)`.
pub trait SnapshotStore: Send + Sync + 'static {
    /// Reads the value stored under `key`, if any.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(
        &self,
        key: &str,
        value: &[u8],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
