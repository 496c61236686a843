//! Durable key-value storage for the cart payload.
//!
//! The cart is written as a whole under [`CART_KEY`] after every successful
//! mutation. There are no deltas and no versions: each write replaces the
//! previous value.
//!
//! Several processes may share one store (the server and `rs-cli` on the
//! same data directory). A writer takes [`KeyValueStore::lock`] and re-reads
//! the value before deciding what to write, so no one overwrites a value it
//! has not seen.

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key under which the serialized cart is stored.
pub const CART_KEY: &str = "@RocketShoes:cart";

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The store refused the write.
    #[error("write rejected for {0}")]
    Rejected(String),
}

/// A local string key-value store that survives restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `None` if the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Take exclusive hold of a key until the returned guard is dropped.
    ///
    /// Waits while another holder, in this process or another one, has it.
    async fn lock(&self, key: &str) -> Result<KeyLock, StorageError>;
}

/// Exclusive hold on a store key. Released on drop.
#[derive(Debug)]
#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyLock {
    _held: Held,
}

// Fields are only held to be dropped.
#[allow(dead_code)]
#[derive(Debug)]
enum Held {
    /// An open lock file with an exclusive advisory lock on it.
    File(std::fs::File),
    /// A per-key mutex inside this process.
    Local(tokio::sync::OwnedMutexGuard<()>),
}

impl KeyLock {
    pub(crate) fn file(file: std::fs::File) -> Self {
        Self {
            _held: Held::File(file),
        }
    }

    pub(crate) fn local(guard: tokio::sync::OwnedMutexGuard<()>) -> Self {
        Self {
            _held: Held::Local(guard),
        }
    }
}
