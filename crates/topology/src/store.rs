//! Persistent mirror of registered announcements.
//!
//! Announcements are stored per instance: each instance of a cluster writes
//! the announcements registered against it under its own id, one entry per
//! announcement owner, and reads the entries of its siblings.
mod database;
mod memory;

pub use database::Database;
pub use memory::MemoryStore;

use thiserror::Error;

use crate::time::Timestamp;

#[derive(Debug, Error)]
pub enum Error {
    /// An internal database error.
    #[error("internal error: {0}")]
    Internal(#[from] sqlite::Error),
    /// A write was attempted through a read-only handle.
    #[error("store is read-only")]
    ReadOnly,
}

/// A persisted announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Owner of the announcement.
    pub owner: String,
    /// Encoded announcement.
    pub json: String,
    /// Time of the write.
    pub timestamp: Timestamp,
}

/// Key-value store holding announcements, keyed by instance and owner.
pub trait Store {
    /// Instances that have announcements stored.
    fn instances(&self) -> Result<Vec<String>, Error>;
    /// All announcements stored under an instance, ordered by owner.
    fn announcements(&self, instance: &str) -> Result<Vec<Entry>, Error>;
    /// The announcement of `owner` stored under an instance.
    fn get(&self, instance: &str, owner: &str) -> Result<Option<Entry>, Error>;
    /// Create or replace the announcement of `owner` under an instance.
    fn put(&mut self, instance: &str, owner: &str, json: &str, timestamp: Timestamp)
        -> Result<(), Error>;
    /// Delete the announcement of `owner` under an instance. Returns whether
    /// there was one.
    fn remove(&mut self, instance: &str, owner: &str) -> Result<bool, Error>;
    /// Run `f` as one unit: its writes are committed if it succeeds, and
    /// rolled back if it fails.
    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<Error>,
        F: FnOnce(&mut Self) -> Result<T, E>;
}
