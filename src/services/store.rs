//! The bucket binding the pack handler talks to.
//!
//! A `PackStore` is bound to exactly one bucket. The handler only needs three
//! operations from it, so both the SQLite/disk store and the in-memory store
//! used by tests implement this trait.

use crate::models::object::{Checksums, Listing, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object key `{0}`")]
    InvalidObjectKey(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PackStore: Send + Sync {
    /// Name of the bucket this store is bound to.
    fn bucket(&self) -> &str;

    /// Return one page of objects. Implementations never follow continuation
    /// tokens; `Listing::truncated` reports whether more objects exist.
    async fn list(&self) -> StoreResult<Listing>;

    /// Fetch an object with its content. `None` when the key does not exist.
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>>;

    /// Write `body` under `key`, replacing any existing object and its checksums.
    async fn put(&self, key: &str, body: Bytes, checksums: Checksums) -> StoreResult<()>;
}
