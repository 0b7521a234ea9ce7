//! Represents objects as seen through a bucket binding.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One entry of a bucket listing.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key, unique within the bucket.
    pub key: String,

    /// When the current version of the object was written.
    pub uploaded: DateTime<Utc>,
}

/// A single page returned by [`PackStore::list`](crate::services::store::PackStore::list).
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Objects in listing order.
    pub objects: Vec<ObjectSummary>,

    /// Set when the store holds more objects than this page carries.
    pub truncated: bool,
}

/// Precomputed digests attached to an object's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checksums {
    /// Raw SHA-1 digest bytes (20 bytes when present).
    pub sha1: Option<Vec<u8>>,
}

impl Checksums {
    pub fn with_sha1(digest: impl Into<Vec<u8>>) -> Self {
        Self {
            sha1: Some(digest.into()),
        }
    }
}

/// A fetched object: metadata plus its full content.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub uploaded: DateTime<Utc>,
    pub checksums: Checksums,
    pub body: Bytes,
}

impl StoredObject {
    pub fn summary(&self) -> ObjectSummary {
        ObjectSummary {
            key: self.key.clone(),
            uploaded: self.uploaded,
        }
    }
}
