//! Latest-pack lookup and SHA-1 caching.
//!
//! The flow is: list the bucket once, keep the newest object, then make sure a
//! SHA-1 is attached to it. A missing checksum is computed from the object's
//! content and written back by a detached task, so a successful response does
//! not mean the checksum has been persisted yet. Two requests racing on the
//! same object may both write it back; the value is identical either way.

use crate::{
    models::{
        object::{Checksums, ObjectSummary},
        pack::LatestPack,
    },
    services::store::{PackStore, StoreError},
};
use sha1::{Digest, Sha1};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PackError {
    #[error("bucket `{0}` holds no packs")]
    Empty(String),
    #[error("object `{key}` was listed in bucket `{bucket}` but could not be fetched")]
    Vanished { bucket: String, key: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of [`ensure_sha1`].
#[derive(Debug)]
pub struct Sha1Outcome {
    /// Lowercase hex digest.
    pub sha1: String,

    /// Handle of the write-back task when the digest had to be computed.
    /// Dropping it leaves the task running.
    pub write_back: Option<JoinHandle<()>>,
}

/// Pick the object with the greatest upload time. On ties the earliest entry
/// in listing order wins.
pub fn select_latest(objects: &[ObjectSummary]) -> Option<&ObjectSummary> {
    objects.iter().reduce(|latest, candidate| {
        if candidate.uploaded > latest.uploaded {
            candidate
        } else {
            latest
        }
    })
}

/// Two lowercase hex characters per byte, in order.
pub fn to_hex(digest: &[u8]) -> String {
    hex::encode(digest)
}

pub fn sha1_digest(content: &[u8]) -> Vec<u8> {
    Sha1::digest(content).to_vec()
}

/// Return the SHA-1 of `key`, computing and writing it back when the object
/// does not carry one yet.
pub async fn ensure_sha1(store: Arc<dyn PackStore>, key: &str) -> Result<Sha1Outcome, PackError> {
    let object = store.get(key).await?.ok_or_else(|| PackError::Vanished {
        bucket: store.bucket().to_string(),
        key: key.to_string(),
    })?;

    if let Some(existing) = object.checksums.sha1.as_deref() {
        debug!("using stored sha1 for {}", key);
        return Ok(Sha1Outcome {
            sha1: to_hex(existing),
            write_back: None,
        });
    }

    let digest = sha1_digest(&object.body);
    let sha1 = to_hex(&digest);
    debug!("computed sha1 {} for {} ({} bytes)", sha1, key, object.body.len());

    let key = object.key;
    let body = object.body;
    let write_back = tokio::spawn(async move {
        if let Err(err) = store.put(&key, body, Checksums::with_sha1(digest)).await {
            warn!("failed to write back sha1 for {}: {}", key, err);
        }
    });

    Ok(Sha1Outcome {
        sha1,
        write_back: Some(write_back),
    })
}

/// Resolve the newest pack in the bucket and its checksum.
pub async fn latest_pack(
    store: Arc<dyn PackStore>,
) -> Result<(LatestPack, Option<JoinHandle<()>>), PackError> {
    let listing = store.list().await?;
    if listing.truncated {
        warn!(
            "listing of bucket {} is truncated; selecting from the first {} objects only",
            store.bucket(),
            listing.objects.len()
        );
    }

    let latest = select_latest(&listing.objects)
        .ok_or_else(|| PackError::Empty(store.bucket().to_string()))?;
    debug!("latest pack is {} uploaded at {}", latest.key, latest.uploaded);

    let key = latest.key.clone();
    let outcome = ensure_sha1(store, &key).await?;
    Ok((
        LatestPack {
            key,
            sha1: outcome.sha1,
        },
        outcome.write_back,
    ))
}
