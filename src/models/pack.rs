//! Response payload for the latest-pack endpoint.

use serde::{Deserialize, Serialize};

/// `{ "key": ..., "sha1": ... }` as returned by `GET`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LatestPack {
    /// Key of the most recently uploaded object.
    pub key: String,

    /// Lowercase hex SHA-1 of the object's content (40 characters).
    pub sha1: String,
}
