//! In-memory `PackStore` keeping objects in insertion order.

use crate::{
    models::object::{Checksums, Listing, StoredObject},
    services::store::{PackStore, StoreResult},
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::RwLock;

/// A `put` as observed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub key: String,
    pub body: Bytes,
    pub checksums: Checksums,
}

#[derive(Debug)]
pub struct MemoryStore {
    bucket: String,
    objects: RwLock<Vec<StoredObject>>,
    puts: RwLock<Vec<RecordedPut>>,
    page_size: Option<usize>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self::with_objects(bucket, Vec::new())
    }

    /// Seed the store. Listing order follows the order of `objects`.
    pub fn with_objects(bucket: impl Into<String>, objects: Vec<StoredObject>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(objects),
            puts: RwLock::new(Vec::new()),
            page_size: None,
        }
    }

    /// Cap listings at `size` objects, marking longer ones as truncated.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Every `put` issued against this store, oldest first.
    pub async fn puts(&self) -> Vec<RecordedPut> {
        self.puts.read().await.clone()
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .iter()
            .find(|obj| obj.key == key)
            .cloned()
    }
}

#[async_trait]
impl PackStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list(&self) -> StoreResult<Listing> {
        let objects = self.objects.read().await;
        let limit = self.page_size.unwrap_or(objects.len());
        Ok(Listing {
            objects: objects.iter().take(limit).map(StoredObject::summary).collect(),
            truncated: objects.len() > limit,
        })
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        Ok(self.object(key).await)
    }

    async fn put(&self, key: &str, body: Bytes, checksums: Checksums) -> StoreResult<()> {
        self.puts.write().await.push(RecordedPut {
            key: key.to_string(),
            body: body.clone(),
            checksums: checksums.clone(),
        });

        let replacement = StoredObject {
            key: key.to_string(),
            uploaded: Utc::now(),
            checksums,
            body,
        };
        let mut objects = self.objects.write().await;
        match objects.iter_mut().find(|obj| obj.key == key) {
            Some(existing) => *existing = replacement,
            None => objects.push(replacement),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn object(key: &str, secs: i64) -> StoredObject {
        StoredObject {
            key: key.into(),
            uploaded: Utc.timestamp_opt(secs, 0).unwrap(),
            checksums: Checksums::default(),
            body: Bytes::from_static(b"pack"),
        }
    }

    #[tokio::test]
    async fn list_preserves_seed_order() {
        let store = MemoryStore::with_objects("packs", vec![object("b", 2), object("a", 1)]);
        let listing = store.list().await.unwrap();
        let keys: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert!(!listing.truncated);
    }

    #[tokio::test]
    async fn page_size_truncates_listing() {
        let store = MemoryStore::with_objects("packs", vec![object("a", 1), object("b", 2)])
            .with_page_size(1);
        let listing = store.list().await.unwrap();
        assert_eq!(listing.objects.len(), 1);
        assert!(listing.truncated);
    }

    #[tokio::test]
    async fn put_replaces_in_place_and_is_recorded() {
        let store = MemoryStore::with_objects("packs", vec![object("a", 1), object("b", 2)]);
        store
            .put("a", Bytes::from_static(b"new"), Checksums::with_sha1(vec![1u8; 20]))
            .await
            .unwrap();

        let listing = store.list().await.unwrap();
        assert_eq!(listing.objects[0].key, "a");
        let a = store.get("a").await.unwrap().unwrap();
        assert_eq!(a.body, Bytes::from_static(b"new"));
        assert_eq!(a.checksums.sha1, Some(vec![1u8; 20]));
        assert_eq!(store.puts().await.len(), 1);
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = MemoryStore::new("packs");
        assert!(store.get("nope").await.unwrap().is_none());
    }
}
