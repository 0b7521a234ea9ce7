//! LocalStore — a bucket binding backed by SQLite for object metadata and
//! local disk for payloads sharded beneath
//! `base_path/{bucket}/{shard}/{shard}/{key}`.

use crate::{
    models::object::{Checksums, Listing, ObjectSummary, StoredObject},
    services::store::{PackStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const DEFAULT_PAGE_SIZE: usize = 1000;
const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Clone)]
pub struct LocalStore {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where object payloads are stored.
    pub base_path: PathBuf,

    bucket: String,
    page_size: usize,
}

impl LocalStore {
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            db,
            base_path: base_path.into(),
            bucket: bucket.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Limit how many objects a single `list` call returns.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create the metadata tables if they do not exist yet.
    pub async fn run_migrations(db: &SqlitePool) -> StoreResult<()> {
        let statements = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        tracing::info!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(db).await?;
        }
        Ok(())
    }

    /// Rejects keys that are empty, oversized, absolute, contain `..`, or carry
    /// control characters and backslashes.
    fn ensure_key_safe(key: &str) -> StoreResult<()> {
        let unsafe_key = key.is_empty()
            || key.len() > MAX_OBJECT_KEY_LEN
            || key.starts_with('/')
            || key.contains("..")
            || key
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0');
        if unsafe_key {
            return Err(StoreError::InvalidObjectKey(key.to_string()));
        }
        Ok(())
    }

    /// First two bytes of MD5(bucket/key) as lowercase hex, one per level.
    fn object_shards(bucket: &str, key: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", bucket, key));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    fn object_path(&self, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(&self.bucket, key);
        let mut path = self.base_path.clone();
        path.push(&self.bucket);
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    /// Write `body` to a temp file next to `file_path`, fsync, then rename into place.
    async fn write_payload(file_path: &Path, body: &[u8]) -> StoreResult<()> {
        let parent = file_path.parent().ok_or_else(|| {
            StoreError::Io(io::Error::new(
                ErrorKind::Other,
                "object path missing parent directory",
            ))
        })?;
        fs::create_dir_all(parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        let written = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(body).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(file_path).await?;
                fs::rename(&tmp_path, file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PackStore for LocalStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list(&self) -> StoreResult<Listing> {
        let fetch_limit = self.page_size + 1;
        let mut objects = sqlx::query_as::<_, ObjectSummary>(
            "SELECT key, uploaded FROM objects WHERE bucket = ? ORDER BY key ASC LIMIT ?",
        )
        .bind(&self.bucket)
        .bind(fetch_limit as i64)
        .fetch_all(&*self.db)
        .await?;

        let truncated = objects.len() == fetch_limit;
        if truncated {
            objects.pop();
        }
        Ok(Listing { objects, truncated })
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        Self::ensure_key_safe(key)?;
        let row = sqlx::query_as::<_, (DateTime<Utc>, Option<Vec<u8>>)>(
            "SELECT uploaded, sha1 FROM objects WHERE bucket = ? AND key = ?",
        )
        .bind(&self.bucket)
        .bind(key)
        .fetch_optional(&*self.db)
        .await?;

        let Some((uploaded, sha1)) = row else {
            return Ok(None);
        };

        let file_path = self.object_path(key);
        let body = match fs::read(&file_path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("metadata for {} present but payload {} missing", key, file_path.display());
                return Ok(None);
            }
            Err(err) => return Err(StoreError::Io(err)),
        };

        Ok(Some(StoredObject {
            key: key.to_string(),
            uploaded,
            checksums: Checksums { sha1 },
            body,
        }))
    }

    async fn put(&self, key: &str, body: Bytes, checksums: Checksums) -> StoreResult<()> {
        Self::ensure_key_safe(key)?;
        let file_path = self.object_path(key);
        Self::write_payload(&file_path, &body).await?;

        let etag = format!("{:x}", md5::compute(&body));
        sqlx::query(
            r#"
            INSERT INTO objects (id, bucket, key, size_bytes, etag, uploaded, sha1)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(bucket, key) DO UPDATE SET
                size_bytes = excluded.size_bytes,
                etag = excluded.etag,
                uploaded = excluded.uploaded,
                sha1 = excluded.sha1
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&self.bucket)
        .bind(key)
        .bind(body.len() as i64)
        .bind(&etag)
        .bind(Utc::now())
        .bind(checksums.sha1)
        .execute(&*self.db)
        .await?;

        debug!("stored {} ({} bytes) in bucket {}", key, body.len(), self.bucket);
        Ok(())
    }
}
