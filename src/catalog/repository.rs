//! Catalog repository for STASH.
//!
//! Durable file metadata on SQLite. Every mutating operation that is
//! "scoped by owner" carries the owner inside the statement itself, so the
//! authorization check and the mutation are a single atomic store operation
//! rather than a read-then-write.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::query::SearchQuery;
use super::record::{format_timestamp, read_timestamp, FileRecord, NewFileRecord, Visibility};
use super::MAX_SEARCH_RESULTS;
use crate::{Result, StashError};

/// Shared SELECT head: one row per file with its grantees concatenated.
const SELECT_RECORD: &str = "SELECT f.filename, f.stored_key, f.owner, f.content_type, f.size, \
     f.visibility, f.uploaded_at, GROUP_CONCAT(s.grantee) AS shared_with \
     FROM files f LEFT JOIN file_shares s ON s.file_id = f.id";

/// Repository for file metadata operations.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new CatalogRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    ///
    /// The filename is the shared lookup key; inserting a taken filename
    /// fails with `Conflict` so the caller can compensate for any blob it
    /// has already written.
    pub async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let uploaded_at = format_timestamp(&chrono::Utc::now());

        sqlx::query(
            "INSERT INTO files (filename, stored_key, owner, content_type, size, visibility, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.filename)
        .bind(&record.stored_key)
        .bind(&record.owner)
        .bind(&record.content_type)
        .bind(record.size)
        .bind(record.visibility.as_str())
        .bind(&uploaded_at)
        .execute(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StashError::Conflict(format!("file '{}' already exists", record.filename))
            }
            _ => StashError::Database(e.to_string()),
        })?;

        self.find_by_filename(&record.filename)
            .await?
            .ok_or_else(|| StashError::NotFound("file".to_string()))
    }

    /// Find a record by filename.
    pub async fn find_by_filename(&self, filename: &str) -> Result<Option<FileRecord>> {
        let row = sqlx::query(&format!("{SELECT_RECORD} WHERE f.filename = ? GROUP BY f.id"))
            .bind(filename)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Find a record by filename, scoped to its owner.
    ///
    /// Returns None both when the file is absent and when it belongs to
    /// someone else; callers must not be able to tell the difference.
    pub async fn find_owned(&self, filename: &str, owner: &str) -> Result<Option<FileRecord>> {
        let row = sqlx::query(&format!(
            "{SELECT_RECORD} WHERE f.filename = ? AND f.owner = ? GROUP BY f.id"
        ))
        .bind(filename)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Search records visible to `username` (owned or shared with them),
    /// applying the query's filters. Results are newest first, capped at
    /// `MAX_SEARCH_RESULTS` per page.
    pub async fn search_visible_to(
        &self,
        username: &str,
        query: &SearchQuery,
    ) -> Result<Vec<FileRecord>> {
        let (from, to) = query.parse_range()?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_RECORD);
        qb.push(" WHERE (f.owner = ");
        qb.push_bind(username);
        qb.push(" OR f.id IN (SELECT file_id FROM file_shares WHERE grantee = ");
        qb.push_bind(username);
        qb.push("))");

        if let Some(ref name) = query.name {
            qb.push(" AND f.filename LIKE ");
            qb.push_bind(format!("%{}%", escape_like(name)));
            qb.push(" ESCAPE '\\'");
        }
        if let Some(ref content_type) = query.content_type {
            qb.push(" AND f.content_type = ");
            qb.push_bind(content_type.clone());
        }
        if let Some(from) = from {
            qb.push(" AND f.uploaded_at >= ");
            qb.push_bind(format_timestamp(&from));
        }
        if let Some(to) = to {
            qb.push(" AND f.uploaded_at <= ");
            qb.push_bind(format_timestamp(&to));
        }

        qb.push(" GROUP BY f.id ORDER BY f.uploaded_at DESC, f.id DESC LIMIT ");
        qb.push_bind(MAX_SEARCH_RESULTS as i64);
        qb.push(" OFFSET ");
        qb.push_bind(query.offset as i64);

        let rows = qb.build().fetch_all(self.pool).await?;
        rows.iter().map(Self::map_row).collect()
    }

    /// List public records, newest first.
    pub async fn list_public(&self, limit: u32) -> Result<Vec<FileRecord>> {
        let limit = limit.min(MAX_SEARCH_RESULTS) as i64;

        let rows = sqlx::query(&format!(
            "{SELECT_RECORD} WHERE f.visibility = 'public' \
             GROUP BY f.id ORDER BY f.uploaded_at DESC, f.id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Set a file's visibility, scoped to `(filename, owner)`.
    ///
    /// Returns false when no such pair exists; a non-owner can never flip
    /// another user's file.
    pub async fn set_visibility(
        &self,
        filename: &str,
        owner: &str,
        visibility: Visibility,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE files SET visibility = ? WHERE filename = ? AND owner = ?")
            .bind(visibility.as_str())
            .bind(filename)
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Grant `grantee` read access, scoped to `(filename, owner)`.
    ///
    /// Idempotent: an existing grant is left untouched. The owner is never
    /// added to their own share list. Returns false when no such
    /// `(filename, owner)` pair exists.
    pub async fn add_share(&self, filename: &str, owner: &str, grantee: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO file_shares (file_id, grantee)
             SELECT id, ?3 FROM files WHERE filename = ?1 AND owner = ?2 AND owner != ?3",
        )
        .bind(filename)
        .bind(owner)
        .bind(grantee)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Nothing inserted: the grant already existed (or grantee is the
        // owner), or there is no such file. Only the latter is a failure.
        self.owned_exists(filename, owner).await
    }

    /// Delete a record, scoped to `(filename, owner)`. Grants are removed by
    /// the cascade.
    ///
    /// Returns false when no such pair exists.
    pub async fn delete(&self, filename: &str, owner: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE filename = ? AND owner = ?")
            .bind(filename)
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all records.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }

    /// Check whether a `(filename, owner)` pair exists.
    async fn owned_exists(&self, filename: &str, owner: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM files WHERE filename = ? AND owner = ?)",
        )
        .bind(filename)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Ok(exists.0)
    }

    /// Map a database row to a FileRecord.
    fn map_row(row: &SqliteRow) -> Result<FileRecord> {
        let visibility: String = row.try_get("visibility")?;
        let uploaded_at: String = row.try_get("uploaded_at")?;
        let shared: Option<String> = row.try_get("shared_with")?;

        let mut shared_with: Vec<String> = shared
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        shared_with.sort();

        Ok(FileRecord {
            filename: row.try_get("filename")?,
            stored_key: row.try_get("stored_key")?,
            owner: row.try_get("owner")?,
            content_type: row.try_get("content_type")?,
            size: row.try_get("size")?,
            visibility: visibility.parse().map_err(StashError::Database)?,
            shared_with,
            uploaded_at: read_timestamp(&uploaded_at),
        })
    }
}

/// Escape LIKE wildcards in user input.
fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
