//! Use-case orchestration for STASH.
//!
//! The coordinator wires the identity directory, metadata catalog, blob
//! store, and access policy together for each hosting operation. It is the
//! sole writer of file records; all shared state lives in the injected
//! database and blob store, so the service itself holds nothing mutable
//! between requests.

use tracing::{error, info};

use crate::auth::{hash_password, validate_password, validate_username, verify_password};
use crate::catalog::{
    CatalogRepository, FileRecord, NewFileRecord, SearchQuery, Visibility, MAX_FILENAME_LENGTH,
    MAX_SEARCH_RESULTS,
};
use crate::db::{Database, NewUser, User, UserRepository};
use crate::policy::{decide, Actor, FileOperation};
use crate::store::BlobStore;
use crate::{Result, StashError};

/// Default maximum upload size (10 MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Display filename; the lookup key for all later operations.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
    /// MIME content type.
    pub content_type: String,
    /// Whether the file is world-readable from the start.
    pub make_public: bool,
}

impl UploadRequest {
    /// Create a new private upload request.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
            content_type: "application/octet-stream".to_string(),
            make_public: false,
        }
    }

    /// Set the content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the initial visibility.
    pub fn public(mut self, make_public: bool) -> Self {
        self.make_public = make_public;
        self
    }
}

/// Result of a fetch: the record plus the blob bytes.
#[derive(Debug)]
pub struct FetchResult {
    /// File metadata.
    pub record: FileRecord,
    /// File content.
    pub content: Vec<u8>,
}

/// Coordinator for all hosting use cases.
///
/// Store handles are injected at construction; nothing reaches for ambient
/// globals.
pub struct HostingService {
    db: Database,
    store: BlobStore,
    max_upload_size: u64,
}

impl HostingService {
    /// Create a new service over the given database and blob store.
    pub fn new(db: Database, store: BlobStore) -> Self {
        Self {
            db,
            store,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Override the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    fn catalog(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(self.db.pool())
    }

    fn invalid_credentials() -> StashError {
        // One message for unknown user and wrong password alike
        StashError::Unauthenticated("invalid credentials".to_string())
    }

    /// Register a new user. A taken username fails with `Conflict`.
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        validate_username(username).map_err(|e| StashError::Validation(e.to_string()))?;
        validate_password(password).map_err(|e| StashError::Validation(e.to_string()))?;

        let digest =
            hash_password(password).map_err(|e| StashError::Validation(e.to_string()))?;
        let user = self.users().create(&NewUser::new(username, digest)).await?;

        info!(username = %user.username, "new user registered");
        Ok(user)
    }

    /// Verify credentials and return the user.
    ///
    /// Fails with `Unauthenticated` on unknown username or wrong password,
    /// without distinguishing the two.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .users()
            .get_by_username(username)
            .await?
            .ok_or_else(Self::invalid_credentials)?;

        verify_password(password, &user.password).map_err(|_| Self::invalid_credentials())?;

        Ok(user)
    }

    /// Upload a file owned by `owner`.
    ///
    /// The blob is written under a fresh opaque key, then the record is
    /// inserted. If the insert fails after the blob write, the blob is
    /// removed again before the error propagates: a file is either fully
    /// present (blob + record) or fully absent.
    pub async fn upload(&self, owner: &str, request: &UploadRequest) -> Result<FileRecord> {
        if request.filename.is_empty() || request.filename.chars().count() > MAX_FILENAME_LENGTH {
            return Err(StashError::Validation(format!(
                "filename must be 1-{MAX_FILENAME_LENGTH} characters"
            )));
        }
        if request.content.len() as u64 > self.max_upload_size {
            return Err(StashError::Validation(format!(
                "file exceeds the maximum upload size of {} bytes",
                self.max_upload_size
            )));
        }

        let stored_key = BlobStore::generate_key(&request.filename);
        let size = self.store.put(&stored_key, &request.content)?;

        let new_record = NewFileRecord::new(
            &request.filename,
            &stored_key,
            owner,
            &request.content_type,
            size as i64,
        )
        .with_visibility(Visibility::from_public_flag(request.make_public));

        match self.catalog().insert(&new_record).await {
            Ok(record) => {
                info!(
                    filename = %record.filename,
                    owner = %record.owner,
                    size = record.size,
                    visibility = %record.visibility,
                    "file uploaded"
                );
                Ok(record)
            }
            Err(e) => {
                // Compensating action: never leave an untracked blob behind.
                if let Err(cleanup) = self.store.remove(&stored_key) {
                    error!(
                        stored_key = %stored_key,
                        error = %cleanup,
                        "failed to remove orphaned blob after catalog insert failure"
                    );
                }
                Err(e)
            }
        }
    }

    /// Fetch a file's record and bytes, subject to the read policy.
    ///
    /// A record without its blob is `Corrupt`, surfaced distinctly from an
    /// ordinary miss.
    pub async fn fetch(&self, actor: &Actor, filename: &str) -> Result<FetchResult> {
        let record = self
            .catalog()
            .find_by_filename(filename)
            .await?
            .ok_or_else(|| StashError::NotFound(format!("file '{filename}'")))?;

        if !decide(actor, &record, FileOperation::Read).is_allowed() {
            return Err(StashError::Forbidden(
                "you do not have access to this file".to_string(),
            ));
        }

        let content = match self.store.get(&record.stored_key) {
            Ok(content) => content,
            Err(StashError::NotFound(_)) => {
                error!(
                    filename = %filename,
                    stored_key = %record.stored_key,
                    "catalog record present but blob missing"
                );
                return Err(StashError::Corrupt(format!(
                    "file '{filename}' has a record but no stored blob"
                )));
            }
            Err(e) => return Err(e),
        };

        Ok(FetchResult { record, content })
    }

    /// Delete a file, record and blob, owner only.
    ///
    /// The lookup is owner-scoped: a file that exists but belongs to
    /// someone else fails exactly like a file that does not exist. The blob
    /// is removed before the record; if blob removal fails, the record
    /// stays so nothing dangles.
    pub async fn delete(&self, owner: &str, filename: &str) -> Result<()> {
        let record = self
            .catalog()
            .find_owned(filename, owner)
            .await?
            .ok_or_else(|| StashError::NotFound(format!("file '{filename}'")))?;

        if !self.store.exists(&record.stored_key) {
            error!(
                filename = %filename,
                stored_key = %record.stored_key,
                "catalog record present but blob missing"
            );
            return Err(StashError::Corrupt(format!(
                "file '{filename}' has a record but no stored blob"
            )));
        }

        self.store.remove(&record.stored_key)?;
        self.catalog().delete(filename, owner).await?;

        info!(filename = %filename, owner = %owner, "file deleted");
        Ok(())
    }

    /// Search records visible to `username`: owned or shared with them,
    /// filters ANDed.
    pub async fn search(&self, username: &str, query: &SearchQuery) -> Result<Vec<FileRecord>> {
        self.catalog().search_visible_to(username, query).await
    }

    /// List public records.
    pub async fn list_public(&self) -> Result<Vec<FileRecord>> {
        self.catalog().list_public(MAX_SEARCH_RESULTS).await
    }

    /// Grant `grantee` read access to a file owned by `owner`.
    ///
    /// Idempotent. The grantee must exist in the identity directory.
    pub async fn share(&self, owner: &str, filename: &str, grantee: &str) -> Result<()> {
        self.catalog()
            .find_owned(filename, owner)
            .await?
            .ok_or_else(|| StashError::NotFound(format!("file '{filename}'")))?;

        if !self.users().username_exists(grantee).await? {
            return Err(StashError::UnknownUser(grantee.to_string()));
        }

        let granted = self.catalog().add_share(filename, owner, grantee).await?;
        if !granted {
            // The file vanished between lookup and grant
            return Err(StashError::NotFound(format!("file '{filename}'")));
        }

        info!(filename = %filename, owner = %owner, grantee = %grantee, "file shared");
        Ok(())
    }

    /// Flip a file's visibility, owner only.
    pub async fn toggle_visibility(
        &self,
        owner: &str,
        filename: &str,
        make_public: bool,
    ) -> Result<Visibility> {
        let visibility = Visibility::from_public_flag(make_public);

        let updated = self
            .catalog()
            .set_visibility(filename, owner, visibility)
            .await?;
        if !updated {
            return Err(StashError::NotFound(format!("file '{filename}'")));
        }

        info!(filename = %filename, owner = %owner, visibility = %visibility, "visibility changed");
        Ok(visibility)
    }
}
