//! Request and response DTOs for the STASH HTTP layer.
//!
//! Response types are secret-free: they expose display metadata only,
//! never row ids or storage keys.

use serde::{Deserialize, Serialize};

use crate::catalog::FileRecord;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token type, always "bearer".
    pub token_type: String,
}

/// Share request.
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    /// File to share.
    pub filename: String,
    /// Username to grant read access to.
    pub share_with: String,
}

/// Visibility toggle request.
#[derive(Debug, Deserialize)]
pub struct VisibilityToggleRequest {
    /// File to update.
    pub filename: String,
    /// New visibility.
    pub make_public: bool,
}

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive filename substring.
    pub name: Option<String>,
    /// Exact content type.
    pub content_type: Option<String>,
    /// Inclusive lower bound on upload time (ISO-8601).
    pub from: Option<String>,
    /// Inclusive upper bound on upload time (ISO-8601).
    pub to: Option<String>,
    /// Rows to skip, for paging.
    #[serde(default)]
    pub offset: u32,
}

/// Generic confirmation response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub detail: String,
}

impl MessageResponse {
    /// Create a confirmation message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Upload response, echoing the filename.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// The uploaded file's name.
    pub filename: String,
}

/// A file record as exposed to API callers.
#[derive(Debug, Serialize)]
pub struct FileRecordResponse {
    /// Display filename.
    pub filename: String,
    /// Owner's username.
    pub owner: String,
    /// MIME content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// "private" or "public".
    pub visibility: String,
    /// Usernames with read access.
    pub shared_with: Vec<String>,
    /// Upload timestamp (RFC 3339).
    pub uploaded_at: String,
}

impl From<FileRecord> for FileRecordResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            filename: record.filename,
            owner: record.owner,
            content_type: record.content_type,
            size: record.size,
            visibility: record.visibility.to_string(),
            shared_with: record.shared_with,
            uploaded_at: record
                .uploaded_at
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Visibility;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_record_response_omits_stored_key() {
        let record = FileRecord {
            filename: "doc.txt".to_string(),
            stored_key: "secret-key.txt".to_string(),
            owner: "alice".to_string(),
            content_type: "text/plain".to_string(),
            size: 12,
            visibility: Visibility::Public,
            shared_with: vec!["bob".to_string()],
            uploaded_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        };

        let response = FileRecordResponse::from(record);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["filename"], "doc.txt");
        assert_eq!(json["visibility"], "public");
        assert_eq!(json["uploaded_at"], "2025-01-02T03:04:05Z");
        // No internal identifiers leak
        assert!(json.get("stored_key").is_none());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_search_params_defaults() {
        let params: SearchParams = serde_json::from_str("{}").unwrap();
        assert!(params.name.is_none());
        assert_eq!(params.offset, 0);
    }
}
