//! File metadata types for the STASH catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

/// Who may read a file without an explicit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Readable only by the owner and explicitly shared users.
    #[default]
    Private,
    /// Readable by anyone, including anonymous actors.
    Public,
}

impl Visibility {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }

    /// Construct from the upload flag.
    pub fn from_public_flag(make_public: bool) -> Self {
        if make_public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "public" => Ok(Visibility::Public),
            _ => Err(format!("unknown visibility: {s}")),
        }
    }
}

/// Metadata record for one hosted file.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Display name and lookup key for all operations.
    pub filename: String,
    /// Opaque storage key addressing the blob on disk.
    pub stored_key: String,
    /// Username of the uploader.
    pub owner: String,
    /// MIME content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Current visibility.
    pub visibility: Visibility,
    /// Usernames granted read access. Never contains the owner.
    pub shared_with: Vec<String>,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Display name.
    pub filename: String,
    /// Opaque storage key.
    pub stored_key: String,
    /// Username of the uploader.
    pub owner: String,
    /// MIME content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Initial visibility.
    pub visibility: Visibility,
}

impl NewFileRecord {
    /// Create a new record with private visibility.
    pub fn new(
        filename: impl Into<String>,
        stored_key: impl Into<String>,
        owner: impl Into<String>,
        content_type: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            filename: filename.into(),
            stored_key: stored_key.into(),
            owner: owner.into(),
            content_type: content_type.into(),
            size,
            visibility: Visibility::Private,
        }
    }

    /// Set the initial visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Render a timestamp in the canonical stored form (RFC 3339, UTC, second
/// precision). The fixed width keeps string comparison consistent with
/// chronological order, which the range filter relies on.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp, falling back to now on a malformed value.
pub(crate) fn read_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
