//! Search filters for the STASH catalog.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{Result, StashError};

/// Filters for a catalog search. All filters are optional and ANDed.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Case-insensitive filename substring.
    pub name: Option<String>,
    /// Exact content type.
    pub content_type: Option<String>,
    /// Inclusive lower bound on upload time (ISO-8601).
    pub from: Option<String>,
    /// Inclusive upper bound on upload time (ISO-8601).
    pub to: Option<String>,
    /// Rows to skip, for paging past the result cap.
    pub offset: u32,
}

impl SearchQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by filename substring.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by exact content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Filter by inclusive upload-time range.
    pub fn uploaded_between(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self.to = Some(to.into());
        self
    }

    /// Skip the first `offset` matches.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Parse and validate the time bounds.
    ///
    /// Fails with `InvalidQuery` on a malformed bound or an inverted range.
    pub fn parse_range(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let from = self.from.as_deref().map(parse_bound).transpose()?;
        let to = self.to.as_deref().map(parse_bound).transpose()?;

        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(StashError::InvalidQuery(
                    "'from' must not be after 'to'".to_string(),
                ));
            }
        }

        Ok((from, to))
    }
}

/// Parse an ISO-8601 bound. Accepts RFC 3339, a naive datetime, or a bare
/// date; naive values are taken as UTC.
fn parse_bound(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(StashError::InvalidQuery(format!(
        "invalid timestamp '{s}', use ISO format: YYYY-MM-DDTHH:MM:SS"
    )))
}
