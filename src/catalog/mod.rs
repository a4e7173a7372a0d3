//! Metadata catalog for STASH.
//!
//! One durable record per hosted file: owner, visibility, share list,
//! content type, size, upload time. Supports filtered search scoped to what
//! a user may see, and owner-scoped mutations.

mod query;
mod record;
mod repository;

pub use query::SearchQuery;
pub use record::{FileRecord, NewFileRecord, Visibility};
pub use repository::CatalogRepository;

/// Hard cap on search and listing result sets. Callers page past it with
/// the query offset.
pub const MAX_SEARCH_RESULTS: u32 = 100;

/// Maximum length for a display filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;
