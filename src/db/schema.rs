//! Database schema and migrations for STASH.
//!
//! Migrations are applied sequentially when the database is opened; the
//! schema_version table tracks which have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users table (identity directory)
    r#"
-- Registered users. Records are never deleted.
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,           -- Argon2 PHC string
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: files and file_shares tables (metadata catalog)
    r#"
-- One record per hosted file. The blob lives on disk under stored_key;
-- filename is the display name and the lookup key for all operations.
CREATE TABLE files (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    filename     TEXT NOT NULL UNIQUE,
    stored_key   TEXT NOT NULL UNIQUE,
    owner        TEXT NOT NULL REFERENCES users(username),
    content_type TEXT NOT NULL,
    size         INTEGER NOT NULL,
    visibility   TEXT NOT NULL DEFAULT 'private',  -- 'private' or 'public'
    uploaded_at  TEXT NOT NULL
);

CREATE INDEX idx_files_owner ON files(owner);
CREATE INDEX idx_files_visibility ON files(visibility);
CREATE INDEX idx_files_uploaded_at ON files(uploaded_at);

-- Read grants. UNIQUE keeps shared_with a set.
CREATE TABLE file_shares (
    file_id  INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    grantee  TEXT NOT NULL REFERENCES users(username),
    UNIQUE(file_id, grantee)
);

CREATE INDEX idx_file_shares_grantee ON file_shares(grantee);
"#,
];
