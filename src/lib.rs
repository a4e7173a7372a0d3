//! STASH - Multi-tenant file hosting service.
//!
//! Users upload files, own them by default, and may selectively grant read
//! access to other users or make a file world-readable. The core is the
//! access-controlled metadata and storage coordination subsystem; HTTP
//! transport and credential plumbing are thin layers around it.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod policy;
pub mod service;
pub mod store;
pub mod web;

pub use auth::{hash_password, validate_password, validate_username, verify_password, TokenIssuer};
pub use catalog::{
    CatalogRepository, FileRecord, NewFileRecord, SearchQuery, Visibility, MAX_SEARCH_RESULTS,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{Result, StashError};
pub use policy::{decide, Actor, Decision, FileOperation};
pub use service::{FetchResult, HostingService, UploadRequest};
pub use store::BlobStore;
