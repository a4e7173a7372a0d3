//! HTTP layer for STASH.
//!
//! Thin plumbing from routes to the hosting service: DTOs, auth
//! extractors, error mapping, router, and server loop.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use handlers::AppState;
pub use middleware::{AuthUser, OptionalAuthUser};
pub use router::create_router;
pub use server::serve;
