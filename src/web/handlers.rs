//! HTTP handlers for STASH.
//!
//! Thin bindings from routes to the hosting service. Handlers resolve the
//! actor from the request, call the coordinator, and map the result to a
//! DTO; no access decisions are made here.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{
    FileRecordResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    SearchParams, ShareRequest, UploadResponse, VisibilityToggleRequest,
};
use super::error::ApiError;
use super::middleware::{AuthUser, OptionalAuthUser};
use crate::auth::TokenIssuer;
use crate::catalog::SearchQuery;
use crate::policy::Actor;
use crate::service::{HostingService, UploadRequest};

/// Application state shared across handlers.
pub struct AppState {
    /// The hosting coordinator.
    pub service: HostingService,
    /// Access token issuer.
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    pub fn new(service: HostingService, tokens: TokenIssuer) -> Self {
        Self { service, tokens }
    }
}

/// POST /register - create a user account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.service.register(&req.username, &req.password).await?;
    Ok(Json(MessageResponse::new("user registered successfully")))
}

/// POST /login - exchange credentials for an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .service
        .authenticate(&req.username, &req.password)
        .await?;

    let access_token = state
        .tokens
        .issue(&user.username)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to issue token");
            ApiError::internal("failed to issue token")
        })?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /upload - multipart file upload.
///
/// Expects a `file` part; an optional `is_public` part ("true"/"false")
/// controls initial visibility.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut make_public = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::bad_request("file part has no filename"))?;
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&filename)
                            .first_or_octet_stream()
                            .to_string()
                    });
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read file: {e}")))?;

                file = Some((filename, content_type, content.to_vec()));
            }
            Some("is_public") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read field: {e}")))?;
                make_public = value.trim() == "true";
            }
            _ => {}
        }
    }

    let (filename, content_type, content) =
        file.ok_or_else(|| ApiError::bad_request("missing 'file' part"))?;

    let record = state
        .service
        .upload(
            user.username(),
            &UploadRequest::new(filename, content)
                .content_type(content_type)
                .public(make_public),
        )
        .await?;

    Ok(Json(UploadResponse {
        filename: record.filename,
    }))
}

/// GET /files/{filename} - download a file.
pub async fn download(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let actor = Actor::from_username(user.username());
    let result = state.service.fetch(&actor, &filename).await?;

    Ok((
        [(header::CONTENT_TYPE, result.record.content_type)],
        result.content,
    )
        .into_response())
}

/// DELETE /files/{filename} - delete an owned file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.service.delete(user.username(), &filename).await?;
    Ok(Json(MessageResponse::new("file deleted")))
}

/// GET /files - search files visible to the caller.
pub async fn search(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FileRecordResponse>>, ApiError> {
    let query = SearchQuery {
        name: params.name,
        content_type: params.content_type,
        from: params.from,
        to: params.to,
        offset: params.offset,
    };

    let records = state.service.search(user.username(), &query).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// GET /public-files - list public files.
pub async fn public_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileRecordResponse>>, ApiError> {
    let records = state.service.list_public().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /files/share - grant another user read access.
pub async fn share(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ShareRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .service
        .share(user.username(), &req.filename, &req.share_with)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "file '{}' shared with '{}'",
        req.filename, req.share_with
    ))))
}

/// POST /files/toggle-visibility - flip a file between public and private.
pub async fn toggle_visibility(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<VisibilityToggleRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let visibility = state
        .service
        .toggle_visibility(user.username(), &req.filename, req.make_public)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "file visibility updated to {visibility}"
    ))))
}
