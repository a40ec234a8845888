//! Artist endpoints
//!
//! - GET    /artists       list every artist
//! - POST   /artists       create an artist
//! - GET    /artists/:id   fetch one artist
//! - PUT    /artists/:id   overwrite name and is_group
//! - DELETE /artists/:id   delete (songs cascade)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use musiclib_common::db::{Artist, Store};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::validation::{self, Validate, Violations};
use super::{parse_id, ApiError, Status, StatusResponse};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateArtistRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_group: bool,
}

impl Validate for CreateArtistRequest {
    fn check(&self, violations: &mut Violations) {
        violations.check("name", validation::required_name(&self.name));
    }
}

/// Both fields are written back even when omitted (empty name, `false`)
#[derive(Debug, Deserialize)]
pub struct UpdateArtistRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_group: bool,
}

impl Validate for UpdateArtistRequest {
    fn check(&self, violations: &mut Violations) {
        violations.check("name", validation::optional_name(&self.name));
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistListResponse {
    pub status: Status,
    pub artists: Vec<Artist>,
}

#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub status: Status,
    pub artist: Artist,
}

impl ArtistResponse {
    fn ok(artist: Artist) -> Json<Self> {
        Json(Self {
            status: Status::Ok,
            artist,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /artists
pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<ArtistListResponse>, ApiError> {
    let artists = state
        .store
        .find_all::<Artist>()
        .await
        .map_err(|e| ApiError::storage("failed to load artists", e))?;

    Ok(Json(ArtistListResponse {
        status: Status::Ok,
        artists,
    }))
}

/// POST /artists
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateArtistRequest>, JsonRejection>,
) -> Result<Json<ArtistResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let artist = state
        .store
        .create(Artist::new(request.name, request.is_group))
        .await
        .map_err(|e| ApiError::storage("failed to create artist", e))?;

    info!(id = artist.id, name = %artist.name, "Artist created");
    Ok(ArtistResponse::ok(artist))
}

/// GET /artists/:id
pub async fn get<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ArtistResponse>, ApiError> {
    let id = parse_id(&raw_id)?;

    let artist = state
        .store
        .first_by_id::<Artist>(id)
        .await
        .map_err(|e| ApiError::storage("failed to load artist", e))?;

    Ok(ArtistResponse::ok(artist))
}

/// PUT /artists/:id
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateArtistRequest>, JsonRejection>,
) -> Result<Json<ArtistResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(request) = payload?;
    request.validate()?;

    let mut artist = state
        .store
        .first_by_id::<Artist>(id)
        .await
        .map_err(|e| ApiError::storage("failed to load artist", e))?;

    artist.name = request.name;
    artist.is_group = request.is_group;

    let artist = state
        .store
        .save(artist)
        .await
        .map_err(|e| ApiError::storage("failed to update artist", e))?;

    info!(id = artist.id, "Artist updated");
    Ok(ArtistResponse::ok(artist))
}

/// DELETE /artists/:id
///
/// Succeeds whether or not the artist existed.
pub async fn delete<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = parse_id(&raw_id)?;

    let removed = state
        .store
        .delete_by_id::<Artist>(id)
        .await
        .map_err(|e| ApiError::storage("failed to delete artist", e))?;

    info!(id, removed, "Artist delete");
    Ok(Json(StatusResponse::ok()))
}
