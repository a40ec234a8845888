//! Song endpoints
//!
//! - GET    /songs       list every song
//! - POST   /songs       create a song, optionally with its detail
//! - GET    /songs/:id   fetch one song with its detail
//! - PUT    /songs/:id   overwrite name, reassign artist, upsert detail
//! - DELETE /songs/:id   delete (detail cascades)
//!
//! Song and detail are written with separate statements, not in one
//! transaction.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::NaiveDate;
use musiclib_common::db::{Song, SongDetail, Store};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::validation::{self, Validate, Violations};
use super::{parse_id, ApiError, Status, StatusResponse};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SongDetailRequest {
    #[serde(default)]
    pub text: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub link: Option<String>,
}

impl SongDetailRequest {
    fn check(&self, violations: &mut Violations) {
        violations.check("detail.text", validation::required(&self.text));
        if let Some(link) = &self.link {
            violations.check("detail.link", validation::link(link));
        }
    }
}

/// A missing `artist_id` is left to the artist foreign key to reject
#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    #[serde(default)]
    pub name: String,
    pub artist_id: Option<i64>,
    pub detail: Option<SongDetailRequest>,
}

impl Validate for CreateSongRequest {
    fn check(&self, violations: &mut Violations) {
        violations.check("name", validation::required_name(&self.name));
        if let Some(artist_id) = self.artist_id {
            violations.check("artist_id", validation::positive_id(artist_id));
        }
        if let Some(detail) = &self.detail {
            detail.check(violations);
        }
    }
}

/// `name` is always written back; `artist_id` only when given
#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
    #[serde(default)]
    pub name: String,
    pub artist_id: Option<i64>,
    pub detail: Option<SongDetailRequest>,
}

impl Validate for UpdateSongRequest {
    fn check(&self, violations: &mut Violations) {
        violations.check("name", validation::optional_name(&self.name));
        if let Some(artist_id) = self.artist_id {
            violations.check("artist_id", validation::positive_id(artist_id));
        }
        if let Some(detail) = &self.detail {
            detail.check(violations);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub status: Status,
    pub songs: Vec<Song>,
}

/// A song with its detail, when it has one
#[derive(Debug, Serialize)]
pub struct SongView {
    #[serde(flatten)]
    pub song: Song,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_detail: Option<SongDetail>,
}

#[derive(Debug, Serialize)]
pub struct SongResponse {
    pub status: Status,
    pub song: SongView,
}

impl SongResponse {
    fn ok(song: Song, song_detail: Option<SongDetail>) -> Json<Self> {
        Json(Self {
            status: Status::Ok,
            song: SongView { song, song_detail },
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /songs
pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<SongListResponse>, ApiError> {
    let songs = state
        .store
        .find_all::<Song>()
        .await
        .map_err(|e| ApiError::storage("failed to load songs", e))?;

    Ok(Json(SongListResponse {
        status: Status::Ok,
        songs,
    }))
}

/// POST /songs
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateSongRequest>, JsonRejection>,
) -> Result<Json<SongResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let artist_id = request.artist_id.unwrap_or_default();
    let song = state
        .store
        .create(Song::new(request.name, artist_id))
        .await
        .map_err(|e| ApiError::storage("failed to create song", e))?;

    let song_detail = match request.detail {
        Some(detail) => Some(
            state
                .store
                .create(SongDetail::new(
                    song.id,
                    detail.text,
                    detail.release_date,
                    detail.link,
                ))
                .await
                .map_err(|e| ApiError::storage("failed to create song detail", e))?,
        ),
        None => None,
    };

    info!(id = song.id, artist_id, with_detail = song_detail.is_some(), "Song created");
    Ok(SongResponse::ok(song, song_detail))
}

/// GET /songs/:id
pub async fn get<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<SongResponse>, ApiError> {
    let id = parse_id(&raw_id)?;

    let song = state
        .store
        .first_by_id::<Song>(id)
        .await
        .map_err(|e| ApiError::storage("failed to load song", e))?;
    let song_detail = find_detail(&state.store, song.id).await?;

    Ok(SongResponse::ok(song, song_detail))
}

/// PUT /songs/:id
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateSongRequest>, JsonRejection>,
) -> Result<Json<SongResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(request) = payload?;
    request.validate()?;

    let mut song = state
        .store
        .first_by_id::<Song>(id)
        .await
        .map_err(|e| ApiError::storage("failed to load song", e))?;

    song.name = request.name;
    if let Some(artist_id) = request.artist_id {
        song.artist_id = artist_id;
    }

    let song = state
        .store
        .save(song)
        .await
        .map_err(|e| ApiError::storage("failed to update song", e))?;

    let existing = find_detail(&state.store, song.id).await?;
    let song_detail = match (request.detail, existing) {
        (Some(detail), Some(mut current)) => {
            current.text = detail.text;
            current.release_date = detail.release_date;
            current.link = detail.link;
            Some(
                state
                    .store
                    .save(current)
                    .await
                    .map_err(|e| ApiError::storage("failed to update song detail", e))?,
            )
        }
        (Some(detail), None) => Some(
            state
                .store
                .create(SongDetail::new(
                    song.id,
                    detail.text,
                    detail.release_date,
                    detail.link,
                ))
                .await
                .map_err(|e| ApiError::storage("failed to create song detail", e))?,
        ),
        (None, existing) => existing,
    };

    info!(id = song.id, "Song updated");
    Ok(SongResponse::ok(song, song_detail))
}

/// DELETE /songs/:id
///
/// Succeeds whether or not the song existed.
pub async fn delete<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = parse_id(&raw_id)?;

    let removed = state
        .store
        .delete_by_id::<Song>(id)
        .await
        .map_err(|e| ApiError::storage("failed to delete song", e))?;

    info!(id, removed, "Song delete");
    Ok(Json(StatusResponse::ok()))
}

/// Detail of `song_id`, `None` when the song has none
async fn find_detail<S: Store>(store: &S, song_id: i64) -> Result<Option<SongDetail>, ApiError> {
    match store.first_by::<SongDetail>("song_id", song_id).await {
        Ok(detail) => Ok(Some(detail)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(ApiError::storage("failed to load song detail", e)),
    }
}
