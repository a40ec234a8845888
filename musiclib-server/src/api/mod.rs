//! HTTP API handlers for musiclib

use serde::Serialize;

pub mod artists;
pub mod error;
pub mod health;
pub mod middleware;
pub mod songs;
pub mod validation;

pub use error::{parse_id, ApiError, ErrorResponse, FieldError};
pub use health::health;

/// Envelope status discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Envelope with no payload (DELETE responses)
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: Status,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: Status::Ok }
    }
}
