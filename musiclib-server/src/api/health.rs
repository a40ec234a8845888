//! Liveness probe

/// GET /health
///
/// Plain-text `OK`. Never touches the database, so it answers even while
/// the store is unreachable.
pub async fn health() -> &'static str {
    "OK"
}
