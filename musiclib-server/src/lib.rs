//! musiclib server library - music catalog HTTP API
//!
//! Router and shared state live here so the binary and the integration
//! tests build the exact same service.

use axum::{middleware, routing::get, Router};
use musiclib_common::db::Store;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod logging;
pub mod shutdown;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Catalog storage (PostgreSQL in production)
    pub store: S,
}

impl<S: Store> AppState<S> {
    /// Create new application state
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router<S: Store>(state: AppState<S>) -> Router {
    let catalog = Router::new()
        .route(
            "/artists",
            get(api::artists::list::<S>).post(api::artists::create::<S>),
        )
        .route(
            "/artists/:id",
            get(api::artists::get::<S>)
                .put(api::artists::update::<S>)
                .delete(api::artists::delete::<S>),
        )
        .route(
            "/songs",
            get(api::songs::list::<S>).post(api::songs::create::<S>),
        )
        .route(
            "/songs/:id",
            get(api::songs::get::<S>)
                .put(api::songs::update::<S>)
                .delete(api::songs::delete::<S>),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(api::health))
        .merge(catalog)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(api::middleware::request_span)
                        .on_request(())
                        .on_response(())
                        .on_failure(()),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(api::middleware::real_ip))
                .layer(middleware::from_fn(api::middleware::access_log))
                .layer(CatchPanicLayer::custom(api::middleware::panic_response)),
        )
}
