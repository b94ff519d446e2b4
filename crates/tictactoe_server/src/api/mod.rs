//! HTTP/JSON interface.

pub mod dto;
mod error;
mod handlers;

pub use error::ApiError;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tracing::{info, instrument};

use crate::service::GameService;

/// Path prefix of the game endpoints.
pub const API_PREFIX: &str = "/api/v1/tictactoe";

/// Builds the application router with request logging.
#[instrument(skip(service))]
pub fn router(service: GameService) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            API_PREFIX,
            get(handlers::get_game)
                .post(handlers::make_move)
                .delete(handlers::delete_game),
        )
        .route(&format!("{API_PREFIX}/ai"), get(handlers::create_automated))
        .route(&format!("{API_PREFIX}/person"), get(handlers::create_human))
        .route(&format!("{API_PREFIX}/new"), post(handlers::create_with_mode))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(
                method = %req.method(),
                uri = %req.uri(),
                "Incoming HTTP request"
            );
            req
        }))
        .with_state(service)
}
