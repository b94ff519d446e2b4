//! HTTP handlers.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use tictactoe_engine::{GameId, GameMode};
use tracing::{debug, instrument};

use crate::api::ApiError;
use crate::api::dto::{GameQuery, GameResponse, HealthResponse, MoveRequest, NewGameRequest};
use crate::service::GameService;

fn game_id(query: &GameQuery) -> Result<GameId, ApiError> {
    query
        .parsed()
        .ok_or_else(|| ApiError::MalformedId(query.game_id.clone()))
}

async fn create(service: &GameService, mode: GameMode) -> Result<Json<GameResponse>, ApiError> {
    let snapshot = service.create_game(mode).await?;
    Ok(Json(GameResponse::from(&snapshot)))
}

/// `GET /api/v1/tictactoe/ai`
#[instrument(skip(service))]
pub async fn create_automated(
    State(service): State<GameService>,
) -> Result<Json<GameResponse>, ApiError> {
    create(&service, GameMode::HumanVsAutomated).await
}

/// `GET /api/v1/tictactoe/person`
#[instrument(skip(service))]
pub async fn create_human(
    State(service): State<GameService>,
) -> Result<Json<GameResponse>, ApiError> {
    create(&service, GameMode::HumanVsHuman).await
}

/// `POST /api/v1/tictactoe/new` with the mode in the body.
#[instrument(skip(service))]
pub async fn create_with_mode(
    State(service): State<GameService>,
    body: Result<Json<NewGameRequest>, JsonRejection>,
) -> Result<Json<GameResponse>, ApiError> {
    let Json(req) = body?;
    create(&service, req.mode.into()).await
}

/// `POST /api/v1/tictactoe?gameId=ID`
#[instrument(skip(service))]
pub async fn make_move(
    State(service): State<GameService>,
    query: Result<Query<GameQuery>, QueryRejection>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameResponse>, ApiError> {
    let Query(query) = query?;
    let Json(req) = body?;
    let id = game_id(&query)?;
    let snapshot = service.play(id, req.x, req.y).await?;
    debug!(game_id = id, moves = snapshot.moves().len(), "Move handled");
    Ok(Json(GameResponse::from(&snapshot)))
}

/// `GET /api/v1/tictactoe?gameId=ID`
#[instrument(skip(service))]
pub async fn get_game(
    State(service): State<GameService>,
    query: Result<Query<GameQuery>, QueryRejection>,
) -> Result<Json<GameResponse>, ApiError> {
    let Query(query) = query?;
    let id = game_id(&query)?;
    let snapshot = service.get_game(id).await?;
    Ok(Json(GameResponse::from(&snapshot)))
}

/// `DELETE /api/v1/tictactoe?gameId=ID`. Answers 200 whether or not the
/// game existed.
#[instrument(skip(service))]
pub async fn delete_game(
    State(service): State<GameService>,
    query: Result<Query<GameQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let Query(query) = query?;
    match query.parsed() {
        Some(id) => service.delete_game(id).await?,
        None => debug!(raw = %query.game_id, "Ignoring delete of malformed id"),
    }
    Ok(StatusCode::OK)
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
