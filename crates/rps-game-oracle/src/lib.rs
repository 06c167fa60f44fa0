//! RPS Game Oracle Service
//!
//! HTTP service that hosts commit-reveal games: it keeps the registry,
//! collects commitments and reveals, and publishes results.

pub mod config;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rps_game_core::{
    protocol::{CommitMessage, CreateGameMessage, RevealMessage},
    GameError, GameOutcome, GameRegistry, GameSnapshot, PlayerId, RegistryError, RevealStatus,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::debug;

pub use config::OracleConfig;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Body missing, not JSON, or not the expected shape
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Registry(RegistryError::InvalidIdentity(_))
            | AppError::Registry(RegistryError::InvalidChoice(_))
            | AppError::Body(_) => StatusCode::BAD_REQUEST,
            AppError::Registry(RegistryError::GameNotFound) => StatusCode::NOT_FOUND,
            AppError::Registry(RegistryError::Game(_)) => StatusCode::CONFLICT,
        };
        debug!(%status, error = %self, "request rejected");
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Oracle state
#[derive(Default)]
pub struct OracleState {
    registry: GameRegistry,
}

impl OracleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }
}

// === Response types ===

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct RevealResponse {
    status: &'static str,
    result: Option<GameOutcome>,
}

#[derive(Serialize)]
struct GameResultResponse {
    status: &'static str,
    result: Option<GameOutcome>,
}

#[derive(Serialize)]
struct PlayerGamesResponse {
    games: Vec<GameSnapshot>,
}

// === Route handlers ===

async fn health() -> &'static str {
    "ok"
}

async fn create_game(
    State(state): State<Arc<OracleState>>,
    req: Result<Json<CreateGameMessage>, JsonRejection>,
) -> Result<Json<GameSnapshot>, AppError> {
    let Json(req) = req?;
    let handle = state
        .registry
        .create_game(req.initiator, req.responder, req.commitment)?;
    Ok(Json(handle.snapshot()))
}

async fn submit_commit(
    State(state): State<Arc<OracleState>>,
    req: Result<Json<CommitMessage>, JsonRejection>,
) -> Result<Json<GameSnapshot>, AppError> {
    let Json(req) = req?;
    state
        .registry
        .submit_responder_commitment(req.caller, req.counterparty, req.commitment)?;
    Ok(Json(state.registry.snapshot(req.caller, req.counterparty)?))
}

async fn submit_reveal(
    State(state): State<Arc<OracleState>>,
    req: Result<Json<RevealMessage>, JsonRejection>,
) -> Result<Json<RevealResponse>, AppError> {
    let Json(req) = req?;
    let status = state
        .registry
        .reveal_choice(req.caller, req.counterparty, req.choice, req.secret)?;

    Ok(Json(match status {
        RevealStatus::AwaitingOpponent => RevealResponse {
            status: "waiting_for_opponent",
            result: None,
        },
        RevealStatus::Adjudicated(outcome) => RevealResponse {
            status: "game_complete",
            result: Some(outcome),
        },
    }))
}

async fn get_game(
    State(state): State<Arc<OracleState>>,
    Path((caller, counterparty)): Path<(PlayerId, PlayerId)>,
) -> Result<Json<GameSnapshot>, AppError> {
    Ok(Json(state.registry.snapshot(caller, counterparty)?))
}

async fn get_result(
    State(state): State<Arc<OracleState>>,
    Path((caller, counterparty)): Path<(PlayerId, PlayerId)>,
) -> Result<Json<GameResultResponse>, AppError> {
    match state.registry.get_result(caller, counterparty) {
        Ok(outcome) => Ok(Json(GameResultResponse {
            status: "completed",
            result: Some(outcome),
        })),
        Err(RegistryError::Game(GameError::NotReady(_))) => Ok(Json(GameResultResponse {
            status: "pending",
            result: None,
        })),
        Err(e) => Err(e.into()),
    }
}

async fn list_player_games(
    State(state): State<Arc<OracleState>>,
    Path(player): Path<PlayerId>,
) -> Json<PlayerGamesResponse> {
    Json(PlayerGamesResponse {
        games: state.registry.games_for(player),
    })
}

pub fn create_router(state: Arc<OracleState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/game/create", post(create_game))
        .route("/game/commit", post(submit_commit))
        .route("/game/reveal", post(submit_reveal))
        .route("/game/:caller/:counterparty", get(get_game))
        .route("/game/:caller/:counterparty/result", get(get_result))
        .route("/player/:player/games", get(list_player_games))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
