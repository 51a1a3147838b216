//! Error taxonomy, split the way the teacher splits `GameError` (rules-level) from
//! `ServiceError` (orchestration/infra), each with its own HTTP projection.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised by a `GameModel::apply`. Never crash a worker; always reported
/// verbatim to the caller that made the move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum GameError {
    InvalidPlayer(String),
    InvalidTurn,
    CellOccupied,
    OutOfBounds,
    GameOver,
    Unknown(String),
}

impl GameError {
    pub fn message(&self) -> String {
        match self {
            GameError::InvalidPlayer(id) => format!("{} is not a player in this match", id),
            GameError::InvalidTurn => "it is not your turn".to_string(),
            GameError::CellOccupied => "that cell is already occupied".to_string(),
            GameError::OutOfBounds => "that move is out of bounds".to_string(),
            GameError::GameOver => "The game is already over.".to_string(),
            GameError::Unknown(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for GameError {}

/// Orchestration and infrastructure errors. Every variant has exactly one HTTP
/// projection via `to_http_response`, mirroring the teacher's `ServiceError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum ServiceError {
    LobbyNotFound(String),
    LobbyFull,
    AlreadyJoined,
    NotJoinable,
    NotHost,
    NotReady,
    MatchNotFound(String),
    UnsupportedGameType(String),
    Game(GameError),
    Decode(String),
    Storage(String),
    Auth(String),
    Timeout,
    BadRequest(String),
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(msg: &str) -> Self {
        ServiceError::BadRequest(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        ServiceError::Internal(msg.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::LobbyNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::LobbyFull
            | ServiceError::AlreadyJoined
            | ServiceError::NotJoinable
            | ServiceError::NotHost
            | ServiceError::NotReady
            | ServiceError::UnsupportedGameType(_)
            | ServiceError::BadRequest(_)
            | ServiceError::Decode(_) => StatusCode::BAD_REQUEST,
            // Game errors are surfaced as 404s per SPEC_FULL.md §8 scenario 2/3: a move
            // against a match that can no longer accept it reads like "no such move".
            ServiceError::Game(_) => StatusCode::NOT_FOUND,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            ServiceError::LobbyNotFound(id) => format!("No such lobby: {}", id),
            ServiceError::LobbyFull => "lobby is full".to_string(),
            ServiceError::AlreadyJoined => "already in game".to_string(),
            ServiceError::NotJoinable => "game already started or ended".to_string(),
            ServiceError::NotHost => {
                "Only host can start, and game must be ready to start".to_string()
            }
            ServiceError::NotReady => {
                "Only host can start, and game must be ready to start".to_string()
            }
            ServiceError::MatchNotFound(id) => format!("No game found with gameId {}", id),
            ServiceError::UnsupportedGameType(t) => format!("unsupported game type: {}", t),
            ServiceError::Game(e) => e.message(),
            ServiceError::Decode(msg) => format!("decode error: {}", msg),
            ServiceError::Storage(msg) => format!("storage error: {}", msg),
            ServiceError::Auth(msg) => msg.clone(),
            ServiceError::Timeout => "request timed out".to_string(),
            ServiceError::BadRequest(msg) => msg.clone(),
            ServiceError::Internal(msg) => msg.clone(),
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("application/json")
            .json(ErrorBody {
                error: self.message(),
            })
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

impl From<GameError> for ServiceError {
    fn from(e: GameError) -> Self {
        ServiceError::Game(e)
    }
}
