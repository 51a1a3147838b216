//! HTTP adapter, per SPEC_FULL.md §6: auth, parameter parsing, request→supervisor ask.
//! Handlers never build `HttpResponse`s for error paths by hand — every `ServiceError`
//! goes through `to_http_response`, mirroring the teacher's own handler shape of
//! "extract, ask, project".

use crate::auth::{issue_token, AuthenticatedPlayer};
use crate::domain::{GameId, GameOperation, GameType, Player, PlayerId};
use crate::errors::ServiceError;
use crate::supervisor::SupervisorHandle;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // actix-web's top-level router commits to the first service whose prefix matches and
    // never backtracks into a sibling if the match's inner routing fails — an empty-prefix
    // `scope("")` matches every path, so every route it would otherwise shadow has to be
    // registered ahead of it. "/lobby/list" also has to come ahead of "/lobby/{gameId}" so
    // the literal segment is never shadowed by the dynamic one.
    cfg.route("/healthz", web::get().to(healthz))
        .route("/auth/token", web::post().to(issue_token_handler))
        .route("/lobby/list", web::get().to(list_lobbies))
        .route("/lobby/{gameId}", web::get().to(get_lobby_info))
        .route("/{gameType}/{gameId}/status", web::get().to(get_status))
        .service(
            web::scope("")
                .wrap(crate::auth::AuthenticationMiddlewareFactory)
                .route("/auth/whoami", web::get().to(whoami))
                .route("/lobby/create/{gameType}", web::post().to(create_lobby))
                .route("/lobby/{gameId}/join", web::post().to(join_lobby))
                .route("/lobby/{gameId}/leave", web::post().to(leave_lobby))
                .route("/lobby/{gameId}/start", web::post().to(start_game))
                .route("/{gameType}/{gameId}/move", web::post().to(make_move)),
        );
}

async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

#[derive(Deserialize)]
struct TokenRequest {
    id: Option<String>,
    name: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

async fn issue_token_handler(body: web::Json<TokenRequest>) -> HttpResponse {
    let id = match &body.id {
        Some(raw) => match PlayerId::from_str(raw) {
            Ok(id) => id,
            Err(_) => return ServiceError::bad_request("id must be a UUID").to_http_response(),
        },
        None => PlayerId::new(),
    };
    let now = chrono::Utc::now().timestamp();
    let token = issue_token(id, &body.name, now);
    HttpResponse::Ok().json(TokenResponse { token })
}

async fn whoami(player: AuthenticatedPlayer) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"id": player.id.to_string(), "name": player.name}))
}

fn parse_game_id(raw: &str) -> Result<GameId, HttpResponse> {
    GameId::from_str(raw).map_err(|_| ServiceError::bad_request("gameId must be a UUID").to_http_response())
}

async fn create_lobby(
    supervisor: web::Data<SupervisorHandle>,
    path: web::Path<String>,
    player: AuthenticatedPlayer,
) -> HttpResponse {
    let game_type = match GameType::from_str(&path) {
        Ok(t) => t,
        Err(e) => return ServiceError::bad_request(&e.to_string()).to_http_response(),
    };
    let host = Player {
        id: player.id,
        name: player.name,
    };
    match supervisor.create_lobby(game_type, host).await {
        Ok(created) => HttpResponse::Ok().json(serde_json::json!({"gameId": created.game_id})),
        Err(e) => e.to_http_response(),
    }
}

async fn join_lobby(
    supervisor: web::Data<SupervisorHandle>,
    path: web::Path<String>,
    player: AuthenticatedPlayer,
) -> HttpResponse {
    let game_id = match parse_game_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let joiner = Player {
        id: player.id,
        name: player.name,
    };
    match supervisor.join_lobby(game_id, joiner).await {
        Ok(joined) => HttpResponse::Ok().json(joined.metadata),
        Err(e) => e.to_http_response(),
    }
}

async fn leave_lobby(
    supervisor: web::Data<SupervisorHandle>,
    path: web::Path<String>,
    player: AuthenticatedPlayer,
) -> HttpResponse {
    let game_id = match parse_game_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match supervisor.leave_lobby(game_id, player.id).await {
        Ok(left) => HttpResponse::Ok().json(serde_json::json!({"gameId": left.game_id, "reason": left.reason})),
        Err(e) => e.to_http_response(),
    }
}

async fn start_game(
    supervisor: web::Data<SupervisorHandle>,
    path: web::Path<String>,
    player: AuthenticatedPlayer,
) -> HttpResponse {
    let game_id = match parse_game_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match supervisor.start_game(game_id, player.id).await {
        Ok(started) => HttpResponse::Ok().json(serde_json::json!({"gameId": started.game_id})),
        Err(e) => e.to_http_response(),
    }
}

async fn get_lobby_info(supervisor: web::Data<SupervisorHandle>, path: web::Path<String>) -> HttpResponse {
    let game_id = match parse_game_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match supervisor.get_lobby_info(game_id).await {
        Ok(metadata) => HttpResponse::Ok().json(metadata),
        Err(e) => e.to_http_response(),
    }
}

async fn list_lobbies(supervisor: web::Data<SupervisorHandle>) -> HttpResponse {
    match supervisor.list_lobbies().await {
        Ok(lobbies) => HttpResponse::Ok().json(lobbies),
        Err(e) => e.to_http_response(),
    }
}

async fn make_move(
    supervisor: web::Data<SupervisorHandle>,
    path: web::Path<(String, String)>,
    body: web::Bytes,
    player: AuthenticatedPlayer,
) -> HttpResponse {
    let (game_type_raw, game_id_raw) = path.into_inner();
    if let Err(e) = GameType::from_str(&game_type_raw) {
        return ServiceError::bad_request(&e.to_string()).to_http_response();
    }
    let game_id = match parse_game_id(&game_id_raw) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return ServiceError::bad_request(&format!("malformed move body: {}", e)).to_http_response(),
    };
    let op = GameOperation::MakeMove {
        player_id: player.id,
        payload,
    };
    match supervisor.run_game_operation(game_id, op).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.to_http_response(),
    }
}

async fn get_status(supervisor: web::Data<SupervisorHandle>, path: web::Path<(String, String)>) -> HttpResponse {
    let (game_type_raw, game_id_raw) = path.into_inner();
    if let Err(e) = GameType::from_str(&game_type_raw) {
        return ServiceError::bad_request(&e.to_string()).to_http_response();
    }
    let game_id = match parse_game_id(&game_id_raw) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match supervisor.run_game_operation(game_id, GameOperation::GetState).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.to_http_response(),
    }
}
