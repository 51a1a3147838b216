//! Drives the literal end-to-end scenarios in SPEC_FULL.md §8 through the real HTTP
//! router wired to an `InMemoryRepository`, the way the teacher's own integration
//! tests exercise handlers without a live database.

use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use turnforge_service::domain::GameId;
use turnforge_service::http;
use turnforge_service::repository::{Backend, InMemoryRepository, Repository};
use turnforge_service::{persistence, supervisor};

async fn spawn_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    spawn_app_over(Backend::InMemory(InMemoryRepository::new())).await
}

/// Wires the router over any `Repository`, so the restart/corruption scenarios can
/// spawn a fresh supervisor against storage a previous app instance already wrote to.
async fn spawn_app_over<R: Repository + 'static>(
    repo: R,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    let persistence_handle = persistence::spawn(repo);
    let supervisor_handle = supervisor::spawn(persistence_handle);
    test::init_service(
        App::new()
            .app_data(web::Data::new(supervisor_handle))
            .configure(http::configure),
    )
    .await
}

async fn token_for(app: &impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
>, name: &str) -> String {
    let req = test::TestRequest::post()
        .uri("/auth/token")
        .set_json(json!({"name": name}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(app, req).await;
    resp["token"].as_str().unwrap().to_string()
}

fn authed(method: &str, uri: &str, token: &str) -> test::TestRequest {
    let req = match method {
        "GET" => test::TestRequest::get(),
        "POST" => test::TestRequest::post(),
        other => panic!("unsupported method {}", other),
    };
    req.uri(uri).insert_header(("Authorization", format!("Bearer {}", token)))
}

#[actix_web::test]
async fn happy_path_through_a_full_game() {
    let app = spawn_app().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game_id = created["gameId"].as_str().unwrap().to_string();

    let req = authed("POST", &format!("/lobby/{}/join", game_id), &bob).to_request();
    let joined: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(joined["status"], "readyToStart");

    let req = authed("POST", &format!("/lobby/{}/start", game_id), &alice).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = authed("POST", &format!("/tictactoe/{}/move", game_id), &alice)
        .set_json(json!({"row": 0, "col": 0}))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["board"][0][0], "X");
    assert_eq!(view["currentPlayer"], "O");

    let req = authed("POST", &format!("/tictactoe/{}/move", game_id), &bob)
        .set_json(json!({"row": 1, "col": 1}))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["board"][1][1], "O");
}

#[actix_web::test]
async fn winning_line_completes_the_match() {
    let app = spawn_app().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game_id = created["gameId"].as_str().unwrap().to_string();
    let req = authed("POST", &format!("/lobby/{}/join", game_id), &bob).to_request();
    test::call_service(&app, req).await;
    let req = authed("POST", &format!("/lobby/{}/start", game_id), &alice).to_request();
    test::call_service(&app, req).await;

    let moves = [
        (&alice, 0, 0),
        (&bob, 1, 0),
        (&alice, 0, 1),
        (&bob, 1, 1),
        (&alice, 0, 2),
    ];
    let mut last_view = json!(null);
    for (token, row, col) in moves {
        let req = authed("POST", &format!("/tictactoe/{}/move", game_id), token)
            .set_json(json!({"row": row, "col": col}))
            .to_request();
        last_view = test::call_and_read_body_json(&app, req).await;
    }
    assert_eq!(last_view["winner"], "X");
    assert_eq!(last_view["draw"], false);

    let req = authed("POST", &format!("/tictactoe/{}/move", game_id), &bob)
        .set_json(json!({"row": 2, "col": 2}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get().uri(&format!("/lobby/{}", game_id)).to_request();
    let lobby: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(lobby["status"], "completed");
}

#[actix_web::test]
async fn wrong_turn_is_rejected_without_mutating_state() {
    let app = spawn_app().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game_id = created["gameId"].as_str().unwrap().to_string();
    let req = authed("POST", &format!("/lobby/{}/join", game_id), &bob).to_request();
    test::call_service(&app, req).await;
    let req = authed("POST", &format!("/lobby/{}/start", game_id), &alice).to_request();
    test::call_service(&app, req).await;

    let req = authed("POST", &format!("/tictactoe/{}/move", game_id), &bob)
        .set_json(json!({"row": 0, "col": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("not your turn"));

    let req = test::TestRequest::get()
        .uri(&format!("/tictactoe/{}/status", game_id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["currentPlayer"], "X");
    assert!(view["board"][0][0].is_null());
}

#[actix_web::test]
async fn host_leave_cancels_an_unstarted_lobby() {
    let app = spawn_app().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;
    let carl = token_for(&app, "carl").await;

    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game_id = created["gameId"].as_str().unwrap().to_string();
    let req = authed("POST", &format!("/lobby/{}/join", game_id), &bob).to_request();
    test::call_service(&app, req).await;

    let req = authed("POST", &format!("/lobby/{}/leave", game_id), &alice).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri(&format!("/lobby/{}", game_id)).to_request();
    let lobby: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(lobby["status"], "cancelled");

    let req = authed("POST", &format!("/lobby/{}/join", game_id), &carl).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn boundary_out_of_bounds_and_occupied_cell() {
    let app = spawn_app().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game_id = created["gameId"].as_str().unwrap().to_string();
    let req = authed("POST", &format!("/lobby/{}/join", game_id), &bob).to_request();
    test::call_service(&app, req).await;
    let req = authed("POST", &format!("/lobby/{}/start", game_id), &alice).to_request();
    test::call_service(&app, req).await;

    let req = authed("POST", &format!("/tictactoe/{}/move", game_id), &alice)
        .set_json(json!({"row": 3, "col": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = authed("POST", &format!("/tictactoe/{}/move", game_id), &alice)
        .set_json(json!({"row": 0, "col": 0}))
        .to_request();
    test::call_service(&app, req).await;
    let req = authed("POST", &format!("/tictactoe/{}/move", game_id), &bob)
        .set_json(json!({"row": 0, "col": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn lobby_full_and_already_joined_are_rejected() {
    let app = spawn_app().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;
    let carl = token_for(&app, "carl").await;

    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game_id = created["gameId"].as_str().unwrap().to_string();

    let req = authed("POST", &format!("/lobby/{}/join", game_id), &alice).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = authed("POST", &format!("/lobby/{}/join", game_id), &bob).to_request();
    test::call_service(&app, req).await;

    let req = authed("POST", &format!("/lobby/{}/join", game_id), &carl).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn start_by_non_host_is_rejected() {
    let app = spawn_app().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game_id = created["gameId"].as_str().unwrap().to_string();
    let req = authed("POST", &format!("/lobby/{}/join", game_id), &bob).to_request();
    test::call_service(&app, req).await;

    let req = authed("POST", &format!("/lobby/{}/start", game_id), &bob).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn restart_restores_matches_not_lobbies() {
    let shared = Arc::new(InMemoryRepository::new());
    let app = spawn_app_over(shared.clone()).await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    // G1: created but never started — a lobby only, no snapshot ever written for it.
    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let g1 = created["gameId"].as_str().unwrap().to_string();

    // G2: started and moved once — a live match with a persisted snapshot.
    let req = authed("POST", "/lobby/create/tictactoe", &alice).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let g2 = created["gameId"].as_str().unwrap().to_string();
    let req = authed("POST", &format!("/lobby/{}/join", g2), &bob).to_request();
    test::call_service(&app, req).await;
    let req = authed("POST", &format!("/lobby/{}/start", g2), &alice).to_request();
    test::call_service(&app, req).await;
    let req = authed("POST", &format!("/tictactoe/{}/move", g2), &alice)
        .set_json(json!({"row": 0, "col": 0}))
        .to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;

    // Simulate a restart: a brand-new supervisor/persistence pair over the same
    // underlying storage, with no lobby state carried over.
    let restarted = spawn_app_over(shared.clone()).await;

    let req = test::TestRequest::get().uri("/lobby/list").to_request();
    let lobbies: Value = test::call_and_read_body_json(&restarted, req).await;
    assert_eq!(lobbies.as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/tictactoe/{}/status", g2))
        .to_request();
    let view: Value = test::call_and_read_body_json(&restarted, req).await;
    assert_eq!(view["board"][0][0], "X");
    assert_eq!(view["currentPlayer"], "O");

    let req = authed("POST", &format!("/tictactoe/{}/move", g1), &alice)
        .set_json(json!({"row": 0, "col": 0}))
        .to_request();
    let resp = test::call_service(&restarted, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn corrupt_rows_are_skipped_during_restore() {
    let repo = InMemoryRepository::new();
    let corrupt_payload = GameId::new();
    let unknown_type = GameId::new();
    repo.save(corrupt_payload, "tictactoe", "not-json".to_string())
        .await
        .unwrap();
    repo.save(unknown_type, "unknowngame", "{}".to_string())
        .await
        .unwrap();

    let app = spawn_app_over(repo).await;

    let req = test::TestRequest::get()
        .uri(&format!("/tictactoe/{}/status", corrupt_payload))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri(&format!("/tictactoe/{}/status", unknown_type))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
