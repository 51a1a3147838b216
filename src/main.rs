use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use turnforge_service::config::SERVICE_CONFIG;
use turnforge_service::repository::{Backend, Repository, SqlRepository};
use turnforge_service::{http, persistence, supervisor};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::new()
        .parse_filters(&SERVICE_CONFIG.log.filter)
        .init();

    let repo = SqlRepository::connect(&SERVICE_CONFIG.db)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
    let backend = Backend::Sql(repo);
    backend
        .init()
        .await
        .unwrap_or_else(|e| panic!("failed to initialize schema: {}", e));

    let persistence_handle = persistence::spawn(backend);
    let supervisor_handle = supervisor::spawn(persistence_handle);

    let bind_addr = (SERVICE_CONFIG.http.host.clone(), SERVICE_CONFIG.http.port);
    log::info!("listening on {}:{}", bind_addr.0, bind_addr.1);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(supervisor_handle.clone()))
            .wrap(Cors::permissive())
            .configure(http::configure)
    })
    .bind(bind_addr)?
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("shutdown signal received, stopping gracefully");
        server_handle.stop(true).await;
    });

    server.await
}
