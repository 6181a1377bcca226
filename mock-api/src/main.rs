use actix_web::{middleware::Logger, App, HttpServer};
use dotenvy::dotenv;
use marketplace_admin::telemetry::init_tracing;
use mock_api::{repositories::in_memory::InMemoryOrderRepository, routes, state::AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    init_tracing();

    let state = AppState::new(InMemoryOrderRepository::default());
    let addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());
    tracing::info!("mock marketplace api listening on {}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::config)
    })
    .bind(addr)?
    .run()
    .await
}
