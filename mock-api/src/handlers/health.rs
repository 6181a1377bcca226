use actix_web::HttpResponse;
use serde_json::json;

pub const SERVICE_NAME: &str = "mock-marketplace-api";

pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}
