use crate::handlers::{self, collections};
use crate::repositories::collections::CollectionKind;
use actix_web::web::{self, ServiceConfig};

fn collection_scope(path: &str, kind: CollectionKind) -> actix_web::Scope {
    web::scope(path)
        .app_data(web::Data::new(kind))
        .route("", web::get().to(collections::list))
        .route("", web::post().to(collections::create))
        .route("/{id}", web::get().to(collections::get))
        .route("/{id}", web::put().to(collections::replace))
        .route("/{id}", web::delete().to(collections::delete))
}

pub fn config(cfg: &mut ServiceConfig) {
    cfg.service(web::scope("/health").route("", web::get().to(handlers::health::ping)))
        .service(
            web::scope("/orders")
                .route("", web::post().to(handlers::orders::create_order))
                .route("", web::get().to(handlers::orders::list_orders))
                .route("/{id}", web::get().to(handlers::orders::get_order))
                .route(
                    "/{id}/status",
                    web::put().to(handlers::orders::update_status),
                )
                .route(
                    "/{id}/assign",
                    web::put().to(handlers::orders::assign_partner),
                )
                .route(
                    "/{id}/payment-status",
                    web::put().to(handlers::orders::update_payment_status),
                )
                .route(
                    "/{id}/refund",
                    web::post().to(handlers::orders::refund_order),
                )
                .route("/{id}", web::delete().to(handlers::orders::delete_order)),
        )
        .service(collection_scope("/vendors", CollectionKind::Vendors))
        .service(collection_scope(
            "/delivery-partners",
            CollectionKind::DeliveryPartners,
        ))
        .service(collection_scope("/tenants", CollectionKind::Tenants));
}
