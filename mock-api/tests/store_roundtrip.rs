//! Drives the console stores over real HTTP against the mock server.

use std::time::Duration;

use actix_web::{App, HttpServer};
use marketplace_admin::config::ClientConfig;
use marketplace_admin::entities::{
    ListQuery, NewDeliveryPartner, NewOrder, OrderItem, OrderQuery, OrderStatus, PaymentStatus,
    RefundRequest,
};
use marketplace_admin::errors::SYNC_FAILED_MESSAGE;
use marketplace_admin::AdminStores;
use mock_api::{repositories::in_memory::InMemoryOrderRepository, routes, state::AppState};
use rust_decimal_macros::dec;

fn spawn_server() -> String {
    let state = AppState::new(InMemoryOrderRepository::default());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::config)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind mock api");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}")
}

fn connect(base_url: &str) -> AdminStores {
    let config = ClientConfig::new(base_url)
        .with_tenant("tenant-1")
        .with_timeout(Duration::from_secs(5))
        .with_reconcile_delay(Duration::from_millis(50));
    AdminStores::connect(&config).expect("client config")
}

fn new_order(customer: &str) -> NewOrder {
    NewOrder {
        vendor_id: "V1".into(),
        customer_id: customer.into(),
        items: vec![OrderItem {
            product_id: "P1".into(),
            quantity: 3,
            unit_price: dec!(2.00),
        }],
        delivery_address: Some("1 Main St".into()),
        notes: None,
    }
}

#[actix_web::test]
async fn order_lifecycle_through_the_store() {
    let base = spawn_server();
    let stores = connect(&base);
    let orders = &stores.orders;

    let created = orders.create_order(&new_order("C1")).await.unwrap();
    orders.create_order(&new_order("C2")).await.unwrap();
    assert_eq!(created.status, OrderStatus::Pending);

    let list = orders.fetch_orders(&OrderQuery::page(0, 10)).await.unwrap();
    assert_eq!(list.total, 2);
    orders.fetch_order(&created.order_id).await.unwrap();

    let confirmed = orders
        .update_order_status(&created.order_id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Processing);
    assert_ne!(confirmed.attribute("updated_at"), created.attribute("updated_at"));

    let state = orders.snapshot().await;
    assert_eq!(state.order.as_ref(), Some(&confirmed));
    assert_eq!(state.orders.get(&created.order_id), Some(&confirmed));

    orders
        .update_payment_status(&created.order_id, PaymentStatus::Paid)
        .await
        .unwrap();
    let refunded = orders
        .refund_order(
            &created.order_id,
            &RefundRequest {
                amount: dec!(6.00),
                reason: "customer request".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert_eq!(refunded.payment_status, Some(PaymentStatus::Refunded));

    orders.delete_order(&created.order_id).await.unwrap();
    let state = orders.snapshot().await;
    assert!(state.order.is_none());
    assert_eq!(state.orders.total, 1);
}

#[actix_web::test]
async fn rejected_status_update_rolls_back_and_resyncs() {
    let base = spawn_server();
    let stores = connect(&base);
    let orders = &stores.orders;

    let created = orders.create_order(&new_order("C1")).await.unwrap();
    orders
        .update_order_status(&created.order_id, OrderStatus::Delivered)
        .await
        .unwrap();
    orders.fetch_orders(&OrderQuery::default()).await.unwrap();
    let before = orders.snapshot().await;

    let err = orders
        .update_order_status(&created.order_id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));

    let after = orders.snapshot().await;
    assert_eq!(after.order, before.order);
    assert_eq!(after.orders, before.orders);
    assert_eq!(after.error.as_ref().unwrap().status, Some(409));

    orders.wait_for_reconciliations().await;
    let state = orders.snapshot().await;
    assert_eq!(
        state.order.as_ref().unwrap().status,
        OrderStatus::Delivered
    );
    assert_eq!(state.error.unwrap().status, Some(409));
}

#[actix_web::test]
async fn vanished_order_ends_in_sync_failure() {
    let base = spawn_server();
    let stores = connect(&base);
    let orders = &stores.orders;

    let created = orders.create_order(&new_order("C1")).await.unwrap();
    // another console session removes it behind this store's back
    connect(&base)
        .orders
        .delete_order(&created.order_id)
        .await
        .unwrap();

    let err = orders
        .update_order_status(&created.order_id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(
        orders.snapshot().await.order.unwrap().status,
        OrderStatus::Pending
    );

    orders.wait_for_reconciliations().await;
    let error = orders.snapshot().await.error.unwrap();
    assert_eq!(error.message, SYNC_FAILED_MESSAGE);
    assert_eq!(error.status, Some(404));
}

#[actix_web::test]
async fn delivery_partner_store_over_http() {
    let base = spawn_server();
    let stores = connect(&base);
    let partners = &stores.delivery_partners;

    let ana = partners
        .create(&NewDeliveryPartner {
            name: "Ana".into(),
            phone: "+351000".into(),
            vehicle_type: Some("bike".into()),
            is_available: true,
        })
        .await
        .unwrap();
    partners
        .create(&NewDeliveryPartner {
            name: "Bo".into(),
            phone: "+351001".into(),
            vehicle_type: None,
            is_available: false,
        })
        .await
        .unwrap();

    let available = partners.fetch_available(&ListQuery::default()).await.unwrap();
    assert_eq!(available.total, 1);
    assert_eq!(available.items[0], ana);

    let err = partners.fetch_one("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    // query and path characters in an id stay inside its own segment
    for id in ["x?is_available=true", "../tenants", "a#b"] {
        let err = partners.fetch_one(id).await.unwrap_err();
        assert_eq!(err.status(), Some(404), "id {id:?}");
    }
    assert_eq!(
        partners.snapshot().await.error.unwrap().message,
        "not found"
    );
}
