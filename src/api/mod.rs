pub mod envelope;
pub mod http;

use async_trait::async_trait;

use crate::entities::{
    ListQuery, NewOrder, Order, OrderList, OrderQuery, OrderStatus, Page, PaymentStatus,
    RefundRequest, Resource,
};
use crate::errors::ClientResult;

pub use http::HttpApi;

#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn list_orders(&self, query: &OrderQuery) -> ClientResult<OrderList>;
    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;
    async fn create_order(&self, new: &NewOrder) -> ClientResult<Order>;
    async fn delete_order(&self, order_id: &str) -> ClientResult<()>;
    async fn update_order_status(&self, order_id: &str, status: OrderStatus)
        -> ClientResult<Order>;
    async fn assign_delivery_partner(&self, order_id: &str, partner_id: &str)
        -> ClientResult<Order>;
    async fn update_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> ClientResult<Order>;
    async fn refund_order(&self, order_id: &str, refund: &RefundRequest) -> ClientResult<Order>;
}

#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> ClientResult<Page<R>>;
    async fn get(&self, id: &str) -> ClientResult<R>;
    async fn create(&self, draft: &R::Draft) -> ClientResult<R>;
    async fn update(&self, id: &str, draft: &R::Draft) -> ClientResult<R>;
    async fn delete(&self, id: &str) -> ClientResult<()>;
}
