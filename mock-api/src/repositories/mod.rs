pub mod collections;
pub mod in_memory;

use async_trait::async_trait;
use marketplace_admin::entities::{NewOrder, OrderStatus, PaymentStatus, RefundRequest};

use crate::{entities::order::OrderRecord, errors::RepoErr};

#[derive(Debug, Clone, Default)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, new: NewOrder) -> Result<OrderRecord, RepoErr>;
    async fn get_by_id(&self, id: &str) -> Result<OrderRecord, RepoErr>;
    /// Returns the requested window plus the unpaged match count.
    async fn list(&self, q: ListOrdersQuery) -> Result<(Vec<OrderRecord>, u64), RepoErr>;
    async fn set_status(&self, id: &str, status: OrderStatus) -> Result<OrderRecord, RepoErr>;
    async fn assign(&self, id: &str, partner_id: &str) -> Result<OrderRecord, RepoErr>;
    async fn set_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> Result<OrderRecord, RepoErr>;
    async fn refund(&self, id: &str, refund: RefundRequest) -> Result<OrderRecord, RepoErr>;
    async fn delete(&self, id: &str) -> Result<(), RepoErr>;
}
