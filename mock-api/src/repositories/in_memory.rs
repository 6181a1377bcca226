use crate::entities::order::OrderRecord;
use crate::errors::RepoErr;
use crate::repositories::{ListOrdersQuery, OrderRepository};
use async_trait::async_trait;
use marketplace_admin::entities::{NewOrder, OrderStatus, PaymentStatus, RefundRequest};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    inner: Arc<RwLock<HashMap<String, OrderRecord>>>,
}

impl InMemoryOrderRepository {
    pub async fn insert(&self, record: OrderRecord) {
        let mut map = self.inner.write().await;
        map.insert(record.order_id.clone(), record);
    }
}

fn is_terminal(status: &OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
    )
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, new: NewOrder) -> Result<OrderRecord, RepoErr> {
        if new.items.iter().any(|i| i.quantity == 0) {
            return Err(RepoErr::Invalid("item quantity must be positive".into()));
        }
        let mut map = self.inner.write().await;
        let order = OrderRecord::new(new);
        map.insert(order.order_id.clone(), order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: &str) -> Result<OrderRecord, RepoErr> {
        let map = self.inner.read().await;
        map.get(id).cloned().ok_or(RepoErr::NotFound)
    }

    async fn list(&self, q: ListOrdersQuery) -> Result<(Vec<OrderRecord>, u64), RepoErr> {
        let map = self.inner.read().await;
        let mut items: Vec<OrderRecord> = map.values().cloned().collect();

        if let Some(status) = q.status {
            items.retain(|o| o.status == status);
        }
        if let Some(search) = q.search.filter(|s| !s.is_empty()) {
            items.retain(|o| {
                o.order_id.contains(&search)
                    || o.customer_id.contains(&search)
                    || o.vendor_id.contains(&search)
            });
        }
        // newest first, id as tiebreak so pages are stable
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });

        let total = items.len() as u64;
        let start = q.skip.unwrap_or(0) as usize;
        if start >= items.len() {
            return Ok((vec![], total));
        }
        let end = q
            .limit
            .filter(|&l| l > 0)
            .map(|l| start + l as usize)
            .unwrap_or(items.len())
            .min(items.len());

        Ok((items[start..end].to_vec(), total))
    }

    async fn set_status(&self, id: &str, status: OrderStatus) -> Result<OrderRecord, RepoErr> {
        let mut map = self.inner.write().await;
        let o = map.get_mut(id).ok_or(RepoErr::NotFound)?;
        if is_terminal(&o.status) && o.status != status {
            return Err(RepoErr::PreconditionFailed(format!(
                "order is already {}",
                o.status
            )));
        }
        o.status = status;
        o.touch();
        Ok(o.clone())
    }

    async fn assign(&self, id: &str, partner_id: &str) -> Result<OrderRecord, RepoErr> {
        let mut map = self.inner.write().await;
        let o = map.get_mut(id).ok_or(RepoErr::NotFound)?;
        if is_terminal(&o.status) {
            return Err(RepoErr::PreconditionFailed(format!(
                "cannot assign a {} order",
                o.status
            )));
        }
        o.delivery_partner_id = Some(partner_id.to_string());
        o.status = OrderStatus::Assigned;
        o.touch();
        Ok(o.clone())
    }

    async fn set_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> Result<OrderRecord, RepoErr> {
        let mut map = self.inner.write().await;
        let o = map.get_mut(id).ok_or(RepoErr::NotFound)?;
        o.payment_status = status;
        o.touch();
        Ok(o.clone())
    }

    async fn refund(&self, id: &str, refund: RefundRequest) -> Result<OrderRecord, RepoErr> {
        if refund.amount <= Decimal::ZERO {
            return Err(RepoErr::Invalid("refund amount must be positive".into()));
        }
        let mut map = self.inner.write().await;
        let o = map.get_mut(id).ok_or(RepoErr::NotFound)?;
        if o.payment_status != PaymentStatus::Paid
            && o.payment_status != PaymentStatus::PartiallyRefunded
        {
            return Err(RepoErr::PreconditionFailed(format!(
                "payment is {}",
                o.payment_status
            )));
        }
        if refund.amount > o.refundable() {
            return Err(RepoErr::Invalid(format!(
                "refund exceeds refundable amount {}",
                o.refundable()
            )));
        }
        o.refunded_amount += refund.amount;
        if o.refundable().is_zero() {
            o.payment_status = PaymentStatus::Refunded;
            o.status = OrderStatus::Refunded;
        } else {
            o.payment_status = PaymentStatus::PartiallyRefunded;
        }
        o.touch();
        Ok(o.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoErr> {
        let mut map = self.inner.write().await;
        map.remove(id).map(|_| ()).ok_or(RepoErr::NotFound)
    }
}
