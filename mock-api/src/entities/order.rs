use marketplace_admin::entities::{NewOrder, OrderItem, OrderStatus, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::now_ms;

/// Server-side order row. Serializes to the shape the console client mirrors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub vendor_id: String,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_partner_id: Option<String>,
    pub refunded_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderRecord {
    pub fn new(new: NewOrder) -> Self {
        let now = now_ms();
        let total = new
            .items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum();
        Self {
            order_id: Uuid::new_v4().to_string(),
            vendor_id: new.vendor_id,
            customer_id: new.customer_id,
            items: new.items,
            total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            delivery_partner_id: None,
            refunded_amount: Decimal::ZERO,
            delivery_address: new.delivery_address,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_ms().max(self.updated_at + 1);
    }

    pub fn refundable(&self) -> Decimal {
        self.total - self.refunded_amount
    }
}
