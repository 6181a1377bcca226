use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::page::Page;
use super::Resource;

/// Order lifecycle state. The server owns the vocabulary; values this client
/// has no variant for decode into `Other` and serialize back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[display("pending")]
    Pending,
    #[display("confirmed")]
    Confirmed,
    #[display("processing")]
    Processing,
    #[display("preparing")]
    Preparing,
    #[display("ready_for_pickup")]
    ReadyForPickup,
    #[display("assigned")]
    Assigned,
    #[display("picked_up")]
    PickedUp,
    #[display("shipped")]
    Shipped,
    #[display("out_for_delivery")]
    OutForDelivery,
    #[display("delivered")]
    Delivered,
    #[display("cancelled")]
    Cancelled,
    #[display("refunded")]
    Refunded,
    #[display("failed")]
    Failed,
    #[display("{_0}")]
    Other(String),
}

impl OrderStatus {
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "processing" => Self::Processing,
            "preparing" => Self::Preparing,
            "ready_for_pickup" => Self::ReadyForPickup,
            "assigned" => Self::Assigned,
            "picked_up" => Self::PickedUp,
            "shipped" => Self::Shipped,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            "failed" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[display("pending")]
    Pending,
    #[display("paid")]
    Paid,
    #[display("failed")]
    Failed,
    #[display("refunded")]
    Refunded,
    #[display("partially_refunded")]
    PartiallyRefunded,
}

/// Client-side mirror of a server-owned order.
///
/// Only the fields the stores act on are typed; everything else the server
/// sends is kept verbatim in `attributes` so a stored copy always equals the
/// server's copy field for field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_partner_id: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Order {
    pub fn new(order_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            status,
            payment_status: None,
            delivery_partner_id: None,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

impl Resource for Order {
    const COLLECTION: &'static str = "orders";
    type Draft = NewOrder;

    fn id(&self) -> &str {
        &self.order_id
    }
}

pub type OrderList = Page<Order>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrder {
    pub vendor_id: String,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefundRequest {
    pub amount: Decimal,
    pub reason: String,
}

/// Marker for the plain (non-optimistic) operation currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OrderAction {
    #[display("fetch_list")]
    FetchList,
    #[display("fetch")]
    Fetch,
    #[display("create")]
    Create,
    #[display("delete")]
    Delete,
    #[display("assign")]
    Assign,
    #[display("update_payment")]
    UpdatePayment,
    #[display("refund")]
    Refund,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
}

impl OrderQuery {
    pub fn page(skip: u64, limit: u64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip {
            pairs.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs
    }
}
