pub mod order;
pub mod page;
pub mod resources;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use order::{
    NewOrder, Order, OrderAction, OrderItem, OrderList, OrderQuery, OrderStatus, PaymentStatus,
    RefundRequest,
};
pub use page::Page;
pub use resources::{
    DeliveryPartner, NewDeliveryPartner, NewTenant, NewVendor, Tenant, Vendor,
};

/// A server-owned entity addressed as `/{COLLECTION}/{id}`.
pub trait Resource: Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Request body used for create and full update.
    type Draft: Debug + Serialize + Send + Sync;

    fn id(&self) -> &str;
}

/// Listing parameters for the generic resource endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn page(skip: u64, limit: u64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
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
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}
