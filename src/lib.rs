pub mod api;
pub mod config;
pub mod entities;
pub mod errors;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use api::HttpApi;
use config::ClientConfig;
use errors::ClientResult;
use store::{DeliveryPartnerStore, OrderStore, TenantStore, VendorStore};

/// One set of stores sharing a single HTTP client, built per console session.
#[derive(Clone)]
pub struct AdminStores {
    pub orders: OrderStore,
    pub vendors: VendorStore,
    pub delivery_partners: DeliveryPartnerStore,
    pub tenants: TenantStore,
}

impl AdminStores {
    pub fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let api = Arc::new(HttpApi::new(config)?);
        Ok(Self {
            orders: OrderStore::from_shared(api.clone(), config.reconcile_delay),
            vendors: VendorStore::from_shared(api.clone()),
            delivery_partners: DeliveryPartnerStore::from_shared(api.clone()),
            tenants: TenantStore::from_shared(api),
        })
    }
}
