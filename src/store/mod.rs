mod order_store;
mod reconcile;
mod resource_store;
mod state;

pub use order_store::OrderStore;
pub use reconcile::Reconciler;
pub use resource_store::{DeliveryPartnerStore, ResourceStore, TenantStore, VendorStore};
pub use state::{OrderState, ResourceAction, ResourceState};
