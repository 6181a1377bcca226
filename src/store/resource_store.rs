use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use super::state::{ResourceAction, ResourceState};
use crate::api::ResourceApi;
use crate::entities::{DeliveryPartner, ListQuery, Page, Resource, Tenant, Vendor};
use crate::errors::{ClientResult, StoreError};

/// Request/response store for one resource collection.
pub struct ResourceStore<R: Resource> {
    api: Arc<dyn ResourceApi<R>>,
    state: Arc<RwLock<ResourceState<R>>>,
}

impl<R: Resource> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

pub type VendorStore = ResourceStore<Vendor>;
pub type DeliveryPartnerStore = ResourceStore<DeliveryPartner>;
pub type TenantStore = ResourceStore<Tenant>;

impl<R: Resource> ResourceStore<R> {
    pub fn new<A: ResourceApi<R> + 'static>(api: A) -> Self {
        Self::from_shared(Arc::new(api))
    }

    pub fn from_shared(api: Arc<dyn ResourceApi<R>>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ResourceState::default())),
        }
    }

    pub async fn snapshot(&self) -> ResourceState<R> {
        self.state.read().await.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub async fn reset(&self) {
        *self.state.write().await = ResourceState::default();
    }

    async fn begin(&self, action: ResourceAction) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.active_action = Some(action);
        state.error = None;
    }

    async fn finish<T>(
        &self,
        action: ResourceAction,
        result: ClientResult<T>,
        apply: impl FnOnce(&mut ResourceState<R>, &T),
    ) -> ClientResult<T> {
        let mut state = self.state.write().await;
        match &result {
            Ok(value) => apply(&mut state, value),
            Err(e) => {
                warn!(collection = R::COLLECTION, %action, err = %e, "resource operation failed");
                state.error = Some(StoreError::from(e));
            }
        }
        state.loading = false;
        state.active_action = None;
        result
    }

    pub async fn fetch_list(&self, query: &ListQuery) -> ClientResult<Page<R>> {
        self.begin(ResourceAction::FetchList).await;
        let result = self.api.list(query).await;
        self.finish(ResourceAction::FetchList, result, |state, page| {
            state.list = page.clone();
        })
        .await
    }

    pub async fn fetch_one(&self, id: &str) -> ClientResult<R> {
        self.begin(ResourceAction::Fetch).await;
        let result = self.api.get(id).await;
        self.finish(ResourceAction::Fetch, result, |state, item| {
            state.current = Some(item.clone());
            state.list.replace(item);
        })
        .await
    }

    pub async fn create(&self, draft: &R::Draft) -> ClientResult<R> {
        self.begin(ResourceAction::Create).await;
        let result = self.api.create(draft).await;
        self.finish(ResourceAction::Create, result, |state, item| {
            state.list.prepend(item.clone());
            state.current = Some(item.clone());
        })
        .await
    }

    pub async fn update(&self, id: &str, draft: &R::Draft) -> ClientResult<R> {
        self.begin(ResourceAction::Update).await;
        let result = self.api.update(id, draft).await;
        self.finish(ResourceAction::Update, result, ResourceState::replace)
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.begin(ResourceAction::Delete).await;
        let result = self.api.delete(id).await;
        self.finish(ResourceAction::Delete, result, |state, _| state.remove(id))
            .await
    }
}

impl ResourceStore<DeliveryPartner> {
    /// Partners currently able to take an assignment.
    pub async fn fetch_available(&self, query: &ListQuery) -> ClientResult<Page<DeliveryPartner>> {
        let query = query.clone().filter("is_available", true);
        self.fetch_list(&query).await
    }
}
