use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use super::reconcile::Reconciler;
use super::state::{OrderState, StatusSnapshot};
use crate::api::OrderApi;
use crate::entities::{
    NewOrder, Order, OrderAction, OrderList, OrderQuery, OrderStatus, PaymentStatus,
    RefundRequest,
};
use crate::errors::{ClientResult, StoreError};

/// Client-side mirror of orders, cheap to clone and share between views.
#[derive(Clone)]
pub struct OrderStore {
    api: Arc<dyn OrderApi>,
    state: Arc<RwLock<OrderState>>,
    reconciler: Reconciler,
}

impl OrderStore {
    pub fn new<A: OrderApi + 'static>(api: A, reconcile_delay: Duration) -> Self {
        Self::from_shared(Arc::new(api), reconcile_delay)
    }

    pub fn from_shared(api: Arc<dyn OrderApi>, reconcile_delay: Duration) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(OrderState::default())),
            reconciler: Reconciler::new(reconcile_delay),
        }
    }

    pub async fn snapshot(&self) -> OrderState {
        self.state.read().await.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Drops all mirrored data, e.g. when the owning view goes away.
    pub async fn reset(&self) {
        *self.state.write().await = OrderState::default();
    }

    pub fn cancel_reconciliations(&self) {
        self.reconciler.cancel_all();
    }

    pub fn pending_reconciliations(&self) -> usize {
        self.reconciler.pending()
    }

    pub async fn wait_for_reconciliations(&self) {
        self.reconciler.wait_idle().await;
    }

    /// Optimistically sets `status`, then confirms with the server.
    ///
    /// Readers see the new status as soon as this is called. On success both
    /// slots hold the server's copy. On failure both slots get their exact
    /// prior values back, the store error is set, a delayed re-fetch of the
    /// order is scheduled and the error is returned.
    ///
    /// Concurrent calls for the same order are not sequenced; whichever state
    /// write lands last wins.
    #[instrument(name = "update_order_status", skip(self), fields(status = %new_status))]
    pub async fn update_order_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> ClientResult<Order> {
        let snapshot = {
            let mut state = self.state.write().await;
            let snapshot = StatusSnapshot::capture(&state, order_id);
            if !state.patch_status(order_id, &new_status) {
                debug!("order not mirrored locally; skipping optimistic apply");
            }
            state.error = None;
            snapshot
        };

        match self.api.update_order_status(order_id, new_status.clone()).await {
            Ok(confirmed) => {
                self.state.write().await.replace_order(&confirmed);
                info!(server_status = %confirmed.status, "status update confirmed");
                Ok(confirmed)
            }
            Err(e) => {
                {
                    let mut state = self.state.write().await;
                    snapshot.restore(&mut state);
                    state.error = Some(StoreError::from(&e));
                }
                warn!(err = %e, "status update failed; rolled back");
                self.schedule_reconciliation(order_id);
                Err(e)
            }
        }
    }

    fn schedule_reconciliation(&self, order_id: &str) {
        let store = self.clone();
        let order_id = order_id.to_string();
        self.reconciler
            .schedule(order_id.clone(), async move { store.reconcile(&order_id).await });
    }

    #[instrument(name = "reconcile_order", skip(self))]
    async fn reconcile(&self, order_id: &str) {
        match self.api.get_order(order_id).await {
            Ok(order) => {
                self.state.write().await.replace_order(&order);
                info!(status = %order.status, "order re-synced with server");
            }
            Err(e) => {
                self.state.write().await.error = Some(StoreError::sync_failed(e.status()));
                error!(err = %e, "order re-sync failed; local copy may be stale");
            }
        }
    }

    async fn begin(&self, action: OrderAction) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.active_action = Some(action);
        state.error = None;
    }

    /// Records the outcome of a plain operation and clears the busy markers.
    async fn finish<T>(
        &self,
        action: OrderAction,
        result: ClientResult<T>,
        apply: impl FnOnce(&mut OrderState, &T),
    ) -> ClientResult<T> {
        let mut state = self.state.write().await;
        match &result {
            Ok(value) => apply(&mut state, value),
            Err(e) => {
                warn!(%action, err = %e, "order operation failed");
                state.error = Some(StoreError::from(e));
            }
        }
        state.loading = false;
        state.active_action = None;
        result
    }

    pub async fn fetch_orders(&self, query: &OrderQuery) -> ClientResult<OrderList> {
        self.begin(OrderAction::FetchList).await;
        let result = self.api.list_orders(query).await;
        self.finish(OrderAction::FetchList, result, |state, list| {
            state.orders = list.clone();
        })
        .await
    }

    pub async fn fetch_order(&self, order_id: &str) -> ClientResult<Order> {
        self.begin(OrderAction::Fetch).await;
        let result = self.api.get_order(order_id).await;
        self.finish(OrderAction::Fetch, result, |state, order| {
            state.order = Some(order.clone());
            state.orders.replace(order);
        })
        .await
    }

    pub async fn create_order(&self, new: &NewOrder) -> ClientResult<Order> {
        self.begin(OrderAction::Create).await;
        let result = self.api.create_order(new).await;
        self.finish(OrderAction::Create, result, |state, order| {
            state.orders.prepend(order.clone());
            state.order = Some(order.clone());
        })
        .await
    }

    pub async fn delete_order(&self, order_id: &str) -> ClientResult<()> {
        self.begin(OrderAction::Delete).await;
        let result = self.api.delete_order(order_id).await;
        self.finish(OrderAction::Delete, result, |state, _| {
            state.remove_order(order_id);
        })
        .await
    }

    pub async fn assign_delivery_partner(
        &self,
        order_id: &str,
        partner_id: &str,
    ) -> ClientResult<Order> {
        self.begin(OrderAction::Assign).await;
        let result = self.api.assign_delivery_partner(order_id, partner_id).await;
        self.finish(OrderAction::Assign, result, OrderState::replace_order)
            .await
    }

    pub async fn update_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> ClientResult<Order> {
        self.begin(OrderAction::UpdatePayment).await;
        let result = self.api.update_payment_status(order_id, status).await;
        self.finish(OrderAction::UpdatePayment, result, OrderState::replace_order)
            .await
    }

    pub async fn refund_order(&self, order_id: &str, refund: &RefundRequest) -> ClientResult<Order> {
        self.begin(OrderAction::Refund).await;
        let result = self.api.refund_order(order_id, refund).await;
        self.finish(OrderAction::Refund, result, OrderState::replace_order)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::entities::Page;
    use crate::errors::{ClientError, SYNC_FAILED_MESSAGE};

    #[derive(Default)]
    struct FakeApi {
        orders: Mutex<HashMap<String, Order>>,
        status_replies: Mutex<VecDeque<ClientResult<Order>>>,
        fail_get_for: Mutex<HashSet<String>>,
        gate: Option<Arc<Notify>>,
        get_calls: Mutex<Vec<String>>,
        status_calls: Mutex<Vec<(String, OrderStatus)>>,
    }

    impl FakeApi {
        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::default()
            }
        }

        fn seed(&self, order: Order) {
            self.orders
                .lock()
                .unwrap()
                .insert(order.order_id.clone(), order);
        }

        fn reply_status(&self, reply: ClientResult<Order>) {
            self.status_replies.lock().unwrap().push_back(reply);
        }

        fn fail_get(&self, id: &str) {
            self.fail_get_for.lock().unwrap().insert(id.to_string());
        }

        fn not_found(id: &str) -> ClientError {
            ClientError::Status {
                status: 404,
                message: format!("order {id} not found"),
            }
        }

        fn stored(&self, id: &str) -> ClientResult<Order> {
            self.orders
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| Self::not_found(id))
        }

        fn patch(&self, id: &str, f: impl FnOnce(&mut Order)) -> ClientResult<Order> {
            let mut map = self.orders.lock().unwrap();
            let order = map.get_mut(id).ok_or_else(|| Self::not_found(id))?;
            f(order);
            Ok(order.clone())
        }
    }

    #[async_trait]
    impl OrderApi for FakeApi {
        async fn list_orders(&self, query: &OrderQuery) -> ClientResult<OrderList> {
            let map = self.orders.lock().unwrap();
            let mut items: Vec<Order> = map
                .values()
                .filter(|o| query.status.as_ref().map_or(true, |s| &o.status == s))
                .cloned()
                .collect();
            items.sort_by(|a, b| a.order_id.cmp(&b.order_id));
            let total = items.len() as u64;
            Ok(Page::new(items, query.skip.unwrap_or(0), query.limit.unwrap_or(20), total))
        }

        async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
            self.get_calls.lock().unwrap().push(order_id.to_string());
            if self.fail_get_for.lock().unwrap().contains(order_id) {
                return Err(ClientError::Status {
                    status: 503,
                    message: "upstream unavailable".into(),
                });
            }
            self.stored(order_id)
        }

        async fn create_order(&self, new: &NewOrder) -> ClientResult<Order> {
            let id = format!("O{}", self.orders.lock().unwrap().len() + 100);
            let order = Order::new(id, OrderStatus::Pending)
                .with_attribute("vendor_id", new.vendor_id.clone());
            self.seed(order.clone());
            Ok(order)
        }

        async fn delete_order(&self, order_id: &str) -> ClientResult<()> {
            self.orders
                .lock()
                .unwrap()
                .remove(order_id)
                .map(|_| ())
                .ok_or_else(|| Self::not_found(order_id))
        }

        async fn update_order_status(
            &self,
            order_id: &str,
            status: OrderStatus,
        ) -> ClientResult<Order> {
            self.status_calls
                .lock()
                .unwrap()
                .push((order_id.to_string(), status.clone()));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let scripted = self.status_replies.lock().unwrap().pop_front();
            match scripted {
                Some(reply) => reply,
                None => self.patch(order_id, |o| o.status = status),
            }
        }

        async fn assign_delivery_partner(
            &self,
            order_id: &str,
            partner_id: &str,
        ) -> ClientResult<Order> {
            self.patch(order_id, |o| {
                o.delivery_partner_id = Some(partner_id.to_string());
                o.status = OrderStatus::Assigned;
            })
        }

        async fn update_payment_status(
            &self,
            order_id: &str,
            status: PaymentStatus,
        ) -> ClientResult<Order> {
            self.patch(order_id, |o| o.payment_status = Some(status))
        }

        async fn refund_order(
            &self,
            order_id: &str,
            refund: &RefundRequest,
        ) -> ClientResult<Order> {
            self.patch(order_id, |o| {
                o.status = OrderStatus::Refunded;
                o.payment_status = Some(PaymentStatus::Refunded);
                o.attributes
                    .insert("refunded_amount".into(), json!(refund.amount.to_string()));
            })
        }
    }

    const DELAY: Duration = Duration::from_secs(3);

    fn pending(id: &str) -> Order {
        Order::new(id, OrderStatus::Pending)
    }

    async fn store_holding(api: FakeApi, id: &str) -> (OrderStore, Arc<FakeApi>) {
        api.seed(pending(id));
        let api = Arc::new(api);
        let store = OrderStore::from_shared(api.clone(), DELAY);
        store.fetch_orders(&OrderQuery::default()).await.unwrap();
        store.fetch_order(id).await.unwrap();
        (store, api)
    }

    async fn wait_for_status(store: &OrderStore, id: &str, status: OrderStatus) {
        for _ in 0..100 {
            if store.snapshot().await.find(id).map(|o| &o.status) == Some(&status) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("status of {id} never became {status}");
    }

    #[tokio::test]
    async fn optimistic_value_visible_then_rolled_back_on_failure() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi::gated(gate.clone());
        api.reply_status(Err(ClientError::Status {
            status: 500,
            message: "boom".into(),
        }));
        let (store, _api) = store_holding(api, "O1").await;
        let before = store.snapshot().await;

        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.update_order_status("O1", OrderStatus::Processing).await })
        };
        wait_for_status(&store, "O1", OrderStatus::Processing).await;
        let during = store.snapshot().await;
        assert_eq!(during.order.as_ref().unwrap().status, OrderStatus::Processing);
        assert_eq!(during.orders.items[0].status, OrderStatus::Processing);

        gate.notify_one();
        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.status(), Some(500));

        let after = store.snapshot().await;
        assert_eq!(after.order, before.order);
        assert_eq!(after.orders, before.orders);
        assert_eq!(after.error, Some(StoreError::new("boom", Some(500))));
        store.cancel_reconciliations();
    }

    #[tokio::test]
    async fn success_writes_server_copy_into_both_slots() {
        let api = FakeApi::default();
        let server_copy = Order::new("O1", OrderStatus::Processing).with_attribute("updated_at", "T2");
        api.reply_status(Ok(server_copy.clone()));
        let (store, _api) = store_holding(api, "O1").await;

        let confirmed = store
            .update_order_status("O1", OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(confirmed, server_copy);

        let state = store.snapshot().await;
        assert_eq!(state.order, Some(server_copy.clone()));
        assert_eq!(state.orders.items, vec![server_copy]);
        assert!(state.error.is_none());
        assert_eq!(store.pending_reconciliations(), 0);
    }

    #[tokio::test]
    async fn server_copy_wins_over_optimistic_guess() {
        let api = FakeApi::default();
        api.reply_status(Ok(Order::new("O1", OrderStatus::Confirmed)));
        let (store, _api) = store_holding(api, "O1").await;

        store
            .update_order_status("O1", OrderStatus::Delivered)
            .await
            .unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.order.unwrap().status, OrderStatus::Confirmed);
        assert_eq!(state.orders.items[0].status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn reply_with_unlisted_status_is_confirmed() {
        let api = FakeApi::default();
        let on_hold: Order =
            serde_json::from_value(json!({ "order_id": "O1", "status": "on_hold" })).unwrap();
        api.reply_status(Ok(on_hold.clone()));
        let (store, _api) = store_holding(api, "O1").await;

        let confirmed = store
            .update_order_status("O1", OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Other("on_hold".into()));

        let state = store.snapshot().await;
        assert_eq!(state.order, Some(on_hold.clone()));
        assert_eq!(state.orders.items, vec![on_hold]);
        assert!(state.error.is_none());
        assert_eq!(store.pending_reconciliations(), 0);
    }

    #[tokio::test]
    async fn new_attempt_clears_previous_error() {
        let api = FakeApi::default();
        api.reply_status(Err(FakeApi::not_found("O1")));
        let (store, _api) = store_holding(api, "O1").await;

        assert!(store
            .update_order_status("O1", OrderStatus::Shipped)
            .await
            .is_err());
        store.cancel_reconciliations();
        assert!(store.snapshot().await.error.is_some());

        store
            .update_order_status("O1", OrderStatus::Shipped)
            .await
            .unwrap();
        assert!(store.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn unknown_order_still_calls_server_and_leaves_state_alone() {
        let api = FakeApi::default();
        api.seed(pending("O1"));
        api.seed(pending("O2"));
        let api = Arc::new(api);
        let store = OrderStore::from_shared(api.clone(), DELAY);
        store.fetch_order("O1").await.unwrap();
        let before = store.snapshot().await;

        let confirmed = store
            .update_order_status("O2", OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Cancelled);
        assert_eq!(
            api.status_calls.lock().unwrap().as_slice(),
            &[("O2".to_string(), OrderStatus::Cancelled)]
        );
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_schedules_refetch_after_delay() {
        let api = FakeApi::default();
        api.reply_status(Err(ClientError::InvalidResponse(
            "Invalid response from server on status update".into(),
        )));
        let (store, api) = store_holding(api, "O1").await;
        api.get_calls.lock().unwrap().clear();

        // the server did apply the change despite the bad reply
        api.patch("O1", |o| {
            o.status = OrderStatus::Processing;
            o.attributes.insert("updated_at".into(), json!("T3"));
        })
        .unwrap();

        store
            .update_order_status("O1", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert_eq!(store.snapshot().await.order.unwrap().status, OrderStatus::Pending);

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert!(api.get_calls.lock().unwrap().is_empty());

        store.wait_for_reconciliations().await;
        assert_eq!(api.get_calls.lock().unwrap().as_slice(), &["O1".to_string()]);

        let state = store.snapshot().await;
        let server = api.stored("O1").unwrap();
        assert_eq!(state.order, Some(server.clone()));
        assert_eq!(state.orders.items, vec![server]);
        assert_eq!(
            state.error.unwrap().message,
            "Invalid response from server on status update"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refetch_records_sync_error() {
        let api = FakeApi::default();
        api.reply_status(Err(ClientError::Status {
            status: 502,
            message: "bad gateway".into(),
        }));
        let (store, api) = store_holding(api, "O1").await;
        api.fail_get("O1");

        store
            .update_order_status("O1", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert_eq!(store.snapshot().await.error.unwrap().message, "bad gateway");

        store.wait_for_reconciliations().await;
        let state = store.snapshot().await;
        let err = state.error.unwrap();
        assert_eq!(err.message, SYNC_FAILED_MESSAGE);
        assert_eq!(err.status, Some(503));
        assert_eq!(state.order.unwrap().status, OrderStatus::Pending);
        assert_eq!(store.pending_reconciliations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reconciliation_never_refetches() {
        let api = FakeApi::default();
        api.reply_status(Err(FakeApi::not_found("O1")));
        let (store, api) = store_holding(api, "O1").await;
        api.get_calls.lock().unwrap().clear();

        store
            .update_order_status("O1", OrderStatus::Processing)
            .await
            .unwrap_err();
        store.cancel_reconciliations();
        store.wait_for_reconciliations().await;

        assert!(api.get_calls.lock().unwrap().is_empty());
        assert_eq!(store.snapshot().await.error.unwrap().status, Some(404));
    }

    #[tokio::test]
    async fn plain_operations_keep_slots_consistent() {
        let api = FakeApi::default();
        let (store, _api) = store_holding(api, "O1").await;

        let assigned = store.assign_delivery_partner("O1", "DP-7").await.unwrap();
        assert_eq!(assigned.delivery_partner_id.as_deref(), Some("DP-7"));
        let state = store.snapshot().await;
        assert_eq!(state.order.as_ref(), Some(&assigned));
        assert_eq!(state.orders.items[0], assigned);
        assert!(!state.loading);
        assert!(state.active_action.is_none());

        store
            .update_payment_status("O1", PaymentStatus::Paid)
            .await
            .unwrap();
        let refunded = store
            .refund_order(
                "O1",
                &RefundRequest {
                    amount: dec!(12.50),
                    reason: "damaged".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert_eq!(refunded.attribute("refunded_amount"), Some(&json!("12.50")));
        let state = store.snapshot().await;
        assert_eq!(state.order.as_ref(), Some(&refunded));
        assert_eq!(state.orders.items[0], refunded);
    }

    #[tokio::test]
    async fn create_and_delete_adjust_list() {
        let api = FakeApi::default();
        let (store, _api) = store_holding(api, "O1").await;

        let created = store
            .create_order(&NewOrder {
                vendor_id: "V1".into(),
                customer_id: "C1".into(),
                items: vec![],
                delivery_address: None,
                notes: None,
            })
            .await
            .unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.orders.items[0], created);
        assert_eq!(state.orders.total, 2);
        assert_eq!(state.order.as_ref(), Some(&created));

        store.delete_order(&created.order_id).await.unwrap();
        let state = store.snapshot().await;
        assert!(state.order.is_none());
        assert_eq!(state.orders.total, 1);
        assert_eq!(state.orders.items[0].order_id, "O1");
    }

    #[tokio::test]
    async fn plain_failure_records_error_and_clears_loading() {
        let api = FakeApi::default();
        let (store, _api) = store_holding(api, "O1").await;

        let err = store.fetch_order("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        let state = store.snapshot().await;
        assert!(!state.loading);
        assert!(state.active_action.is_none());
        assert_eq!(state.error.unwrap().status, Some(404));
        assert_eq!(state.order.unwrap().order_id, "O1");
    }

    #[tokio::test]
    async fn loading_flag_is_set_while_call_is_in_flight() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(FakeApi::gated(gate.clone()));
        api.seed(pending("O1"));
        let store = OrderStore::from_shared(api.clone(), DELAY);

        // status updates are gated; plain operations are not, so observe the
        // begin step directly
        store.begin(OrderAction::Assign).await;
        let state = store.snapshot().await;
        assert!(state.loading);
        assert_eq!(state.active_action, Some(OrderAction::Assign));

        store.assign_delivery_partner("O1", "DP-1").await.unwrap();
        assert!(!store.snapshot().await.loading);
    }

    #[tokio::test]
    async fn reset_drops_everything() {
        let api = FakeApi::default();
        let (store, _api) = store_holding(api, "O1").await;
        store.reset().await;
        assert_eq!(store.snapshot().await, OrderState::default());
    }
}
