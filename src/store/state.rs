use crate::entities::{Order, OrderAction, OrderList, OrderStatus, Page, Resource};
use crate::errors::StoreError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderState {
    /// The single order open in a detail view, if any.
    pub order: Option<Order>,
    pub orders: OrderList,
    pub loading: bool,
    pub active_action: Option<OrderAction>,
    pub error: Option<StoreError>,
}

impl OrderState {
    /// Current order first, then the list.
    pub fn find(&self, order_id: &str) -> Option<&Order> {
        self.order
            .as_ref()
            .filter(|o| o.order_id == order_id)
            .or_else(|| self.orders.get(order_id))
    }

    /// Writes `order` into every slot holding its id.
    pub(crate) fn replace_order(&mut self, order: &Order) {
        if let Some(current) = self.order.as_mut().filter(|o| o.order_id == order.order_id) {
            *current = order.clone();
        }
        self.orders.replace(order);
    }

    pub(crate) fn patch_status(&mut self, order_id: &str, status: &OrderStatus) -> bool {
        let mut touched = false;
        if let Some(current) = self.order.as_mut().filter(|o| o.order_id == order_id) {
            current.status = status.clone();
            touched = true;
        }
        if let Some(entry) = self.orders.get_mut(order_id) {
            entry.status = status.clone();
            touched = true;
        }
        touched
    }

    pub(crate) fn remove_order(&mut self, order_id: &str) {
        if self.order.as_ref().is_some_and(|o| o.order_id == order_id) {
            self.order = None;
        }
        self.orders.remove(order_id);
    }
}

/// Owned copies of the slots an optimistic update may touch.
#[derive(Debug, Clone)]
pub(crate) struct StatusSnapshot {
    order: Option<Order>,
    orders: OrderList,
}

impl StatusSnapshot {
    pub(crate) fn capture(state: &OrderState, order_id: &str) -> Self {
        Self {
            order: state
                .order
                .as_ref()
                .filter(|o| o.order_id == order_id)
                .cloned(),
            orders: state.orders.clone(),
        }
    }

    /// Puts back exactly what was captured. The current-order slot is only
    /// written when it held the updated order at capture time.
    pub(crate) fn restore(self, state: &mut OrderState) {
        if let Some(order) = self.order {
            state.order = Some(order);
        }
        state.orders = self.orders;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<R> {
    pub current: Option<R>,
    pub list: Page<R>,
    pub loading: bool,
    pub active_action: Option<ResourceAction>,
    pub error: Option<StoreError>,
}

impl<R> Default for ResourceState<R> {
    fn default() -> Self {
        Self {
            current: None,
            list: Page::default(),
            loading: false,
            active_action: None,
            error: None,
        }
    }
}

impl<R: Resource> ResourceState<R> {
    pub(crate) fn replace(&mut self, item: &R) {
        if let Some(current) = self.current.as_mut().filter(|c| c.id() == item.id()) {
            *current = item.clone();
        }
        self.list.replace(item);
    }

    pub(crate) fn remove(&mut self, id: &str) {
        if self.current.as_ref().is_some_and(|c| c.id() == id) {
            self.current = None;
        }
        self.list.remove(id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ResourceAction {
    #[display("fetch_list")]
    FetchList,
    #[display("fetch")]
    Fetch,
    #[display("create")]
    Create,
    #[display("update")]
    Update,
    #[display("delete")]
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(current: Option<Order>, items: Vec<Order>) -> OrderState {
        let total = items.len() as u64;
        OrderState {
            order: current,
            orders: Page::new(items, 0, 20, total),
            ..OrderState::default()
        }
    }

    #[test]
    fn patch_status_touches_both_slots() {
        let o1 = Order::new("O1", OrderStatus::Pending).with_attribute("note", "fragile");
        let mut state = state_with(Some(o1.clone()), vec![o1, Order::new("O2", OrderStatus::Pending)]);

        assert!(state.patch_status("O1", &OrderStatus::Shipped));
        assert_eq!(state.order.as_ref().unwrap().status, OrderStatus::Shipped);
        assert_eq!(state.orders.items[0].status, OrderStatus::Shipped);
        assert_eq!(
            state.orders.items[0].attribute("note"),
            Some(&serde_json::json!("fragile"))
        );
        assert_eq!(state.orders.items[1].status, OrderStatus::Pending);
    }

    #[test]
    fn patch_status_of_unknown_order_is_noop() {
        let mut state = state_with(None, vec![Order::new("O1", OrderStatus::Pending)]);
        let before = state.clone();
        assert!(!state.patch_status("nope", &OrderStatus::Cancelled));
        assert_eq!(state, before);
    }

    #[test]
    fn snapshot_leaves_unrelated_current_order_alone() {
        let other = Order::new("O9", OrderStatus::Delivered);
        let mut state = state_with(Some(other.clone()), vec![Order::new("O1", OrderStatus::Pending)]);
        let snapshot = StatusSnapshot::capture(&state, "O1");

        state.patch_status("O1", &OrderStatus::Processing);
        let replacement = Order::new("O3", OrderStatus::Pending);
        state.order = Some(replacement.clone());
        snapshot.restore(&mut state);

        assert_eq!(state.order, Some(replacement));
        assert_eq!(state.orders.items[0].status, OrderStatus::Pending);
    }

    #[test]
    fn remove_clears_matching_current_order() {
        let o1 = Order::new("O1", OrderStatus::Pending);
        let mut state = state_with(Some(o1.clone()), vec![o1]);
        state.remove_order("O1");
        assert!(state.order.is_none());
        assert!(state.orders.is_empty());
        assert_eq!(state.orders.total, 0);
    }
}
