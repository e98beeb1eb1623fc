//! Order lifecycle orchestration: creation, item-status updates and the
//! read-side projections.
//!
//! Every public method is one unit of work; the caller wraps it in a database
//! transaction (see the handlers) so all entity mutations commit or roll back
//! together.

use chrono::Duration;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::lifecycle::{self, StockEffect};
use crate::domain::order::{Category, Order, OrderDetails, OrderItem, OrderStatus};
use crate::domain::ports::{Clock, OrderStore, Page};
use crate::domain::user::{capitalize, User};

/// Window for the "recent items" projections.
const RECENT_WINDOW_HOURS: i64 = 18;

#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Free-text client name, used when no user is attached.
    pub client_name: Option<String>,
    pub user_id: Option<Uuid>,
    /// One product id per item ordered.
    pub items: Vec<Uuid>,
}

pub struct OrderService<'a, S, C> {
    store: &'a mut S,
    clock: &'a C,
}

impl<'a, S: OrderStore, C: Clock> OrderService<'a, S, C> {
    pub fn new(store: &'a mut S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Place an order: price the items, debit the attached user, and
    /// auto-deliver drink items.
    pub fn create_order(&mut self, cmd: CreateOrder) -> Result<OrderDetails, DomainError> {
        log::debug!("create order, client name {:?}", cmd.client_name);

        if cmd.items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }

        let mut client_name = capitalize(cmd.client_name.as_deref().unwrap_or(""));
        let mut user: Option<User> = None;
        if let Some(user_id) = cmd.user_id {
            let found = self
                .store
                .find_user(user_id)?
                .ok_or(DomainError::UserNotFound(user_id))?;
            client_name = found.display_name();
            if found.credit <= 0 {
                return Err(DomainError::CreditExhausted {
                    user_id,
                    credit: found.credit,
                });
            }
            user = Some(found);
        }

        let now = self.clock.now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: user.as_ref().map(|u| u.id),
            client_name,
            total: 0,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_order(&order)?;

        let mut items = Vec::with_capacity(cmd.items.len());
        let mut drink_ids = Vec::new();
        for product_id in &cmd.items {
            let product = self
                .store
                .find_product(*product_id)?
                .ok_or(DomainError::ProductNotFound(*product_id))?;
            let item = OrderItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: product.id,
                price: product.price,
                status: OrderStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            self.store.insert_order_item(&item)?;
            if product.category == Category::Drink {
                drink_ids.push(item.id);
            }
            items.push(item);
        }

        let total: i64 = items.iter().map(|item| item.price).sum();
        let order = order.with_total(total, now);
        self.store.update_order(&order)?;
        log::info!("order {} created with total {}", order.id, total);

        if let Some(user) = user {
            let debited = user.with_credit(user.credit - total, now);
            self.store.update_user(&debited)?;
            log::info!("user {} debited, new credit {}", debited.id, debited.credit);
        }

        for item_id in drink_ids {
            self.update_item_status(item_id, OrderStatus::Deliver)?;
        }

        let order = self
            .store
            .find_order(order.id)?
            .ok_or(DomainError::OrderNotFound(order.id))?;
        let items = self.store.items_by_order(order.id)?;
        Ok(OrderDetails { order, items })
    }

    /// Move one item through the state machine, apply the stock effect,
    /// re-aggregate the owning order's status and refund on cancellation.
    pub fn update_item_status(
        &mut self,
        item_id: Uuid,
        requested: OrderStatus,
    ) -> Result<OrderItem, DomainError> {
        log::debug!("update order item {item_id} to {requested}");

        let item = self
            .store
            .find_order_item(item_id)?
            .ok_or(DomainError::OrderItemNotFound(item_id))?;
        let effect = lifecycle::plan_transition(&item, requested)?;
        let now = self.clock.now();

        if effect != StockEffect::None {
            let product = self
                .store
                .find_product(item.product_id)?
                .ok_or(DomainError::ProductNotFound(item.product_id))?;
            for ingredient in &product.ingredients {
                let adjusted = ingredient.with_quantity(effect.apply(ingredient.quantity));
                self.store.update_ingredient(&adjusted)?;
            }
        }

        let updated = item.with_status(requested, now);
        self.store.update_order_item(&updated)?;

        let order = self
            .store
            .find_order(item.order_id)?
            .ok_or(DomainError::OrderNotFound(item.order_id))?;
        let siblings = self.store.items_by_order(order.id)?;
        let status = lifecycle::aggregate_status(order.status, &siblings);
        self.store.update_order(&order.with_status(status, now))?;

        if updated.status == OrderStatus::Cancel {
            if let Some(user_id) = order.user_id {
                let user = self
                    .store
                    .find_user(user_id)?
                    .ok_or(DomainError::UserNotFound(user_id))?;
                let refunded = user.with_credit(user.credit + updated.price, now);
                self.store.update_user(&refunded)?;
                log::info!(
                    "user {user_id} refunded {}, new credit {}",
                    updated.price,
                    refunded.credit
                );
            }
        }

        log::info!("order item {item_id} moved to {requested}");
        Ok(updated)
    }

    /// Items still waiting to be served, oldest first.
    pub fn pending_items(&mut self, page: i64, limit: i64) -> Result<Page<OrderItem>, DomainError> {
        self.store.items_by_status(OrderStatus::Pending, page, limit)
    }

    /// Items delivered or cancelled within the recent window, latest first.
    pub fn recent_items(&mut self, page: i64, limit: i64) -> Result<Page<OrderItem>, DomainError> {
        let now = self.clock.now();
        let start = now - Duration::hours(RECENT_WINDOW_HOURS);
        self.store
            .items_not_in_status_updated_between(OrderStatus::Pending, start, now, page, limit)
    }

    /// A user's delivered or cancelled items from orders placed within the
    /// recent window.
    pub fn recent_items_by_user(&mut self, user_id: Uuid) -> Result<Vec<OrderItem>, DomainError> {
        let user = self
            .store
            .find_user(user_id)?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let now = self.clock.now();
        let start = now - Duration::hours(RECENT_WINDOW_HOURS);
        let orders = self
            .store
            .orders_by_user_created_between(user.id, start, now)?;

        let mut items = Vec::new();
        for order in &orders {
            items.extend(
                self.store
                    .items_by_order(order.id)?
                    .into_iter()
                    .filter(|item| item.status != OrderStatus::Pending),
            );
        }
        Ok(items)
    }
}
