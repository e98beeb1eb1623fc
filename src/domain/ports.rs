//! Ports consumed by the application services: the entity store and a clock.
//!
//! Implementations: [`crate::infrastructure::store::DieselStore`] (Postgres,
//! one transaction per service call) and
//! [`crate::infrastructure::memory::MemoryStore`] (tests and local runs).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Ingredient, Order, OrderItem, OrderStatus, Product};
use super::user::User;

/// Injected time source so services stay deterministic under test.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One page of a predicate query, with the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Entity store contract for the lifecycle engine.
///
/// Methods take `&mut self` because the Diesel implementation borrows the
/// transaction connection; atomicity of a whole service call is the
/// implementation's concern.
pub trait OrderStore {
    fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError>;
    fn user_exists(
        &mut self,
        first_name: &str,
        last_name: &str,
        section: &str,
    ) -> Result<bool, DomainError>;
    fn insert_user(&mut self, user: &User) -> Result<(), DomainError>;
    fn update_user(&mut self, user: &User) -> Result<(), DomainError>;
    fn delete_user(&mut self, id: Uuid) -> Result<(), DomainError>;

    /// Loads the product together with its ingredients.
    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn insert_product(&mut self, product: &Product) -> Result<(), DomainError>;
    fn update_ingredient(&mut self, ingredient: &Ingredient) -> Result<(), DomainError>;

    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError>;
    fn update_order(&mut self, order: &Order) -> Result<(), DomainError>;
    fn orders_by_user(&mut self, user_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn orders_by_user_created_between(
        &mut self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, DomainError>;
    fn delete_orders_by_user(&mut self, user_id: Uuid) -> Result<(), DomainError>;

    fn find_order_item(&mut self, id: Uuid) -> Result<Option<OrderItem>, DomainError>;
    fn insert_order_item(&mut self, item: &OrderItem) -> Result<(), DomainError>;
    fn update_order_item(&mut self, item: &OrderItem) -> Result<(), DomainError>;
    fn items_by_order(&mut self, order_id: Uuid) -> Result<Vec<OrderItem>, DomainError>;
    fn delete_items_by_order(&mut self, order_id: Uuid) -> Result<(), DomainError>;

    /// Items in `status`, ordered by creation time ascending, 1-based page.
    fn items_by_status(
        &mut self,
        status: OrderStatus,
        page: i64,
        limit: i64,
    ) -> Result<Page<OrderItem>, DomainError>;

    /// Items whose status differs from `excluded` and whose last update falls
    /// in `[start, end]`, ordered by update time descending, 1-based page.
    fn items_not_in_status_updated_between(
        &mut self,
        excluded: OrderStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: i64,
        limit: i64,
    ) -> Result<Page<OrderItem>, DomainError>;
}
