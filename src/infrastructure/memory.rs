//! In-memory implementation of the entity store.
//!
//! Backs the service-level tests and is handy for local experiments where a
//! Postgres instance is overkill. No persistence across restarts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Ingredient, Order, OrderItem, OrderStatus, Product};
use crate::domain::ports::{OrderStore, Page};
use crate::domain::user::User;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    items: HashMap<Uuid, OrderItem>,
}

fn paginate<T>(mut items: Vec<T>, page: i64, limit: i64) -> Page<T> {
    let total = items.len() as i64;
    let offset = ((page.max(1) - 1) * limit) as usize;
    let items = if offset >= items.len() {
        Vec::new()
    } else {
        items.drain(offset..).take(limit as usize).collect()
    };
    Page { items, total }
}

impl OrderStore for MemoryStore {
    fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.get(&id).cloned())
    }

    fn user_exists(
        &mut self,
        first_name: &str,
        last_name: &str,
        section: &str,
    ) -> Result<bool, DomainError> {
        Ok(self.users.values().any(|u| {
            u.first_name == first_name && u.last_name == last_name && u.section == section
        }))
    }

    fn insert_user(&mut self, user: &User) -> Result<(), DomainError> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn update_user(&mut self, user: &User) -> Result<(), DomainError> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn delete_user(&mut self, id: Uuid) -> Result<(), DomainError> {
        self.users.remove(&id);
        Ok(())
    }

    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.products.get(&id).cloned())
    }

    fn insert_product(&mut self, product: &Product) -> Result<(), DomainError> {
        self.products.insert(product.id, product.clone());
        Ok(())
    }

    fn update_ingredient(&mut self, ingredient: &Ingredient) -> Result<(), DomainError> {
        let product = self
            .products
            .get_mut(&ingredient.product_id)
            .ok_or(DomainError::ProductNotFound(ingredient.product_id))?;
        for slot in &mut product.ingredients {
            if slot.id == ingredient.id {
                *slot = ingredient.clone();
            }
        }
        Ok(())
    }

    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.get(&id).cloned())
    }

    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    fn update_order(&mut self, order: &Order) -> Result<(), DomainError> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    fn orders_by_user(&mut self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .values()
            .filter(|o| o.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    fn orders_by_user_created_between(
        &mut self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .values()
            .filter(|o| o.user_id == Some(user_id) && o.created_at >= start && o.created_at <= end)
            .cloned()
            .collect())
    }

    fn delete_orders_by_user(&mut self, user_id: Uuid) -> Result<(), DomainError> {
        self.orders.retain(|_, o| o.user_id != Some(user_id));
        Ok(())
    }

    fn find_order_item(&mut self, id: Uuid) -> Result<Option<OrderItem>, DomainError> {
        Ok(self.items.get(&id).cloned())
    }

    fn insert_order_item(&mut self, item: &OrderItem) -> Result<(), DomainError> {
        self.items.insert(item.id, item.clone());
        Ok(())
    }

    fn update_order_item(&mut self, item: &OrderItem) -> Result<(), DomainError> {
        self.items.insert(item.id, item.clone());
        Ok(())
    }

    fn items_by_order(&mut self, order_id: Uuid) -> Result<Vec<OrderItem>, DomainError> {
        let mut items: Vec<OrderItem> = self
            .items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }

    fn delete_items_by_order(&mut self, order_id: Uuid) -> Result<(), DomainError> {
        self.items.retain(|_, i| i.order_id != order_id);
        Ok(())
    }

    fn items_by_status(
        &mut self,
        status: OrderStatus,
        page: i64,
        limit: i64,
    ) -> Result<Page<OrderItem>, DomainError> {
        let mut items: Vec<OrderItem> = self
            .items
            .values()
            .filter(|i| i.status == status)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.created_at);
        Ok(paginate(items, page, limit))
    }

    fn items_not_in_status_updated_between(
        &mut self,
        excluded: OrderStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: i64,
        limit: i64,
    ) -> Result<Page<OrderItem>, DomainError> {
        let mut items: Vec<OrderItem> = self
            .items
            .values()
            .filter(|i| i.status != excluded && i.updated_at >= start && i.updated_at <= end)
            .cloned()
            .collect();
        items.sort_by_key(|i| std::cmp::Reverse(i.updated_at));
        Ok(paginate(items, page, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: OrderStatus, created_offset: i64) -> OrderItem {
        let now = Utc::now() + chrono::Duration::seconds(created_offset);
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            price: 100,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn items_by_status_pages_and_counts() {
        let mut store = MemoryStore::default();
        for offset in 0..5 {
            store
                .insert_order_item(&item(OrderStatus::Pending, offset))
                .unwrap();
        }
        store.insert_order_item(&item(OrderStatus::Cancel, 9)).unwrap();

        let page = store.items_by_status(OrderStatus::Pending, 1, 3).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 3);

        let page2 = store.items_by_status(OrderStatus::Pending, 2, 3).unwrap();
        assert_eq!(page2.items.len(), 2);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let mut store = MemoryStore::default();
        store.insert_order_item(&item(OrderStatus::Pending, 0)).unwrap();
        let page = store.items_by_status(OrderStatus::Pending, 4, 10).unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
    }
}
