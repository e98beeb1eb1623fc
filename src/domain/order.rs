use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Fulfillment status shared by orders and order items.
///
/// `Pending` is the initial state; `Deliver` and `Cancel` are terminal except
/// for the reversal back to `Pending` (see [`crate::domain::lifecycle`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Deliver,
    Cancel,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Deliver => "DELIVER",
            OrderStatus::Cancel => "CANCEL",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "DELIVER" => Ok(OrderStatus::Deliver),
            "CANCEL" => Ok(OrderStatus::Cancel),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

/// Product category. Drink items are auto-delivered at order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Drink,
    Food,
    Snack,
    Dessert,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Drink => "DRINK",
            Category::Food => "FOOD",
            Category::Snack => "SNACK",
            Category::Dessert => "DESSERT",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRINK" => Ok(Category::Drink),
            "FOOD" => Ok(Category::Food),
            "SNACK" => Ok(Category::Snack),
            "DESSERT" => Ok(Category::Dessert),
            other => Err(format!("unknown product category '{other}'")),
        }
    }
}

/// Stock entry owned by a product. Quantity has no floor: it may go negative,
/// stock is informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
}

impl Ingredient {
    pub fn with_quantity(&self, quantity: i64) -> Ingredient {
        Ingredient {
            quantity,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Price in integer minor currency units (cents).
    pub price: i64,
    pub category: Category,
    pub ingredients: Vec<Ingredient>,
}

/// A client transaction grouping one or more priced items. `user_id` is absent
/// for walk-in cash orders. `total` is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub client_name: String,
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn with_total(&self, total: i64, now: DateTime<Utc>) -> Order {
        Order {
            total,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: OrderStatus, now: DateTime<Utc>) -> Order {
        Order {
            status,
            updated_at: now,
            ..self.clone()
        }
    }
}

/// One product instance within an order. `price` is a snapshot of the product
/// price at order time and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn with_status(&self, status: OrderStatus, now: DateTime<Utc>) -> OrderItem {
        OrderItem {
            status,
            updated_at: now,
            ..self.clone()
        }
    }
}

/// An order together with its items, as returned by the lifecycle service.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_str() {
        for status in [OrderStatus::Pending, OrderStatus::Deliver, OrderStatus::Cancel] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn category_roundtrips_through_str() {
        for category in [
            Category::Drink,
            Category::Food,
            Category::Snack,
            Category::Dessert,
        ] {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }
}
