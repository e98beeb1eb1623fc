use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::{CreateOrder, OrderService};
use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderDetails, OrderItem, OrderStatus};
use crate::domain::ports::{Page, SystemClock};
use crate::errors::AppError;
use crate::infrastructure::store::DieselStore;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Free-text client name for walk-in orders; ignored when `user_id` is set.
    pub name: Option<String>,
    pub user_id: Option<Uuid>,
    /// Product ids, one entry per item ordered.
    pub items: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderItemRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    /// Price snapshot in minor currency units.
    pub price: i64,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            price: item.price,
            status: item.status,
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub client_name: String,
    /// Sum of item prices in minor currency units, fixed at creation.
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderDetails> for OrderResponse {
    fn from(details: OrderDetails) -> Self {
        OrderResponse {
            id: details.order.id,
            user_id: details.order.user_id,
            client_name: details.order.client_name,
            total: details.order.total,
            status: details.order.status,
            created_at: details.order.created_at.to_rfc3339(),
            items: details.items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListItemsParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListItemsResponse {
    pub items: Vec<OrderItemResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl ListItemsResponse {
    fn from_page(page_data: Page<OrderItem>, page: i64, limit: i64) -> Self {
        ListItemsResponse {
            items: page_data.items.into_iter().map(Into::into).collect(),
            total: page_data.total,
            page,
            limit,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order with its items, debits the attached user's credit and
/// auto-delivers drink items. Everything runs inside a single database
/// transaction: a failure leaves no partial order behind.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Empty item list or exhausted credit"),
        (status = 404, description = "Unknown user or product"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    pool: web::Data<DbPool>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let details = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut store = DieselStore::new(conn);
            OrderService::new(&mut store, &SystemClock).create_order(CreateOrder {
                client_name: body.name,
                user_id: body.user_id,
                items: body.items,
            })
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(details)))
}

/// POST /orders/items/{item_id}
///
/// Requests a status transition for one order item. Illegal transitions
/// (same status, deliver a cancelled item, cancel a delivered one) are
/// rejected with 400 before any stock or credit mutation.
#[utoipa::path(
    post,
    path = "/orders/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Order item UUID"),
    ),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Item updated", body = OrderItemResponse),
        (status = 400, description = "Illegal status transition"),
        (status = 404, description = "Unknown order item"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_item_status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let requested = body.into_inner().status;

    let item = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut store = DieselStore::new(conn);
            OrderService::new(&mut store, &SystemClock).update_item_status(item_id, requested)
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderItemResponse::from(item)))
}

/// GET /orders/items
///
/// Pending items, oldest first.
#[utoipa::path(
    get,
    path = "/orders/items",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated pending items", body = ListItemsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn pending_items(
    pool: web::Data<DbPool>,
    query: web::Query<ListItemsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        let mut store = DieselStore::new(conn);
        OrderService::new(&mut store, &SystemClock).pending_items(page, limit)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListItemsResponse::from_page(result, page, limit)))
}

/// GET /orders/items/last
///
/// Items delivered or cancelled within the last 18 hours, latest first.
#[utoipa::path(
    get,
    path = "/orders/items/last",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated recent items", body = ListItemsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn recent_items(
    pool: web::Data<DbPool>,
    query: web::Query<ListItemsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        let mut store = DieselStore::new(conn);
        OrderService::new(&mut store, &SystemClock).recent_items(page, limit)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListItemsResponse::from_page(result, page, limit)))
}

/// GET /orders/items/user/{user_id}
///
/// A user's delivered or cancelled items from orders placed in the last
/// 18 hours.
#[utoipa::path(
    get,
    path = "/orders/items/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Recent items for the user", body = [OrderItemResponse]),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn recent_items_by_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let items = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        let mut store = DieselStore::new(conn);
        OrderService::new(&mut store, &SystemClock).recent_items_by_user(user_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let responses: Vec<OrderItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}
