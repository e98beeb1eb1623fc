use actix_web::{web, HttpRequest, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::user_service::{Actor, RegisterUser, UpdateUser, UserService};
use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::SystemClock;
use crate::domain::user::User;
use crate::errors::AppError;
use crate::infrastructure::store::DieselStore;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub nick_name: Option<String>,
    pub section: String,
    /// Initial credit in minor currency units, strictly positive.
    pub credit: i64,
    #[serde(default)]
    pub is_membership: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub nick_name: Option<String>,
    pub section: String,
    /// Omit to keep the current membership flag.
    pub is_membership: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreditUserRequest {
    /// Amount to add in minor currency units, strictly positive.
    pub credit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: Option<String>,
    pub section: String,
    pub credit: i64,
    pub is_membership: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            nick_name: user.nick_name,
            section: user.section,
            credit: user.credit,
            is_membership: user.is_membership,
        }
    }
}

/// Acting identity passed explicitly by the caller; authentication itself is
/// the gateway's concern.
fn actor_from_request(req: &HttpRequest) -> Actor {
    let id = req
        .headers()
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::nil);
    let is_admin = req
        .headers()
        .get("x-actor-admin")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    Actor { id, is_admin }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /users
///
/// Registers a member. Members get a 10% bonus on the initial credit.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Non-positive credit"),
        (status = 409, description = "User already exists in this section"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn register_user(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let user = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut store = DieselStore::new(conn);
            UserService::new(&mut store, &SystemClock).register_user(RegisterUser {
                first_name: body.first_name,
                last_name: body.last_name,
                nick_name: body.nick_name,
                section: body.section,
                credit: body.credit,
                is_membership: body.is_membership,
            })
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /users/{id}
///
/// Rewrites a member's profile; credit is left alone.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn update_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let body = body.into_inner();

    let user = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut store = DieselStore::new(conn);
            UserService::new(&mut store, &SystemClock).update_user(
                user_id,
                UpdateUser {
                    first_name: body.first_name,
                    last_name: body.last_name,
                    nick_name: body.nick_name,
                    section: body.section,
                    is_membership: body.is_membership,
                },
            )
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// POST /users/{id}/credit
///
/// Tops up a member's balance; the membership bonus applies to the amount.
#[utoipa::path(
    post,
    path = "/users/{id}/credit",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    request_body = CreditUserRequest,
    responses(
        (status = 200, description = "Credit updated", body = UserResponse),
        (status = 400, description = "Non-positive amount"),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn credit_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CreditUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let amount = body.into_inner().credit;

    let user = web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut store = DieselStore::new(conn);
            UserService::new(&mut store, &SystemClock).credit_user(user_id, amount)
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /users/{id}
///
/// Deletes a user and cascades through their orders (items, then orders,
/// then the user). Requires an admin actor.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
        ("x-actor-id" = Option<Uuid>, Header, description = "Acting user id"),
        ("x-actor-admin" = Option<bool>, Header, description = "Whether the actor is an admin"),
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Actor is not an admin"),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let actor = actor_from_request(&req);

    web::block(move || {
        let mut conn = pool.get().map_err(DomainError::from)?;
        let conn = &mut *conn;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut store = DieselStore::new(conn);
            UserService::new(&mut store, &SystemClock).delete_user(actor, user_id)
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
