pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
mod testsupport;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::update_item_status,
        handlers::orders::pending_items,
        handlers::orders::recent_items,
        handlers::orders::recent_items_by_user,
        handlers::users::register_user,
        handlers::users::update_user,
        handlers::users::credit_user,
        handlers::users::delete_user,
    ),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "users", description = "Member management"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/items", web::get().to(handlers::orders::pending_items))
                    .route("/items/last", web::get().to(handlers::orders::recent_items))
                    .route(
                        "/items/user/{user_id}",
                        web::get().to(handlers::orders::recent_items_by_user),
                    )
                    .route(
                        "/items/{item_id}",
                        web::post().to(handlers::orders::update_item_status),
                    ),
            )
            .service(
                web::scope("/users")
                    .route("", web::post().to(handlers::users::register_user))
                    .route("/{id}/credit", web::post().to(handlers::users::credit_user))
                    .route("/{id}", web::put().to(handlers::users::update_user))
                    .route("/{id}", web::delete().to(handlers::users::delete_user)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
