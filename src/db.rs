use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// Shared r2d2 pool handed to every handler; one connection is checked out
/// per unit of work.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .expect("Failed to create database connection pool")
}
