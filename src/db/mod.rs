//! # Entity Store
//!
//! Durable storage for users, places, favorites and reviews on top of SQLite.
//!
//! Every function is a single statement and therefore its own commit unit; a
//! workflow spanning several chat turns writes through several calls and may
//! leave a partially populated place behind if it is abandoned.
//!
//! - `schema`: idempotent schema creation and column migrations
//! - `users`: registration, durable workflow status and the admin flag
//! - `places`: directory entries
//! - `favorites`: (user, place) bookmarks
//! - `reviews`: review rows and rating aggregates

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::errors::StoreError;

mod favorites;
mod places;
mod reviews;
mod schema;
mod users;

pub use favorites::{add_favorite, is_favorite, list_favorites, remove_favorite};
pub use places::{
    create_place, delete_place, get_place, list_places, next_place_id, set_place_address,
    set_place_name, set_place_photo, set_place_type,
};
pub use reviews::{
    add_review, has_reviewed, list_reviewed_places, list_reviews, rating_summary, review_ratings,
    set_review_rating, set_review_text,
};
pub use schema::init_database_schema;
pub use users::{
    create_user, get_status, get_user, get_user_field, is_admin, set_admin, set_status,
    set_user_field, user_exists, UserField,
};

/// Connection pool shared by every handler task
pub type DbPool = SqlitePool;

/// Open (and create if missing) the database at `database_url`
pub async fn connect(database_url: &str) -> Result<DbPool, StoreError> {
    info!(database_url = %database_url, "Opening database");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Private in-memory database, used by tests.
///
/// Limited to one connection that is never recycled, since every SQLite
/// in-memory connection is a database of its own.
pub async fn connect_in_memory() -> Result<DbPool, StoreError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}
