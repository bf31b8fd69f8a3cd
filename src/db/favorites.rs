use tracing::debug;

use super::places::{PlaceRow, PLACE_COLUMNS};
use super::DbPool;
use crate::errors::StoreError;
use crate::models::{Place, UserId};

/// Bookmark a place. Returns true if the pair was newly inserted, false if it
/// was already present.
pub async fn add_favorite(pool: &DbPool, user_id: UserId, place_id: i64) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "INSERT INTO favorites (user_id, place_id) VALUES (?1, ?2)
         ON CONFLICT (user_id, place_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(place_id)
    .execute(pool)
    .await?;

    let inserted = result.rows_affected() > 0;
    debug!(user_id, place_id, inserted, "Favorite added");
    Ok(inserted)
}

/// Returns true if a row was deleted
pub async fn remove_favorite(
    pool: &DbPool,
    user_id: UserId,
    place_id: i64,
) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ?1 AND place_id = ?2")
        .bind(user_id)
        .bind(place_id)
        .execute(pool)
        .await?;

    let removed = result.rows_affected() > 0;
    debug!(user_id, place_id, removed, "Favorite removed");
    Ok(removed)
}

pub async fn is_favorite(pool: &DbPool, user_id: UserId, place_id: i64) -> Result<bool, StoreError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM favorites WHERE user_id = ?1 AND place_id = ?2")
            .bind(user_id)
            .bind(place_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Places bookmarked by a user, by place identifier
pub async fn list_favorites(pool: &DbPool, user_id: UserId) -> Result<Vec<Place>, StoreError> {
    let rows: Vec<PlaceRow> = sqlx::query_as(&format!(
        "SELECT {PLACE_COLUMNS} FROM favorites
         JOIN places ON places.id = favorites.place_id
         WHERE favorites.user_id = ?1
         ORDER BY places.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Place::from).collect())
}
