use tracing::info;

use super::DbPool;
use crate::errors::StoreError;
use crate::models::{Place, PlaceType};

/// Column list matching [`PlaceRow`]; `kind` is read back as text whatever
/// storage class it was written with
pub(super) const PLACE_COLUMNS: &str = "places.id AS id, places.name AS name, \
    CAST(places.kind AS TEXT) AS kind, places.address AS address, places.photo_ref AS photo_ref";

#[derive(sqlx::FromRow)]
pub(super) struct PlaceRow {
    id: i64,
    name: String,
    kind: String,
    address: Option<String>,
    photo_ref: Option<String>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Place {
            id: row.id,
            name: row.name,
            kind: PlaceType::from_stored(&row.kind),
            address: row.address,
            photo_ref: row.photo_ref,
        }
    }
}

/// Identifier the next created place will get: 1 + the current maximum, or 1.
///
/// Not reserved: two concurrent callers can observe the same value.
pub async fn next_place_id(pool: &DbPool) -> Result<i64, StoreError> {
    let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM places")
        .fetch_one(pool)
        .await?;
    Ok(next)
}

/// Create a place and return its identifier
pub async fn create_place(pool: &DbPool, name: &str, kind: &PlaceType) -> Result<i64, StoreError> {
    let id = next_place_id(pool).await?;

    let query = sqlx::query("INSERT INTO places (id, name, kind) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(name);
    let query = match kind {
        PlaceType::Numbered(code) => query.bind(i64::from(*code)),
        PlaceType::Custom(text) => query.bind(text.as_str()),
    };
    query.execute(pool).await?;

    info!(place_id = id, name = %name, kind = %kind, "Place created");
    Ok(id)
}

pub async fn get_place(pool: &DbPool, id: i64) -> Result<Option<Place>, StoreError> {
    let row: Option<PlaceRow> =
        sqlx::query_as(&format!("SELECT {PLACE_COLUMNS} FROM places WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Place::from))
}

/// All places, by identifier
pub async fn list_places(pool: &DbPool) -> Result<Vec<Place>, StoreError> {
    let rows: Vec<PlaceRow> =
        sqlx::query_as(&format!("SELECT {PLACE_COLUMNS} FROM places ORDER BY places.id"))
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(Place::from).collect())
}

async fn update_text_column(
    pool: &DbPool,
    id: i64,
    column: &'static str,
    value: &str,
) -> Result<bool, StoreError> {
    let result = sqlx::query(&format!("UPDATE places SET {column} = ?1 WHERE id = ?2"))
        .bind(value)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Each setter returns false when the place does not exist
pub async fn set_place_address(pool: &DbPool, id: i64, address: &str) -> Result<bool, StoreError> {
    update_text_column(pool, id, "address", address).await
}

pub async fn set_place_photo(pool: &DbPool, id: i64, photo_ref: &str) -> Result<bool, StoreError> {
    update_text_column(pool, id, "photo_ref", photo_ref).await
}

pub async fn set_place_name(pool: &DbPool, id: i64, name: &str) -> Result<bool, StoreError> {
    update_text_column(pool, id, "name", name).await
}

pub async fn set_place_type(pool: &DbPool, id: i64, kind: &PlaceType) -> Result<bool, StoreError> {
    let query = sqlx::query("UPDATE places SET kind = ?1 WHERE id = ?2");
    let query = match kind {
        PlaceType::Numbered(code) => query.bind(i64::from(*code)),
        PlaceType::Custom(text) => query.bind(text.as_str()),
    };
    let result = query.bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a place; its favorites and reviews go with it
pub async fn delete_place(pool: &DbPool, id: i64) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM places WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        info!(place_id = id, "Place deleted");
    }
    Ok(deleted)
}
