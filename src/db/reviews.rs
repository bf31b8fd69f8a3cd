use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::places::{PlaceRow, PLACE_COLUMNS};
use super::DbPool;
use crate::aggregate::RatingSummary;
use crate::errors::StoreError;
use crate::models::{Place, Review, UserId};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    user_id: i64,
    place_id: i64,
    body: String,
    rating: Option<i64>,
    created_at: i64,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            user_id: row.user_id,
            place_id: row.place_id,
            text: row.body,
            // the CHECK constraint keeps stored ratings within 1..=5
            rating: row.rating.and_then(|r| u8::try_from(r).ok()),
            created_at: DateTime::from_timestamp_millis(row.created_at).unwrap_or_default(),
        }
    }
}

fn checked_rating(rating: u8) -> Result<i64, StoreError> {
    if (1..=5).contains(&rating) {
        Ok(i64::from(rating))
    } else {
        Err(StoreError::InvalidRating(i64::from(rating)))
    }
}

/// Store a review and return its identifier.
///
/// The rating is usually absent here and patched in later by
/// [`set_review_rating`].
pub async fn add_review(
    pool: &DbPool,
    user_id: UserId,
    place_id: i64,
    text: &str,
    rating: Option<u8>,
) -> Result<i64, StoreError> {
    let rating = rating.map(checked_rating).transpose()?;

    let result = sqlx::query(
        "INSERT INTO reviews (user_id, place_id, body, rating, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(user_id)
    .bind(place_id)
    .bind(text)
    .bind(rating)
    .bind(Utc::now().timestamp_millis())
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!(review_id = id, user_id, place_id, "Review stored");
    Ok(id)
}

/// Patch the rating of an existing review in place. Returns false when the
/// review does not exist.
pub async fn set_review_rating(pool: &DbPool, review_id: i64, rating: u8) -> Result<bool, StoreError> {
    let rating = checked_rating(rating)?;

    let result = sqlx::query("UPDATE reviews SET rating = ?1 WHERE id = ?2")
        .bind(rating)
        .bind(review_id)
        .execute(pool)
        .await?;

    debug!(review_id, rating, "Review rated");
    Ok(result.rows_affected() > 0)
}

/// Replace the text of an existing review. Returns false when the review
/// does not exist.
pub async fn set_review_text(pool: &DbPool, review_id: i64, text: &str) -> Result<bool, StoreError> {
    let result = sqlx::query("UPDATE reviews SET body = ?1 WHERE id = ?2")
        .bind(text)
        .bind(review_id)
        .execute(pool)
        .await?;

    debug!(review_id, "Review text replaced");
    Ok(result.rows_affected() > 0)
}

/// Most recent reviews of a place first
pub async fn list_reviews(pool: &DbPool, place_id: i64, limit: u32) -> Result<Vec<Review>, StoreError> {
    let rows: Vec<ReviewRow> = sqlx::query_as(
        "SELECT id, user_id, place_id, body, rating, created_at FROM reviews
         WHERE place_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )
    .bind(place_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Review::from).collect())
}

pub async fn has_reviewed(pool: &DbPool, user_id: UserId, place_id: i64) -> Result<bool, StoreError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM reviews WHERE user_id = ?1 AND place_id = ?2 LIMIT 1")
            .bind(user_id)
            .bind(place_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Places a user has left a review for, by place identifier
pub async fn list_reviewed_places(pool: &DbPool, user_id: UserId) -> Result<Vec<Place>, StoreError> {
    let rows: Vec<PlaceRow> = sqlx::query_as(&format!(
        "SELECT {PLACE_COLUMNS} FROM places
         WHERE places.id IN (SELECT place_id FROM reviews WHERE user_id = ?1)
         ORDER BY places.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Place::from).collect())
}

/// Raw `rating` column of every review of a place
pub async fn review_ratings(pool: &DbPool, place_id: i64) -> Result<Vec<Option<u8>>, StoreError> {
    let ratings: Vec<Option<i64>> = sqlx::query_scalar("SELECT rating FROM reviews WHERE place_id = ?1")
        .bind(place_id)
        .fetch_all(pool)
        .await?;

    Ok(ratings
        .into_iter()
        .map(|r| r.and_then(|r| u8::try_from(r).ok()))
        .collect())
}

pub async fn rating_summary(pool: &DbPool, place_id: i64) -> Result<RatingSummary, StoreError> {
    let ratings = review_ratings(pool, place_id).await?;
    Ok(RatingSummary::from_ratings(&ratings))
}
