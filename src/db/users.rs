use tracing::{debug, info};

use super::DbPool;
use crate::dialogue::WorkflowState;
use crate::errors::StoreError;
use crate::models::{User, UserId};

/// Mutable per-user columns reachable through the generic accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Status,
    IsAdmin,
}

impl UserField {
    const fn column(self) -> &'static str {
        match self {
            UserField::Status => "status",
            UserField::IsAdmin => "is_admin",
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    status: i64,
    is_admin: bool,
}

/// Register a user with status 0 and no admin rights.
///
/// Fails with `DuplicateKey` when the user is already known; callers check
/// [`user_exists`] first.
pub async fn create_user(pool: &DbPool, id: UserId) -> Result<(), StoreError> {
    let result = sqlx::query("INSERT INTO users (id) VALUES (?1) ON CONFLICT (id) DO NOTHING")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::duplicate("users", id));
    }

    info!(user_id = id, "User registered");
    Ok(())
}

pub async fn user_exists(pool: &DbPool, id: UserId) -> Result<bool, StoreError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn get_user(pool: &DbPool, id: UserId) -> Result<Option<User>, StoreError> {
    let row: Option<UserRow> =
        sqlx::query_as("SELECT id, status, is_admin FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|row| User {
        id: row.id,
        status: row.status,
        is_admin: row.is_admin,
    }))
}

/// Read one per-user column; `None` when the user does not exist
pub async fn get_user_field(
    pool: &DbPool,
    id: UserId,
    field: UserField,
) -> Result<Option<i64>, StoreError> {
    let query = format!("SELECT {} FROM users WHERE id = ?1", field.column());
    let value: Option<i64> = sqlx::query_scalar(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

/// Write one per-user column. Returns false when the user does not exist.
pub async fn set_user_field(
    pool: &DbPool,
    id: UserId,
    field: UserField,
    value: i64,
) -> Result<bool, StoreError> {
    let query = format!("UPDATE users SET {} = ?1 WHERE id = ?2", field.column());
    let result = sqlx::query(&query).bind(value).bind(id).execute(pool).await?;

    debug!(user_id = id, field = field.column(), value, "User field updated");
    Ok(result.rows_affected() > 0)
}

/// Raw status code of a user, `None` for unknown users
pub async fn get_status(pool: &DbPool, id: UserId) -> Result<Option<i64>, StoreError> {
    get_user_field(pool, id, UserField::Status).await
}

pub async fn set_status(
    pool: &DbPool,
    id: UserId,
    state: WorkflowState,
) -> Result<bool, StoreError> {
    set_user_field(pool, id, UserField::Status, state.code()).await
}

/// Admin flag of a user; unknown users are not admins
pub async fn is_admin(pool: &DbPool, id: UserId) -> Result<bool, StoreError> {
    let flag = get_user_field(pool, id, UserField::IsAdmin).await?;
    Ok(flag.unwrap_or(0) != 0)
}

pub async fn set_admin(pool: &DbPool, id: UserId, admin: bool) -> Result<bool, StoreError> {
    set_user_field(pool, id, UserField::IsAdmin, i64::from(admin)).await
}
