//! # Session Registry
//!
//! Transient per-user payloads collected across the steps of a workflow, and
//! the per-user locks that serialize event handling.
//!
//! Nothing here survives a restart. The durable status column stays the
//! authority on which step a user is in; a payload is only trusted when the
//! step that reads it finds the keys it needs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::models::UserId;

/// Data collected so far in a multi-step workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Place created by the add-place workflow, waiting for its photo
    pub place_id: Option<i64>,
    pub place_name: Option<String>,
    pub place_type: Option<u8>,
    /// Place targeted by an edit workflow
    pub edit_place_id: Option<i64>,
    /// Place being reviewed
    pub review_place_id: Option<i64>,
    /// Review waiting for its rating
    pub review_id: Option<i64>,
}

impl SessionPayload {
    pub fn is_empty(&self) -> bool {
        *self == SessionPayload::default()
    }

    fn apply(&mut self, field: SessionField) {
        match field {
            SessionField::PlaceId(id) => self.place_id = Some(id),
            SessionField::PlaceName(name) => self.place_name = Some(name),
            SessionField::PlaceType(kind) => self.place_type = Some(kind),
            SessionField::EditPlaceId(id) => self.edit_place_id = Some(id),
            SessionField::ReviewPlaceId(id) => self.review_place_id = Some(id),
            SessionField::ReviewId(id) => self.review_id = Some(id),
        }
    }
}

/// One named payload value, as written by a step handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionField {
    PlaceId(i64),
    PlaceName(String),
    PlaceType(u8),
    EditPlaceId(i64),
    ReviewPlaceId(i64),
    ReviewId(i64),
}

/// Process-wide map from user to session payload
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<UserId, SessionPayload>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<UserId, SessionPayload>> {
        // a panic while holding the lock cannot leave a payload half-written
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of a user's payload, creating an empty one on first access
    pub fn get(&self, user_id: UserId) -> SessionPayload {
        self.sessions().entry(user_id).or_default().clone()
    }

    pub fn set(&self, user_id: UserId, field: SessionField) {
        self.sessions().entry(user_id).or_default().apply(field);
    }

    /// Discard a user's payload
    pub fn remove(&self, user_id: UserId) {
        self.sessions().remove(&user_id);
    }

    /// Whether a payload exists for the user, without creating one
    pub fn contains(&self, user_id: UserId) -> bool {
        self.sessions().contains_key(&user_id)
    }
}

type LockMap = HashMap<UserId, Arc<AsyncMutex<()>>>;

/// Per-user locks; events of one user are handled one at a time while
/// different users proceed in parallel
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Arc<Mutex<LockMap>>,
}

fn lock_map(locks: &Mutex<LockMap>) -> MutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other event of this user is being handled
    pub async fn lock(&self, user_id: UserId) -> UserLockGuard {
        let lock = Arc::clone(lock_map(&self.locks).entry(user_id).or_default());
        let guard = lock.lock_owned().await;
        UserLockGuard {
            user_id,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of users with a live lock entry
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held while one event of a user is handled. The user's entry is dropped
/// from the map once nobody holds or waits for it.
#[derive(Debug)]
pub struct UserLockGuard {
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = lock_map(&self.locks);
        // waiters hold their own clone, only the map's reference is left when idle
        if locks
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_get_creates_empty_payload() {
        let registry = SessionRegistry::new();
        assert!(!registry.contains(1));

        let payload = registry.get(1);
        assert!(payload.is_empty());
        assert!(registry.contains(1));
    }

    #[test]
    fn test_set_and_remove() {
        let registry = SessionRegistry::new();
        registry.set(1, SessionField::PlaceName("Central Park".to_string()));
        registry.set(1, SessionField::PlaceType(3));
        registry.set(2, SessionField::ReviewPlaceId(9));

        let payload = registry.get(1);
        assert_eq!(payload.place_name.as_deref(), Some("Central Park"));
        assert_eq!(payload.place_type, Some(3));
        assert_eq!(payload.review_place_id, None);

        registry.remove(1);
        assert!(!registry.contains(1));
        assert_eq!(registry.get(2).review_place_id, Some(9));
    }

    #[tokio::test]
    async fn test_user_lock_serializes_same_user() -> anyhow::Result<()> {
        let locks = Arc::new(UserLocks::new());
        let guard = locks.lock(1).await;

        // another user is not blocked
        let _other = tokio::time::timeout(Duration::from_millis(100), locks.lock(2)).await?;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender).await??;
        Ok(())
    }

    #[tokio::test]
    async fn test_idle_user_locks_are_pruned() -> anyhow::Result<()> {
        let locks = Arc::new(UserLocks::new());
        let guard = locks.lock(1).await;
        assert_eq!(locks.len(), 1);

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // the waiter still needs the entry
        drop(guard);
        assert_eq!(locks.len(), 1);

        tokio::time::timeout(Duration::from_secs(1), waiter).await??;
        assert!(locks.is_empty());

        drop(locks.lock(2).await);
        assert!(locks.is_empty());
        Ok(())
    }
}
