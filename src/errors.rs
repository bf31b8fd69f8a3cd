//! # Error Types Module
//!
//! Error taxonomies for the storage layer, the workflow engine and configuration.
//! Only `StoreError::Storage` represents a real fault; everything else is a
//! recoverable condition the workflow turns into a reply.

use thiserror::Error;

use crate::dialogue::WorkflowState;

/// Errors surfaced by the entity store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same primary key already exists
    #[error("{table} row {key} already exists")]
    DuplicateKey { table: &'static str, key: i64 },
    /// Review rating outside of 1..=5
    #[error("rating {0} is outside of 1..=5")]
    InvalidRating(i64),
    /// I/O or constraint failure reported by SQLite
    #[error("storage operation failed: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StoreError {
    /// Helper for duplicate key failures.
    pub fn duplicate(table: &'static str, key: i64) -> Self {
        Self::DuplicateKey { table, key }
    }
}

/// Errors produced by a single workflow step
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A step was reached without the session keys it needs
    #[error("session lost in {state:?}: `{missing}` is missing")]
    LostSession {
        state: WorkflowState,
        missing: &'static str,
    },
    /// The input failed the step's validation; `reason` is a message key
    #[error("invalid input in {state:?}: {reason}")]
    InvalidInput {
        state: WorkflowState,
        reason: &'static str,
    },
    /// The place targeted by the workflow was deleted in the meantime
    #[error("place {0} no longer exists")]
    PlaceGone(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub fn lost(state: WorkflowState, missing: &'static str) -> Self {
        Self::LostSession { state, missing }
    }

    pub fn invalid(state: WorkflowState, reason: &'static str) -> Self {
        Self::InvalidInput { state, reason }
    }
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::Store(StoreError::Storage(err))
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}
