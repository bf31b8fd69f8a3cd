//! # Data Models
//!
//! Durable records of the place directory: users, places and reviews.
//! Favorites have no payload and are represented by the (user, place) pair alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-assigned user identifier (the Telegram user id)
pub type UserId = i64;

/// A bot user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Raw workflow status code, see [`crate::dialogue::WorkflowState`]
    pub status: i64,
    pub is_admin: bool,
}

/// Category of a place.
///
/// The legacy schema keeps either a category number or free text in the same
/// column, so both shapes survive here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceType {
    /// 1 hotel, 2 café, 3 restaurant, 4 grocery shop, 5 brand store
    Numbered(u8),
    Custom(String),
}

impl PlaceType {
    pub const MIN_CODE: u8 = 1;
    pub const MAX_CODE: u8 = 5;

    /// Parses a raw type value the way the legacy column was written.
    ///
    /// Integers 1..=5 are categories, zero and negative integers are rejected,
    /// anything else is kept as custom text.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(n) if n <= 0 => None,
            Ok(n) if n <= i64::from(Self::MAX_CODE) => Some(PlaceType::Numbered(n as u8)),
            _ => Some(PlaceType::Custom(trimmed.to_string())),
        }
    }

    /// Decodes a stored value. Never fails: unexpected values stay custom text.
    pub fn from_stored(raw: &str) -> Self {
        match raw.trim().parse::<u8>() {
            Ok(n) if (Self::MIN_CODE..=Self::MAX_CODE).contains(&n) => PlaceType::Numbered(n),
            _ => PlaceType::Custom(raw.to_string()),
        }
    }

    pub fn code(&self) -> Option<u8> {
        match self {
            PlaceType::Numbered(n) => Some(*n),
            PlaceType::Custom(_) => None,
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceType::Numbered(n) => write!(f, "{n}"),
            PlaceType::Custom(text) => f.write_str(text),
        }
    }
}

/// A directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub kind: PlaceType,
    pub address: Option<String>,
    /// Opaque photo token issued by the chat platform
    pub photo_ref: Option<String>,
}

/// A user review; `rating` stays empty until the second step of the review flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: UserId,
    pub place_id: i64,
    pub text: String,
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
}
