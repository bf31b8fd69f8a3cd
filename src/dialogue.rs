//! Workflow state module: the per-user "program counter" and step input validation.
//!
//! The state itself is durable (the `users.status` column); this module only maps
//! between the stored integer and the named steps of each track.

use serde::{Deserialize, Serialize};

use crate::models::PlaceType;

/// Upper bound for place names and addresses, in characters
pub const MAX_NAME_LEN: usize = 255;
/// Upper bound for review text, in characters
pub const MAX_REVIEW_LEN: usize = 2000;

/// Inputs that finish the add-place workflow without a photo
const SKIP_WORDS: [&str; 3] = ["skip", "пропустить", "no"];

/// Named workflow steps, grouped by track
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowState {
    #[default]
    Idle,
    // admin: add place
    AddName,
    AddType,
    AddAddress,
    AddPhoto,
    // admin: edit place
    EditName,
    EditType,
    // any user: review
    AddReview,
    AddRating,
}

impl WorkflowState {
    /// Status code persisted in `users.status`.
    ///
    /// Codes 1, 2, 101 and 102 are the values the legacy bot already wrote,
    /// so existing rows keep resuming at the right step.
    pub const fn code(self) -> i64 {
        match self {
            WorkflowState::Idle => 0,
            WorkflowState::AddName => 1,
            WorkflowState::AddType => 2,
            WorkflowState::AddAddress => 3,
            WorkflowState::AddPhoto => 4,
            WorkflowState::EditName => 101,
            WorkflowState::EditType => 102,
            WorkflowState::AddReview => 201,
            WorkflowState::AddRating => 202,
        }
    }

    /// Inverse of [`WorkflowState::code`]; unknown codes have no step.
    pub fn from_code(code: i64) -> Option<Self> {
        let state = match code {
            0 => WorkflowState::Idle,
            1 => WorkflowState::AddName,
            2 => WorkflowState::AddType,
            3 => WorkflowState::AddAddress,
            4 => WorkflowState::AddPhoto,
            101 => WorkflowState::EditName,
            102 => WorkflowState::EditType,
            201 => WorkflowState::AddReview,
            202 => WorkflowState::AddRating,
            _ => return None,
        };
        Some(state)
    }

    /// Steps only an administrator may be in
    pub const fn requires_admin(self) -> bool {
        matches!(
            self,
            WorkflowState::AddName
                | WorkflowState::AddType
                | WorkflowState::AddAddress
                | WorkflowState::AddPhoto
                | WorkflowState::EditName
                | WorkflowState::EditType
        )
    }

    pub const fn is_idle(self) -> bool {
        matches!(self, WorkflowState::Idle)
    }
}

fn validate_text(
    input: &str,
    max_len: usize,
    empty: &'static str,
    too_long: &'static str,
) -> Result<String, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(empty);
    }

    if trimmed.chars().count() > max_len {
        return Err(too_long);
    }

    Ok(trimmed.to_string())
}

/// Validates a place name input. Errors are message keys.
pub fn validate_place_name(name: &str) -> Result<String, &'static str> {
    validate_text(name, MAX_NAME_LEN, "invalid-name-empty", "invalid-name-too-long")
}

/// Validates a street address input
pub fn validate_address(address: &str) -> Result<String, &'static str> {
    validate_text(
        address,
        MAX_NAME_LEN,
        "invalid-address-empty",
        "invalid-address-too-long",
    )
}

/// Validates review text
pub fn validate_review_text(text: &str) -> Result<String, &'static str> {
    validate_text(
        text,
        MAX_REVIEW_LEN,
        "invalid-review-empty",
        "invalid-review-too-long",
    )
}

fn parse_one_to_five(
    input: &str,
    not_a_number: &'static str,
    out_of_range: &'static str,
) -> Result<u8, &'static str> {
    let value: i64 = input.trim().parse().map_err(|_| not_a_number)?;
    match u8::try_from(value) {
        Ok(v @ 1..=5) => Ok(v),
        _ => Err(out_of_range),
    }
}

/// Parses a place type answer. Only numbered categories are offered in chat,
/// so custom values are out of range here.
pub fn parse_type_choice(input: &str) -> Result<u8, &'static str> {
    if input.trim().parse::<i64>().is_err() {
        return Err("invalid-type-not-number");
    }
    match PlaceType::parse(input) {
        Some(PlaceType::Numbered(code)) => Ok(code),
        _ => Err("invalid-type-out-of-range"),
    }
}

/// Parses a review rating: an integer in 1..=5
pub fn parse_rating(input: &str) -> Result<u8, &'static str> {
    parse_one_to_five(input, "invalid-rating-not-number", "invalid-rating-out-of-range")
}

/// True when the admin declines to attach a photo
pub fn is_skip_word(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    SKIP_WORDS.contains(&normalized.as_str())
}
