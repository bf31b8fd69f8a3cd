use anyhow::Result;

use city_places::dialogue::{
    is_skip_word, parse_rating, parse_type_choice, validate_address, validate_place_name,
    validate_review_text, WorkflowState,
};
use city_places::session::{SessionField, SessionRegistry};

/// Integration test for place name validation
#[tokio::test]
async fn test_place_name_validation() -> Result<()> {
    assert!(validate_place_name("Central Park").is_ok());
    assert!(validate_place_name("  Кафе «Крем»  ").is_ok());

    assert!(validate_place_name("").is_err());
    assert!(validate_place_name("   ").is_err());
    assert!(validate_place_name(&"a".repeat(256)).is_err());

    Ok(())
}

#[tokio::test]
async fn test_address_and_review_validation() -> Result<()> {
    assert_eq!(validate_address(" Mira 12 ").as_deref(), Ok("Mira 12"));
    assert_eq!(validate_address(""), Err("invalid-address-empty"));

    assert!(validate_review_text(&"good ".repeat(300)).is_ok());
    assert_eq!(
        validate_review_text(&"x".repeat(2001)),
        Err("invalid-review-too-long")
    );

    Ok(())
}

/// Only 1..=5 moves a type or rating step forward
#[tokio::test]
async fn test_numeric_steps_accept_one_to_five() -> Result<()> {
    for input in ["1", "2", "3", "4", "5"] {
        assert!(parse_type_choice(input).is_ok());
        assert!(parse_rating(input).is_ok());
    }
    for input in ["", "abc", "0", "-3", "6", "3.5", "1e2"] {
        assert!(parse_type_choice(input).is_err(), "{input:?} accepted as type");
        assert!(parse_rating(input).is_err(), "{input:?} accepted as rating");
    }

    Ok(())
}

#[tokio::test]
async fn test_skip_words() -> Result<()> {
    assert!(is_skip_word("Skip"));
    assert!(is_skip_word("пропустить"));
    assert!(is_skip_word("no"));
    assert!(!is_skip_word("Main St 1"));

    Ok(())
}

/// Legacy status codes keep their meaning
#[tokio::test]
async fn test_legacy_status_codes() -> Result<()> {
    assert_eq!(WorkflowState::from_code(0), Some(WorkflowState::Idle));
    assert_eq!(WorkflowState::from_code(1), Some(WorkflowState::AddName));
    assert_eq!(WorkflowState::from_code(2), Some(WorkflowState::AddType));
    assert_eq!(WorkflowState::from_code(101), Some(WorkflowState::EditName));
    assert_eq!(WorkflowState::from_code(102), Some(WorkflowState::EditType));

    assert!(WorkflowState::AddPhoto.requires_admin());
    assert!(!WorkflowState::AddRating.requires_admin());
    assert!(WorkflowState::default().is_idle());

    Ok(())
}

/// Sessions of different users never share data
#[tokio::test]
async fn test_sessions_are_per_user() -> Result<()> {
    let registry = SessionRegistry::new();
    registry.set(1, SessionField::EditPlaceId(4));
    registry.set(2, SessionField::ReviewPlaceId(4));
    registry.set(2, SessionField::ReviewId(10));

    assert_eq!(registry.get(1).edit_place_id, Some(4));
    assert_eq!(registry.get(1).review_id, None);
    assert_eq!(registry.get(2).review_id, Some(10));

    registry.remove(2);
    assert!(registry.get(2).is_empty());
    assert_eq!(registry.get(1).edit_place_id, Some(4));

    Ok(())
}
