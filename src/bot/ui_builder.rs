//! UI Builder module for creating keyboards and formatting messages

use crate::aggregate::RatingSummary;
use crate::dialogue::WorkflowState;
use crate::localization::{t_args_lang, t_lang};
use crate::models::{Place, PlaceType, Review};

use super::actions::Action;
use super::event::{Button, Keyboard, Reply};

/// Human-readable place category
pub fn type_label(kind: &PlaceType, language_code: Option<&str>) -> String {
    match kind {
        PlaceType::Numbered(code) => t_lang(&format!("type-{code}"), language_code),
        PlaceType::Custom(text) => text.clone(),
    }
}

/// Menu entries available to every user
fn user_menu_buttons(language_code: Option<&str>) -> Vec<Button> {
    vec![
        Button::new(t_lang("menu-places", language_code), Action::Places),
        Button::new(t_lang("menu-my-places", language_code), Action::MyPlaces),
        Button::new(t_lang("menu-favorites", language_code), Action::Favorites),
    ]
}

/// Create the main menu keyboard; administrators get the management entries on top
pub fn create_menu_keyboard(is_admin: bool, language_code: Option<&str>) -> Keyboard {
    let mut buttons = Vec::new();
    if is_admin {
        buttons.push(Button::new(t_lang("menu-add-place", language_code), Action::AddPlace));
        buttons.push(Button::new(
            t_lang("menu-manage-places", language_code),
            Action::ManagePlaces,
        ));
    }
    buttons.extend(user_menu_buttons(language_code));
    Keyboard::column(buttons)
}

/// The idle menu reply
pub fn menu_reply(is_admin: bool, language_code: Option<&str>) -> Reply {
    let title = if is_admin { "menu-admin-title" } else { "menu-user-title" };
    Reply::text_with_keyboard(
        t_lang(title, language_code),
        create_menu_keyboard(is_admin, language_code),
    )
}

/// Prompt shown when a user enters, or has to repeat, a workflow step
pub fn prompt_for(state: WorkflowState, language_code: Option<&str>) -> Option<String> {
    let key = match state {
        WorkflowState::Idle => return None,
        WorkflowState::AddName => "prompt-name",
        WorkflowState::AddType => "prompt-type",
        WorkflowState::AddAddress => "prompt-address",
        WorkflowState::AddPhoto => "prompt-photo",
        WorkflowState::EditName => "prompt-edit-name",
        WorkflowState::EditType => "prompt-edit-type",
        WorkflowState::AddReview => "prompt-review",
        WorkflowState::AddRating => "prompt-rating",
    };
    Some(t_lang(key, language_code))
}

fn format_average(average: f64) -> String {
    format!("{average:.1}")
}

/// Rating line of a place card
pub fn format_rating_line(summary: &RatingSummary, language_code: Option<&str>) -> String {
    let count = summary.review_count.to_string();
    match summary.average {
        Some(average) => t_args_lang(
            "card-rating",
            &[("average", format_average(average).as_str()), ("count", count.as_str())],
            language_code,
        ),
        None => t_args_lang("card-no-rating", &[("count", count.as_str())], language_code),
    }
}

/// Format a place as a card caption
pub fn format_place_card(
    place: &Place,
    summary: Option<&RatingSummary>,
    language_code: Option<&str>,
) -> String {
    let mut card = format!("🏠 {}\n", place.name);

    card.push_str(&t_args_lang(
        "card-type",
        &[("type", type_label(&place.kind, language_code).as_str())],
        language_code,
    ));
    card.push('\n');

    match &place.address {
        Some(address) => card.push_str(&t_args_lang(
            "card-address",
            &[("address", address.as_str())],
            language_code,
        )),
        None => card.push_str(&t_lang("card-no-address", language_code)),
    }

    if let Some(summary) = summary {
        card.push('\n');
        card.push_str(&format_rating_line(summary, language_code));
    }

    card
}

/// Edit / delete buttons under a place card in the management list
pub fn create_manage_keyboard(place_id: i64, language_code: Option<&str>) -> Keyboard {
    Keyboard {
        rows: vec![
            vec![
                Button::new(
                    format!("✏️ {}", t_lang("button-edit-name", language_code)),
                    Action::EditName(place_id),
                ),
                Button::new(
                    format!("✏️ {}", t_lang("button-edit-type", language_code)),
                    Action::EditType(place_id),
                ),
            ],
            vec![Button::new(
                format!("🗑️ {}", t_lang("button-delete", language_code)),
                Action::DeletePlace(place_id),
            )],
        ],
    }
}

/// Buttons under a place card in the browse lists
pub fn create_browse_keyboard(
    place_id: i64,
    is_favorite: bool,
    language_code: Option<&str>,
) -> Keyboard {
    let favorite = if is_favorite {
        Button::new(
            format!("💔 {}", t_lang("button-favorite-remove", language_code)),
            Action::RemoveFavorite(place_id),
        )
    } else {
        Button::new(
            format!("⭐ {}", t_lang("button-favorite-add", language_code)),
            Action::AddFavorite(place_id),
        )
    };

    Keyboard {
        rows: vec![
            vec![favorite],
            vec![
                Button::new(
                    format!("✅ {}", t_lang("button-visited", language_code)),
                    Action::Visited(place_id),
                ),
                Button::new(
                    format!("💬 {}", t_lang("button-reviews", language_code)),
                    Action::Reviews(place_id),
                ),
            ],
        ],
    }
}

/// A card as a photo message when the place has a photo, as text otherwise
pub fn place_card_reply(place: &Place, caption: String, keyboard: Keyboard) -> Reply {
    match &place.photo_ref {
        Some(photo_ref) => Reply::Photo {
            photo_ref: photo_ref.clone(),
            caption,
            keyboard: Some(keyboard),
        },
        None => Reply::text_with_keyboard(caption, keyboard),
    }
}

/// Format the reviews of a place, newest first
pub fn format_reviews(
    place: &Place,
    summary: &RatingSummary,
    reviews: &[Review],
    language_code: Option<&str>,
) -> String {
    let mut result = t_args_lang("reviews-title", &[("name", place.name.as_str())], language_code);
    result.push('\n');
    result.push_str(&format_rating_line(summary, language_code));

    if reviews.is_empty() {
        result.push_str("\n\n");
        result.push_str(&t_lang("reviews-empty", language_code));
        return result;
    }

    for review in reviews {
        let rating = match review.rating {
            Some(rating) => "⭐".repeat(usize::from(rating)),
            None => t_lang("review-unrated", language_code),
        };
        result.push_str(&format!(
            "\n\n{} · {}\n{}",
            rating,
            review.created_at.format("%Y-%m-%d"),
            review.text
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(photo_ref: Option<&str>) -> Place {
        Place {
            id: 4,
            name: "Central Park".to_string(),
            kind: PlaceType::Numbered(3),
            address: Some("Main St 1".to_string()),
            photo_ref: photo_ref.map(str::to_string),
        }
    }

    #[test]
    fn test_admin_menu_extends_user_menu() {
        let user: Vec<Action> = create_menu_keyboard(false, None).actions().collect();
        let admin: Vec<Action> = create_menu_keyboard(true, None).actions().collect();

        assert_eq!(user, vec![Action::Places, Action::MyPlaces, Action::Favorites]);
        assert_eq!(&admin[..2], &[Action::AddPlace, Action::ManagePlaces]);
        assert_eq!(&admin[2..], &user[..]);
    }

    #[test]
    fn test_browse_keyboard_reflects_favorite_state() {
        let keyboard = create_browse_keyboard(4, false, None);
        assert!(keyboard.actions().any(|a| a == Action::AddFavorite(4)));

        let keyboard = create_browse_keyboard(4, true, None);
        assert!(keyboard.actions().any(|a| a == Action::RemoveFavorite(4)));
        assert!(!keyboard.actions().any(|a| a == Action::AddFavorite(4)));
    }

    #[test]
    fn test_card_reply_uses_photo_when_present() {
        let reply = place_card_reply(&place(Some("AgAD")), "card".to_string(), Keyboard::default());
        assert!(matches!(reply, Reply::Photo { ref photo_ref, .. } if photo_ref == "AgAD"));

        let reply = place_card_reply(&place(None), "card".to_string(), Keyboard::default());
        assert!(matches!(reply, Reply::Text { .. }));
    }

    #[test]
    fn test_card_shows_name_and_address() {
        let card = format_place_card(&place(None), None, Some("en"));
        assert!(card.contains("Central Park"));
        assert!(card.contains("Main St 1"));
    }

    #[test]
    fn test_average_has_one_decimal() {
        assert_eq!(format_average(4.0), "4.0");
        assert_eq!(format_average(11.0 / 3.0), "3.7");
    }

    #[test]
    fn test_custom_type_shown_verbatim() {
        assert_eq!(type_label(&PlaceType::Custom("museum".to_string()), None), "museum");
    }
}
