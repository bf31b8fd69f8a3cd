//! # Localization Tests
//!
//! Message retrieval and formatting for the bundled languages.

use city_places::localization::{t_args_lang, t_lang, LocalizationManager};
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("menu-places", "en", None);
        assert!(message.contains("Places"));
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("menu-places", "unsupported", None);
        let english = manager.get_message_in_language("menu-places", "en", None);
        assert_eq!(message, english);
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("name", "Central Park");
        args.insert("id", "5");

        let message = manager.get_message_in_language("place-name-saved", "en", Some(&args));
        assert!(message.contains("Central Park"));
        assert!(message.contains('5'));
        // no bidi isolation marks around arguments
        assert!(!message.contains('\u{2068}'));
    }

    #[test]
    fn test_get_message_missing_args() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("place-name-saved", "en", None);
        assert!(!message.is_empty());
    }

    #[test]
    fn test_russian_localization() {
        let manager = setup_localization();

        let russian = manager.get_message_in_language("menu-places", "ru", None);
        let english = manager.get_message_in_language("menu-places", "en", None);
        assert_ne!(russian, english);
        assert!(russian.contains("Места"));
    }

    #[test]
    fn test_language_resolution() {
        let manager = setup_localization();

        assert_eq!(manager.resolve_language(Some("ru-RU")), "ru");
        assert_eq!(manager.resolve_language(Some("EN")), "en");
        assert_eq!(manager.resolve_language(Some("de")), "en");
        assert_eq!(manager.resolve_language(None), "en");
        assert!(manager.is_supported("ru"));
        assert!(!manager.is_supported("fr"));
    }

    #[test]
    fn test_global_helpers() {
        assert_eq!(t_lang("type-2", Some("ru")), "кафе");
        assert_eq!(t_lang("type-2", Some("pt-BR")), "café");
        assert_eq!(
            t_args_lang("card-type", &[("type", "hotel")], None),
            "Type: hotel"
        );
    }

    #[test]
    fn test_every_key_is_translated() {
        let manager = setup_localization();
        let english = include_str!("../locales/en/main.ftl");

        for line in english.lines() {
            let Some((key, _)) = line.split_once(" = ") else {
                continue;
            };
            let message = manager.get_message_in_language(key, "ru", None);
            let fallback = manager.get_message_in_language(key, "en", None);
            assert!(!message.starts_with("Missing translation:"), "{key}");
            assert_ne!(message, fallback, "{key} is not translated");
        }
    }
}
