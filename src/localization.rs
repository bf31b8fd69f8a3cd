//! # Localization Module
//!
//! Fluent message bundles for every supported interface language. The `.ftl`
//! resources are compiled into the binary, so the bot does not depend on the
//! working directory it is started from.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;
use unic_langid::LanguageIdentifier;

/// Language used when the user's language is unknown or unsupported
pub const DEFAULT_LANGUAGE: &str = "en";

const RESOURCES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en/main.ftl")),
    ("ru", include_str!("../locales/ru/main.ftl")),
];

/// Localization manager for the places bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (language, source) in RESOURCES {
            let locale: LanguageIdentifier = language.parse()?;
            let bundle = Self::create_bundle(locale, source)?;
            bundles.insert(language.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    fn create_bundle(
        locale: LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("failed to parse {locale} resource: {errors:?}"))?;

        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Unicode isolation marks around arguments show up as garbage in Telegram
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("duplicate messages in {locale} resource: {errors:?}"))?;

        Ok(bundle)
    }

    /// Languages with a loaded bundle
    pub fn is_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Reduce a platform language code ("ru-RU", "en", None) to a bundle key
    pub fn resolve_language(&self, language: Option<&str>) -> &str {
        let primary = language
            .and_then(|code| code.split(['-', '_']).next())
            .map(str::to_lowercase);

        match primary {
            Some(code) => match self.bundles.get_key_value(code.as_str()) {
                Some((key, _)) => key.as_str(),
                None => DEFAULT_LANGUAGE,
            },
            None => DEFAULT_LANGUAGE,
        }
    }

    /// Get a localized message in `language`, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None if language != DEFAULT_LANGUAGE => {
                return self.get_message_in_language(key, DEFAULT_LANGUAGE, args)
            }
            None => return format!("Missing translation: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, language, ?errors, "Message formatted with errors");
        }

        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)], language: &str) -> String {
        let args_map: HashMap<&str, &str> = args.iter().copied().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }
}

static LOCALIZATION_MANAGER: OnceLock<Option<LocalizationManager>> = OnceLock::new();

/// Initialize the global localization manager. Calling it again is a no-op.
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_some() {
        return Ok(());
    }
    let manager = LocalizationManager::new()?;
    let _ = LOCALIZATION_MANAGER.set(Some(manager));
    Ok(())
}

/// The global localization manager, initialized on first use
fn manager() -> Option<&'static LocalizationManager> {
    LOCALIZATION_MANAGER
        .get_or_init(|| match LocalizationManager::new() {
            Ok(manager) => Some(manager),
            Err(err) => {
                warn!(error = %err, "Localization unavailable, falling back to message keys");
                None
            }
        })
        .as_ref()
}

/// Localized message for a platform language code
pub fn t_lang(key: &str, language: Option<&str>) -> String {
    match manager() {
        Some(manager) => {
            let language = manager.resolve_language(language);
            manager.get_message_in_language(key, language, None)
        }
        None => key.to_string(),
    }
}

/// Localized message with arguments for a platform language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language: Option<&str>) -> String {
    match manager() {
        Some(manager) => {
            let language = manager.resolve_language(language);
            manager.get_message_with_args(key, args, language)
        }
        None => key.to_string(),
    }
}
