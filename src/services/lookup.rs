//! Runtime lookup over loaded catalogs.
//!
//! A lookup never fails: when no locale provides a usable translation the
//! source phrase itself is returned.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::Serialize;

use crate::model::catalog::{Catalog, EntryKey};
use crate::model::entry::TranslationStatus;
use crate::model::locale::Locale;

/// Translations of one locale, reduced to what a lookup may return.
#[derive(Debug, Clone, Default)]
struct Table {
    strings: HashMap<EntryKey, String>,
}

impl Table {
    fn compile(catalog: &Catalog, include_unfinished: bool) -> Self {
        let mut strings = HashMap::new();
        for (ctx, e) in catalog.entries() {
            let usable = match e.status {
                TranslationStatus::Finished => true,
                TranslationStatus::Unfinished => include_unfinished,
                TranslationStatus::Vanished | TranslationStatus::Obsolete => false,
            };
            // Plural forms need a count, which this lookup does not take.
            if !usable || e.numerus || !e.has_translation() {
                continue;
            }
            // First occurrence wins, as duplicates are reported by QA.
            strings
                .entry(EntryKey::new(ctx, e.source.as_str()))
                .or_insert_with(|| e.translation.clone());
        }
        Table { strings }
    }

    fn get(&self, context: &str, source: &str) -> Option<&str> {
        self.strings
            .get(&EntryKey::new(context, source))
            .map(String::as_str)
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub text: String,
    /// Locale whose table supplied `text`; `None` on source fallback.
    pub locale: Option<String>,
    pub fallback: bool,
}

#[derive(Debug, Clone)]
pub struct Translator {
    tables: HashMap<Locale, Table>,
    /// Bare-language aliases (`de` → `de_DE`) for catalogs registered with
    /// a region.
    aliases: HashMap<Locale, Locale>,
    include_unfinished: bool,
}

impl Default for Translator {
    fn default() -> Self {
        Translator::new(true)
    }
}

impl Translator {
    pub fn new(include_unfinished: bool) -> Self {
        Translator {
            tables: HashMap::new(),
            aliases: HashMap::new(),
            include_unfinished,
        }
    }

    /// Registers a catalog under `locale`, replacing any previous one.
    pub fn insert(&mut self, locale: Locale, catalog: &Catalog) {
        let table = Table::compile(catalog, self.include_unfinished);
        log::debug!(
            "registered {} with {} usable translations",
            locale,
            table.strings.len()
        );

        if !locale.is_language_only() {
            self.aliases
                .entry(locale.language_only())
                .or_insert_with(|| locale.clone());
        }
        self.tables.insert(locale, table);
    }

    /// Registers a catalog under its own `language` attribute.
    pub fn insert_catalog(&mut self, catalog: &Catalog) -> crate::error::Result<Locale> {
        let locale = Locale::parse(&catalog.language)?;
        self.insert(locale.clone(), catalog);
        Ok(locale)
    }

    pub fn locales(&self) -> Vec<String> {
        let mut out: Vec<String> = self.tables.keys().map(Locale::to_string).collect();
        out.sort();
        out
    }

    /// Tables to consult for `locale`, most specific first.
    fn resolve(&self, locale: &str) -> Vec<&Locale> {
        let Ok(requested) = Locale::parse(locale) else {
            return Vec::new();
        };

        let mut chain: Vec<&Locale> = Vec::with_capacity(2);
        if let Some((key, _)) = self.tables.get_key_value(&requested) {
            chain.push(key);
        }

        let bare = requested.language_only();
        let fallback = match self.tables.get_key_value(&bare) {
            Some((key, _)) => Some(key),
            None => self.aliases.get(&bare),
        };
        if let Some(key) = fallback {
            if !chain.contains(&key) {
                chain.push(key);
            }
        }
        chain
    }

    pub fn lookup_detailed(&self, context: &str, source: &str, locale: &str) -> LookupResult {
        for key in self.resolve(locale) {
            let found = self
                .tables
                .get(key)
                .and_then(|table| table.get(context, source));
            if let Some(text) = found {
                return LookupResult {
                    text: text.to_string(),
                    locale: Some(key.to_string()),
                    fallback: false,
                };
            }
        }

        log::debug!("no translation for {context}/{source:?} in {locale}; using source");
        LookupResult {
            text: source.to_string(),
            locale: None,
            fallback: true,
        }
    }

    /// Best available translation of `source`, or `source` itself.
    pub fn lookup<'a>(&'a self, context: &str, source: &'a str, locale: &str) -> Cow<'a, str> {
        for key in self.resolve(locale) {
            if let Some(text) = self.tables.get(key).and_then(|t| t.get(context, source)) {
                return Cow::Borrowed(text);
            }
        }
        Cow::Borrowed(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::TranslationEntry;

    fn german() -> Catalog {
        let mut catalog = Catalog::new("de_DE");
        let plugin = catalog.context_mut("Plugin");
        plugin
            .entries
            .push(TranslationEntry::new("Spotify tracks", "Spotify Songs"));
        plugin.entries.push(TranslationEntry::new("Open settings", ""));
        plugin.entries.push(
            TranslationEntry::new("Enter a query", "Geben Sie eine Suchanfrage ein")
                .with_status(TranslationStatus::Vanished),
        );
        catalog.context_mut("SpotifyItem").entries.push(
            TranslationEntry::new("Add to queue", "Zur Warteschlange hinzufügen")
                .with_status(TranslationStatus::Unfinished),
        );
        catalog
    }

    fn translator(include_unfinished: bool) -> Translator {
        let mut t = Translator::new(include_unfinished);
        t.insert_catalog(&german()).unwrap();
        t
    }

    #[test]
    fn finds_exact_locale() {
        let t = translator(true);
        assert_eq!(t.lookup("Plugin", "Spotify tracks", "de_DE"), "Spotify Songs");
        assert_eq!(t.lookup("Plugin", "Spotify tracks", "de-de"), "Spotify Songs");
    }

    #[test]
    fn region_falls_back_to_language() {
        let t = translator(true);
        let r = t.lookup_detailed("Plugin", "Spotify tracks", "de_AT");
        assert_eq!(r.text, "Spotify Songs");
        assert_eq!(r.locale.as_deref(), Some("de_DE"));
        assert!(!r.fallback);
        assert_eq!(t.lookup("Plugin", "Spotify tracks", "de"), "Spotify Songs");
    }

    #[test]
    fn empty_vanished_and_unknown_fall_back_to_source() {
        let t = translator(true);
        assert_eq!(t.lookup("Plugin", "Open settings", "de_DE"), "Open settings");
        assert_eq!(t.lookup("Plugin", "Enter a query", "de_DE"), "Enter a query");
        assert_eq!(t.lookup("Plugin", "Nope", "de_DE"), "Nope");
        // Context matters.
        assert_eq!(t.lookup("spotify", "Spotify tracks", "de_DE"), "Spotify tracks");
    }

    #[test]
    fn unsupported_or_invalid_locale_falls_back() {
        let t = translator(true);
        let r = t.lookup_detailed("Plugin", "Spotify tracks", "fr_FR");
        assert_eq!(r.text, "Spotify tracks");
        assert!(r.fallback);
        assert_eq!(r.locale, None);
        assert_eq!(t.lookup("Plugin", "Spotify tracks", "???"), "Spotify tracks");
    }

    #[test]
    fn unfinished_respects_option() {
        assert_eq!(
            translator(true).lookup("SpotifyItem", "Add to queue", "de_DE"),
            "Zur Warteschlange hinzufügen"
        );
        assert_eq!(
            translator(false).lookup("SpotifyItem", "Add to queue", "de_DE"),
            "Add to queue"
        );
    }

    #[test]
    fn blank_and_plural_entries_fall_back_to_source() {
        let mut catalog = Catalog::new("de_DE");
        let plugin = catalog.context_mut("Plugin");
        plugin.entries.push(TranslationEntry::new("Search Spotify", "  \n "));
        let mut plural = TranslationEntry::new("%n tracks", "");
        plural.numerus = true;
        plural.numerus_forms = vec!["%n Song".into(), "%n Songs".into()];
        plugin.entries.push(plural);

        let mut t = Translator::default();
        t.insert_catalog(&catalog).unwrap();

        let r = t.lookup_detailed("Plugin", "%n tracks", "de_DE");
        assert_eq!(r.text, "%n tracks");
        assert!(r.fallback);
        assert_eq!(t.lookup("Plugin", "Search Spotify", "de_DE"), "Search Spotify");
    }

    #[test]
    fn bare_language_catalog_wins_over_alias() {
        let mut t = translator(true);
        let mut plain = Catalog::new("de");
        plain
            .context_mut("Plugin")
            .entries
            .push(TranslationEntry::new("Spotify tracks", "Titel"));
        t.insert_catalog(&plain).unwrap();

        assert_eq!(t.lookup("Plugin", "Spotify tracks", "de_CH"), "Titel");
        assert_eq!(t.lookup("Plugin", "Spotify tracks", "de_DE"), "Spotify Songs");
        assert_eq!(t.locales(), vec!["de".to_string(), "de_DE".to_string()]);
    }
}
