use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::model::TmEntry;
use super::{hash, normalize};
use crate::error::{CoreError, Result};
use crate::model::catalog::Catalog;
use crate::model::locale::Locale;
use crate::services::rebuild::write_atomic;

/// Language pair, normalized source and context.
type MemoryKey = (String, String, String, Option<String>);

/// Loads the memory file. A missing file is an empty memory; an unreadable
/// one is logged and treated as empty. Stale hashes and duplicates are
/// cleaned up and written back.
pub fn load(path: &Path) -> Vec<TmEntry> {
    let raw = match read(path) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("ignoring translation memory {}: {e}", path.display());
            return Vec::new();
        }
    };

    let count = raw.len();
    let mut stale = false;
    let entries = consolidate(raw.into_iter().map(|mut e| {
        stale |= refresh(&mut e);
        e
    }));

    if stale || entries.len() != count {
        if let Err(e) = save(path, &entries) {
            log::warn!("failed to rewrite {}: {e}", path.display());
        }
    }

    entries
}

fn read(path: &Path) -> Result<Vec<TmEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    Ok(serde_json::from_str(&data)?)
}

pub fn save(path: &Path, entries: &[TmEntry]) -> Result<()> {
    let entries = consolidate(entries.iter().cloned());
    let json = serde_json::to_string_pretty(&entries)?;

    write_atomic(path, json.as_bytes())?;
    log::info!("saved {} memory entries to {}", entries.len(), path.display());

    Ok(())
}

/// Every non-plural entry of `catalog` that carries text, retired ones
/// included, as memory entries from `source_lang` into the catalog's
/// language.
pub fn harvest(catalog: &Catalog, source_lang: &str) -> Vec<TmEntry> {
    let target_lang = canonical_lang(&catalog.language);
    let source_lang = canonical_lang(source_lang);

    catalog
        .entries()
        .filter(|(_, e)| !e.numerus && !e.translation.trim().is_empty())
        .filter_map(|(ctx, e)| {
            let mut tm = TmEntry {
                source_lang: source_lang.clone(),
                target_lang: target_lang.clone(),
                context: Some(ctx.to_string()),
                source: e.source.clone(),
                translation: e.translation.clone(),
                normalized: String::new(),
                hash: String::new(),
            };
            refresh(&mut tm);
            (!tm.normalized.is_empty()).then_some(tm)
        })
        .collect()
}

/// Adds `incoming` to `entries`. For the same language pair, context and
/// normalized source the incoming text replaces the stored one.
pub fn merge(entries: Vec<TmEntry>, incoming: Vec<TmEntry>) -> Vec<TmEntry> {
    consolidate(entries.into_iter().chain(incoming))
}

pub(crate) fn canonical_lang(lang: &str) -> String {
    match Locale::parse(lang) {
        Ok(l) => l.to_string(),
        Err(_) => lang.trim().to_string(),
    }
}

/// Recomputes `normalized` and `hash`; returns whether either changed.
fn refresh(e: &mut TmEntry) -> bool {
    let normalized = normalize::normalize(&e.source);
    let hash = hash::hash_norm(&normalized);
    let changed = e.normalized != normalized || e.hash != hash;
    e.normalized = normalized;
    e.hash = hash;
    changed
}

/// One entry per key, last one wins, ordered by key. Entries without text
/// or without a matchable source are dropped.
fn consolidate(entries: impl IntoIterator<Item = TmEntry>) -> Vec<TmEntry> {
    let mut by_key: BTreeMap<MemoryKey, TmEntry> = BTreeMap::new();

    for mut e in entries {
        refresh(&mut e);
        if e.normalized.is_empty() || e.translation.trim().is_empty() {
            continue;
        }
        let key = (
            e.source_lang.clone(),
            e.target_lang.clone(),
            e.normalized.clone(),
            e.context.clone(),
        );
        by_key.insert(key, e);
    }

    by_key.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::{TranslationEntry, TranslationStatus};

    fn tm(source: &str, translation: &str) -> TmEntry {
        TmEntry {
            source_lang: "en".into(),
            target_lang: "de_DE".into(),
            context: None,
            source: source.into(),
            translation: translation.into(),
            normalized: String::new(),
            hash: String::new(),
        }
    }

    #[test]
    fn harvest_includes_retired_text() {
        let mut c = Catalog::new("de-de");
        let plugin = c.context_mut("Plugin");
        plugin.entries.push(
            TranslationEntry::new("Play on Spotify", "Auf Spotify abspielen")
                .with_status(TranslationStatus::Vanished),
        );
        plugin.entries.push(TranslationEntry::new("Open settings", ""));

        let entries = harvest(&c, "EN");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target_lang, "de_DE");
        assert_eq!(entries[0].source_lang, "en");
        assert_eq!(entries[0].context.as_deref(), Some("Plugin"));
        assert_eq!(entries[0].normalized, "play on spotify");
        assert_eq!(entries[0].hash.len(), 64);
    }

    #[test]
    fn later_translation_replaces_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_memory.json");

        save(
            &path,
            &[
                tm("Add to queue", "Einreihen"),
                tm("add to  queue", "Zur Warteschlange hinzufügen"),
                tm("Show in Spotify", "In Spotify anzeigen"),
            ],
        )
        .unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].translation, "Zur Warteschlange hinzufügen");
        assert_eq!(loaded[1].source, "Show in Spotify");
    }

    #[test]
    fn load_tolerates_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tm.json");
        assert!(load(&path).is_empty());

        fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_empty());
    }

    #[test]
    fn load_migrates_entries_without_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tm.json");
        fs::write(
            &path,
            r#"[{"source_lang":"en","target_lang":"de_DE","source":"Add to queue","translation":"Einreihen"}]"#,
        )
        .unwrap();

        let loaded = load(&path);
        assert_eq!(loaded[0].normalized, "add to queue");

        let persisted = fs::read_to_string(&path).unwrap();
        assert!(persisted.contains(&loaded[0].hash));
    }

    #[test]
    fn harvest_skips_sources_without_words() {
        let mut c = Catalog::new("de_DE");
        let plugin = c.context_mut("Plugin");
        plugin.entries.push(TranslationEntry::new("()", "KLAMMERN"));
        plugin.entries.push(TranslationEntry::new("…", "…"));
        plugin.entries.push(TranslationEntry::new("Artists", "Künstler"));
        let mut plural = TranslationEntry::new("%n tracks", "");
        plural.numerus = true;
        plural.numerus_forms = vec!["%n Song".into(), "%n Songs".into()];
        plugin.entries.push(plural);

        let entries = harvest(&c, "en");
        let sources: Vec<&str> = entries.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["Artists"]);
    }

    #[test]
    fn contexts_are_kept_apart() {
        let mut a = tm("Artists", "Künstler");
        a.context = Some("Plugin".into());
        let mut b = tm("artists", "Interpreten");
        b.context = Some("spotify".into());

        let merged = merge(vec![a], vec![b, tm("()", "KLAMMERN")]);
        let pairs: Vec<(Option<&str>, &str)> = merged
            .iter()
            .map(|e| (e.context.as_deref(), e.translation.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![(Some("Plugin"), "Künstler"), (Some("spotify"), "Interpreten")]
        );
    }
}
