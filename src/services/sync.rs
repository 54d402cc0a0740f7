//! Brings a locale catalog in line with the reference skeleton, the way the
//! extraction tool updates translation files after the host code changed.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::catalog::{Catalog, Context, EntryKey};
use crate::model::entry::{TranslationEntry, TranslationStatus};

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub kept: usize,
    pub added: usize,
    pub revived: usize,
    pub vanished: usize,
    pub dropped: usize,
}

/// Returns the merged catalog. `target` keeps its language, version and
/// translations; order, comments and locations come from `reference`.
pub fn sync_with_reference(reference: &Catalog, target: &Catalog) -> (Catalog, SyncReport) {
    let mut report = SyncReport::default();

    // Active entries shadow retired ones with the same key.
    let mut existing: HashMap<EntryKey, &TranslationEntry> = HashMap::new();
    for (ctx, e) in target.entries() {
        let key = EntryKey::new(ctx, e.source.as_str());
        match existing.get(&key) {
            Some(prev) if prev.is_active() || !e.is_active() => {}
            _ => {
                existing.insert(key, e);
            }
        }
    }

    let reference_keys: HashSet<EntryKey> = reference.active_keys().collect();
    let mut placed: HashSet<EntryKey> = HashSet::new();

    let mut out = Catalog {
        version: target.version.clone(),
        language: target.language.clone(),
        source_language: target
            .source_language
            .clone()
            .or_else(|| reference.source_language.clone()),
        contexts: Vec::new(),
    };

    for ref_ctx in &reference.contexts {
        let mut ctx = Context::new(ref_ctx.name.as_str());

        for ref_entry in ref_ctx.entries.iter().filter(|e| e.is_active()) {
            let key = EntryKey::new(ref_ctx.name.as_str(), ref_entry.source.as_str());
            if !placed.insert(key.clone()) {
                continue;
            }

            let mut merged = ref_entry.clone();
            match existing.get(&key) {
                Some(prev) if prev.is_active() => {
                    merged.translation = prev.translation.clone();
                    merged.numerus_forms = prev.numerus_forms.clone();
                    merged.status = prev.status;
                    merged.translatorcomment = prev.translatorcomment.clone();
                    report.kept += 1;
                }
                Some(prev) if prev.has_translation() => {
                    merged.translation = prev.translation.clone();
                    merged.numerus_forms = prev.numerus_forms.clone();
                    merged.status = TranslationStatus::Unfinished;
                    merged.translatorcomment = prev.translatorcomment.clone();
                    report.revived += 1;
                }
                _ => {
                    merged.translation = String::new();
                    merged.numerus_forms.clear();
                    merged.status = TranslationStatus::Finished;
                    merged.translatorcomment = None;
                    report.added += 1;
                }
            }
            ctx.entries.push(merged);
        }

        out.contexts.push(ctx);
    }

    // Whatever the reference no longer knows is retired in its own context.
    for target_ctx in &target.contexts {
        for e in &target_ctx.entries {
            let key = EntryKey::new(target_ctx.name.as_str(), e.source.as_str());
            if reference_keys.contains(&key) {
                continue;
            }
            if !e.has_translation() {
                report.dropped += 1;
                continue;
            }
            if !placed.insert(key) {
                report.dropped += 1;
                continue;
            }

            let mut retired = e.clone();
            retired.status = TranslationStatus::Vanished;
            out.context_mut(&target_ctx.name).entries.push(retired);
            report.vanished += 1;
        }
    }

    out.contexts.retain(|c| !c.entries.is_empty());

    log::info!(
        "synced {}: kept {}, added {}, revived {}, vanished {}, dropped {}",
        out.language,
        report.kept,
        report.added,
        report.revived,
        report.vanished,
        report.dropped
    );

    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(source: &str, translation: &str, status: TranslationStatus) -> TranslationEntry {
        TranslationEntry::new(source, translation).with_status(status)
    }

    fn reference() -> Catalog {
        let mut c = Catalog::new("en_US");
        let plugin = c.context_mut("Plugin");
        plugin
            .entries
            .push(entry("Open settings", "", TranslationStatus::Finished));
        plugin
            .entries
            .push(entry("Spotify tracks", "", TranslationStatus::Finished));
        let mut album = entry("album", "Album", TranslationStatus::Finished);
        album.extracomment = Some("Not literally, use Spotify client translations.".into());
        c.context_mut("spotify").entries.push(album);
        c
    }

    #[test]
    fn merges_onto_reference_order() {
        let mut target = Catalog::new("de_DE");
        let plugin = target.context_mut("Plugin");
        plugin
            .entries
            .push(entry("Enter a query", "Suchanfrage", TranslationStatus::Finished));
        plugin
            .entries
            .push(entry("Spotify tracks", "Spotify Songs", TranslationStatus::Finished));
        plugin
            .entries
            .push(entry("Stale", "", TranslationStatus::Finished));
        target
            .context_mut("spotify")
            .entries
            .push(entry("album", "Album", TranslationStatus::Vanished));

        let (merged, report) = sync_with_reference(&reference(), &target);

        assert_eq!(
            report,
            SyncReport {
                kept: 1,
                added: 1,
                revived: 1,
                vanished: 1,
                dropped: 1,
            }
        );

        let plugin = merged.context("Plugin").unwrap();
        let sources: Vec<(&str, &str, TranslationStatus)> = plugin
            .entries
            .iter()
            .map(|e| (e.source.as_str(), e.translation.as_str(), e.status))
            .collect();
        assert_eq!(
            sources,
            vec![
                ("Open settings", "", TranslationStatus::Finished),
                ("Spotify tracks", "Spotify Songs", TranslationStatus::Finished),
                ("Enter a query", "Suchanfrage", TranslationStatus::Vanished),
            ]
        );

        let album = merged.find("spotify", "album").unwrap();
        assert_eq!(album.status, TranslationStatus::Unfinished);
        assert_eq!(album.translation, "Album");
        assert!(album.extracomment.is_some());
        assert_eq!(merged.language, "de_DE");
    }

    #[test]
    fn contexts_unknown_to_reference_are_appended() {
        let mut target = Catalog::new("de_DE");
        target.context_mut("ConfigWidget").entries.push(entry(
            "Explicit content",
            "Explizite Inhalte",
            TranslationStatus::Vanished,
        ));

        let (merged, report) = sync_with_reference(&reference(), &target);
        let names: Vec<&str> = merged.contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Plugin", "spotify", "ConfigWidget"]);
        assert_eq!(report.added, 3);
        assert_eq!(report.vanished, 1);
    }

    #[test]
    fn sync_is_idempotent() {
        let mut target = Catalog::new("de_DE");
        target
            .context_mut("Plugin")
            .entries
            .push(entry("Spotify tracks", "Spotify Songs", TranslationStatus::Finished));
        let (once, _) = sync_with_reference(&reference(), &target);
        let (twice, report) = sync_with_reference(&reference(), &once);
        assert_eq!(once, twice);
        assert_eq!(report.added, 0);
        assert_eq!(report.kept, 3);
    }

    #[test]
    fn obsolete_entries_are_retired_or_revived() {
        let mut target = Catalog::new("de_DE");
        target.context_mut("Plugin").entries.push(entry(
            "Open settings",
            "Einstellungen öffnen",
            TranslationStatus::Obsolete,
        ));
        target.context_mut("ConfigWidget").entries.push(entry(
            "Explicit content",
            "Explizite Inhalte",
            TranslationStatus::Obsolete,
        ));

        let (merged, report) = sync_with_reference(&reference(), &target);
        assert_eq!(report.revived, 1);
        assert_eq!(report.vanished, 1);

        let open = merged.find("Plugin", "Open settings").unwrap();
        assert_eq!(open.status, TranslationStatus::Unfinished);
        assert_eq!(open.translation, "Einstellungen öffnen");
        let explicit = merged.find("ConfigWidget", "Explicit content").unwrap();
        assert_eq!(explicit.status, TranslationStatus::Vanished);
    }

    #[test]
    fn plural_forms_survive_sync() {
        let mut reference = reference();
        let mut skeleton = entry("%n tracks", "", TranslationStatus::Finished);
        skeleton.numerus = true;
        skeleton.numerus_forms = vec![String::new()];
        reference.context_mut("Plugin").entries.push(skeleton);

        let mut translated = entry("%n tracks", "", TranslationStatus::Finished);
        translated.numerus = true;
        translated.numerus_forms = vec!["%n Song".into(), "%n Songs".into()];
        let mut target = Catalog::new("de_DE");
        target.context_mut("Plugin").entries.push(translated);

        let (merged, report) = sync_with_reference(&reference, &target);
        assert_eq!(report.kept, 1);
        let plural = merged.find("Plugin", "%n tracks").unwrap();
        assert!(plural.numerus);
        assert_eq!(plural.numerus_forms, vec!["%n Song", "%n Songs"]);
    }
}
