#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Checks against the Spotify plugin's shipped catalogs.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use ts_catalog_core::model::catalog::Catalog;
use ts_catalog_core::model::entry::TranslationStatus;
use ts_catalog_core::parsers::ts;
use ts_catalog_core::services::lookup::Translator;
use ts_catalog_core::services::qa::{self, ValidationReport};
use ts_catalog_core::services::{rebuild, sync};

// ===== Helpers =====

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn english() -> Catalog {
    ts::parse_file(&fixture("spotify_en.ts")).expect("english catalog parses")
}

fn german() -> Catalog {
    ts::parse_file(&fixture("spotify_de.ts")).expect("german catalog parses")
}

fn context_names(catalog: &Catalog) -> Vec<&str> {
    catalog.contexts.iter().map(|c| c.name.as_str()).collect()
}

// ===== Parsing =====

#[test]
fn parses_shipped_catalogs() {
    let en = english();
    assert_eq!(en.language, "en_US");
    assert_eq!(en.version, "2.1");
    assert_eq!(context_names(&en), vec!["Plugin", "SpotifyItem", "spotify"]);
    assert_eq!(en.len(), 26);

    let de = german();
    assert_eq!(de.language, "de_DE");
    assert_eq!(
        context_names(&de),
        vec!["ConfigWidget", "Plugin", "SpotifyItem", "spotify"]
    );
    assert_eq!(de.len(), 32);
    assert_eq!(de.active_keys().count(), 25);

    let artist = de.find("spotify", "artist").unwrap();
    assert_eq!(artist.translation, "Künstler:in");
    assert_eq!(
        artist.extracomment.as_deref(),
        Some("Not literally, use Spotify client translations.")
    );

    let queue = de.find("SpotifyItem", "Add to queue").unwrap();
    assert_eq!(queue.status, TranslationStatus::Unfinished);
}

#[test]
fn rebuild_reproduces_shipped_files() {
    for name in ["spotify_en.ts", "spotify_de.ts"] {
        let original = std::fs::read_to_string(fixture(name)).unwrap();
        let catalog = ts::parse(&original).unwrap();
        assert_eq!(rebuild::rebuild(&catalog), original, "{name}");
    }
}

// ===== Structural properties =====

#[test]
fn shipped_catalogs_are_structurally_sound() {
    assert!(qa::run(&english()).is_empty());
    assert!(qa::run(&german()).is_empty());
}

#[test]
fn german_is_a_subset_of_english() {
    let report = ValidationReport::from_issues(qa::compare(&english(), &german()));

    assert!(report.is_ok());
    assert_eq!(report.codes(), vec!["MISSING_IN_LOCALE"]);
    let issue = &report.issues[0];
    assert_eq!(issue.context.as_deref(), Some("Plugin"));
    assert_eq!(issue.source.as_deref(), Some("Open settings"));
}

#[test]
fn english_reference_has_no_retired_entries() {
    assert!(english().entries().all(|(_, e)| e.is_active()));
}

// ===== Lookup =====

#[test]
fn lookup_with_fallback() {
    let mut t = Translator::default();
    t.insert_catalog(&english()).unwrap();
    t.insert_catalog(&german()).unwrap();

    assert_eq!(
        t.lookup("Plugin", "Search Spotify artists", "de_DE"),
        "Spotify Künstler:innen suchen"
    );
    assert_eq!(t.lookup("spotify", "show", "de"), "Podcast");
    assert_eq!(
        t.lookup("SpotifyItem", "Play on Spotify", "de_AT"),
        "Auf Spotify abspielen"
    );

    // Not translated in German.
    assert_eq!(t.lookup("Plugin", "Open settings", "de_DE"), "Open settings");
    // Vanished in German.
    assert_eq!(t.lookup("Plugin", "Enter a query", "de_DE"), "Enter a query");
    // English keeps the source unless a translation is given.
    assert_eq!(t.lookup("Plugin", "Spotify tracks", "en_US"), "Spotify tracks");
    assert_eq!(t.lookup("spotify", "album", "en_GB"), "Album");
    // Unsupported locale.
    assert_eq!(t.lookup("spotify", "album", "ja_JP"), "album");
}

// ===== Sync =====

#[test]
fn sync_german_onto_english() {
    let (merged, report) = sync::sync_with_reference(&english(), &german());

    assert_eq!(report.kept, 25);
    assert_eq!(report.added, 1);
    assert_eq!(report.revived, 0);
    assert_eq!(report.vanished, 7);
    assert_eq!(report.dropped, 0);

    assert_eq!(
        context_names(&merged),
        vec!["Plugin", "SpotifyItem", "spotify", "ConfigWidget"]
    );

    let open = merged.find("Plugin", "Open settings").unwrap();
    assert_eq!(open.translation, "");
    assert_eq!(open.status, TranslationStatus::Finished);

    let report = ValidationReport::from_issues(qa::compare(&english(), &merged));
    assert_eq!(report.codes(), vec!["UNTRANSLATED"]);
    assert!(qa::run(&merged).is_empty());
}
