use crate::model::catalog::Catalog;
use crate::model::entry::TranslationStatus;
use crate::services::translation_memory::{matcher, model::TmEntry, store};

use serde::Serialize;

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    pub missed: usize,
    /// `context/source` of entries still without text.
    pub missing: Vec<String>,
}

/// Drafts translations for active, empty entries of `target` from the
/// memory. Drafts are marked unfinished so they go through review.
pub fn fill(target: &mut Catalog, memory: &[TmEntry], source_lang: &str) -> FillReport {
    let source_lang = store::canonical_lang(source_lang);
    let target_lang = store::canonical_lang(&target.language);

    let mut report = FillReport::default();

    for (ctx, e) in target.entries_mut() {
        if !e.is_active() || e.numerus || e.has_translation() {
            continue;
        }

        match matcher::exact_match(memory, &source_lang, &target_lang, ctx, &e.source) {
            Some(tm) => {
                e.translation = tm.translation.clone();
                e.status = TranslationStatus::Unfinished;
                report.filled += 1;
            }
            None => {
                report.missed += 1;
                report.missing.push(format!("{ctx}/{}", e.source));
            }
        }
    }

    log::info!(
        "filled {} of {} untranslated entries in {}",
        report.filled,
        report.filled + report.missed,
        target_lang
    );

    report
}
