use super::model::TmEntry;
use super::{hash, normalize};

/// Memory entry for `source` in the given language pair. A pair harvested
/// from the same `context` wins over one from elsewhere in the catalog
/// family. Sources that normalize to nothing (`...`, `()`) never match.
pub fn exact_match<'a>(
    entries: &'a [TmEntry],
    source_lang: &str,
    target_lang: &str,
    context: &str,
    source: &str,
) -> Option<&'a TmEntry> {
    let norm = normalize::normalize(source);
    if norm.is_empty() {
        return None;
    }
    let h = hash::hash_norm(&norm);

    let mut candidates = entries.iter().filter(|e| {
        e.source_lang == source_lang
            && e.target_lang == target_lang
            && e.hash == h
            && e.normalized == norm
    });

    let first = candidates.next()?;
    if first.context.as_deref() == Some(context) {
        return Some(first);
    }
    candidates
        .find(|e| e.context.as_deref() == Some(context))
        .or(Some(first))
}
