use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::catalog::{Catalog, EntryKey};
use crate::model::entry::TranslationStatus;
use crate::model::locale::Locale;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub code: String,
    pub severity: Severity,
    pub locale: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub message: String,
}

impl QaIssue {
    fn entry(
        code: &str,
        severity: Severity,
        locale: &str,
        context: &str,
        source: &str,
        message: impl Into<String>,
    ) -> Self {
        QaIssue {
            code: code.to_string(),
            severity,
            locale: locale.to_string(),
            context: Some(context.to_string()),
            source: Some(source.to_string()),
            message: message.into(),
        }
    }

    pub(crate) fn catalog(
        code: &str,
        severity: Severity,
        locale: &str,
        message: impl Into<String>,
    ) -> Self {
        QaIssue {
            code: code.to_string(),
            severity,
            locale: locale.to_string(),
            context: None,
            source: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct ValidationReport {
    pub errors: usize,
    pub warnings: usize,
    pub issues: Vec<QaIssue>,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<QaIssue>) -> Self {
        let mut report = ValidationReport::default();
        report.extend(issues);
        report
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = QaIssue>) {
        for issue in issues {
            match issue.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Info => {}
            }
            self.issues.push(issue);
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    pub fn codes(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.code.as_str()).collect()
    }
}

/// Structural checks on a single catalog.
pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let locale = catalog.language.as_str();

    if locale.trim().is_empty() {
        issues.push(QaIssue::catalog(
            "MISSING_LANGUAGE",
            Severity::Warning,
            locale,
            "<TS> has no language attribute",
        ));
    } else if Locale::parse(locale).is_err() {
        issues.push(QaIssue::catalog(
            "INVALID_LANGUAGE",
            Severity::Warning,
            locale,
            format!("'{locale}' is not a locale identifier"),
        ));
    }

    let mut seen: HashSet<EntryKey> = HashSet::new();

    for (ctx, e) in catalog.entries() {
        if e.source.trim().is_empty() {
            issues.push(QaIssue::entry(
                "EMPTY_SOURCE",
                Severity::Error,
                locale,
                ctx,
                &e.source,
                "Entry has an empty source phrase",
            ));
        }

        if !seen.insert(EntryKey::new(ctx, e.source.as_str())) {
            issues.push(QaIssue::entry(
                "DUPLICATE_KEY",
                Severity::Error,
                locale,
                ctx,
                &e.source,
                "Source phrase appears more than once in this context",
            ));
        }

        let translation_trim = e.translation.trim();

        match e.status {
            TranslationStatus::Unfinished => {
                if !e.has_translation() {
                    issues.push(QaIssue::entry(
                        "UNFINISHED_EMPTY",
                        Severity::Error,
                        locale,
                        ctx,
                        &e.source,
                        "Translation is marked unfinished but has no draft text",
                    ));
                }
            }
            TranslationStatus::Finished => {
                if !translation_trim.is_empty() && translation_trim == e.source.trim() {
                    issues.push(QaIssue::entry(
                        "SAME_AS_SOURCE",
                        Severity::Info,
                        locale,
                        ctx,
                        &e.source,
                        "Translation is identical to the source phrase",
                    ));
                }
            }
            TranslationStatus::Vanished | TranslationStatus::Obsolete => {}
        }
    }

    issues
}

/// Checks `target` against the reference catalog's active key set.
pub fn compare(reference: &Catalog, target: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let locale = target.language.as_str();

    let reference_keys: HashSet<EntryKey> = reference.active_keys().collect();
    let mut target_active: HashSet<EntryKey> = HashSet::new();

    for (ctx, e) in target.entries() {
        let key = EntryKey::new(ctx, e.source.as_str());

        if e.is_active() {
            if !reference_keys.contains(&key) {
                issues.push(QaIssue::entry(
                    "NOT_IN_REFERENCE",
                    Severity::Error,
                    locale,
                    ctx,
                    &e.source,
                    "Active entry does not exist in the reference catalog",
                ));
            } else if !e.has_translation() {
                issues.push(QaIssue::entry(
                    "UNTRANSLATED",
                    Severity::Warning,
                    locale,
                    ctx,
                    &e.source,
                    "Entry has no translation",
                ));
            }
            target_active.insert(key);
        } else if reference_keys.contains(&key) {
            issues.push(QaIssue::entry(
                "VANISHED_IN_REFERENCE",
                Severity::Error,
                locale,
                ctx,
                &e.source,
                "Entry is marked vanished but the reference still uses it",
            ));
        }
    }

    for (ctx, e) in reference.entries().filter(|(_, e)| e.is_active()) {
        let key = EntryKey::new(ctx, e.source.as_str());
        if !target_active.contains(&key) {
            issues.push(QaIssue::entry(
                "MISSING_IN_LOCALE",
                Severity::Warning,
                locale,
                ctx,
                &e.source,
                "Reference entry is missing from this locale",
            ));
        }
    }

    issues
}
