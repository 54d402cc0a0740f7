use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub source: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub status: TranslationStatus,

    /// Disambiguation comment written by the developer.
    #[serde(default)]
    pub comment: Option<String>,

    /// Translator guidance, never used at runtime.
    #[serde(default)]
    pub extracomment: Option<String>,

    #[serde(default)]
    pub translatorcomment: Option<String>,

    #[serde(default)]
    pub oldsource: Option<String>,

    #[serde(default)]
    pub locations: Vec<Location>,

    /// `numerus="yes"`: the translation is a list of plural forms kept in
    /// `numerus_forms`, and `translation` stays empty.
    #[serde(default)]
    pub numerus: bool,

    #[serde(default)]
    pub numerus_forms: Vec<String>,
}

impl TranslationEntry {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        TranslationEntry {
            source: source.into(),
            translation: translation.into(),
            status: TranslationStatus::Finished,
            comment: None,
            extracomment: None,
            translatorcomment: None,
            oldsource: None,
            locations: Vec::new(),
            numerus: false,
            numerus_forms: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether any text beyond whitespace is present; for plural messages
    /// any non-blank form counts.
    pub fn has_translation(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().any(|f| !f.trim().is_empty())
        } else {
            !self.translation.trim().is_empty()
        }
    }
}

/// Value of the `type` attribute on `<translation>`; `Finished` is the
/// attribute being absent.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    #[default]
    Finished,
    Unfinished,
    Vanished,
    Obsolete,
}

impl TranslationStatus {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(TranslationStatus::Unfinished),
            "vanished" => Some(TranslationStatus::Vanished),
            "obsolete" => Some(TranslationStatus::Obsolete),
            _ => None,
        }
    }

    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            TranslationStatus::Finished => None,
            TranslationStatus::Unfinished => Some("unfinished"),
            TranslationStatus::Vanished => Some("vanished"),
            TranslationStatus::Obsolete => Some("obsolete"),
        }
    }

    /// Active entries are referenced by current host code; vanished and
    /// obsolete ones are retired.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TranslationStatus::Finished | TranslationStatus::Unfinished
        )
    }
}

/// `<location>` element. `line` is kept verbatim since extraction tools
/// write relative offsets such as `+3` after the first location of a file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Location {
    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub line: Option<String>,
}
