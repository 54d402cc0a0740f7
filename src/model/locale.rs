use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

fn locale_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<lang>[A-Za-z]{2,3})(?:[_-](?P<script>[A-Za-z]{4}))?(?:[_-](?P<region>[A-Za-z]{2}|[0-9]{3}))?$",
        )
        .expect("locale pattern is valid")
    })
}

/// Locale identifier as used in catalog `language` attributes and file names
/// (`de`, `de_DE`, `zh_Hant_TW`). Accepts `-` or `_` as separator and
/// always renders with `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    script: Option<String>,
    region: Option<String>,
}

impl Locale {
    pub fn parse(text: &str) -> Result<Self> {
        let caps = locale_re()
            .captures(text.trim())
            .ok_or_else(|| CoreError::InvalidLocale(text.to_string()))?;

        let language = caps["lang"].to_ascii_lowercase();
        let script = caps.name("script").map(|m| {
            let s = m.as_str().to_ascii_lowercase();
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => s,
            }
        });
        let region = caps.name("region").map(|m| m.as_str().to_ascii_uppercase());

        Ok(Locale {
            language,
            script,
            region,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn is_language_only(&self) -> bool {
        self.script.is_none() && self.region.is_none()
    }

    /// The bare-language locale this one falls back to (`de_DE` → `de`).
    pub fn language_only(&self) -> Locale {
        Locale {
            language: self.language.clone(),
            script: None,
            region: None,
        }
    }

    pub fn same_language(&self, other: &Locale) -> bool {
        self.language == other.language
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(script) = &self.script {
            write!(f, "_{script}")?;
        }
        if let Some(region) = &self.region {
            write!(f, "_{region}")?;
        }
        Ok(())
    }
}

impl FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Locale::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.to_string()
    }
}
