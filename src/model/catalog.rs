use serde::{Deserialize, Serialize};

use super::entry::TranslationEntry;

fn default_version() -> String {
    "2.1".to_string()
}

/// One parsed `.ts` document: a locale's translation table grouped by
/// context, in file order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub source_language: Option<String>,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Context {
    pub name: String,

    #[serde(default)]
    pub entries: Vec<TranslationEntry>,
}

/// `(context, source)` pair identifying an entry within a catalog.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub context: String,
    pub source: String,
}

impl EntryKey {
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        EntryKey {
            context: context.into(),
            source: source.into(),
        }
    }
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Context {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn find(&self, source: &str) -> Option<&TranslationEntry> {
        self.entries.iter().find(|e| e.source == source)
    }
}

impl Catalog {
    pub fn new(language: impl Into<String>) -> Self {
        Catalog {
            version: default_version(),
            language: language.into(),
            source_language: None,
            contexts: Vec::new(),
        }
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Returns the named context, appending an empty one if absent.
    pub fn context_mut(&mut self, name: &str) -> &mut Context {
        let idx = match self.contexts.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[idx]
    }

    /// First entry with the given key, regardless of status.
    pub fn find(&self, context: &str, source: &str) -> Option<&TranslationEntry> {
        self.context(context).and_then(|c| c.find(source))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TranslationEntry)> {
        self.contexts
            .iter()
            .flat_map(|c| c.entries.iter().map(move |e| (c.name.as_str(), e)))
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &mut TranslationEntry)> {
        self.contexts.iter_mut().flat_map(|c| {
            let name = c.name.as_str();
            c.entries.iter_mut().map(move |e| (name, e))
        })
    }

    pub fn active_keys(&self) -> impl Iterator<Item = EntryKey> + '_ {
        self.entries()
            .filter(|(_, e)| e.is_active())
            .map(|(ctx, e)| EntryKey::new(ctx, e.source.as_str()))
    }

    pub fn len(&self) -> usize {
        self.contexts.iter().map(|c| c.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
