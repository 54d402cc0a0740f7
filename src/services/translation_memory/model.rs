use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TmEntry {
    pub source_lang: String,
    pub target_lang: String,

    /// Catalog context the pair was harvested from. Entries without one
    /// match in any context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    pub source: String,
    pub translation: String,

    #[serde(default)]
    pub normalized: String,

    #[serde(default)]
    pub hash: String,
}
