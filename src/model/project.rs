use serde::{Deserialize, Serialize};

fn default_i18n_dir() -> String {
    "i18n".to_string()
}

fn default_reference_locale() -> String {
    "en".to_string()
}

fn default_include_unfinished() -> bool {
    true
}

fn default_memory_file() -> String {
    "translation_memory.json".to_string()
}

/// Contents of `project.json`: where a catalog family lives and how it is
/// checked and served.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub project_path: String,

    /// Directory holding the `.ts` files. Relative paths resolve against
    /// `project_path`.
    #[serde(default = "default_i18n_dir")]
    pub i18n_dir: String,

    /// File prefix shared by every locale, e.g. `spotify` for
    /// `spotify_de.ts`.
    #[serde(default)]
    pub catalog_name: String,

    #[serde(default = "default_reference_locale")]
    pub reference_locale: String,

    #[serde(default = "default_include_unfinished")]
    pub include_unfinished: bool,

    /// Translation memory file, relative to `project_path` unless absolute.
    #[serde(default = "default_memory_file")]
    pub memory_file: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        ProjectInfo {
            name: String::new(),
            project_path: String::new(),
            i18n_dir: default_i18n_dir(),
            catalog_name: String::new(),
            reference_locale: default_reference_locale(),
            include_unfinished: default_include_unfinished(),
            memory_file: default_memory_file(),
        }
    }
}
