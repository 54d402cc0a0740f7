use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::model::catalog::Catalog;
use crate::model::locale::Locale;
use crate::model::project::ProjectInfo;
use crate::parsers::ts;
use crate::services::lookup::Translator;
use crate::services::qa::{self, QaIssue, Severity, ValidationReport};

const PROJECT_FILE: &str = "project.json";

/// Where projects live: `TS_CATALOG_HOME`, else the per-user application
/// data directory, else `./Projects`.
pub fn projects_base_dir() -> PathBuf {
    if let Ok(home) = std::env::var("TS_CATALOG_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("TsCatalog").join("Projects");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("Projects")
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;
    }
    Ok(())
}

/// Turns a display name (possibly a pasted path) into a directory name.
fn safe_project_dir_name(name: &str) -> String {
    let mut n = name.trim().to_string();

    if n.contains('\\') || n.contains('/') {
        if let Some(bn) = Path::new(&n.replace('\\', "/"))
            .file_name()
            .and_then(|s| s.to_str())
        {
            n = bn.to_string();
        }
    }

    let mut out = String::with_capacity(n.len());
    for ch in n.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == ' ' || ch == '_' || ch == '-' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }

    let out = out.trim().trim_matches('.').to_string();
    if out.is_empty() {
        "Project".to_string()
    } else {
        out
    }
}

pub fn list_projects(base: &Path) -> Vec<ProjectInfo> {
    let mut projects = Vec::new();

    let Ok(entries) = fs::read_dir(base) else {
        return projects;
    };

    for entry in entries.flatten() {
        let path = entry.path().join(PROJECT_FILE);
        if !path.exists() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<ProjectInfo>(&data) {
                Ok(project) => projects.push(project),
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            },
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    projects
}

/// Creates `<base>/<name>/project.json`. Fails if the directory exists.
pub fn create_project(base: &Path, template: ProjectInfo) -> Result<ProjectInfo> {
    if template.name.trim().is_empty() {
        return Err(CoreError::Project("project name is required".into()));
    }
    if template.catalog_name.trim().is_empty() {
        return Err(CoreError::Project("catalog_name is required".into()));
    }
    Locale::parse(&template.reference_locale)?;

    ensure_dir(base)?;

    let project_dir = base.join(safe_project_dir_name(&template.name));
    if project_dir.exists() {
        return Err(CoreError::Project(format!(
            "project already exists: {}",
            project_dir.display()
        )));
    }

    fs::create_dir_all(&project_dir).map_err(|e| CoreError::io(&project_dir, e))?;

    let project = ProjectInfo {
        project_path: project_dir.to_string_lossy().to_string(),
        ..template
    };

    write_project(&project_dir, &project)?;
    log::info!("created project {} at {}", project.name, project.project_path);

    Ok(project)
}

pub fn open_project(project_path: &Path) -> Result<ProjectInfo> {
    let path = project_path.join(PROJECT_FILE);

    if !path.exists() {
        return Err(CoreError::Project(format!(
            "{PROJECT_FILE} not found in {}",
            project_path.display()
        )));
    }

    let data = fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
    let mut project: ProjectInfo = serde_json::from_str(&data)?;

    // A moved project directory keeps working.
    project.project_path = project_path.to_string_lossy().to_string();
    Ok(project)
}

pub fn save_project(base: &Path, mut project: ProjectInfo) -> Result<ProjectInfo> {
    let project_dir: PathBuf = {
        let pp = project.project_path.trim();
        if pp.is_empty() {
            base.join(safe_project_dir_name(&project.name))
        } else {
            PathBuf::from(pp)
        }
    };

    fs::create_dir_all(&project_dir).map_err(|e| CoreError::io(&project_dir, e))?;

    project.project_path = project_dir.to_string_lossy().to_string();

    if project.reference_locale.trim().is_empty() {
        project.reference_locale = ProjectInfo::default().reference_locale;
    }
    if project.i18n_dir.trim().is_empty() {
        project.i18n_dir = ProjectInfo::default().i18n_dir;
    }

    write_project(&project_dir, &project)?;
    Ok(project)
}

fn write_project(dir: &Path, project: &ProjectInfo) -> Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    let path = dir.join(PROJECT_FILE);
    fs::write(&path, json).map_err(|e| CoreError::io(&path, e))
}

fn resolve(project: &ProjectInfo, relative: &str) -> PathBuf {
    let p = Path::new(relative);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        Path::new(&project.project_path).join(p)
    }
}

pub fn i18n_dir(project: &ProjectInfo) -> PathBuf {
    resolve(project, &project.i18n_dir)
}

pub fn memory_path(project: &ProjectInfo) -> PathBuf {
    resolve(project, &project.memory_file)
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    /// Locale taken from the file name (`spotify_de.ts` → `de`).
    pub locale: String,
    pub path: PathBuf,
}

/// Finds `<catalog_name>_<locale>.ts` files in the project's i18n directory,
/// sorted by locale.
pub fn discover_catalogs(project: &ProjectInfo) -> Result<Vec<CatalogFile>> {
    let dir = i18n_dir(project);
    let pattern = format!(
        r"^{}_(?P<locale>[A-Za-z]{{2,3}}(?:[_-][A-Za-z]{{4}})?(?:[_-](?:[A-Za-z]{{2}}|[0-9]{{3}}))?)\.ts$",
        regex::escape(&project.catalog_name)
    );
    let re = Regex::new(&pattern).map_err(|e| CoreError::Project(e.to_string()))?;

    let entries = fs::read_dir(&dir).map_err(|e| CoreError::io(&dir, e))?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(caps) = re.captures(name) {
            let locale = Locale::parse(&caps["locale"])?.to_string();
            files.push(CatalogFile { locale, path });
        }
    }

    files.sort_by(|a, b| a.locale.cmp(&b.locale));
    Ok(files)
}

/// All catalogs of a project, keyed by file-name locale.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    pub reference_locale: String,
    pub catalogs: BTreeMap<String, Catalog>,
    pub paths: BTreeMap<String, PathBuf>,
    /// Problems found while loading, reported alongside validation.
    pub load_issues: Vec<QaIssue>,
}

pub fn load_catalog_set(project: &ProjectInfo) -> Result<CatalogSet> {
    let files = discover_catalogs(project)?;
    if files.is_empty() {
        return Err(CoreError::Project(format!(
            "no {}_*.ts files in {}",
            project.catalog_name,
            i18n_dir(project).display()
        )));
    }

    let wanted = Locale::parse(&project.reference_locale)?;

    let mut catalogs = BTreeMap::new();
    let mut paths = BTreeMap::new();
    let mut load_issues = Vec::new();

    for file in files {
        let catalog = ts::parse_file(&file.path)?;

        if let (Ok(named), Ok(declared)) =
            (Locale::parse(&file.locale), Locale::parse(&catalog.language))
        {
            if !named.same_language(&declared) {
                load_issues.push(QaIssue::catalog(
                    "LANGUAGE_MISMATCH",
                    Severity::Warning,
                    &catalog.language,
                    format!(
                        "{} is named for '{}' but declares '{}'",
                        file.path.display(),
                        named,
                        declared
                    ),
                ));
            }
        }

        catalogs.insert(file.locale.clone(), catalog);
        paths.insert(file.locale, file.path);
    }

    let reference_locale = pick_reference(&wanted, &catalogs).ok_or_else(|| {
        CoreError::Project(format!(
            "reference locale {} has no catalog",
            project.reference_locale
        ))
    })?;

    Ok(CatalogSet {
        reference_locale,
        catalogs,
        paths,
        load_issues,
    })
}

/// Exact file locale first, then any catalog of the same language.
fn pick_reference(wanted: &Locale, catalogs: &BTreeMap<String, Catalog>) -> Option<String> {
    let wanted_str = wanted.to_string();
    if catalogs.contains_key(&wanted_str) {
        return Some(wanted_str);
    }
    catalogs
        .keys()
        .find(|k| Locale::parse(k).is_ok_and(|l| l.same_language(wanted)))
        .cloned()
}

impl CatalogSet {
    pub fn reference(&self) -> &Catalog {
        &self.catalogs[&self.reference_locale]
    }

    /// Non-reference catalogs in locale order.
    pub fn translations(&self) -> impl Iterator<Item = (&str, &Catalog)> {
        self.catalogs
            .iter()
            .filter(move |(k, _)| **k != self.reference_locale)
            .map(|(k, c)| (k.as_str(), c))
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.extend(self.load_issues.iter().cloned());

        let reference = self.reference();
        for catalog in self.catalogs.values() {
            report.extend(qa::run(catalog));
        }
        for (_, catalog) in self.translations() {
            report.extend(qa::compare(reference, catalog));
        }
        report
    }

    /// Registers every catalog under its declared language, or under its
    /// file-name locale when the declaration is unusable.
    pub fn translator(&self, include_unfinished: bool) -> Translator {
        let mut translator = Translator::new(include_unfinished);
        for (locale, catalog) in &self.catalogs {
            let registered = Locale::parse(&catalog.language).or_else(|_| Locale::parse(locale));
            match registered {
                Ok(l) => translator.insert(l, catalog),
                Err(e) => log::warn!("not serving {locale}: {e}"),
            }
        }
        translator
    }
}
