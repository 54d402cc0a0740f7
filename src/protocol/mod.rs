use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::{CoreError, Result};
use crate::model::catalog::Catalog;
use crate::model::project::ProjectInfo;
use crate::parsers::ts;
use crate::services::lookup::Translator;
use crate::services::qa::{self, ValidationReport};
use crate::services::translation_memory::store;
use crate::services::{encoding, pipeline, project, rebuild, sync};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

fn required_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str> {
    str_field(payload, key).ok_or_else(|| CoreError::Request(format!("payload.{key} is required")))
}

fn bool_field(payload: &Value, key: &str, default: bool) -> bool {
    payload.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// A catalog given as `{"path": …}`, `{"text": …}` or `{"catalog": {…}}`.
fn load_catalog(source: &Value) -> Result<Catalog> {
    if let Some(path) = str_field(source, "path") {
        return ts::parse_file(Path::new(path));
    }
    if let Some(text) = source.get("text").and_then(|v| v.as_str()) {
        return ts::parse(text);
    }
    if let Some(catalog) = source.get("catalog") {
        return Ok(serde_json::from_value(catalog.clone())?);
    }
    Err(CoreError::Request(
        "catalog source needs path, text or catalog".into(),
    ))
}

fn load_catalog_field(payload: &Value, key: &str) -> Result<Catalog> {
    let source = payload
        .get(key)
        .ok_or_else(|| CoreError::Request(format!("payload.{key} is required")))?;
    load_catalog(source)
}

fn load_catalog_list(payload: &Value, key: &str) -> Result<Vec<Catalog>> {
    let arr = payload
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| CoreError::Request(format!("payload.{key} must be an array")))?;

    let mut catalogs = Vec::with_capacity(arr.len());
    for (i, v) in arr.iter().enumerate() {
        let catalog = load_catalog(v).map_err(|e| {
            CoreError::Request(format!("invalid catalog at {key}[{i}]: {e}"))
        })?;
        catalogs.push(catalog);
    }
    Ok(catalogs)
}

/// Writes `catalog` to `payload.path` when present and reports where.
fn maybe_write(payload: &Value, catalog: &Catalog) -> Result<Value> {
    match str_field(payload, "path") {
        Some(path) => {
            rebuild::write_file(Path::new(path), catalog)?;
            Ok(json!(path))
        }
        None => Ok(Value::Null),
    }
}

fn base_dir(payload: &Value) -> PathBuf {
    str_field(payload, "base")
        .map(PathBuf::from)
        .unwrap_or_else(project::projects_base_dir)
}

fn open_from_payload(payload: &Value) -> Result<ProjectInfo> {
    project::open_project(Path::new(required_str(payload, "project_path")?))
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    log::debug!("request {id} {cmd_str}");

    match dispatch(Command::from(cmd_str), payload) {
        Ok(result) => ok(id, result),
        Err(e) => {
            log::warn!("{cmd_str} failed: {e}");
            err(id, e.to_string())
        }
    }
}

fn dispatch(cmd: Command, payload: &Value) -> Result<Value> {
    match cmd {
        Command::Ping => Ok(json!({ "message": "ts-catalog-core alive" })),

        Command::CatalogParse => {
            let catalog = load_catalog(payload)?;
            Ok(json!({ "catalog": catalog }))
        }

        Command::CatalogWrite => {
            let value = payload
                .get("catalog")
                .cloned()
                .ok_or_else(|| CoreError::Request("payload.catalog is required".into()))?;
            let catalog: Catalog = serde_json::from_value(value)
                .map_err(|e| CoreError::Request(format!("invalid payload.catalog: {e}")))?;
            match maybe_write(payload, &catalog)? {
                Value::Null => Ok(json!({ "text": rebuild::rebuild(&catalog) })),
                path => Ok(json!({ "path": path })),
            }
        }

        Command::CatalogValidate => {
            let catalog = load_catalog(payload)?;
            let report = ValidationReport::from_issues(qa::run(&catalog));
            Ok(serde_json::to_value(report)?)
        }

        Command::CatalogCompare => {
            let reference = load_catalog_field(payload, "reference")?;
            let target = load_catalog_field(payload, "target")?;
            let mut report = ValidationReport::from_issues(qa::run(&target));
            report.extend(qa::compare(&reference, &target));
            Ok(serde_json::to_value(report)?)
        }

        Command::CatalogSync => {
            let reference = load_catalog_field(payload, "reference")?;
            let target = load_catalog_field(payload, "target")?;
            let (merged, report) = sync::sync_with_reference(&reference, &target);
            let path = maybe_write(payload, &merged)?;
            Ok(json!({ "catalog": merged, "report": report, "path": path }))
        }

        Command::CatalogFill => {
            let mut target = load_catalog_field(payload, "target")?;
            let source_lang = str_field(payload, "source_lang").unwrap_or("en");

            let mut memory = match str_field(payload, "memory_file") {
                Some(path) => store::load(Path::new(path)),
                None => Vec::new(),
            };
            if payload.get("sources").is_some() {
                for catalog in load_catalog_list(payload, "sources")? {
                    memory = store::merge(memory, store::harvest(&catalog, source_lang));
                }
            }

            let report = pipeline::fill(&mut target, &memory, source_lang);
            let path = maybe_write(payload, &target)?;
            Ok(json!({ "catalog": target, "report": report, "path": path }))
        }

        Command::CatalogLookup => {
            let catalogs = load_catalog_list(payload, "catalogs")?;
            let mut translator = Translator::new(bool_field(payload, "include_unfinished", true));
            for (i, catalog) in catalogs.iter().enumerate() {
                if let Err(e) = translator.insert_catalog(catalog) {
                    log::warn!("skipping catalogs[{i}] for lookup: {e}");
                }
            }
            lookup(&translator, payload)
        }

        Command::DetectEncoding => {
            let path = required_str(payload, "path")?;
            let result = encoding::detect_from_file(Path::new(path))?;
            Ok(serde_json::to_value(result)?)
        }

        Command::ProjectList => {
            let projects = project::list_projects(&base_dir(payload));
            Ok(json!({ "projects": projects }))
        }

        Command::ProjectCreate => {
            let template: ProjectInfo = serde_json::from_value(payload.clone())
                .map_err(|e| CoreError::Request(format!("invalid project: {e}")))?;
            let created = project::create_project(&base_dir(payload), template)?;
            Ok(json!({ "project_path": created.project_path, "project": created }))
        }

        Command::ProjectOpen => {
            let p = open_from_payload(payload)?;
            Ok(json!({ "project": p }))
        }

        Command::ProjectSave => {
            let project_val = payload
                .get("project")
                .filter(|v| !v.is_null())
                .ok_or_else(|| CoreError::Request("payload.project is required".into()))?;
            let p: ProjectInfo = serde_json::from_value(project_val.clone())
                .map_err(|e| CoreError::Request(format!("invalid payload.project: {e}")))?;
            let saved = project::save_project(&base_dir(payload), p)?;
            Ok(json!({ "project": saved }))
        }

        Command::ProjectValidate => {
            let p = open_from_payload(payload)?;
            let set = project::load_catalog_set(&p)?;
            let report = set.validate();
            Ok(json!({
                "reference_locale": set.reference_locale,
                "locales": set.catalogs.keys().collect::<Vec<_>>(),
                "report": report,
            }))
        }

        Command::ProjectLookup => {
            let p = open_from_payload(payload)?;
            let set = project::load_catalog_set(&p)?;
            let include_unfinished = bool_field(payload, "include_unfinished", p.include_unfinished);
            lookup(&set.translator(include_unfinished), payload)
        }

        Command::ProjectSync => {
            let p = open_from_payload(payload)?;
            let set = project::load_catalog_set(&p)?;
            let write = bool_field(payload, "write", true);

            let mut reports = serde_json::Map::new();
            for (locale, catalog) in set.translations() {
                let (merged, report) = sync::sync_with_reference(set.reference(), catalog);
                if write {
                    rebuild::write_file(&set.paths[locale], &merged)?;
                }
                reports.insert(locale.to_string(), serde_json::to_value(report)?);
            }
            Ok(json!({ "reports": reports, "written": write }))
        }

        Command::ProjectFill => {
            let p = open_from_payload(payload)?;
            let set = project::load_catalog_set(&p)?;
            let write = bool_field(payload, "write", true);
            let source_lang = set.reference().language.clone();

            let memory_path = project::memory_path(&p);
            let mut memory = store::load(&memory_path);
            for (_, catalog) in set.translations() {
                memory = store::merge(memory, store::harvest(catalog, &source_lang));
            }

            let mut reports = serde_json::Map::new();
            for (locale, catalog) in set.translations() {
                let mut target = catalog.clone();
                let report = pipeline::fill(&mut target, &memory, &source_lang);
                if write && report.filled > 0 {
                    rebuild::write_file(&set.paths[locale], &target)?;
                }
                reports.insert(locale.to_string(), serde_json::to_value(report)?);
            }

            if write {
                store::save(&memory_path, &memory)?;
            }
            Ok(json!({ "reports": reports, "memory_entries": memory.len(), "written": write }))
        }

        Command::Unknown => Err(CoreError::Request("unknown command".into())),
    }
}

fn lookup(translator: &Translator, payload: &Value) -> Result<Value> {
    let context = payload
        .get("context")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CoreError::Request("payload.context is required".into()))?;
    let source = payload
        .get("source")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CoreError::Request("payload.source is required".into()))?;
    // A blank locale is just an unsupported one.
    let locale = payload.get("locale").and_then(|v| v.as_str()).unwrap_or("");

    let result = translator.lookup_detailed(context, source, locale);
    Ok(serde_json::to_value(result)?)
}
