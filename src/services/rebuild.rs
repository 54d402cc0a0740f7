use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;

use crate::error::{CoreError, Result};
use crate::model::catalog::Catalog;
use crate::model::entry::TranslationEntry;

/// Serializes a catalog in the layout the Qt extraction tools write:
/// contexts at column 0, messages indented by four spaces, message
/// children by eight.
pub fn rebuild(catalog: &Catalog) -> String {
    let mut out: Vec<String> = Vec::with_capacity(catalog.len() * 5 + 8);

    out.push(r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string());
    out.push("<!DOCTYPE TS>".to_string());

    let mut root = format!(r#"<TS version="{}""#, escape(&catalog.version));
    if !catalog.language.is_empty() {
        root.push_str(&format!(r#" language="{}""#, escape(&catalog.language)));
    }
    if let Some(src) = &catalog.source_language {
        root.push_str(&format!(r#" sourcelanguage="{}""#, escape(src)));
    }
    root.push('>');
    out.push(root);

    for ctx in &catalog.contexts {
        out.push("<context>".to_string());
        out.push(format!("    <name>{}</name>", escape(&ctx.name)));
        for e in &ctx.entries {
            push_message(&mut out, e);
        }
        out.push("</context>".to_string());
    }

    out.push("</TS>".to_string());

    // Trailing newline as the extraction tools emit it.
    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn push_message(out: &mut Vec<String>, e: &TranslationEntry) {
    if e.numerus {
        out.push(r#"    <message numerus="yes">"#.to_string());
    } else {
        out.push("    <message>".to_string());
    }

    for loc in &e.locations {
        let mut line = "        <location".to_string();
        if let Some(filename) = &loc.filename {
            line.push_str(&format!(r#" filename="{}""#, escape(filename)));
        }
        if let Some(l) = &loc.line {
            line.push_str(&format!(r#" line="{}""#, escape(l)));
        }
        line.push_str("/>");
        out.push(line);
    }

    out.push(element("source", &e.source));
    if let Some(v) = &e.oldsource {
        out.push(element("oldsource", v));
    }
    if let Some(v) = &e.comment {
        out.push(element("comment", v));
    }
    if let Some(v) = &e.extracomment {
        out.push(element("extracomment", v));
    }
    if let Some(v) = &e.translatorcomment {
        out.push(element("translatorcomment", v));
    }

    let open = match e.status.as_attr() {
        Some(kind) => format!(r#"        <translation type="{kind}">"#),
        None => "        <translation>".to_string(),
    };
    if e.numerus && !e.numerus_forms.is_empty() {
        out.push(open);
        for form in &e.numerus_forms {
            out.push(format!(
                "            <numerusform>{}</numerusform>",
                escape(form)
            ));
        }
        out.push("        </translation>".to_string());
    } else if e.numerus {
        out.push(format!("{open}</translation>"));
    } else {
        out.push(format!("{open}{}</translation>", escape(&e.translation)));
    }

    out.push("    </message>".to_string());
}

fn element(tag: &str, text: &str) -> String {
    format!("        <{tag}>{}</{tag}>", escape(text))
}

/// Writes the catalog next to `path` first and renames it into place.
pub fn write_file(path: &Path, catalog: &Catalog) -> Result<()> {
    write_atomic(path, rebuild(catalog).as_bytes())?;
    log::info!("wrote {} ({} entries)", path.display(), catalog.len());
    Ok(())
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
    }

    fs::write(&tmp, bytes).map_err(|e| CoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| CoreError::io(path, e))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "catalog".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
