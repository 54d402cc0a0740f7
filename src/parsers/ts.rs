use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CoreError, Result};
use crate::model::catalog::{Catalog, Context};
use crate::model::entry::{Location, TranslationEntry, TranslationStatus};
use crate::services::encoding;

/// Reads a `.ts` file from disk, decoding it first.
pub fn parse_file(path: &Path) -> Result<Catalog> {
    let text = encoding::decode_file(path)?;
    let catalog = parse(&text).map_err(|e| match e {
        CoreError::InvalidCatalog(msg) => {
            CoreError::InvalidCatalog(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;
    log::debug!(
        "parsed {} ({}, {} entries)",
        path.display(),
        catalog.language,
        catalog.len()
    );
    Ok(catalog)
}

pub fn parse(text: &str) -> Result<Catalog> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(false);

    let mut state = ParseState::default();

    loop {
        let pos = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => state.open(&e, false)?,
            Ok(Event::Empty(e)) => state.open(&e, true)?,
            Ok(Event::End(_)) => state.close()?,
            Ok(Event::Text(t)) => {
                if state.capturing() {
                    let s = t
                        .unescape()
                        .map_err(|e| invalid(format!("bad text at byte {pos}: {e}")))?;
                    state.text.push_str(&s);
                }
            }
            Ok(Event::CData(c)) => {
                if state.capturing() {
                    let raw = c.into_inner();
                    let s = std::str::from_utf8(&raw)
                        .map_err(|e| invalid(format!("bad CDATA at byte {pos}: {e}")))?;
                    state.text.push_str(s);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(invalid(format!("XML error at byte {pos}: {e}"))),
        }
    }

    state.finish()
}

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidCatalog(msg.into())
}

fn attr(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a.map_err(|err| invalid(format!("bad attribute: {err}")))?;
        if a.key.as_ref() == key {
            let value = a
                .unescape_value()
                .map_err(|err| invalid(format!("bad attribute value: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ContextName,
    Source,
    Translation,
    NumerusForm,
    Comment,
    ExtraComment,
    TranslatorComment,
    OldSource,
}

#[derive(Default)]
struct PendingContext {
    name: Option<String>,
    entries: Vec<TranslationEntry>,
}

struct PendingMessage {
    source: Option<String>,
    entry: TranslationEntry,
}

#[derive(Default)]
struct ParseState {
    stack: Vec<Vec<u8>>,
    catalog: Option<Catalog>,
    context: Option<PendingContext>,
    message: Option<PendingMessage>,
    /// Field being captured and the stack depth of its element.
    field: Option<(Field, usize)>,
    text: String,
}

impl ParseState {
    fn capturing(&self) -> bool {
        matches!(self.field, Some((_, depth)) if depth == self.stack.len())
    }

    fn begin(&mut self, field: Field) {
        self.field = Some((field, self.stack.len() + 1));
        self.text.clear();
    }

    fn open(&mut self, e: &BytesStart, empty: bool) -> Result<()> {
        let qname = e.name();
        let name = qname.as_ref();
        let parent = self.stack.last().cloned();

        match (parent.as_deref(), name) {
            (None, b"TS") => {
                let mut catalog = Catalog::new(attr(e, b"language")?.unwrap_or_default());
                if let Some(version) = attr(e, b"version")? {
                    catalog.version = version;
                }
                catalog.source_language = attr(e, b"sourcelanguage")?;
                self.catalog = Some(catalog);
            }
            (None, other) => {
                return Err(invalid(format!(
                    "root element must be <TS>, found <{}>",
                    String::from_utf8_lossy(other)
                )));
            }
            (Some(b"TS"), b"context") => self.context = Some(PendingContext::default()),
            (Some(b"context"), b"name") => self.begin(Field::ContextName),
            (Some(b"context"), b"message") => {
                let mut entry = TranslationEntry::new("", "");
                entry.numerus = attr(e, b"numerus")?.as_deref() == Some("yes");
                self.message = Some(PendingMessage {
                    source: None,
                    entry,
                });
            }
            (Some(b"message"), b"source") => self.begin(Field::Source),
            (Some(b"message"), b"translation") => {
                let status = match attr(e, b"type")? {
                    None => TranslationStatus::Finished,
                    Some(t) => TranslationStatus::from_attr(&t)
                        .ok_or_else(|| invalid(format!("unknown translation type '{t}'")))?,
                };
                let numerus = match self.message.as_mut() {
                    Some(msg) => {
                        msg.entry.status = status;
                        msg.entry.numerus
                    }
                    None => false,
                };
                // Plural text lives in <numerusform> children only.
                if !numerus {
                    self.begin(Field::Translation);
                }
            }
            (Some(b"translation"), b"numerusform") => {
                if self.message.as_ref().is_some_and(|m| m.entry.numerus) {
                    self.begin(Field::NumerusForm);
                }
            }
            (Some(b"message"), b"comment") => self.begin(Field::Comment),
            (Some(b"message"), b"extracomment") => self.begin(Field::ExtraComment),
            (Some(b"message"), b"translatorcomment") => self.begin(Field::TranslatorComment),
            (Some(b"message"), b"oldsource") => self.begin(Field::OldSource),
            (Some(b"message"), b"location") => {
                let location = Location {
                    filename: attr(e, b"filename")?,
                    line: attr(e, b"line")?,
                };
                if let Some(msg) = self.message.as_mut() {
                    msg.entry.locations.push(location);
                }
            }
            (_, other) => {
                log::debug!("skipping <{}>", String::from_utf8_lossy(other));
            }
        }

        self.stack.push(name.to_vec());
        if empty {
            self.close()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let depth = self.stack.len();
        let name = self.stack.pop().unwrap_or_default();

        if let Some((field, field_depth)) = self.field {
            if field_depth == depth {
                self.field = None;
                let text = std::mem::take(&mut self.text);
                self.commit(field, text);
                return Ok(());
            }
        }

        match name.as_slice() {
            b"message" if depth == 3 => {
                let pending = self
                    .message
                    .take()
                    .ok_or_else(|| invalid("unbalanced <message>"))?;
                let source = pending
                    .source
                    .ok_or_else(|| invalid("<message> without <source>"))?;
                let mut entry = pending.entry;
                entry.source = source;
                if let Some(ctx) = self.context.as_mut() {
                    ctx.entries.push(entry);
                }
            }
            b"context" if depth == 2 => {
                let pending = self
                    .context
                    .take()
                    .ok_or_else(|| invalid("unbalanced <context>"))?;
                let name = pending
                    .name
                    .ok_or_else(|| invalid("<context> without <name>"))?;
                if let Some(catalog) = self.catalog.as_mut() {
                    catalog.contexts.push(Context {
                        name,
                        entries: pending.entries,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn commit(&mut self, field: Field, text: String) {
        if field == Field::ContextName {
            if let Some(ctx) = self.context.as_mut() {
                ctx.name = Some(text);
            }
            return;
        }

        let Some(msg) = self.message.as_mut() else {
            return;
        };
        match field {
            Field::Source => msg.source = Some(text),
            Field::Translation => msg.entry.translation = text,
            Field::NumerusForm => msg.entry.numerus_forms.push(text),
            Field::Comment => msg.entry.comment = Some(text),
            Field::ExtraComment => msg.entry.extracomment = Some(text),
            Field::TranslatorComment => msg.entry.translatorcomment = Some(text),
            Field::OldSource => msg.entry.oldsource = Some(text),
            Field::ContextName => {}
        }
    }

    fn finish(self) -> Result<Catalog> {
        if !self.stack.is_empty() {
            return Err(invalid("unexpected end of document"));
        }
        self.catalog.ok_or_else(|| invalid("missing <TS> root element"))
    }
}
