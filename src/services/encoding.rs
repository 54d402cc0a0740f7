use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use serde::Serialize;

use crate::error::{CoreError, Result};

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml[^>]*?\sencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
            .expect("declaration pattern is valid")
    })
}

/// Encoding named by the `<?xml ... encoding="..."?>` declaration, if any.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(256)];
    let caps = declaration_re().captures(head)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}

fn choose_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, bom_len);
    }

    if let Some(encoding) = declared_encoding(bytes) {
        // A declaration can only be read if the bytes are ASCII-compatible,
        // so a UTF-16 label here is wrong and UTF-8 is the safe reading.
        if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
            return (UTF_8, 0);
        }
        return (encoding, 0);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    (detector.guess(None, true), 0)
}

/// Decodes a catalog file to text: BOM first, then the XML declaration,
/// then statistical detection.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let (encoding, bom_len) = choose_encoding(bytes);
    let body = &bytes[bom_len..];

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(CoreError::Encoding(format!(
            "input is not valid {}",
            encoding.name()
        )));
    }

    log::debug!("decoded {} bytes as {}", bytes.len(), encoding.name());
    Ok(text.into_owned())
}

pub fn decode_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| CoreError::io(path, e))?;
    decode(&bytes)
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult> {
    let bytes = fs::read(path).map_err(|e| CoreError::io(path, e))?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let best = if encoding == UTF_8 {
            "utf-8-sig".to_string()
        } else {
            encoding.name().to_lowercase()
        };
        return EncodingDetectionResult {
            best: best.clone(),
            confidence: 0.99,
            candidates: vec![EncodingCandidate {
                name: best,
                confidence: 0.99,
            }],
        };
    }

    let (encoding, _) = choose_encoding(bytes);
    let best = encoding.name().to_lowercase();
    let confidence = if declared_encoding(bytes).is_some() {
        let (_, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            0.20
        } else {
            0.95
        }
    } else {
        estimate_confidence(bytes, encoding)
    };

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    } else if best == "windows-1252" {
        candidates.push(EncodingCandidate {
            name: "iso-8859-1".into(),
            confidence: (confidence - 0.05).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
