//! Text extraction from uploaded itinerary files
//!
//! Supports plain text, e-mail messages (`.eml`, body only) and Word
//! documents (`.docx`, paragraph text of `word/document.xml`).

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::PlannerError;

/// File types accepted by [`extract_text`]
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "eml", "docx"];

/// Extract the readable text of an uploaded file, dispatching on its extension
pub fn extract_text(file_name: &str, bytes: &[u8]) -> crate::Result<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" => utf8(bytes)?,
        "eml" => email_body(&utf8(bytes)?),
        "docx" => docx_text(bytes)?,
        _ => {
            return Err(PlannerError::validation(format!(
                "Unsupported file type '{file_name}'. Supported: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }
    };

    debug!("Extracted {} characters from {}", text.len(), file_name);
    Ok(text)
}

fn utf8(bytes: &[u8]) -> crate::Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| PlannerError::encoding(format!("File is not valid UTF-8: {e}")))
}

/// Everything after the header block; the whole message when there is none
fn email_body(message: &str) -> String {
    let message = message.replace("\r\n", "\n");
    match message.split_once("\n\n") {
        Some((_, body)) => body.trim().to_string(),
        None => message.trim().to_string(),
    }
}

fn docx_text(bytes: &[u8]) -> crate::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PlannerError::encoding(format!("Failed to read DOCX as ZIP: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| PlannerError::encoding(format!("DOCX missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| PlannerError::encoding(format!("Failed to read document.xml: {e}")))?;

    document_xml_text(&xml)
}

/// Join the `<w:t>` runs of each `<w:p>` paragraph, one paragraph per line
fn document_xml_text(xml: &str) -> crate::Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:p" => paragraph.clear(),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut paragraph)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => paragraph.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::GeneralRef(r)) if in_text => {
                let name = String::from_utf8_lossy(&r);
                match resolve_entity(&name) {
                    Some(c) => paragraph.push(c),
                    None => {
                        return Err(PlannerError::encoding(format!(
                            "Unknown entity '&{name};' in document.xml"
                        )));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PlannerError::encoding(format!(
                    "Malformed document.xml at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    let text = paragraphs.join("\n").trim().to_string();
    if text.is_empty() {
        return Err(PlannerError::encoding("DOCX contains no extractable text"));
    }
    Ok(text)
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
