use std::io::{Cursor, Read};

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::extract::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts raw text from a DOCX buffer: run text per paragraph, no styling.
/// Paragraphs are separated by a blank line.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::ExtractionFailed(format!("Failed to open DOCX: {e}")))?;

    let mut document_xml = archive.by_name(DOCUMENT_PART).map_err(|e| {
        ExtractError::ExtractionFailed(format!("Failed to find {DOCUMENT_PART}: {e}"))
    })?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ExtractError::ExtractionFailed(format!("Failed to read {DOCUMENT_PART}: {e}")))?;

    parse_document_xml(&xml_content)
}

fn parse_document_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut in_run = false;
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" => in_text_element = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text_element = false,
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            // <w:tab/> also appears in paragraph properties as a tab stop; only runs count.
            Ok(Event::Empty(ref e)) if in_run => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_element => {
                let decoded = e.decode().map_err(|err| {
                    ExtractError::ExtractionFailed(format!("XML text decoding error: {err}"))
                })?;
                text.push_str(&decoded);
            }
            Ok(Event::GeneralRef(e)) if in_text_element => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else if let Ok(name) = e.decode() {
                    if let Some(resolved) = resolve_xml_entity(&name) {
                        text.push_str(resolved);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::ExtractionFailed(format!(
                    "XML parsing error: {e}"
                )));
            }
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}
