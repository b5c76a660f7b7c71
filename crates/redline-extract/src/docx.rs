use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::{DocumentDecoder, ExtractError};

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// DOCX text extraction: unzip the package and collect the `<w:t>` text runs
/// of `word/document.xml`. Paragraph ends and explicit breaks become newlines.
pub struct DocxDecoder;

fn malformed(error: impl std::fmt::Display) -> ExtractError {
    ExtractError::Malformed {
        format: "docx",
        reason: error.to_string(),
    }
}

impl DocumentDecoder for DocxDecoder {
    fn format(&self) -> &'static str {
        "docx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;
        let mut entry = archive.by_name(DOCUMENT_ENTRY).map_err(malformed)?;
        let mut xml = String::new();
        entry.read_to_string(&mut xml).map_err(malformed)?;
        document_text(&xml)
    }
}

fn document_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => {
                if tag.name().as_ref() == b"w:t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(tag)) => match tag.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(tag)) => {
                if tag.name().as_ref() == b"w:br" {
                    text.push('\n');
                }
            }
            Ok(Event::Text(content)) if in_text_run => {
                let value = content.unescape().map_err(malformed)?;
                text.push_str(&value);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => return Err(malformed(error)),
        }
    }

    Ok(text)
}
