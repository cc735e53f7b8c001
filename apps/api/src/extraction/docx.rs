use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::{BoxError, ExtractError, FormatTag};

const DOCUMENT_PART: &str = "word/document.xml";
/// Upper bound on the decompressed size of the main document part.
const MAX_DOCUMENT_PART_BYTES: u64 = 64 * 1024 * 1024;

/// Reads the main document part and space-joins its body paragraphs.
pub(super) fn extract_paragraphs(content: &[u8]) -> Result<String, ExtractError> {
    let xml = read_document_part(content, MAX_DOCUMENT_PART_BYTES)
        .map_err(|e| ExtractError::parse(FormatTag::Docx, e))?;
    let paragraphs = body_paragraphs(&xml).map_err(|e| ExtractError::parse(FormatTag::Docx, e))?;
    Ok(paragraphs.join(" "))
}

fn read_document_part(content: &[u8], limit: u64) -> Result<String, BoxError> {
    let mut archive = ZipArchive::new(Cursor::new(content))?;
    let part = archive.by_name(DOCUMENT_PART)?;
    let mut xml = String::new();
    let read = part.take(limit.saturating_add(1)).read_to_string(&mut xml)?;
    if read as u64 > limit {
        return Err(format!("{DOCUMENT_PART} exceeds {limit} bytes once decompressed").into());
    }
    Ok(xml)
}

/// Elements whose paragraphs are not direct children of the body: tables,
/// text boxes, drawings and legacy shapes, alternate content, content
/// controls and custom XML wrappers.
fn is_container(local_name: &[u8]) -> bool {
    matches!(
        local_name,
        b"tbl"
            | b"txbxContent"
            | b"drawing"
            | b"pict"
            | b"object"
            | b"AlternateContent"
            | b"sdt"
            | b"customXml"
    )
}

/// Collects the text of top-level body paragraphs in document order.
///
/// Anything under a container (see [`is_container`]) is skipped, including
/// DrawingML `a:p` paragraphs embedded in a run and body paragraphs wrapped
/// in a content control. Inside a run, `w:t` contributes its text, `w:tab` a
/// tab and `w:br`/`w:cr` a newline.
fn body_paragraphs(xml: &str) -> Result<Vec<String>, BoxError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth inside container elements.
    let mut nested = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                name if is_container(name) => nested += 1,
                _ if nested > 0 => {}
                b"p" => current = Some(String::new()),
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                let symbol = match e.local_name().as_ref() {
                    b"p" if nested == 0 => {
                        paragraphs.push(String::new());
                        None
                    }
                    b"tab" if in_run => Some('\t'),
                    b"br" | b"cr" if in_run => Some('\n'),
                    _ => None,
                };
                if let (Some(symbol), Some(paragraph), 0) = (symbol, current.as_mut(), nested) {
                    paragraph.push(symbol);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                name if is_container(name) => nested = nested.saturating_sub(1),
                _ if nested > 0 => {}
                b"p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text && nested == 0 => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
