use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{DocumentKind, ExtractError};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts body paragraph text in document order, joined with `\n`.
///
/// Paragraphs inside tables and text boxes are not part of the body paragraph
/// list and are skipped. Run text is concatenated; tabs and breaks map to
/// `\t` and `\n`.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::failure(DocumentKind::Docx, e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::failure(DocumentKind::Docx, format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::failure(DocumentKind::Docx, e))?;

    let paragraphs = body_paragraphs(&xml)?;
    Ok(paragraphs.join("\n"))
}

fn body_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth of containers whose paragraphs are not body paragraphs.
    let mut nested_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::failure(DocumentKind::Docx, e))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested_depth += 1,
                b"w:p" if nested_depth == 0 => current = Some(String::new()),
                b"w:t" => in_text = nested_depth == 0 && current.is_some(),
                _ => {}
            },
            Event::Empty(e) => {
                if nested_depth > 0 {
                    continue;
                }
                match e.name().as_ref() {
                    b"w:p" => paragraphs.push(String::new()),
                    b"w:tab" => push_char(&mut current, '\t'),
                    b"w:br" | b"w:cr" => push_char(&mut current, '\n'),
                    _ => {}
                }
            }
            Event::Text(e) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractError::failure(DocumentKind::Docx, err))?;
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested_depth = nested_depth.saturating_sub(1),
                b"w:p" if nested_depth == 0 => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push(c);
    }
}
