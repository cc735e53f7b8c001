//! Format-aware text extraction from uploaded resume bytes.
//!
//! Two document shapes are supported: paginated (`.pdf`) and
//! paragraph-structured (`.docx`, `.doc`). Extraction is all-or-nothing: a
//! parse fault anywhere in the document fails the whole call.

mod docx;
mod pdf;

use std::fmt;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Uploaded file is empty.")]
    EmptyInput,

    #[error("Unsupported file format '{0}'. Only .pdf, .doc, .docx supported.")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {format} document: {source}")]
    Parse {
        format: FormatTag,
        #[source]
        source: BoxError,
    },
}

impl ExtractError {
    pub(crate) fn parse(format: FormatTag, source: impl Into<BoxError>) -> Self {
        ExtractError::Parse {
            format,
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// Paginated document; page texts are newline-joined.
    Pdf,
    /// Paragraph-structured document; paragraph texts are space-joined.
    Docx,
}

impl FormatTag {
    /// Resolves a filename (`resume.PDF`), dotted extension (`.docx`) or bare
    /// tag (`pdf`) into a supported format.
    pub fn parse(tag: &str) -> Result<Self, ExtractError> {
        let extension = match tag.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => tag,
        };
        match extension.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(FormatTag::Pdf),
            "docx" | "doc" => Ok(FormatTag::Docx),
            _ => Err(ExtractError::UnsupportedFormat(tag.to_string())),
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::Pdf => f.write_str("PDF"),
            FormatTag::Docx => f.write_str("DOCX"),
        }
    }
}

/// An uploaded document: the client-supplied filename plus raw bytes.
#[derive(Debug, Clone)]
pub struct Document {
    filename: String,
    content: Bytes,
}

impl Document {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Extracts plain text from `content` according to `format_tag`.
///
/// Empty content is rejected before the tag is even looked at.
pub fn extract(content: &[u8], format_tag: &str) -> Result<String, ExtractError> {
    if content.is_empty() {
        return Err(ExtractError::EmptyInput);
    }
    let format = FormatTag::parse(format_tag)?;

    let text = match format {
        FormatTag::Pdf => pdf::extract_pages(content)?,
        FormatTag::Docx => docx::extract_paragraphs(content)?,
    };

    debug!(
        "Extracted {} chars from {} bytes of {format}",
        text.len(),
        content.len()
    );
    Ok(text)
}
