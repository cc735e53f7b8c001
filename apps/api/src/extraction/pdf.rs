use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use super::{ExtractError, FormatTag};

/// Extracts each page with `pdf-extract` and newline-joins the non-blank ones.
///
/// `pdf-extract` panics on some malformed inputs; those are reported as parse
/// errors like any other fault.
pub(super) fn extract_pages(content: &[u8]) -> Result<String, ExtractError> {
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(content)
    }))
    .map_err(|payload| {
        let message = panic_message(payload.as_ref());
        warn!("PDF parser panicked: {message}");
        ExtractError::parse(FormatTag::Pdf, format!("parser panicked: {message}"))
    })?
    .map_err(|e| ExtractError::parse(FormatTag::Pdf, format!("{e:?}")))?;

    Ok(join_pages(pages))
}

fn join_pages(pages: impl IntoIterator<Item = String>) -> String {
    let mut text = String::new();
    for page in pages {
        if page.trim().is_empty() {
            continue;
        }
        text.push_str(&page);
        text.push('\n');
    }
    text
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
