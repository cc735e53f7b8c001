//! Text normalization applied to both training rows and uploaded resumes.

use std::sync::LazyLock;

use regex::Regex;

/// `http…` / `www…` runs up to the next whitespace.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+").expect("URL pattern is a valid regex"));

/// Normalizes raw text into the form the vectorizer was fit on.
///
/// Lowercases, drops URL-like tokens, turns every character that is not an
/// ASCII letter into a separator, then collapses separators into single
/// spaces. Total: never fails, may return an empty string.
pub fn clean(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_urls = URL_PATTERN.replace_all(&lowered, "");

    let mut cleaned = String::with_capacity(without_urls.len());
    let mut pending_space = false;
    for ch in without_urls.chars() {
        if ch.is_ascii_alphabetic() {
            if pending_space && !cleaned.is_empty() {
                cleaned.push(' ');
            }
            pending_space = false;
            cleaned.push(ch);
        } else {
            pending_space = true;
        }
    }
    cleaned
}
