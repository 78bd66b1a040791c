//! Text normalization for scraped field values.

use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not a digit or a thousands separator.
static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d,]").unwrap());

/// Anything that is not a word character or a comma.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w,]").unwrap());

/// Keep only digits and commas.
///
/// Returns `None` for missing or empty input, and for input that contains no
/// digits or commas at all.
pub fn extract_number(text: Option<&str>) -> Option<String> {
    let text = text.filter(|t| !t.is_empty())?;
    let digits = NON_NUMERIC.replace_all(text, "");
    let digits = digits.trim();
    if digits.is_empty() {
        None
    } else {
        Some(digits.to_string())
    }
}

/// Replace punctuation and symbols with spaces, keeping word characters and
/// commas, then trim.
pub fn word_chars(text: &str) -> Option<String> {
    let cleaned = NON_WORD.replace_all(text, " ");
    non_empty(cleaned.trim())
}

/// Trim whitespace, treating an empty result as absent.
pub fn clean_text(text: &str) -> Option<String> {
    non_empty(text.trim())
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
