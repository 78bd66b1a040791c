//! Shared utility functions.
//!
//! - `text`: normalization of scraped field values

mod text;

pub use text::{clean_text, extract_number, word_chars};
