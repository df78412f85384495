//! Markdown-derived card previews.
//!
//! Rules:
//! - `image`: path of the first markdown image.
//! - `text`: images dropped, links reduced to their label, markdown symbols
//!   stripped, whitespace collapsed, first 100 chars kept.

use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_TEXT_MAX_CHARS: usize = 100;

static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Preview projection shown on list and board cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePreview {
    pub text: Option<String>,
    pub image: Option<String>,
}

/// Builds a card preview from note content.
pub fn note_preview(content: &str) -> NotePreview {
    let image = IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|path| path.as_str().trim().to_string())
        .filter(|path| !path.is_empty());

    let plain = [&*IMAGE_RE, &*LINK_RE, &*SYMBOL_RE, &*WHITESPACE_RE]
        .into_iter()
        .zip([" ", "$1", " ", " "])
        .fold(content.to_string(), |text, (re, replacement)| {
            re.replace_all(&text, replacement).into_owned()
        });
    let trimmed = plain.trim();
    let text = (!trimmed.is_empty()).then(|| trimmed.chars().take(PREVIEW_TEXT_MAX_CHARS).collect());

    NotePreview { text, image }
}
