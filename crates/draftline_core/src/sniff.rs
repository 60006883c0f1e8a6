//! Heuristic HTML-vs-Markdown detection for backend output.
//!
//! The backend does not declare what it produced, so the decision is made from
//! surface signals. The precedence is order-sensitive:
//!
//! 1. tags plus styling or nested `<div>`s: HTML, whatever else is present
//! 2. tags plus a Markdown heading: Markdown wearing a thin HTML wrapper
//! 3. any tag, entity or document-level tag: HTML
//! 4. everything else: Markdown
//!
//! Misclassification is possible and accepted.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*(?:\s[^<>]*)?/?>").expect("html tag regex")
});

static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("entity regex")
});

static DOCUMENT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!doctype|<(?:html|head|body)[\s>]").expect("document tag regex")
});

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {0,3}#{1,6}\s+\S").expect("heading regex"));

const STYLE_SIGNALS: [&str; 6] = [
    "style=",
    "class=",
    "display:",
    "flex",
    "text-align:",
    "justify-content:",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Html,
    Markdown,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Markdown => "markdown",
        }
    }
}

/// Decides how `text` should be rendered. Deterministic for identical input.
pub fn detect_content_kind(text: &str) -> ContentKind {
    let has_tags = has_html_tags(text);

    if has_tags && is_complex_html(text) {
        return ContentKind::Html;
    }
    if has_tags && has_markdown_heading(text) {
        return ContentKind::Markdown;
    }
    if has_tags || HTML_ENTITY.is_match(text) || DOCUMENT_TAG.is_match(text) {
        return ContentKind::Html;
    }
    ContentKind::Markdown
}

pub fn has_html_tags(text: &str) -> bool {
    HTML_TAG.is_match(text)
}

pub fn has_markdown_heading(text: &str) -> bool {
    MARKDOWN_HEADING.is_match(text)
}

/// Styling attributes, CSS tokens or nested `<div>` structure.
pub fn is_complex_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    STYLE_SIGNALS.iter().any(|signal| lower.contains(signal)) || has_nested_div(&lower)
}

// Expects lowercased input.
fn has_nested_div(lower: &str) -> bool {
    let mut rest = lower;
    while let Some(open) = rest.find("<div") {
        let after_open = &rest[open + 4..];
        let next_open = after_open.find("<div");
        let close = after_open.find("</div");
        match (next_open, close) {
            (Some(inner), Some(close)) if inner < close => return true,
            (Some(_), None) => return true,
            (_, Some(close)) => rest = &after_open[close..],
            (None, None) => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_divs_are_not_nested() {
        assert!(!has_nested_div("<div>a</div><div>b</div>"));
        assert!(has_nested_div("<div><div>a</div></div>"));
    }

    #[test]
    fn heading_needs_text_after_hashes() {
        assert!(has_markdown_heading("intro\n## Title"));
        assert!(!has_markdown_heading("#hashtag"));
        assert!(!has_markdown_heading("####### seven"));
    }
}
