//! Post-processing for sanitized HTML that still carries literal Markdown.
//!
//! The backend sometimes mixes `**bold**`, bullet dashes or `#` headings into an
//! otherwise-HTML payload. Those are rewritten to inline-styled tags, then
//! newlines are normalized into explicit `<br>` breaks.

use std::sync::LazyLock;

use regex::Regex;

use crate::style::style_for;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("bold regex"));

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("inline code regex"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*$").expect("heading regex"));

static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").expect("rule regex"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+(.+)$").expect("bullet regex"));

static ENDS_WITH_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:<br\s*/?>|</(?:h[1-6]|p|div|li|ul|ol|table|thead|tbody|tr|td|th|blockquote|pre)>|<hr[^>]*>)$",
    )
    .expect("trailing break regex")
});

struct FixedLine {
    html: String,
    bullet: bool,
}

/// Rewrites leaked Markdown and normalizes newlines.
pub fn fix_markdown_leaks(html: &str) -> String {
    let normalized = html.replace("\r\n", "\n");
    let lines: Vec<FixedLine> = normalized.split('\n').map(convert_line).collect();
    let lines = space_after_bullets(collapse_blank_lines(lines));
    let joined = lines
        .into_iter()
        .map(|line| line.html)
        .collect::<Vec<_>>()
        .join("\n");
    newlines_to_breaks(&joined)
}

fn convert_line(line: &str) -> FixedLine {
    let trimmed = line.trim();

    if let Some(caps) = HEADING.captures(trimmed) {
        let tag = format!("h{}", caps[1].len());
        return FixedLine {
            html: format!(
                "<{tag} style=\"{}\">{}</{tag}>",
                style_for(&tag),
                convert_inline(&caps[2])
            ),
            bullet: false,
        };
    }
    if RULE.is_match(trimmed) {
        return FixedLine {
            html: format!("<hr style=\"{}\">", style_for("hr")),
            bullet: false,
        };
    }
    if let Some(caps) = BULLET.captures(trimmed) {
        return FixedLine {
            html: format!(
                "<span style=\"{}\">• {}</span>",
                style_for("bullet"),
                convert_inline(&caps[1])
            ),
            bullet: true,
        };
    }
    FixedLine {
        html: convert_inline(line),
        bullet: false,
    }
}

fn convert_inline(text: &str) -> String {
    let bold = BOLD.replace_all(
        text,
        format!("<strong style=\"{}\">$1</strong>", style_for("strong")).as_str(),
    );
    INLINE_CODE
        .replace_all(
            &bold,
            format!("<code style=\"{}\">$1</code>", style_for("code")).as_str(),
        )
        .into_owned()
}

// Pass 1: three or more newlines become one blank line.
fn collapse_blank_lines(lines: Vec<FixedLine>) -> Vec<FixedLine> {
    let mut out: Vec<FixedLine> = Vec::with_capacity(lines.len());
    for line in lines {
        let blank = line.html.trim().is_empty();
        let previous_blank = out.last().is_some_and(|prev| prev.html.trim().is_empty());
        if blank && previous_blank {
            continue;
        }
        out.push(line);
    }
    out
}

// Pass 2: a blank line after each bullet that is followed by more text.
fn space_after_bullets(lines: Vec<FixedLine>) -> Vec<FixedLine> {
    let mut out = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter().peekable();
    while let Some(line) = iter.next() {
        let needs_gap = line.bullet
            && iter
                .peek()
                .is_some_and(|next| !next.html.trim().is_empty());
        out.push(line);
        if needs_gap {
            out.push(FixedLine {
                html: String::new(),
                bullet: false,
            });
        }
    }
    out
}

// Pass 3: double newlines, then single newlines, become `<br>` tags unless a break
// or a closing block tag is already there.
fn newlines_to_breaks(text: &str) -> String {
    let paragraphs = text
        .split("\n\n")
        .map(|paragraph| join_with_break(paragraph.split('\n').map(str::to_string), "<br>"));
    join_with_break(paragraphs, "<br><br>")
}

fn join_with_break(parts: impl Iterator<Item = String>, separator: &str) -> String {
    let mut out = String::new();
    for (idx, part) in parts.enumerate() {
        if idx > 0 {
            let settled = out.trim_end();
            if !settled.is_empty() && !ENDS_WITH_BREAK.is_match(settled) {
                out.push_str(separator);
            }
            out.push('\n');
        }
        out.push_str(&part);
    }
    out
}
