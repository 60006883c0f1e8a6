//! Text preparation for the Markdown rendering path.

use std::sync::LazyLock;

use regex::Regex;

static WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^<(div|p)(?:\s[^>]*)?>(.*)</(div|p)\s*>$").expect("wrapper regex")
});

const HARD_BREAK: &str = "  ";
const MAX_UNWRAP_ROUNDS: usize = 4;

/// Full preparation pipeline: unwrap fence and wrapper tags until stable, then
/// turn single newlines into hard breaks. Applying it twice equals applying it once.
pub fn prepare_markdown(text: &str) -> String {
    let mut current = text.replace("\r\n", "\n");
    for _ in 0..MAX_UNWRAP_ROUNDS {
        let next = strip_wrapper_tags(&unwrap_fenced_block(&current));
        if next == current {
            break;
        }
        current = next;
    }
    force_line_breaks(&current)
}

/// Strips a ```` ```markdown ```` (or ```` ```md ````) fence when it encloses the
/// whole payload. Anything else is returned unchanged.
pub fn unwrap_fenced_block(text: &str) -> String {
    match fenced_inner(text) {
        Some(inner) => inner.trim().to_string(),
        None => text.to_string(),
    }
}

fn fenced_inner(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let (opening, body) = trimmed.split_once('\n')?;
    let lang = opening.trim().strip_prefix("```")?.trim();
    if !lang.eq_ignore_ascii_case("markdown") && !lang.eq_ignore_ascii_case("md") {
        return None;
    }
    let inner = body.trim_end().strip_suffix("```")?;
    if inner.lines().any(is_fence_line) {
        return None;
    }
    Some(inner)
}

/// Removes simple enclosing `<div>`/`<p>` tags around the whole payload.
///
/// Only a single wrapper whose inner text contains no tag of the same name is
/// removed; `<div>a</div><div>b</div>` is left alone.
pub fn strip_wrapper_tags(text: &str) -> String {
    let mut current = text.trim();
    let mut stripped = false;
    while let Some(caps) = WRAPPER.captures(current) {
        let open = caps[1].to_ascii_lowercase();
        let close = caps[3].to_ascii_lowercase();
        if open != close {
            break;
        }
        let inner = caps.get(2).map_or("", |m| m.as_str());
        let lower = inner.to_ascii_lowercase();
        if lower.contains(&format!("<{open}")) || lower.contains(&format!("</{open}")) {
            break;
        }
        current = inner.trim();
        stripped = true;
    }
    if stripped {
        current.to_string()
    } else {
        text.to_string()
    }
}

/// Turns single newlines into Markdown hard breaks (two trailing spaces).
///
/// Paragraph breaks and fenced code blocks are untouched; lines that already end
/// in a hard break are not extended.
pub fn force_line_breaks(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = String::with_capacity(text.len() + lines.len() * HARD_BREAK.len());
    let mut in_fence = false;

    for (idx, line) in lines.iter().enumerate() {
        let next = lines.get(idx + 1);
        if is_fence_line(line) {
            in_fence = !in_fence;
            out.push_str(line);
        } else if !in_fence
            && !line.trim().is_empty()
            && next.is_some_and(|next| !next.trim().is_empty() && !is_fence_line(next))
        {
            out.push_str(line.trim_end());
            out.push_str(HARD_BREAK);
        } else {
            out.push_str(line);
        }
        if next.is_some() {
            out.push('\n');
        }
    }
    out
}

fn is_fence_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_code_fence_is_not_unwrapped() {
        let text = "```rust\nfn main() {}\n```";
        assert_eq!(unwrap_fenced_block(text), text);
    }

    #[test]
    fn mismatched_wrapper_kept() {
        let text = "<div>one</p>";
        assert_eq!(strip_wrapper_tags(text), text);
    }

    #[test]
    fn nested_wrappers_unwrap_fully() {
        assert_eq!(strip_wrapper_tags("<div class=\"x\"><p>Hi</p></div>"), "Hi");
    }
}
