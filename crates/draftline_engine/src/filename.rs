use sha2::{Digest, Sha256};

const MAX_STEM_BYTES: usize = 80;

/// Windows-safe, deterministic name: `{sanitized_label}--{short_hash(content)}.{extension}`.
///
/// The same label and content always map to the same file, so re-exporting a
/// result replaces the earlier copy.
pub fn export_filename(label: &str, content: &str, extension: &str) -> String {
    let sanitized = sanitize_label(label);
    let hash = short_hash(content);
    format!("{sanitized}--{hash}.{extension}")
}

fn sanitize_label(input: &str) -> String {
    let mut collapsed = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let mut stem = collapsed.trim_matches(&['_', '.'][..]).to_string();
    if stem.is_empty() {
        stem.push_str("untitled");
    }
    if stem.len() > MAX_STEM_BYTES {
        let end = (0..=MAX_STEM_BYTES)
            .rev()
            .find(|&idx| stem.is_char_boundary(idx))
            .unwrap_or(0);
        stem.truncate(end);
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    Sha256::digest(input.as_bytes())[..4]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_characters_collapse_to_one_underscore() {
        assert_eq!(sanitize_label("essay: draft / v2?"), "essay_draft_v2");
    }

    #[test]
    fn reserved_names_get_suffix() {
        assert_eq!(sanitize_label("con"), "con_");
    }

    #[test]
    fn empty_label_becomes_untitled() {
        assert_eq!(sanitize_label(" ?? "), "untitled");
    }

    #[test]
    fn long_multibyte_label_truncates_on_boundary() {
        let stem = sanitize_label(&"陈".repeat(40));
        assert!(stem.len() <= MAX_STEM_BYTES);
        assert!(stem.chars().all(|c| c == '陈'));
    }

    #[test]
    fn name_is_deterministic_per_content() {
        let a = export_filename("resume", "body", "md");
        assert_eq!(a, export_filename("resume", "body", "md"));
        assert_ne!(a, export_filename("resume", "other body", "md"));
        assert!(a.starts_with("resume--"));
        assert!(a.ends_with(".md"));
    }
}
