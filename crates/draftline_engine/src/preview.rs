const ELLIPSIS: &str = "...";

/// Single-line, char-boundary-safe excerpt for log messages.
pub fn preview_for_log(text: &str, max_chars: usize) -> String {
    let flattened: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let trimmed = flattened.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{ELLIPSIS}", &trimmed[..end]),
        None => trimmed.to_string(),
    }
}
