/// Inline style applied to each rendered element.
///
/// Both rendering paths share this table so HTML payloads with leaked Markdown look
/// the same as Markdown payloads.
pub fn style_for(tag: &str) -> &'static str {
    match tag {
        "h1" => "font-size:1.6em;font-weight:700;margin:0.8em 0 0.4em",
        "h2" => "font-size:1.4em;font-weight:700;margin:0.8em 0 0.4em",
        "h3" => "font-size:1.2em;font-weight:600;margin:0.6em 0 0.3em",
        "h4" | "h5" | "h6" => "font-size:1em;font-weight:600;margin:0.6em 0 0.3em",
        "p" => "margin:0 0 0.8em;line-height:1.7",
        "strong" => "font-weight:600",
        "em" => "font-style:italic",
        "del" => "text-decoration:line-through",
        "code" => "background:#f5f5f5;padding:0 4px;border-radius:3px;font-family:monospace",
        "pre" => "background:#f5f5f5;padding:12px;border-radius:4px;overflow-x:auto",
        "blockquote" => "border-left:4px solid #e5e5e5;padding-left:12px;color:#555;margin:0.8em 0",
        "ul" => "list-style:disc;padding-left:1.5em;margin:0 0 0.8em",
        "ol" => "list-style:decimal;padding-left:1.5em;margin:0 0 0.8em",
        "li" => "margin:0.2em 0",
        "a" => "color:#2563eb;text-decoration:underline",
        "hr" => "border:none;border-top:1px solid #e5e5e5;margin:12px 0",
        "table" => "border-collapse:collapse;margin:0.8em 0",
        "th" => "border:1px solid #e5e5e5;padding:4px 8px;font-weight:600",
        "td" => "border:1px solid #e5e5e5;padding:4px 8px",
        "img" => "max-width:100%",
        "bullet" => "display:inline-block;padding-left:1em",
        _ => "",
    }
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
