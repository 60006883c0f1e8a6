use draftline_core::{detect_content_kind, ContentKind};

#[test]
fn markdown_without_tags_is_markdown() {
    assert_eq!(
        detect_content_kind("## Title\n\nSome **bold** text"),
        ContentKind::Markdown
    );
}

#[test]
fn styled_nested_divs_are_html() {
    assert_eq!(
        detect_content_kind(r#"<div style="display:flex"><div>Nested</div></div>"#),
        ContentKind::Html
    );
}

#[test]
fn complex_html_wins_over_markdown_headings() {
    let text = "<div class=\"card\">\n## Not a heading here\n</div>";
    assert_eq!(detect_content_kind(text), ContentKind::Html);
    let nested = "<div><div>\n# Title\n</div></div>";
    assert_eq!(detect_content_kind(nested), ContentKind::Html);
}

#[test]
fn simply_wrapped_markdown_is_markdown() {
    let text = "<p>\n# Personal Statement\n\nI grew up by the sea.\n</p>";
    assert_eq!(detect_content_kind(text), ContentKind::Markdown);
}

#[test]
fn plain_tags_or_entities_are_html() {
    assert_eq!(detect_content_kind("<p>Hello</p>"), ContentKind::Html);
    assert_eq!(detect_content_kind("Fish &amp; chips"), ContentKind::Html);
    assert_eq!(detect_content_kind("A &#8212; B"), ContentKind::Html);
    assert_eq!(
        detect_content_kind("<!DOCTYPE html><html><body>x</body></html>"),
        ContentKind::Html
    );
}

#[test]
fn plain_text_defaults_to_markdown() {
    assert_eq!(detect_content_kind("just words, 3 < 4 and 5 > 2"), ContentKind::Markdown);
    assert_eq!(detect_content_kind(""), ContentKind::Markdown);
}

#[test]
fn detection_is_deterministic() {
    let text = "<section>\n### Heading\n</section>";
    let first = detect_content_kind(text);
    for _ in 0..5 {
        assert_eq!(detect_content_kind(text), first);
    }
}
