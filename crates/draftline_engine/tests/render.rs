use draftline_core::ContentKind;
use draftline_engine::{render_content, HtmlRenderer, HtmlSanitizer, MarkdownRenderer, Renderer};

#[test]
fn markdown_heading_and_bold_render_as_styled_html() {
    let rendered = render_content("## Title\n\nSome **bold** text");

    assert_eq!(rendered.kind, ContentKind::Markdown);
    let heading = rendered.html.find("<h2 style=").expect("h2 element");
    let paragraph = rendered.html.find("<p style=").expect("p element");
    assert!(heading < paragraph);
    assert!(rendered.html.contains(">Title</h2>"));
    assert!(rendered.html.contains("<strong style=\"font-weight:600\">bold</strong>"));
}

#[test]
fn complex_html_keeps_layout_styles() {
    let rendered = render_content(r#"<div style="display:flex"><div>Nested</div></div>"#);

    assert_eq!(rendered.kind, ContentKind::Html);
    assert_eq!(
        rendered.html,
        r#"<div style="display:flex"><div>Nested</div></div>"#
    );
}

#[test]
fn sanitizer_removes_scripts_handlers_and_script_urls() {
    let html = HtmlSanitizer.sanitize(
        r#"<div class="card"><p onclick="steal()">Hi</p><script>alert(1)</script><a href="javascript:alert(1)" title="t">link</a><iframe src="https://x"></iframe></div>"#,
    );

    assert_eq!(
        html,
        r#"<div class="card"><p>Hi</p><a title="t">link</a></div>"#
    );
}

#[test]
fn sanitizer_escapes_text_and_attributes() {
    let html = HtmlSanitizer.sanitize(r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3</p>"#);

    assert_eq!(html, r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3</p>"#);
}

#[test]
fn leaked_markdown_in_html_is_converted() {
    let html = HtmlRenderer::default().render("<p>Intro</p>\n**Key point**\n- first\n- second");

    assert!(html.contains("<p>Intro</p>"));
    assert!(html.contains("<strong style=\"font-weight:600\">Key point</strong>"));
    assert!(html.contains("• first</span>"));
    assert!(html.contains("• second</span>"));
    assert!(!html.contains("**"));
}

#[test]
fn raw_html_inside_markdown_is_escaped() {
    let html = MarkdownRenderer.render("# Heading\n\nA <b>loud</b> word");

    assert!(html.contains("&lt;b&gt;loud&lt;/b&gt;"));
    assert!(!html.contains("<b>"));
}

#[test]
fn fenced_markdown_payload_is_unwrapped_before_rendering() {
    let rendered = render_content("```markdown\n# Plan\n\n- one\n- two\n```");

    assert_eq!(rendered.kind, ContentKind::Markdown);
    assert!(rendered.html.contains(">Plan</h1>"));
    assert_eq!(rendered.html.matches("<li style=").count(), 2);
    assert!(!rendered.html.contains("<pre"));
}

#[test]
fn single_newlines_become_hard_breaks() {
    let html = MarkdownRenderer.render("Line one\nLine two");

    assert!(html.contains("Line one<br>\nLine two"));
}

#[test]
fn script_links_lose_their_target() {
    let html =
        MarkdownRenderer.render("[click](javascript:alert(1)) or [docs](https://example.com)");

    assert!(!html.contains("javascript"));
    assert!(html.contains("href=\"https://example.com\""));
}

#[test]
fn code_blocks_are_escaped() {
    let html = MarkdownRenderer.render("```rust\nlet x = a < b;\n```");

    assert!(html.contains("<pre style="));
    assert!(html.contains("<code class=\"language-rust\">let x = a &lt; b;\n</code></pre>"));
}
