use draftline_core::fix_markdown_leaks;

#[test]
fn bold_and_code_become_tags() {
    let out = fix_markdown_leaks("<p>Use **this** and `that`</p>");
    assert!(out.contains("<strong style=\"font-weight:600\">this</strong>"), "{out}");
    assert!(out.contains("<code style="), "{out}");
    assert!(out.contains(">that</code>"), "{out}");
    assert!(!out.contains("**"));
}

#[test]
fn headings_and_rules_become_block_tags() {
    let out = fix_markdown_leaks("## Goals\n---\ntext");
    assert!(out.starts_with("<h2 style="), "{out}");
    assert!(out.contains(">Goals</h2>"), "{out}");
    assert!(out.contains("<hr style="), "{out}");
    // No break is added after a block element.
    assert!(!out.contains("</h2><br>"), "{out}");
}

#[test]
fn bullet_lines_get_spacing() {
    let out = fix_markdown_leaks("- one\n- two");
    assert_eq!(out.matches("• ").count(), 2);
    assert!(out.contains("• one</span><br><br>\n"), "{out}");
}

#[test]
fn single_newlines_become_breaks() {
    assert_eq!(fix_markdown_leaks("first\nsecond"), "first<br>\nsecond");
}

#[test]
fn html_without_markdown_is_untouched_apart_from_breaks() {
    assert_eq!(fix_markdown_leaks("<p>plain</p>"), "<p>plain</p>");
}
