use draftline_core::{force_line_breaks, prepare_markdown, strip_wrapper_tags, unwrap_fenced_block};
use pretty_assertions::assert_eq;

const SAMPLES: [&str; 6] = [
    "## Title\nline a\nline b\n\nparagraph",
    "<div>Hello\nWorld</div>",
    "```markdown\n# Draft\nfirst\nsecond\n```",
    "intro\n```\ncode line 1\ncode line 2\n```\noutro",
    "already  \nbroken  \nlines",
    "",
];

#[test]
fn fenced_markdown_round_trips() {
    for inner in ["# Heading\n\nBody **bold**", "single line", "a\n\n- b\n- c"] {
        for lang in ["markdown", "md", "Markdown"] {
            let wrapped = format!("```{lang}\n{inner}\n```");
            assert_eq!(unwrap_fenced_block(&wrapped), inner.trim());
        }
    }
}

#[test]
fn unwrap_tolerates_surrounding_whitespace() {
    assert_eq!(unwrap_fenced_block("\n\n```markdown\nbody\n```\n  "), "body");
}

#[test]
fn fence_with_inner_fence_is_left_alone() {
    let text = "```markdown\nbefore\n```\nmiddle\n```";
    assert_eq!(unwrap_fenced_block(text), text);
}

#[test]
fn preparation_is_idempotent() {
    for sample in SAMPLES {
        let once = prepare_markdown(sample);
        let twice = prepare_markdown(&once);
        assert_eq!(twice, once, "sample {sample:?}");
    }
}

#[test]
fn line_breaks_become_hard_breaks() {
    assert_eq!(force_line_breaks("a\nb\n\nc"), "a  \nb\n\nc");
}

#[test]
fn code_fences_keep_their_newlines() {
    let text = "```\nx = 1\ny = 2\n```";
    assert_eq!(force_line_breaks(text), text);
}

#[test]
fn wrapper_stripping_removes_simple_wrappers_only() {
    assert_eq!(strip_wrapper_tags("<p>Hello</p>"), "Hello");
    assert_eq!(strip_wrapper_tags("<DIV>Hello</DIV>"), "Hello");
    let siblings = "<div>a</div><div>b</div>";
    assert_eq!(strip_wrapper_tags(siblings), siblings);
}

#[test]
fn prepare_unwraps_fence_inside_wrapper() {
    let text = "<div>```markdown\n# T\nbody\n```</div>";
    assert_eq!(prepare_markdown(text), "# T  \nbody");
}
