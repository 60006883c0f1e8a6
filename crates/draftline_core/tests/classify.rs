use draftline_core::{classify_line, Framing, StreamEvent};
use pretty_assertions::assert_eq;

fn raw(text: &str) -> Option<StreamEvent> {
    Some(StreamEvent::Raw {
        text: format!("{text}\n"),
    })
}

#[test]
fn bare_json_content_line() {
    let event = classify_line(r#"{"type":"content","content":"Hello "}"#, Framing::Auto);
    assert_eq!(event, Some(StreamEvent::content("Hello ")));
}

#[test]
fn sse_prefixed_json_line() {
    for line in [
        r#"data: {"type":"content","content":"Hi"}"#,
        r#"data:{"type":"content","content":"Hi"}"#,
        r#"   data: {"type":"content","content":"Hi"}   "#,
    ] {
        assert_eq!(
            classify_line(line, Framing::Auto),
            Some(StreamEvent::content("Hi"))
        );
        assert_eq!(
            classify_line(line, Framing::Sse),
            Some(StreamEvent::content("Hi"))
        );
    }
}

#[test]
fn content_type_is_carried_through() {
    let event = classify_line(
        r#"{"type":"content","content":"hmm","content_type":"ai_thinking"}"#,
        Framing::Auto,
    );
    assert_eq!(
        event,
        Some(StreamEvent::Content {
            text: "hmm".to_string(),
            content_type: Some("ai_thinking".to_string()),
        })
    );
}

#[test]
fn step_label_prefers_step_then_current_step_then_content() {
    let cases = [
        (r#"{"type":"step","step":"A","current_step":"B","content":"C"}"#, "A"),
        (r#"{"type":"step","current_step":"B","content":"C"}"#, "B"),
        (r#"{"type":"step","content":"Searching"}"#, "Searching"),
    ];
    for (line, expected) in cases {
        assert_eq!(
            classify_line(line, Framing::Auto),
            Some(StreamEvent::step(expected))
        );
    }
}

#[test]
fn complete_and_done_sentinel() {
    assert_eq!(
        classify_line(r#"{"type":"complete"}"#, Framing::Auto),
        Some(StreamEvent::Complete)
    );
    assert_eq!(
        classify_line("data: [DONE]", Framing::Sse),
        Some(StreamEvent::Complete)
    );
}

#[test]
fn invalid_json_falls_back_to_raw_text() {
    assert_eq!(
        classify_line("not valid json {{{", Framing::Auto),
        raw("not valid json {{{")
    );
    assert_eq!(classify_line("{broken", Framing::Auto), raw("{broken"));
}

#[test]
fn unknown_type_is_kept_as_text() {
    let line = r#"{"type":"heartbeat"}"#;
    assert_eq!(classify_line(line, Framing::Auto), raw(line));
}

#[test]
fn empty_and_control_lines_produce_nothing() {
    for line in ["", "   ", "event: message", "id: 42", "retry: 1000", ": ping", "data:"] {
        assert_eq!(classify_line(line, Framing::Auto), None, "line {line:?}");
    }
}

#[test]
fn non_json_data_line_is_kept_whole_unless_framing_is_sse() {
    let line = "data: science matters to me";
    assert_eq!(classify_line(line, Framing::Auto), raw(line));
    assert_eq!(classify_line(line, Framing::Sse), raw("science matters to me"));
}

#[test]
fn done_sentinel_is_recognized_without_declared_framing() {
    assert_eq!(
        classify_line("data: [DONE]", Framing::Auto),
        Some(StreamEvent::Complete)
    );
}

#[test]
fn bare_json_framing_keeps_data_prefix() {
    let line = r#"data: {"type":"content","content":"Hi"}"#;
    assert_eq!(classify_line(line, Framing::BareJson), raw(line));
}

#[test]
fn sse_framing_treats_unprefixed_json_as_text() {
    let line = r#"{"type":"content","content":"Hi"}"#;
    assert_eq!(classify_line(line, Framing::Sse), raw(line));
}
