use draftline_logging::draft_debug;

use crate::event::{StreamEvent, WireEvent};

/// How stream lines are framed by the endpoint.
///
/// Backends are not uniform: some emit bare NDJSON, some prefix every payload with
/// `data: `. `Auto` accepts both on a per-line basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    #[default]
    Auto,
    /// Only `data:`-prefixed lines are parsed as JSON.
    Sse,
    /// Lines are parsed as JSON as-is; a `data:` prefix is kept as text.
    BareJson,
}

const SSE_DATA: &str = "data:";
const SSE_CONTROL_PREFIXES: [&str; 4] = ["event:", "id:", "retry:", ":"];
const SSE_DONE: &str = "[DONE]";

/// Classifies one complete line into at most one event.
///
/// Never fails: unparsable input degrades to [`StreamEvent::Raw`], and empty or
/// SSE control lines produce nothing.
pub fn classify_line(line: &str, framing: Framing) -> Option<StreamEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let payload = match framing {
        Framing::Auto | Framing::Sse => trimmed.strip_prefix(SSE_DATA).map(str::trim_start),
        Framing::BareJson => None,
    };

    match (framing, payload) {
        (_, Some(data)) => {
            if data.is_empty() {
                return None;
            }
            if data == SSE_DONE {
                return Some(StreamEvent::Complete);
            }
            let text = match framing {
                Framing::Sse => data,
                // Without declared SSE framing the prefix may be part of the prose.
                _ => trimmed,
            };
            parse_json(data).or_else(|| Some(raw(text)))
        }
        (Framing::Sse, None) => {
            if is_control_line(trimmed) {
                None
            } else {
                Some(raw(trimmed))
            }
        }
        (_, None) => {
            if let Some(event) = parse_json(trimmed) {
                return Some(event);
            }
            if is_control_line(trimmed) {
                return None;
            }
            Some(raw(trimmed))
        }
    }
}

fn parse_json(text: &str) -> Option<StreamEvent> {
    if !text.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<WireEvent>(text) {
        Ok(wire) => {
            let event = wire.into_event();
            if event.is_none() {
                draft_debug!("stream line has unrecognized type, keeping as text");
            }
            event
        }
        Err(err) => {
            draft_debug!("stream line is not a JSON event ({err}), keeping as text");
            None
        }
    }
}

fn is_control_line(line: &str) -> bool {
    SSE_CONTROL_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

fn raw(text: &str) -> StreamEvent {
    let mut text = text.to_string();
    text.push('\n');
    StreamEvent::Raw { text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_prefix_detection() {
        assert!(is_control_line("event: message"));
        assert!(is_control_line(": keep-alive"));
        assert!(!is_control_line("identity"));
    }

    #[test]
    fn raw_keeps_line_structure() {
        assert_eq!(
            raw("plain"),
            StreamEvent::Raw {
                text: "plain\n".to_string()
            }
        );
    }
}
