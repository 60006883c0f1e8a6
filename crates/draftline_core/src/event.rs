use serde::Deserialize;

/// One decoded unit of a generation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text to append. `content_type` is carried through untouched (e.g. `ai_thinking`).
    Content {
        text: String,
        content_type: Option<String>,
    },
    /// The backend entered a new named phase.
    Step { label: String },
    /// Terminal marker sent by the backend.
    Complete,
    /// A line that was not structured; appended verbatim.
    Raw { text: String },
}

impl StreamEvent {
    pub fn content(text: impl Into<String>) -> Self {
        StreamEvent::Content {
            text: text.into(),
            content_type: None,
        }
    }

    pub fn step(label: impl Into<String>) -> Self {
        StreamEvent::Step {
            label: label.into(),
        }
    }

    /// Text this event contributes to the accumulated content, if any.
    pub fn appended_text(&self) -> Option<&str> {
        match self {
            StreamEvent::Content { text, .. } | StreamEvent::Raw { text } => Some(text),
            StreamEvent::Step { .. } | StreamEvent::Complete => None,
        }
    }
}

/// Shape of one JSON line as the backend emits it.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl WireEvent {
    /// Maps the loose wire shape onto a typed event; `None` for unknown `type` values.
    pub(crate) fn into_event(self) -> Option<StreamEvent> {
        match self.kind.as_deref()? {
            "content" => Some(StreamEvent::Content {
                text: self.content.unwrap_or_default(),
                content_type: self.content_type,
            }),
            "step" => {
                let label = self
                    .step
                    .or(self.current_step)
                    .or(self.content)
                    .unwrap_or_default();
                Some(StreamEvent::Step { label })
            }
            "complete" => Some(StreamEvent::Complete),
            _ => None,
        }
    }
}
