use serde::{Deserialize, Serialize};

/// Label shown in `current_step` once a generation has failed.
pub const FAILED_STEP_LABEL: &str = "generation failed";

/// Accumulated text of one backend step (sectional mode only).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepSection {
    pub step: String,
    pub content: String,
}

/// Snapshot of one generation task as the UI sees it.
///
/// `content` only ever grows while `is_complete` is false; a complete result is
/// frozen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResult {
    pub content: String,
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    pub is_complete: bool,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(
        default,
        rename = "_stepContents",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub step_contents: Vec<StepSection>,
}

impl DisplayResult {
    /// An empty, in-flight result created at request start.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            ..Self::default()
        }
    }

    /// Content accumulated for `step` in sectional mode, across every stretch
    /// in which it was the current step.
    pub fn step_content(&self, step: &str) -> Option<&str> {
        self.step_contents
            .iter()
            .find(|section| section.step == step)
            .map(|section| section.content.as_str())
    }

    /// Content that arrived before the first step. In sectional mode this is
    /// the part of `content` that belongs to no section.
    pub fn preamble(&self) -> &str {
        let sectioned: usize = self
            .step_contents
            .iter()
            .map(|section| section.content.len())
            .sum();
        let end = self.content.len().saturating_sub(sectioned);
        self.content.get(..end).unwrap_or_default()
    }
}

/// Terminal error state: complete, flagged, with whatever content arrived.
pub fn fail(mut result: DisplayResult, message: impl Into<String>) -> DisplayResult {
    result.is_complete = true;
    result.is_error = true;
    result.error_message = Some(message.into());
    result.current_step = Some(FAILED_STEP_LABEL.to_string());
    result
}
