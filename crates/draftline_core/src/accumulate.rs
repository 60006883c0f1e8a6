use draftline_logging::draft_trace;

use crate::{DisplayResult, StepSection, StreamEvent};

/// How content is grouped while it accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccumulateMode {
    /// One flat, cumulative text.
    #[default]
    Flat,
    /// Flat text plus a per-step breakdown for two-column display.
    Sectional,
}

/// Pure reducer: applies one event to a result and returns the next result.
///
/// A complete result is returned unchanged.
pub fn update(
    mut result: DisplayResult,
    event: StreamEvent,
    mode: AccumulateMode,
) -> DisplayResult {
    if result.is_complete {
        draft_trace!("ignoring {:?} after completion", event);
        return result;
    }

    match event {
        StreamEvent::Content { text, .. } | StreamEvent::Raw { text } => {
            if text.is_empty() {
                return result;
            }
            if mode == AccumulateMode::Sectional {
                if let Some(step) = result.current_step.as_deref() {
                    let section = result
                        .step_contents
                        .iter_mut()
                        .find(|section| section.step == step);
                    if let Some(section) = section {
                        section.content.push_str(&text);
                    }
                }
            }
            result.content.push_str(&text);
        }
        StreamEvent::Step { label } => {
            if result.steps.last() != Some(&label) {
                result.steps.push(label.clone());
            }
            let known = result.step_contents.iter().any(|section| section.step == label);
            if mode == AccumulateMode::Sectional && !known {
                // A step seen before keeps appending to its first section.
                result.step_contents.push(StepSection {
                    step: label.clone(),
                    content: String::new(),
                });
            }
            result.current_step = Some(label);
        }
        StreamEvent::Complete => {
            result.is_complete = true;
            result.current_step = None;
        }
    }

    result
}

/// Stateful wrapper around [`update`] for callers that feed events one by one.
#[derive(Debug, Clone)]
pub struct Accumulator {
    result: DisplayResult,
    mode: AccumulateMode,
}

impl Accumulator {
    pub fn new(result: DisplayResult, mode: AccumulateMode) -> Self {
        Self { result, mode }
    }

    /// Applies `event`; returns whether the result changed.
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        let before = fingerprint(&self.result);
        self.result = update(std::mem::take(&mut self.result), event, self.mode);
        fingerprint(&self.result) != before
    }

    pub fn result(&self) -> &DisplayResult {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut DisplayResult {
        &mut self.result
    }

    pub fn into_result(self) -> DisplayResult {
        self.result
    }
}

// Results only grow, so lengths and flags are enough to detect a change.
fn fingerprint(result: &DisplayResult) -> (usize, usize, usize, Option<String>, bool) {
    (
        result.content.len(),
        result.steps.len(),
        result.step_contents.len(),
        result.current_step.clone(),
        result.is_complete,
    )
}
