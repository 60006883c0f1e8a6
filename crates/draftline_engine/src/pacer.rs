//! Presentation pacing for streamed generations.
//!
//! The network reader is the single writer of the accumulated [`DisplayResult`].
//! Display loops only hold a byte cursor into that result, so whatever they show
//! is always a prefix of the final content.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use draftline_core::{
    classify_line, fail, AccumulateMode, Accumulator, DisplayResult, Framing, StreamEvent,
    UnknownName,
};
use draftline_logging::{draft_debug, draft_info, draft_warn};
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::preview::preview_for_log;
use crate::{Clock, LineReassembler, OpenedStream, StreamError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacerMode {
    /// Forward every accumulator change as it happens.
    #[default]
    Immediate,
    /// Read everything first, then replay it one character at a time.
    Deferred,
    /// Replay characters as they arrive, waiting when the reader falls behind.
    Realtime,
}

impl FromStr for PacerMode {
    type Err = UnknownName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(PacerMode::Immediate),
            "deferred" => Ok(PacerMode::Deferred),
            "realtime" => Ok(PacerMode::Realtime),
            _ => Err(UnknownName::new(
                "pacer mode",
                value,
                "immediate, deferred, realtime",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerSettings {
    pub char_delay: Duration,
    /// Pause before a deferred replay starts.
    pub preroll: Duration,
}

impl Default for PacerSettings {
    fn default() -> Self {
        Self {
            char_delay: Duration::from_millis(20),
            preroll: Duration::from_millis(500),
        }
    }
}

/// Receives the snapshots of one run.
///
/// `on_complete` is called exactly once per run with the terminal result, which
/// is an error result when `on_error` was called before it.
pub trait DisplaySink: Send + Sync {
    fn on_update(&self, result: &DisplayResult);
    fn on_complete(&self, result: &DisplayResult);
    fn on_error(&self, error: &StreamError);
}

/// Pause/resume/stop handle shared between a run and its owner.
#[derive(Debug, Clone)]
pub struct PacerControl {
    cancel: CancellationToken,
    paused: Arc<watch::Sender<bool>>,
}

impl Default for PacerControl {
    fn default() -> Self {
        Self::new()
    }
}

impl PacerControl {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            cancel: CancellationToken::new(),
            paused: Arc::new(paused),
        }
    }

    /// Holds the display loop; the network read keeps going.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Cancels both the network read and the display loop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn watch_paused(&self) -> watch::Receiver<bool> {
        self.paused.subscribe()
    }

    fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Returns once unpaused or stopped.
    async fn wait_while_paused(&self) {
        let mut paused = self.paused.subscribe();
        loop {
            if !*paused.borrow_and_update() || self.is_stopped() {
                return;
            }
            tokio::select! {
                _ = self.cancelled() => return,
                changed = paused.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// Per-run parsing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamOptions {
    pub framing: Framing,
    pub accumulate_mode: AccumulateMode,
}

#[derive(Clone)]
pub struct Pacer {
    mode: PacerMode,
    settings: PacerSettings,
    clock: Clock,
}

struct ReadOutcome {
    result: DisplayResult,
    error: Option<StreamError>,
}

/// Reader state shared with the display side of one run.
struct Feed {
    accumulator: Accumulator,
    finished: bool,
    failed: bool,
}

impl Feed {
    fn result(&self) -> &DisplayResult {
        self.accumulator.result()
    }
}

impl Pacer {
    pub fn new(mode: PacerMode, settings: PacerSettings, clock: Clock) -> Self {
        Self {
            mode,
            settings,
            clock,
        }
    }

    pub fn mode(&self) -> PacerMode {
        self.mode
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Terminal path for a request that failed before any body arrived.
    pub fn fail_unopened(&self, error: StreamError, sink: &dyn DisplaySink) -> DisplayResult {
        let outcome = ReadOutcome {
            result: DisplayResult::new((self.clock)()),
            error: Some(error),
        };
        self.settle(outcome, sink, &PacerControl::new())
    }

    /// Drives one stream to a terminal result, reporting through `sink`.
    pub async fn run(
        &self,
        opened: OpenedStream,
        options: StreamOptions,
        sink: &dyn DisplaySink,
        control: &PacerControl,
    ) -> DisplayResult {
        let (feed, display) = watch::channel(Feed {
            accumulator: Accumulator::new(
                DisplayResult::new((self.clock)()),
                options.accumulate_mode,
            ),
            finished: false,
            failed: false,
        });

        let outcome = match self.mode {
            PacerMode::Immediate => {
                let reader = self.read(opened, options.framing, &feed, control, |result| {
                    if !result.is_complete && !control.is_paused() {
                        sink.on_update(result);
                    }
                });
                let (outcome, ()) =
                    tokio::join!(reader, self.release_on_resume(display, sink, control));
                outcome
            }
            PacerMode::Deferred => {
                let outcome = self
                    .read(opened, options.framing, &feed, control, |_| {})
                    .await;
                if outcome.error.is_none() {
                    self.replay(display, sink, control).await;
                }
                outcome
            }
            PacerMode::Realtime => {
                let reader = self.read(opened, options.framing, &feed, control, |_| {});
                let (outcome, ()) = tokio::join!(reader, self.typewrite(display, sink, control));
                outcome
            }
        };
        self.settle(outcome, sink, control)
    }

    fn settle(
        &self,
        outcome: ReadOutcome,
        sink: &dyn DisplaySink,
        control: &PacerControl,
    ) -> DisplayResult {
        let error = outcome
            .error
            .or_else(|| control.is_stopped().then(StreamError::cancelled));
        let mut terminal = match error {
            Some(error) => {
                draft_warn!("generation failed: {}", error);
                sink.on_error(&error);
                fail(outcome.result, error.to_string())
            }
            None => {
                draft_info!(
                    "generation complete, {} bytes: {}",
                    outcome.result.content.len(),
                    preview_for_log(&outcome.result.content, 60)
                );
                outcome.result
            }
        };
        terminal.timestamp = (self.clock)();
        sink.on_update(&terminal);
        sink.on_complete(&terminal);
        terminal
    }

    /// Network side: chunks to lines to events to the accumulator in `feed`.
    ///
    /// `publish` sees every change. The feed is marked finished on return, and
    /// the returned result is complete unless an error is reported alongside it.
    async fn read<F>(
        &self,
        opened: OpenedStream,
        framing: Framing,
        feed: &watch::Sender<Feed>,
        control: &PacerControl,
        publish: F,
    ) -> ReadOutcome
    where
        F: FnMut(&DisplayResult),
    {
        let error = self.accumulate(opened, framing, feed, control, publish).await;
        feed.send_modify(|state| {
            state.finished = true;
            state.failed = error.is_some();
        });
        let result = feed.borrow().result().clone();
        ReadOutcome { result, error }
    }

    async fn accumulate<F>(
        &self,
        mut opened: OpenedStream,
        framing: Framing,
        feed: &watch::Sender<Feed>,
        control: &PacerControl,
        mut publish: F,
    ) -> Option<StreamError>
    where
        F: FnMut(&DisplayResult),
    {
        let mut reassembler = LineReassembler::for_content_type(opened.content_type.as_deref());
        let mut apply = |event: StreamEvent| {
            let changed = feed.send_if_modified(|state| {
                let changed = state.accumulator.apply(event);
                if changed {
                    state.accumulator.result_mut().timestamp = (self.clock)();
                }
                changed
            });
            if changed {
                publish(feed.borrow().result());
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = control.cancelled() => None,
                next = opened.chunks.next() => Some(next),
            };
            let chunk = match next {
                None => return Some(StreamError::cancelled()),
                Some(None) => break,
                Some(Some(Err(error))) => return Some(error),
                Some(Some(Ok(chunk))) => chunk,
            };

            for line in reassembler.push(&chunk) {
                if let Some(event) = classify_line(&line, framing) {
                    apply(event);
                }
            }
            if feed.borrow().result().is_complete {
                draft_debug!("complete event received, closing stream");
                break;
            }
        }

        if let Some(fragment) = reassembler.finish() {
            draft_debug!(
                "discarding unterminated trailing fragment: {}",
                preview_for_log(&fragment, 40)
            );
        }
        // Stream end completes the result even without a `complete` event.
        apply(StreamEvent::Complete);
        None
    }

    /// Immediate mode: updates skipped during a pause are caught up with the
    /// latest snapshot on resume. A run that finishes while paused is held
    /// until resumed or stopped.
    async fn release_on_resume(
        &self,
        mut feed: watch::Receiver<Feed>,
        sink: &dyn DisplaySink,
        control: &PacerControl,
    ) {
        let mut paused = control.watch_paused();
        loop {
            if control.is_paused() {
                control.wait_while_paused().await;
                if control.is_stopped() {
                    return;
                }
                let current = feed.borrow();
                if !current.finished {
                    sink.on_update(current.result());
                }
            }

            tokio::select! {
                biased;
                _ = control.cancelled() => return,
                changed = paused.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                changed = feed.changed() => {
                    let finished = changed.is_err() || feed.borrow_and_update().finished;
                    if finished {
                        control.wait_while_paused().await;
                        return;
                    }
                }
            }
        }
    }

    async fn replay(
        &self,
        feed: watch::Receiver<Feed>,
        sink: &dyn DisplaySink,
        control: &PacerControl,
    ) {
        tokio::select! {
            _ = control.cancelled() => return,
            _ = tokio::time::sleep(self.settings.preroll) => {}
        }
        self.typewrite(feed, sink, control).await;
    }

    /// Advances one character per tick through whatever the feed holds, waiting
    /// for more when caught up. Returns once the feed is finished and drained,
    /// failed, or stopped.
    async fn typewrite(
        &self,
        mut feed: watch::Receiver<Feed>,
        sink: &dyn DisplaySink,
        control: &PacerControl,
    ) {
        // Only `content` is paced; it grows here one char at a time.
        let mut shown = DisplayResult::default();
        loop {
            control.wait_while_paused().await;
            if control.is_stopped() {
                return;
            }

            let (next, finished) = {
                let current = feed.borrow_and_update();
                if current.failed {
                    return;
                }
                let next = current.result().content[shown.content.len()..].chars().next();
                (next, current.finished)
            };

            match next {
                Some(ch) => {
                    tokio::select! {
                        _ = control.cancelled() => return,
                        _ = tokio::time::sleep(self.settings.char_delay) => {}
                    }
                    mirror_metadata(&mut shown, feed.borrow().result());
                    shown.content.push(ch);
                    sink.on_update(&shown);
                }
                None if finished => return,
                None => {
                    tokio::select! {
                        _ = control.cancelled() => return,
                        changed = feed.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Copies everything but `content` from `source`. Results only grow, so fields
/// whose sizes match are already current and are not copied again.
fn mirror_metadata(shown: &mut DisplayResult, source: &DisplayResult) {
    if shown.steps.len() != source.steps.len() {
        shown.steps.clone_from(&source.steps);
    }
    if shown.current_step != source.current_step {
        shown.current_step.clone_from(&source.current_step);
    }
    let sections_len = |result: &DisplayResult| -> (usize, usize) {
        let bytes = result.step_contents.iter().map(|s| s.content.len()).sum();
        (result.step_contents.len(), bytes)
    };
    if sections_len(shown) != sections_len(source) {
        shown.step_contents.clone_from(&source.step_contents);
    }
    shown.timestamp.clone_from(&source.timestamp);
}
