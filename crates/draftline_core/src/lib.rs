//! Draftline core: pure stream parsing, accumulation and content heuristics.
mod accumulate;
mod classify;
mod event;
mod form;
mod html_fixup;
mod markdown;
mod result;
mod sniff;
mod style;

pub use accumulate::{update, AccumulateMode, Accumulator};
pub use classify::{classify_line, Framing};
pub use event::StreamEvent;
pub use form::{
    DocumentKind, JsonFlow, JsonSubmission, PrimaryInput, SubmissionForm, UnknownName,
    UploadedFile, ValidatedSubmission, ValidationError, PASTED_TEXT_FIELD, SUPPORT_FILES_FIELD,
};
pub use html_fixup::fix_markdown_leaks;
pub use markdown::{force_line_breaks, prepare_markdown, strip_wrapper_tags, unwrap_fenced_block};
pub use result::{fail, DisplayResult, StepSection, FAILED_STEP_LABEL};
pub use sniff::{
    detect_content_kind, has_html_tags, has_markdown_heading, is_complex_html, ContentKind,
};
pub use style::{escape_html, style_for};
