//! Draftline engine: transport, pacing, rendering and export.
mod decode;
mod export;
mod fetch;
mod filename;
mod pacer;
mod persist;
mod preview;
mod registry;
mod render;
mod sanitize;
mod types;
mod wordcount;

pub use decode::LineReassembler;
pub use export::{
    build_markdown_document, export_result, ExportError, ExportFormat, ExportRequest,
    ExportSummary,
};
pub use fetch::{
    ClientSettings, Endpoints, GenerationRequest, OpenedStream, ReqwestTransport, Transport,
};
pub use filename::export_filename;
pub use pacer::{DisplaySink, Pacer, PacerControl, PacerMode, PacerSettings, StreamOptions};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use preview::preview_for_log;
pub use registry::{TaskRegistry, TaskSnapshot};
pub use render::{render_content, HtmlRenderer, MarkdownRenderer, RenderedContent, Renderer};
pub use sanitize::HtmlSanitizer;
pub use types::{Clock, FailureKind, StreamError, TaskId, TaskStatus};
pub use wordcount::{EssayWordCounter, WordCounter};
