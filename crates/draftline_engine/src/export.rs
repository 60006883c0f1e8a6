use std::path::{Path, PathBuf};
use std::str::FromStr;

use draftline_core::{DisplayResult, UnknownName};
use draftline_logging::draft_info;

use crate::filename::export_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::render::render_content;
use crate::wordcount::WordCounter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

}

impl FromStr for ExportFormat {
    type Err = UnknownName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            _ => Err(UnknownName::new("export format", value, "md, html")),
        }
    }
}

/// A finished generation ready to be written out.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    /// Document kind or flow name, used for the file name and the header.
    pub label: &'a str,
    pub result: &'a DisplayResult,
    pub created_utc: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub word_count: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("result is not complete yet")]
    Incomplete,
    #[error("result ended with an error: {0}")]
    Failed(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Writes a completed, successful result to `dir`.
pub fn export_result(
    dir: &Path,
    format: ExportFormat,
    request: &ExportRequest<'_>,
    word_counter: &dyn WordCounter,
) -> Result<ExportSummary, ExportError> {
    let result = request.result;
    if !result.is_complete {
        return Err(ExportError::Incomplete);
    }
    if result.is_error {
        return Err(ExportError::Failed(
            result.error_message.clone().unwrap_or_default(),
        ));
    }

    let (word_count, document) = match format {
        ExportFormat::Markdown => build_markdown_document(request, word_counter),
        ExportFormat::Html => (
            word_counter.count(&result.content),
            render_content(&result.content).html,
        ),
    };
    let filename = export_filename(request.label, &result.content, format.extension());
    let path = AtomicFileWriter::new(dir.to_path_buf()).write(&filename, &document)?;
    draft_info!("exported {} ({} words)", path.display(), word_count);
    Ok(ExportSummary { path, word_count })
}

/// Metadata header plus body. Returns the word count alongside the document.
pub fn build_markdown_document(
    request: &ExportRequest<'_>,
    word_counter: &dyn WordCounter,
) -> (u32, String) {
    let result = request.result;
    let word_count = word_counter.count(&result.content);
    let steps = if result.steps.is_empty() {
        "[]".to_string()
    } else {
        format!("[{}]", result.steps.join(", "))
    };
    let mut doc = format!(
        "---\ndocument: {label}\ncreated_utc: {created}\nsteps: {steps}\n\
         word_count: {word_count}\n---\n\n",
        label = request.label,
        created = request.created_utc,
    );
    if result.step_contents.is_empty() {
        doc.push_str(&result.content);
    } else {
        let mut blocks: Vec<String> = Vec::with_capacity(result.step_contents.len() + 1);
        let preamble = result.preamble().trim();
        if !preamble.is_empty() {
            blocks.push(preamble.to_string());
        }
        blocks.extend(
            result
                .step_contents
                .iter()
                .map(|section| format!("## {}\n\n{}", section.step, section.content.trim_end())),
        );
        doc.push_str(&blocks.join("\n\n"));
    }
    if !doc.ends_with('\n') {
        doc.push('\n');
    }
    (word_count, doc)
}
