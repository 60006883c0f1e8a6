use std::fs;

use draftline_core::{fail, update, AccumulateMode, DisplayResult, StepSection, StreamEvent};
use draftline_engine::{
    build_markdown_document, export_result, EssayWordCounter, ExportError, ExportFormat,
    ExportRequest,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn finished(content: &str) -> DisplayResult {
    DisplayResult {
        content: content.to_string(),
        steps: vec!["Outline".to_string(), "Draft".to_string()],
        is_complete: true,
        timestamp: "2026-02-02T10:00:00Z".to_string(),
        ..DisplayResult::default()
    }
}

#[test]
fn markdown_document_has_metadata_header() {
    let result = finished("My first summer job taught me patience.");
    let request = ExportRequest {
        label: "personal-statement",
        result: &result,
        created_utc: "2026-02-02T10:00:00Z",
    };

    let (words, doc) = build_markdown_document(&request, &EssayWordCounter);

    assert_eq!(words, 7);
    assert_eq!(
        doc,
        "---\ndocument: personal-statement\ncreated_utc: 2026-02-02T10:00:00Z\nsteps: [Outline, Draft]\nword_count: 7\n---\n\nMy first summer job taught me patience.\n"
    );
}

#[test]
fn sectional_results_export_one_heading_per_step() {
    let mut result = finished("Clear voice.Too long.");
    result.step_contents = vec![
        StepSection {
            step: "Strengths".to_string(),
            content: "Clear voice.".to_string(),
        },
        StepSection {
            step: "Weaknesses".to_string(),
            content: "Too long.".to_string(),
        },
    ];
    let request = ExportRequest {
        label: "sectional-analysis",
        result: &result,
        created_utc: "now",
    };

    let (_, doc) = build_markdown_document(&request, &EssayWordCounter);

    assert!(doc.ends_with("## Strengths\n\nClear voice.\n\n## Weaknesses\n\nToo long.\n"));
}

#[test]
fn sectional_export_keeps_text_before_the_first_step() {
    let result = [
        StreamEvent::content("Overview paragraph. "),
        StreamEvent::step("Strengths"),
        StreamEvent::content("Clear voice."),
        StreamEvent::Complete,
    ]
    .into_iter()
    .fold(DisplayResult::new("t0"), |result, event| {
        update(result, event, AccumulateMode::Sectional)
    });
    let request = ExportRequest {
        label: "sectional-analysis",
        result: &result,
        created_utc: "now",
    };

    let (words, doc) = build_markdown_document(&request, &EssayWordCounter);

    assert_eq!(words, 4);
    assert!(doc.ends_with("---\n\nOverview paragraph.\n\n## Strengths\n\nClear voice.\n"));
}

#[test]
fn export_is_deterministic_and_replaces_previous_copy() {
    let temp = TempDir::new().unwrap();
    let result = finished("Same content");
    let request = ExportRequest {
        label: "resume",
        result: &result,
        created_utc: "2026-02-02T10:00:00Z",
    };

    let first = export_result(temp.path(), ExportFormat::Markdown, &request, &EssayWordCounter)
        .unwrap();
    let second = export_result(temp.path(), ExportFormat::Markdown, &request, &EssayWordCounter)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.word_count, 2);
    let name = first.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("resume--"));
    assert!(name.ends_with(".md"));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    assert!(fs::read_to_string(&first.path)
        .unwrap()
        .contains("document: resume"));
}

#[test]
fn html_export_writes_rendered_content() {
    let temp = TempDir::new().unwrap();
    let result = finished("## Title\n\nBody");
    let request = ExportRequest {
        label: "essay-revision",
        result: &result,
        created_utc: "2026-02-02T10:00:00Z",
    };

    let summary =
        export_result(temp.path(), ExportFormat::Html, &request, &EssayWordCounter).unwrap();

    assert_eq!(summary.path.extension().unwrap(), "html");
    let html = fs::read_to_string(&summary.path).unwrap();
    assert!(html.contains(">Title</h2>"));
}

#[test]
fn unfinished_or_failed_results_are_not_exported() {
    let temp = TempDir::new().unwrap();
    let mut running = finished("partial");
    running.is_complete = false;
    let request = ExportRequest {
        label: "resume",
        result: &running,
        created_utc: "now",
    };
    assert!(matches!(
        export_result(temp.path(), ExportFormat::Markdown, &request, &EssayWordCounter),
        Err(ExportError::Incomplete)
    ));

    let failed = fail(finished("partial"), "timeout");
    let request = ExportRequest {
        result: &failed,
        ..request
    };
    assert!(matches!(
        export_result(temp.path(), ExportFormat::Markdown, &request, &EssayWordCounter),
        Err(ExportError::Failed(message)) if message == "timeout"
    ));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn export_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    let result = finished("body");
    let request = ExportRequest {
        label: "resume",
        result: &result,
        created_utc: "now",
    };

    let outcome = export_result(&file_path, ExportFormat::Markdown, &request, &EssayWordCounter);
    assert!(matches!(outcome, Err(ExportError::Persist(_))));
}
