use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use draftline_core::{DisplayResult, JsonSubmission, SubmissionForm, UploadedFile};
use draftline_engine::{
    export_result, render_content, Clock, EssayWordCounter, ExportRequest, GenerationRequest,
    Pacer, ReqwestTransport, TaskId, TaskRegistry,
};
use draftline_logging::{draft_info, draft_warn};
use tokio::runtime::Runtime;
use tokio::sync::watch;

use crate::cli::{ExportArgs, GenerateArgs, QueryArgs, RenderArgs};
use crate::config::AppConfig;
use crate::display::TerminalView;

pub fn generate(config: &AppConfig, args: GenerateArgs) -> Result<()> {
    let form = build_form(&args)?;
    let submission = form.validate().context("submission rejected")?;
    let request = GenerationRequest::Form(submission);
    let label = request.label();
    let result = stream_request(config, request)?;
    finish(label, &result, &args.export)
}

pub fn query(config: &AppConfig, args: QueryArgs) -> Result<()> {
    let mut submission = JsonSubmission::new(args.flow, args.text);
    submission.instructions = args.instructions;
    let submission = submission.validate().context("submission rejected")?;

    if args.sync {
        let runtime = build_runtime()?;
        let transport = ReqwestTransport::new(config.client.clone())?;
        let body = runtime.block_on(transport.post_json(&submission))?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let request = GenerationRequest::Json(submission);
    let label = request.label();
    let result = stream_request(config, request)?;
    finish(label, &result, &args.export)
}

pub fn render(args: RenderArgs) -> Result<()> {
    let content = fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let rendered = render_content(&content);
    if args.detect_only {
        println!("{}", rendered.kind.as_str());
    } else {
        println!("{}", rendered.html);
    }
    Ok(())
}

fn build_form(args: &GenerateArgs) -> Result<SubmissionForm> {
    let mut form = SubmissionForm::new(args.kind);
    form.primary_file = args.file.as_deref().map(read_upload).transpose()?;
    form.pasted_text = args.text.clone();
    form.support_files = args
        .support
        .iter()
        .map(|path| read_upload(path))
        .collect::<Result<Vec<_>>>()?;
    form.instructions = args.instructions.clone();
    form.custom_role = args.role.clone();
    form.custom_task = args.task.clone();
    form.custom_output_format = args.output_format.clone();
    Ok(form)
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadedFile::new(file_name, mime_for(path), bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

fn utc_clock() -> Clock {
    Arc::new(|| Utc::now().to_rfc3339())
}

/// Runs one generation through the registry and mirrors it to the terminal.
fn stream_request(config: &AppConfig, request: GenerationRequest) -> Result<DisplayResult> {
    let runtime = build_runtime()?;
    let transport = ReqwestTransport::new(config.client.clone())?;
    let pacer = Pacer::new(config.pacer_mode, config.pacer, utc_clock());
    let registry = TaskRegistry::new(runtime.handle().clone(), Arc::new(transport), pacer);

    let id = registry.create(request);
    let rx = registry
        .subscribe(id)
        .context("generation task disappeared after creation")?;
    runtime.block_on(follow(&registry, id, rx))
}

async fn follow(
    registry: &TaskRegistry,
    id: TaskId,
    mut rx: watch::Receiver<DisplayResult>,
) -> Result<DisplayResult> {
    let mut view = TerminalView::new(io::stdout(), io::stderr());
    loop {
        let current = rx.borrow_and_update().clone();
        view.show(&current)?;
        if current.is_complete {
            return Ok(current);
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    bail!("generation task {id} was stopped");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                registry.stop(id);
                bail!("interrupted");
            }
        }
    }
}

fn finish(label: &str, result: &DisplayResult, export: &ExportArgs) -> Result<()> {
    if result.is_error {
        let message = result.error_message.as_deref().unwrap_or("unknown error");
        draft_warn!("{} generation failed: {}", label, message);
        bail!("generation failed: {message}");
    }

    let Some(dir) = &export.export_dir else {
        return Ok(());
    };
    let created_utc = Utc::now().to_rfc3339();
    let request = ExportRequest {
        label,
        result,
        created_utc: &created_utc,
    };
    let summary = export_result(dir, export.export_format, &request, &EssayWordCounter)?;
    draft_info!("export of {} finished", label);
    eprintln!(
        "saved {} ({} words)",
        summary.path.display(),
        summary.word_count
    );
    Ok(())
}
