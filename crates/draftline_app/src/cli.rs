use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Args, Parser, Subcommand};
use draftline_core::{DocumentKind, JsonFlow};
use draftline_engine::{ExportFormat, PacerMode};

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "draftline")]
#[command(about = "Streams AI-drafted application documents from the draftline backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Where log records go
    #[arg(long, value_enum, default_value_t = LogDestination::File, global = true)]
    pub log_to: LogDestination,

    /// Config file (defaults to ./draftline.ron when present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides DRAFTLINE_API_BASE_URL and the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API key sent with every request (overrides DRAFTLINE_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Presentation pacing: immediate, deferred or realtime
    #[arg(long, value_parser = PacerMode::from_str, global = true)]
    pub pacer: Option<PacerMode>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload or paste material and stream a generated document
    Generate(GenerateArgs),
    /// Run one of the JSON flows (query, ps-revision, ps-final-draft)
    Query(QueryArgs),
    /// Render a saved result file to styled HTML on stdout
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// personal-statement, essay-revision, resume, recommendation-letter or sectional-analysis
    #[arg(short, long, value_parser = DocumentKind::from_str)]
    pub kind: DocumentKind,

    /// Primary document to upload
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Primary material pasted as text
    #[arg(short, long)]
    pub text: Option<String>,

    /// Supporting file (repeatable)
    #[arg(short, long = "support")]
    pub support: Vec<PathBuf>,

    #[arg(long)]
    pub instructions: Option<String>,

    /// Custom role prompt
    #[arg(long)]
    pub role: Option<String>,

    /// Custom task prompt
    #[arg(long)]
    pub task: Option<String>,

    /// Custom output format prompt
    #[arg(long)]
    pub output_format: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// query, ps-revision or ps-final-draft
    #[arg(long, value_parser = JsonFlow::from_str, default_value = "query")]
    pub flow: JsonFlow,

    /// Question or statement text
    pub text: String,

    #[arg(long)]
    pub instructions: Option<String>,

    /// Call the synchronous endpoint and print its JSON answer
    #[arg(long)]
    pub sync: bool,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Write the finished result into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Export format: md or html
    #[arg(long, value_parser = ExportFormat::from_str, default_value = "md")]
    pub export_format: ExportFormat,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Text, Markdown or HTML file produced by an earlier run
    pub path: PathBuf,

    /// Print only the detected content kind
    #[arg(long)]
    pub detect_only: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_accepts_pasted_text_and_support_files() {
        let cli = Cli::try_parse_from([
            "draftline",
            "-vv",
            "generate",
            "--kind",
            "resume",
            "--text",
            "Led the robotics club",
            "--support",
            "award.pdf",
            "--support",
            "transcript.pdf",
            "--export-dir",
            "out",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.kind, DocumentKind::Resume);
        assert_eq!(args.text.as_deref(), Some("Led the robotics club"));
        assert_eq!(args.support.len(), 2);
        assert_eq!(args.export.export_format, ExportFormat::Markdown);
        assert_eq!(args.export.export_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn unknown_kind_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["draftline", "generate", "--kind", "poem"]).unwrap_err();
        assert!(err.to_string().contains("unknown document kind"));
    }

    #[test]
    fn query_defaults_to_basic_flow() {
        let cli =
            Cli::try_parse_from(["draftline", "--pacer", "realtime", "query", "Why?"]).unwrap();
        assert_eq!(cli.pacer, Some(PacerMode::Realtime));
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.flow, JsonFlow::BasicQuery);
        assert!(!args.sync);
    }
}
