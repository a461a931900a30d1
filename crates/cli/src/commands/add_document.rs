// `lexflow add-document`: record an uploaded file's metadata, or store a
// written document together with its content.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use lexflow_common::document::Upload;
use lexflow_common::types::{Case, LegalDocument};

use super::ls::document_line;
use super::{block_on, emit, given, open_context, today};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct AddDocumentArgs {
    /// File to record.
    path: PathBuf,
    /// Store the file's text as an editor document instead of metadata only.
    #[arg(long)]
    authored: bool,
    /// Title of an authored document; defaults to the file stem.
    #[arg(long, requires = "authored")]
    title: Option<String>,
    /// Font of an authored document.
    #[arg(long, requires = "authored")]
    font: Option<String>,
    #[arg(long)]
    case: Option<String>,
    #[arg(long)]
    client: Option<String>,
    /// Comma-separated tags for an uploaded file.
    #[arg(long, default_value = "", conflicts_with = "authored")]
    tags: String,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: AddDocumentArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(add(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn add(args: &AddDocumentArgs) -> anyhow::Result<LegalDocument> {
    let context = open_context().await?;
    let document = new_document(args, &context.store().cases(), &today())?;
    Ok(context.orchestrator().add(document).await?)
}

fn new_document(args: &AddDocumentArgs, cases: &[Case], date: &str) -> anyhow::Result<LegalDocument> {
    if args.authored {
        let content = fs::read_to_string(&args.path)
            .with_context(|| format!("failed to read `{}`", args.path.display()))?;
        let title = given(&args.title).unwrap_or_else(|| file_stem(&args.path));
        let mut document = LegalDocument::authored(&title, &content, args.font.as_deref(), date);
        document.case_id = given(&args.case);
        document.client_id = given(&args.client);
        return Ok(document);
    }

    let metadata = fs::metadata(&args.path)
        .with_context(|| format!("failed to read `{}`", args.path.display()))?;
    let file_name = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("`{}` does not name a file", args.path.display()))?;
    let upload = Upload {
        file_name: &file_name,
        size_bytes: metadata.len(),
        upload_date: date,
        case_id: args.case.as_deref(),
        client_id: args.client.as_deref(),
        tags_csv: &args.tags,
    };
    Ok(LegalDocument::from_upload(&upload, cases))
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}

fn format_human(document: &LegalDocument) -> String {
    format!("Added document {}", document_line(document))
}
