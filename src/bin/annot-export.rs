//! Command-line front end: read an annotation snapshot from JSON, run one of
//! the exporters, write the artifact next to the input (or wherever `-o`
//! points).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use annot_export::{export_markdown, export_pdf, write_artifact, Annotation, ExportConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Markdown digest (`annotations_{stem}.md`)
    Md,
    /// Paginated PDF report (`{stem} - highlights.pdf`)
    Pdf,
}

#[derive(Debug, Parser)]
#[command(
    name = "annot-export",
    version,
    about = "Export document annotations as Markdown or a PDF report"
)]
struct Cli {
    /// JSON snapshot: an array of annotation records
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "md")]
    format: Format,

    /// Display name of the annotated source document; defaults to the
    /// snapshot file's name with `.json` stripped
    #[arg(short, long)]
    name: Option<String>,

    /// Directory to write the artifact into; defaults to the snapshot's
    /// directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading snapshot {}", cli.input.display()))?;
    let annotations: Vec<Annotation> =
        serde_json::from_str(&raw).context("parsing annotation snapshot")?;

    let source_name = cli.name.unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    });

    let artifact = match cli.format {
        Format::Md => export_markdown(&annotations, &source_name)?,
        Format::Pdf => {
            let config = ExportConfig::default();
            export_pdf(&annotations, &source_name, &config).await?
        }
    };

    let out_dir = cli
        .output_dir
        .or_else(|| cli.input.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = write_artifact(&artifact, &out_dir)?;
    println!("{}", path.display());
    Ok(())
}
