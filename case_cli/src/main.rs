//! # Casewright CLI
//!
//! Command-line front end for `case_core`: loads a job file, places the
//! artwork, and writes the print-ready jewel case PDF.
//!
//! ```text
//! casewright export album.json --paper letter --out prints/
//! casewright paper-sizes
//! casewright layout --paper a4
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=case_core=debug`).

mod job;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use case_core::errors::{CaseError, CaseResult};
use case_core::export::{export_case, ExportRequest, PaperSize, SheetLayout, StageScenes};
use case_core::file_io::save_pdf;
use case_core::scene::{build_front_scene, build_tray_scene, SceneStyle};
use case_core::units::to_millimeters;

use crate::job::CaseJob;

#[derive(Parser, Debug)]
#[command(name = "casewright", version, about = "Lay out CD jewel case artwork and export it for print")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a job file to a one-page PDF
    Export(ExportArgs),
    /// List the supported paper sizes
    #[command(name = "paper-sizes")]
    PaperSizes,
    /// Print the computed sheet layout as JSON
    Layout(LayoutArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Job file (JSON)
    job: PathBuf,
    /// Paper key, overriding the job file
    #[arg(long)]
    paper: Option<String>,
    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
    /// Document title, overriding the job file
    #[arg(long)]
    title: Option<String>,
    /// Fail when any panel or stage had to be left out
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Paper key
    #[arg(long, default_value = "a4")]
    paper: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_job(path: &Path) -> CaseResult<CaseJob> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CaseError::file_error("read job file", path.display().to_string(), e.to_string()))?;
    CaseJob::from_json(&text)
}

/// Run an export. Returns whether every panel and stage made it onto the
/// sheet.
async fn run_export(args: ExportArgs) -> CaseResult<bool> {
    let mut job = read_job(&args.job).await?;
    if let Some(paper) = args.paper {
        job.paper_size = Some(paper);
    }
    if let Some(title) = args.title {
        job.title = title;
    }

    let request = ExportRequest {
        paper_size: job.paper_size.clone(),
        title: job.title.clone(),
    };
    let paper_key = request.paper_size.as_deref().unwrap_or(&job.settings.default_paper);
    // Reject a bad paper key before decoding any artwork
    PaperSize::from_key(paper_key)?;
    job.settings.validate()?;

    let base_dir = args.job.parent().map(Path::to_path_buf).unwrap_or_default();
    let (state, problems) = job.load(&base_dir).await;
    for problem in &problems {
        eprintln!("warning: {}", problem);
    }

    let style = SceneStyle {
        background: job.settings.background,
        ..SceneStyle::default()
    };
    let mut front = build_front_scene(&state, &style);
    let mut tray = build_tray_scene(&state, &style);
    let scenes = StageScenes {
        front: Some(&mut front),
        tray: Some(&mut tray),
    };

    let output = export_case(&request, scenes, &job.settings)?;
    for warning in &output.warnings {
        eprintln!("warning [{}]: {}", warning.error_code(), warning);
    }

    let path = save_pdf(&output.pdf, &args.out, &output.filename)?;
    info!(path = %path.display(), "export written");
    println!("{}", path.display());

    Ok(problems.is_empty() && output.warnings.is_empty())
}

fn print_paper_sizes() {
    println!("{:<8} {:<12} {:>16} {:>20}", "KEY", "NAME", "INCHES", "MILLIMETERS");
    for paper in PaperSize::ALL {
        let (w, h) = (paper.width(), paper.height());
        println!(
            "{:<8} {:<12} {:>16} {:>20}",
            paper.key(),
            paper.label(),
            format!("{} x {}", w.0, h.0),
            format!("{} x {}", to_millimeters(w).0, to_millimeters(h).0),
        );
    }
}

fn print_layout(args: LayoutArgs) -> CaseResult<ExitCode> {
    let layout = SheetLayout::compute(PaperSize::from_key(&args.paper)?);
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export(args) => {
            let strict = args.strict;
            run_export(args).await.map(|complete| {
                if strict && !complete {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            })
        }
        Commands::PaperSizes => {
            print_paper_sizes();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Layout(args) => print_layout(args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error [{}]: {}", e.error_code(), e);
            ExitCode::FAILURE
        }
    }
}
