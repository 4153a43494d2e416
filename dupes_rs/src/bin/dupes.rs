//! `dupes` - print jscpd duplicate ranges for a file without an editor.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::Colorize;

use dupes::locator::ReportSearch;
use dupes::matcher::normalize;
use dupes::{
    Decoration, DupeViewer, DupesConfig, Host, MessageLevel, PassOutcome, Report, ReportError,
    Trigger,
};

#[derive(Parser, Debug)]
#[command(name = "dupes")]
#[command(about = "Show duplicate code ranges from a jscpd report")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Workspace root (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Report file to use instead of searching the workspace
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Highlighted ranges for one file
    Show {
        /// File to inspect (absolute or relative to the current directory)
        file: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Per-file clone counts from the report
    Stats,
}

/// Host backed by the filesystem; decorations are collected for printing
struct CliHost {
    root: PathBuf,
    document: Option<PathBuf>,
    report: Option<PathBuf>,
    exclude: Vec<String>,
    collected: Mutex<Vec<Decoration>>,
}

#[async_trait]
impl Host for CliHost {
    async fn workspace_root(&self) -> Option<PathBuf> {
        Some(self.root.clone())
    }

    async fn find_files(&self, pattern: &str) -> Vec<PathBuf> {
        if let Some(report) = &self.report {
            return vec![report.clone()];
        }
        let search = match (
            dupes::config::build_globset(&[pattern.to_string()]),
            dupes::config::build_globset(&self.exclude),
        ) {
            (Ok(pattern), Ok(exclude)) => ReportSearch::new(pattern, exclude),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("{}", e);
                return Vec::new();
            }
        };
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || search.find(&root))
            .await
            .unwrap_or_default()
    }

    async fn active_document(&self) -> Option<PathBuf> {
        self.document.clone()
    }

    async fn apply_decorations(&self, _document: &Path, decorations: Vec<Decoration>) {
        *self
            .collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = decorations;
    }

    async fn show_message(&self, level: MessageLevel, message: String) {
        match level {
            MessageLevel::Info => eprintln!("{}", message.dimmed()),
            MessageLevel::Warning => eprintln!("{}", message.yellow()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let root = absolutize(&cwd, args.root.as_deref().unwrap_or(Path::new(".")));
    let report = args.report.as_deref().map(|p| absolutize(&cwd, p));
    let config = DupesConfig::load(&root);

    match args.command {
        Command::Show { file, json } => {
            let host = Arc::new(CliHost {
                document: Some(absolutize(&cwd, &file)),
                root,
                report,
                exclude: config.exclude.clone(),
                collected: Mutex::new(Vec::new()),
            });
            let viewer = DupeViewer::new(Arc::clone(&host), config);
            let outcome = viewer.detect(Trigger::Command).await;
            let decorations = host
                .collected
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone();

            if json {
                println!("{}", serde_json::to_string_pretty(&decorations)?);
            } else {
                print_decorations(&file, &decorations);
            }

            Ok(match outcome {
                PassOutcome::ReportNotFound | PassOutcome::ReportUnreadable => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }
        Command::Stats => {
            let path = match report {
                Some(path) => path,
                None => match ReportSearch::from_config(&config)?.find(&root).into_iter().next() {
                    Some(path) => path,
                    None => return Err(ReportError::NotFound { root }.into()),
                },
            };
            let report = Report::load_blocking(&path)?;
            print_stats(&report);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        normalize_dots(&base.join(path))
    }
}

/// Drop `.` components so prefix stripping against the root works
fn normalize_dots(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

fn print_decorations(file: &Path, decorations: &[Decoration]) {
    if decorations.is_empty() {
        println!("{} no duplicates", file.display().to_string().bold());
        return;
    }

    println!(
        "{} {} duplicate range{}",
        file.display().to_string().bold(),
        decorations.len(),
        if decorations.len() == 1 { "" } else { "s" }
    );
    for d in decorations {
        println!(
            "  {}:{}-{}:{}  {} lines  ~ {} {}-{}",
            d.range.start.line + 1,
            d.range.start.character,
            d.range.end.line + 1,
            d.range.end.character,
            d.lines,
            d.partner.file.cyan(),
            d.partner.start_line,
            d.partner.end_line
        );
    }
}

fn print_stats(report: &Report) {
    let mut rows: Vec<_> = report
        .sources()
        .filter(|(_, _, entry)| entry.clones > 0)
        .collect();
    rows.sort_by(|a, b| b.2.clones.cmp(&a.2.clones).then(a.1.cmp(b.1)));

    for (format, path, entry) in &rows {
        println!(
            "{:>4} clones  {:>6.2}%  {}  {}",
            entry.clones,
            entry.percentage,
            normalize(path),
            format.dimmed()
        );
    }

    let total = &report.statistics.total;
    println!(
        "{} {} clones, {} duplicated lines ({:.2}%) across {} sources",
        "total:".bold(),
        total.clones,
        total.duplicated_lines,
        total.percentage,
        total.sources
    );
}
