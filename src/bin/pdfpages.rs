//! CLI binary for edgequake-pdfpages.
//!
//! A thin shim over the library crate: it resolves the input into
//! documents, replays the selection flags through a `Session`, and hands
//! the resulting requests to the export engine.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_pdfpages::export::text::divided_text;
use edgequake_pdfpages::pipeline::docx::PlainTextWriter;
use edgequake_pdfpages::pipeline::input::resolve_sources;
use edgequake_pdfpages::pipeline::recognize::TesseractRecognizer;
use edgequake_pdfpages::pipeline::render::PdfiumRasterizer;
use edgequake_pdfpages::selection::order::{pages_to_indices, parse_order_text};
use edgequake_pdfpages::{
    export_stream, ocr_preview, page_snippet, search, write_artifact, write_artifact_async, Document,
    ExportConfig, ExportConfigBuilder, ExportEngine, ExportRequest, ExportTarget, OcrProgressCallback, OcrState,
    ProgressCallback, Session, Settings, TermMatches,
};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress for OCR runs. A fresh bar is created for every
/// document, so one callback serves a whole batch.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl OcrProgressCallback for CliProgressCallback {
    fn on_ocr_start(&self, total_pages: usize) {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}%  {msg}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("OCR");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Recognising {total_pages} pages…"))
        ));
        self.errors.store(0, Ordering::SeqCst);
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_state(&self, state: &OcrState) {
        let msg = match state {
            OcrState::Rasterizing => "rendering pages".to_string(),
            OcrState::Recognizing { position, of } => format!("page {position}/{of}"),
            _ => return,
        };
        self.with_bar(|bar| bar.set_message(msg));
    }

    fn on_page_complete(&self, page_num: usize, position: usize, text_len: usize) {
        self.with_bar(|bar| {
            bar.println(format!(
                "  {} Page {:>3}  #{:<3}  {}",
                green("✓"),
                page_num,
                position,
                dim(&format!("{text_len:>5} chars")),
            ))
        });
    }

    fn on_page_error(&self, page_num: usize, position: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.with_bar(|bar| {
            bar.println(format!(
                "  {} Page {:>3}  #{:<3}  {}",
                red("✗"),
                page_num,
                position,
                red(&msg),
            ))
        });
    }

    fn on_progress(&self, percent: u8) {
        self.with_bar(|bar| bar.set_position(u64::from(percent)));
    }

    fn on_ocr_complete(&self, total_pages: usize, degraded: usize) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
        let recognised = total_pages.saturating_sub(degraded);
        if degraded == 0 {
            eprintln!(
                "{} {} pages recognised",
                green("✔"),
                bold(&recognised.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages recognised  ({} empty)",
                if degraded == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&recognised.to_string()),
                total_pages,
                red(&degraded.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Page count, key and a snippet of every page
  pdfpages inspect report.pdf

  # Drop page 4, keep 1-10, write report.pdf into ./out
  pdfpages export report.pdf --quick "1-10,-4" -o out

  # Start from nothing and pick pages, reorder, watermark
  pdfpages export report.pdf --none --quick "2,5,8" --order "8,2,5" --watermark DRAFT -o out

  # One PDF per selected page, zipped
  pdfpages export report.pdf --target page-bundle -o out

  # Page images at 300 DPI
  pdfpages export scans/ --target image-bundle --dpi 300 -o out

  # OCR every PDF in a folder into plain-text documents
  pdfpages export scans/ --target ocr-doc --lang eng --format txt -o out

  # Search the text layer
  pdfpages search report.pdf --terms invoice,total

  # Persist the output folder
  pdfpages settings set output_folder ~/Documents/pages

QUICK RANGES:
  5         select page 5
  3-7       select pages 3 to 7
  -4        deselect page 4
  -2-3      deselect pages 2 to 3
  Tokens are comma separated and applied left to right.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (image-bundle, ocr-doc, preview)
  PDFPAGES_OUTPUT_DIR     Default for --output-dir
  PDFPAGES_TESSERACT      Default for --tesseract
  PDFPAGES_LANG           Default for --lang
  RUST_LOG                Override the log filter
"#;

/// Select, reorder and export PDF pages.
#[derive(Parser, Debug)]
#[command(
    name = "pdfpages",
    version,
    about = "Select, reorder and export PDF pages",
    long_about = "Pick the pages of one or many PDFs with quick ranges, put them in order, and \
export them as a trimmed PDF, a ZIP of single-page PDFs, a ZIP of page images, or a text \
document built from OCR or from the embedded text layer.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFPAGES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFPAGES_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PDFPAGES_NO_PROGRESS")]
    no_progress: bool,

    /// Settings file (default: <config dir>/edgequake-pdfpages/config.json).
    #[arg(long, global = true, env = "PDFPAGES_SETTINGS")]
    settings: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "PDFPAGES_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show page count, document key and per-page snippets.
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Write a small PNG of every selected page into this folder.
        #[arg(long, value_name = "DIR")]
        thumbnails: Option<PathBuf>,
    },

    /// Export the selected pages of every document.
    Export(ExportArgs),

    /// Print the first characters of the OCR text of the selection.
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// Count search terms in the text of the selection.
    Search {
        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated search terms.
        #[arg(long, value_delimiter = ',', required = true)]
        terms: Vec<String>,

        /// Search OCR text instead of the embedded text layer.
        #[arg(long)]
        ocr: bool,

        #[command(flatten)]
        ocr_args: OcrArgs,

        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show or change persisted settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the settings file.
    Show,
    /// Set one key: input_folder, output_folder, tesseract_path, ocr_lang.
    Set { key: String, value: String },
}

/// Input and page selection, shared by every document command.
#[derive(Args, Debug)]
struct SourceArgs {
    /// PDF file, folder of PDFs, or HTTP/HTTPS URL. Defaults to the
    /// persisted input folder.
    input: Option<String>,

    /// Start with no page selected instead of all pages.
    #[arg(long)]
    none: bool,

    /// Quick-range expression, e.g. "1-10,-4".
    #[arg(long, allow_hyphen_values = true)]
    quick: Option<String>,

    /// Export order as 1-based page numbers, e.g. "3,1,2".
    #[arg(long)]
    order: Option<String>,
}

#[derive(Args, Debug)]
struct OcrArgs {
    /// OCR language(s), e.g. "eng" or "ell+eng".
    #[arg(long, env = "PDFPAGES_LANG")]
    lang: Option<String>,

    /// Path to the tesseract binary.
    #[arg(long, env = "PDFPAGES_TESSERACT")]
    tesseract: Option<String>,

    /// OCR rendering DPI (72–600).
    #[arg(long, env = "PDFPAGES_OCR_DPI",
          value_parser = clap::value_parser!(u32).range(72..=600))]
    ocr_dpi: Option<u32>,

    /// Path to libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// What to produce.
    #[arg(short, long, value_enum, default_value = "trimmed-pdf")]
    target: TargetArg,

    /// Folder the artifacts are written to (overwrites existing files).
    #[arg(short, long, env = "PDFPAGES_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Stamp this text diagonally on every page of a trimmed PDF.
    #[arg(long)]
    watermark: Option<String>,

    /// Prefix for file names inside page and image bundles.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Image-bundle rendering DPI (72–600).
    #[arg(long, env = "PDFPAGES_DPI",
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: Option<u32>,

    /// Text document format.
    #[arg(long, value_enum, default_value = "docx")]
    format: FormatArg,

    #[command(flatten)]
    ocr: OcrArgs,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TargetArg {
    TrimmedPdf,
    PageBundle,
    ImageBundle,
    OcrDoc,
    TextDoc,
}

impl From<TargetArg> for ExportTarget {
    fn from(v: TargetArg) -> Self {
        match v {
            TargetArg::TrimmedPdf => ExportTarget::TrimmedPdf,
            TargetArg::PageBundle => ExportTarget::PageBundle,
            TargetArg::ImageBundle => ExportTarget::ImageBundle,
            TargetArg::OcrDoc => ExportTarget::OcrDocument,
            TargetArg::TextDoc => ExportTarget::EmbeddedTextDocument,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Docx,
    Txt,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let json = matches!(
        cli.command,
        Command::Inspect { json: true, .. } | Command::Search { json: true, .. }
    );
    let show_progress = !cli.quiet && !cli.no_progress && !json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let settings_path = cli
        .settings
        .clone()
        .or_else(Settings::default_path)
        .context("No config directory on this platform; pass --settings")?;
    let settings = Settings::load(&settings_path);

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn OcrProgressCallback>)
    } else {
        None
    };

    match &cli.command {
        Command::Settings { action } => run_settings(action, settings, &settings_path),
        Command::Inspect {
            source,
            json,
            thumbnails,
        } => {
            let engine = ExportEngine::new(base_config(&cli, &settings, None, None)?);
            preflight(engine.config(), thumbnails.is_some(), false)?;
            let (documents, requests) = open_documents(&settings, source, &engine).await?;
            run_inspect(&engine, &documents, *json)?;
            if let Some(dir) = thumbnails {
                write_thumbnails(&engine, &requests, dir, cli.quiet)?;
            }
            Ok(())
        }
        Command::Export(args) => run_export(&cli, &settings, args, progress).await,
        Command::Preview { source, ocr } => {
            let engine = Arc::new(ExportEngine::new(base_config(
                &cli,
                &settings,
                Some(ocr),
                progress,
            )?));
            preflight(engine.config(), true, true)?;
            let (_, requests) = open_documents(&settings, source, &engine).await?;
            for request in requests {
                let name = request.document().name().to_string();
                let engine = Arc::clone(&engine);
                let outcome = tokio::task::spawn_blocking(move || engine.ocr(&request))
                    .await
                    .context("OCR task panicked")?;
                match outcome {
                    Ok(outcome) => {
                        println!("{}", bold(&format!("{name}: OCR preview")));
                        println!("{}\n", ocr_preview(&outcome.text()));
                    }
                    Err(e) => eprintln!("{} {}: {}", red("✗"), name, red(&e.to_string())),
                }
            }
            Ok(())
        }
        Command::Search {
            source,
            terms,
            ocr,
            ocr_args,
            json,
        } => {
            let engine = Arc::new(ExportEngine::new(base_config(
                &cli,
                &settings,
                Some(ocr_args),
                progress,
            )?));
            preflight(engine.config(), *ocr, *ocr)?;
            let (_, requests) = open_documents(&settings, source, &engine).await?;
            run_search(engine, requests, terms, *ocr, *json).await
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn run_settings(action: &SettingsAction, mut settings: Settings, path: &Path) -> Result<()> {
    match action {
        SettingsAction::Show => {
            println!("File:            {}", path.display());
            println!(
                "{}",
                serde_json::to_string_pretty(&settings).context("Failed to serialise settings")?
            );
        }
        SettingsAction::Set { key, value } => {
            settings.set(key, value.as_str())?;
            settings.save(path)?;
            eprintln!("{} {} = {}", green("✔"), bold(key), value);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct InspectReport {
    name: String,
    key: String,
    page_count: usize,
    selected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<Vec<usize>>,
    pages: Vec<PageReport>,
}

#[derive(Serialize)]
struct PageReport {
    page: usize,
    snippet: String,
}

fn run_inspect(engine: &ExportEngine, documents: &[OpenedDocument], json: bool) -> Result<()> {
    let reports: Vec<InspectReport> = documents
        .iter()
        .map(|opened| {
            let document = &opened.document;
            let indices: Vec<usize> = (0..document.page_count()).collect();
            let pages = engine
                .structure()
                .extract_texts(document.bytes(), &indices)
                .into_iter()
                .enumerate()
                .map(|(i, text)| PageReport {
                    page: i + 1,
                    snippet: page_snippet(&text.unwrap_or_default()),
                })
                .collect();
            InspectReport {
                name: document.name().to_string(),
                key: document.key().to_string(),
                page_count: document.page_count(),
                selected: opened.selected.clone(),
                order: opened.custom_order.clone(),
                pages,
            }
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialise report")?
        );
        return Ok(());
    }

    for report in &reports {
        println!("File:         {}", report.name);
        println!("Key:          {}", report.key);
        println!("Pages:        {}", report.page_count);
        println!("Selected:     {}", report.selected);
        if let Some(order) = &report.order {
            let pages: Vec<String> = order.iter().map(|p| p.to_string()).collect();
            println!("Order:        {}", pages.join(", "));
        }
        for page in &report.pages {
            println!("  {:>4}  {}", page.page, dim(&page.snippet));
        }
        println!();
    }
    Ok(())
}

async fn run_export(
    cli: &Cli,
    settings: &Settings,
    args: &ExportArgs,
    progress: Option<ProgressCallback>,
) -> Result<()> {
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| settings.output_dir())
        .context(
            "Output folder not set: pass --output-dir or run \
             `pdfpages settings set output_folder <dir>`",
        )?;

    let mut builder = settings
        .apply(ExportConfig::builder())
        .filename_prefix(args.prefix.clone())
        .download_timeout_secs(cli.download_timeout);
    if let Some(text) = &args.watermark {
        builder = builder.watermark(text.clone());
    }
    if let Some(dpi) = args.dpi {
        builder = builder.image_dpi(dpi);
    }
    builder = apply_ocr_args(builder, &args.ocr);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let mut engine = ExportEngine::new(config);
    if matches!(args.format, FormatArg::Txt) {
        engine = engine.with_writer(Arc::new(PlainTextWriter));
    }
    let engine = Arc::new(engine);
    let target = ExportTarget::from(args.target);
    preflight(
        engine.config(),
        target.needs_raster(),
        target == ExportTarget::OcrDocument,
    )?;

    let (_, requests) = open_documents(settings, &args.source, &engine).await?;
    let total = requests.len();

    let mut stream = export_stream(Arc::clone(&engine), requests, target);
    let mut failed = 0usize;
    while let Some((name, result)) = stream.next().await {
        let written = match result {
            Ok(artifact) => write_artifact_async(&output_dir, &artifact)
                .await
                .map(|path| (path, artifact.len())),
            Err(e) => Err(e),
        };
        match written {
            Ok((path, len)) => {
                if !cli.quiet {
                    eprintln!(
                        "{}  {}  →  {}  {}",
                        green("✔"),
                        name,
                        bold(&path.display().to_string()),
                        dim(&format!("{len} bytes")),
                    );
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}  {}  {}", red("✘"), name, red(&e.to_string()));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} documents failed to export");
    }
    Ok(())
}

async fn run_search(
    engine: Arc<ExportEngine>,
    requests: Vec<ExportRequest>,
    terms: &[String],
    ocr: bool,
    json: bool,
) -> Result<()> {
    let mut results: BTreeMap<String, BTreeMap<String, TermMatches>> = BTreeMap::new();
    for request in requests {
        let name = request.document().name().to_string();
        let engine = Arc::clone(&engine);
        let text = tokio::task::spawn_blocking(move || {
            if ocr {
                engine.ocr(&request).map(|outcome| outcome.text())
            } else {
                engine.embedded_texts(&request).map(|pages| {
                    divided_text(pages.iter().map(|(n, t)| (*n, t.as_str())))
                })
            }
        })
        .await
        .context("Search task panicked")?;

        match text {
            Ok(text) => {
                results.insert(name, search(&text, terms));
            }
            Err(e) => eprintln!("{} {}: {}", red("✗"), name, red(&e.to_string())),
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("Failed to serialise results")?
        );
        return Ok(());
    }

    for (name, matches) in &results {
        println!("{}", bold(name));
        for (term, found) in matches {
            println!("  {}  {}", cyan(term), found.count);
            for context in &found.contexts {
                println!("      {}", dim(&format!("…{context}…")));
            }
        }
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Config for the commands that only need the OCR knobs.
fn base_config(
    cli: &Cli,
    settings: &Settings,
    ocr: Option<&OcrArgs>,
    progress: Option<ProgressCallback>,
) -> Result<ExportConfig> {
    let mut builder = settings
        .apply(ExportConfig::builder())
        .download_timeout_secs(cli.download_timeout);
    if let Some(ocr) = ocr {
        builder = apply_ocr_args(builder, ocr);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn apply_ocr_args(
    mut builder: ExportConfigBuilder,
    ocr: &OcrArgs,
) -> ExportConfigBuilder {
    if let Some(lang) = &ocr.lang {
        builder = builder.ocr_language(lang.clone());
    }
    if let Some(path) = &ocr.tesseract {
        builder = builder.tesseract_path(path.clone());
    }
    if let Some(dpi) = ocr.ocr_dpi {
        builder = builder.ocr_dpi(dpi);
    }
    if let Some(lib) = &ocr.pdfium {
        builder = builder.pdfium_library(lib.clone());
    }
    builder
}

/// Fail early when a command needs pdfium or tesseract and either is missing.
fn preflight(config: &ExportConfig, raster: bool, ocr: bool) -> Result<()> {
    if raster {
        let rasterizer =
            PdfiumRasterizer::new(config.pdfium_library.clone(), config.max_rendered_pixels);
        if !rasterizer.is_available() {
            anyhow::bail!(
                "pdfium library not found: pass --pdfium <path> or set PDFIUM_LIB_PATH"
            );
        }
    }
    if ocr {
        let recognizer = TesseractRecognizer::new(config.tesseract_path.clone());
        if !recognizer.is_available() {
            anyhow::bail!(
                "tesseract not found at '{}': install tesseract-ocr or pass --tesseract <path>",
                recognizer.binary()
            );
        }
    }
    Ok(())
}

fn write_thumbnails(
    engine: &ExportEngine,
    requests: &[ExportRequest],
    dir: &Path,
    quiet: bool,
) -> Result<()> {
    for request in requests {
        let name = request.document().name();
        let thumbs = match engine.thumbnails(request) {
            Ok(thumbs) => thumbs,
            Err(e) => {
                eprintln!("{} {}: {}", red("✗"), name, red(&e.to_string()));
                continue;
            }
        };
        for thumb in &thumbs {
            write_artifact(dir, thumb)?;
        }
        if !quiet {
            eprintln!(
                "{}  {}  →  {} thumbnails in {}",
                green("✔"),
                name,
                thumbs.len(),
                bold(&dir.display().to_string()),
            );
        }
    }
    Ok(())
}

/// A loaded document with its selection summary and accepted custom order
/// (1-based page numbers).
struct OpenedDocument {
    document: Document,
    selected: String,
    custom_order: Option<Vec<usize>>,
}

/// Resolve the input, load every PDF and replay the selection flags.
///
/// Documents that fail to load are reported and skipped; a rejected order
/// keeps the default order. Returns the opened documents and one export
/// request per document.
async fn open_documents(
    settings: &Settings,
    source: &SourceArgs,
    engine: &ExportEngine,
) -> Result<(Vec<OpenedDocument>, Vec<ExportRequest>)> {
    let input = match &source.input {
        Some(input) => input.clone(),
        None => settings
            .input_dir()
            .map(|p| p.display().to_string())
            .context(
                "No input given: pass a PDF, folder or URL, or run \
                 `pdfpages settings set input_folder <dir>`",
            )?,
    };

    let sources = resolve_sources(&input, engine.config().download_timeout_secs)
        .await
        .with_context(|| format!("Failed to read input '{input}'"))?;

    let mut session = Session::new();
    let mut documents = Vec::with_capacity(sources.len());
    let mut requests = Vec::with_capacity(sources.len());

    for source_file in sources {
        let document = match Document::load(&source_file.name, source_file.bytes, engine.structure())
        {
            Ok(document) => document,
            Err(e) => {
                eprintln!("{} {}", red("✘"), red(&e.to_string()));
                continue;
            }
        };

        session.open(&document);
        if source.none {
            session.deselect_all(&document)?;
        }
        if let Some(expression) = &source.quick {
            session
                .apply_quick_range(&document, expression)
                .with_context(|| format!("Invalid quick range for '{}'", document.name()))?;
        }
        if let Some(order) = &source.order {
            let proposed = pages_to_indices(&parse_order_text(order)).unwrap_or_default();
            if let Err(e) = session.propose_order(&document, &proposed) {
                eprintln!("{} {}: {}", cyan("⚠"), document.name(), e);
            }
        }

        let state = session.state(&document)?;
        let selected = state.selection.describe();
        let custom_order = state
            .order
            .explicit()
            .map(|order| order.iter().map(|i| i + 1).collect());
        requests.push(session.request(&document)?);
        documents.push(OpenedDocument {
            document,
            selected,
            custom_order,
        });
    }

    if documents.is_empty() {
        anyhow::bail!("No readable PDF in '{input}'");
    }
    Ok((documents, requests))
}
