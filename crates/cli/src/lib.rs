use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use doc_model::DocumentId;
use markup_core::shapes::build_segment;
use markup_core::svg::render_svg;
use markup_core::{
    import_json, parse_mentions, read_annotations, render_page, AnnotationStore, AnnotationType,
    Calibration, MarkupSettings, MetricsProvider,
};
use pdf_engine::LopdfPageSource;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use storage::Storage;
use viewer_core::{
    DocPoint, PageSource, RecenterController, ScrollOffset, Size, ViewPoint, Viewport,
};

#[derive(Debug, Parser)]
#[command(name = "markup")]
#[command(about = "PDF markup tools")]
pub struct Cli {
    /// Data directory holding settings and annotations.
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render one page of annotations as an SVG overlay.
    Render {
        #[arg(value_name = "ANNOTATIONS")]
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        /// Take the page size from this PDF instead of --width/--height.
        #[arg(long, value_name = "PDF")]
        pdf: Option<PathBuf>,
        #[arg(long, default_value_t = 612.0)]
        width: f64,
        #[arg(long, default_value_t = 792.0)]
        height: f64,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import an annotation export into a document.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        document: String,
    },
    /// Export the stored annotations of a document.
    Export {
        #[arg(long)]
        document: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the zoom and scroll a double-click would produce.
    Recenter {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(long, default_value_t = 0.0)]
        scroll_x: f64,
        #[arg(long, default_value_t = 0.0)]
        scroll_y: f64,
        #[arg(long)]
        viewport_width: f64,
        #[arg(long)]
        viewport_height: f64,
    },
    /// Measure the distance between two document points.
    Measure {
        #[arg(long, value_name = "X,Y", value_parser = parse_point)]
        from: DocPoint,
        #[arg(long, value_name = "X,Y", value_parser = parse_point)]
        to: DocPoint,
        /// Document units per real-world unit.
        #[arg(long)]
        scale: f64,
        #[arg(long, default_value = "in")]
        unit: String,
    },
    /// List the @mentions in a note.
    Mentions {
        #[arg(value_name = "TEXT")]
        text: String,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportOutput {
    document_id: String,
    total_found: usize,
    imported: usize,
    skipped: usize,
    by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecenterOutput {
    previous_zoom: f64,
    zoom: f64,
    scroll: ScrollOffset,
    settle_delay_ms: u64,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let store = cli.store.as_deref();

    match cli.command {
        Commands::Render { file, page, zoom, pdf, width, height, output } => {
            let page_size = match pdf {
                Some(pdf) => pdf_page_size(&pdf, page)?,
                None => Size::new(width, height),
            };
            run_render(store, &file, page, zoom, page_size, output.as_deref())
        }
        Commands::Import { file, document } => run_import(store, &file, &document),
        Commands::Export { document, output } => run_export(store, &document, output.as_deref()),
        Commands::Recenter { x, y, zoom, scroll_x, scroll_y, viewport_width, viewport_height } => {
            let viewport_size = Size::new(viewport_width, viewport_height);
            run_recenter(
                store,
                ViewPoint::new(x, y),
                zoom,
                ScrollOffset::new(scroll_x, scroll_y),
                viewport_size,
            )
        }
        Commands::Measure { from, to, scale, unit } => run_measure(from, to, scale, &unit),
        Commands::Mentions { text } => {
            println!("{}", serde_json::to_string(&parse_mentions(&text))?);
            Ok(())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_storage(store: Option<&Path>) -> Result<Storage> {
    match store {
        Some(root) => Ok(Storage::with_root(root)),
        None => Storage::from_default_project().context("failed to locate the data directory"),
    }
}

/// Settings from `--store` when given, built-in defaults otherwise.
fn load_settings(store: Option<&Path>) -> Result<MarkupSettings> {
    match store {
        Some(root) => Storage::with_root(root).load_settings().context("failed to load settings"),
        None => Ok(MarkupSettings::default()),
    }
}

fn parse_point(value: &str) -> Result<DocPoint, String> {
    let (x, y) = value.split_once(',').ok_or_else(|| format!("expected X,Y, got {value}"))?;
    let parse = |part: &str| {
        part.trim().parse::<f64>().map_err(|err| format!("invalid coordinate {part:?}: {err}"))
    };
    Ok(DocPoint::new(parse(x)?, parse(y)?))
}

fn pdf_page_size(pdf: &Path, page: u32) -> Result<Size> {
    let source = LopdfPageSource::open(pdf)
        .with_context(|| format!("failed to open PDF {}", pdf.display()))?;
    source.page_size(page).with_context(|| format!("failed to size page {page}"))
}

fn run_render(
    store: Option<&Path>,
    file: &Path,
    page: u32,
    zoom: f64,
    page_size: Size,
    output: Option<&Path>,
) -> Result<()> {
    if page == 0 {
        bail!("page numbers are 1-based");
    }
    if page_size.is_empty() {
        bail!("page size must be positive");
    }

    let settings = load_settings(store)?;
    let mut viewport = Viewport::with_settings(page_size, settings.zoom);
    let zoom = viewport.set_zoom(zoom)?;
    // Headless rendering shows the whole page, so the visible area is the zoomed page.
    viewport.set_size(page_size.scaled(zoom));

    let json = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let annotations = read_annotations(&json)
        .with_context(|| format!("failed to parse annotations from {}", file.display()))?;

    let drawables = render_page(&annotations, page, zoom);
    log::info!("rendered {} elements for page {page} at zoom {zoom}", drawables.len());
    let svg = render_svg(viewport.size(), &drawables);

    match output {
        Some(path) => {
            fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        None => print!("{svg}"),
    }
    Ok(())
}

fn run_import(store: Option<&Path>, file: &Path, document: &str) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let document_id = DocumentId::new(document);
    let import = import_json(&json, &document_id)
        .with_context(|| format!("failed to import {}", file.display()))?;

    let mut annotations = open_storage(store)?.annotation_store();
    for draft in import.drafts {
        annotations.create(draft).context("failed to store imported annotation")?;
    }

    let output = ImportOutput {
        document_id: document_id.to_string(),
        total_found: import.stats.total_found,
        imported: import.stats.imported,
        skipped: import.stats.skipped,
        by_type: import.stats.by_type,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_export(store: Option<&Path>, document: &str, output: Option<&Path>) -> Result<()> {
    let document_id = DocumentId::new(document);
    let annotations = open_storage(store)?
        .annotation_store()
        .list(&document_id)
        .with_context(|| format!("failed to load annotations for {document_id}"))?;
    let json = markup_core::export_json(Some(&document_id), &annotations)?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_recenter(
    store: Option<&Path>,
    click: ViewPoint,
    zoom: f64,
    scroll: ScrollOffset,
    viewport_size: Size,
) -> Result<()> {
    let settings = load_settings(store)?;

    let mut viewport = Viewport::with_settings(viewport_size, settings.zoom);
    viewport.set_zoom(zoom)?;
    viewport.set_scroll(scroll);

    let mut recenter = RecenterController::new();
    let plan = recenter.on_double_click(click, &mut viewport);
    let scroll = recenter.on_layout_settled(&mut viewport).unwrap_or(plan.scroll);

    let output = RecenterOutput {
        previous_zoom: plan.previous_zoom,
        zoom: viewport.zoom(),
        scroll,
        settle_delay_ms: viewport.settings().settle_delay_ms,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_measure(from: DocPoint, to: DocPoint, scale: f64, unit: &str) -> Result<()> {
    let calibration = Calibration::manual(scale, unit)?;
    let metrics = calibration
        .metrics(&AnnotationType::Measurement, &build_segment(from, to))
        .context("measurement produced no value")?;
    match metrics.text {
        Some(text) => println!("{text}"),
        None => bail!("measurement produced no label"),
    }
    Ok(())
}
