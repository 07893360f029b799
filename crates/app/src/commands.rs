use anyhow::{bail, Context};
use mathocr_core::{solve, ProblemRecord};
use mathocr_ocr::{spawn_capture_watcher, ImageSource, ProblemPipeline};
use mathocr_storage::{BackendKind, ProblemBook};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::cli::Commands;
use crate::settings::{OcrSettings, Settings};

pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: Settings,
    pub book: ProblemBook,
}

#[cfg(feature = "tesseract")]
type Engine = mathocr_ocr::TesseractRecognizer;

#[cfg(not(feature = "tesseract"))]
type Engine = mathocr_ocr::UnavailableRecognizer;

#[cfg(feature = "tesseract")]
fn engine(ocr: &OcrSettings) -> Engine {
    mathocr_ocr::TesseractRecognizer::new(ocr.data_path.clone(), &ocr.lang)
}

#[cfg(not(feature = "tesseract"))]
fn engine(_ocr: &OcrSettings) -> Engine {
    tracing::warn!("built without an OCR engine; every picture will read as empty (rebuild with --features tesseract)");
    mathocr_ocr::UnavailableRecognizer
}

pub async fn run(command: Commands, state: &mut AppState) -> anyhow::Result<()> {
    match command {
        Commands::Pick { image } => pick(state, image).await,
        Commands::Eval { fragments } => eval(&fragments),
        Commands::List => {
            let records = state.book.reload().await.context("loading problems")?;
            print!("{}", render_list(&records));
            Ok(())
        }
        Commands::Backend { kind } => switch_backend(state, kind).await,
        Commands::Source { source } => set_source(state, source),
        Commands::Clear => {
            state.book.clear().await?;
            println!("Cleared {} storage.", state.book.active_backend().await);
            Ok(())
        }
    }
}

async fn pick(state: &AppState, image: Option<PathBuf>) -> anyhow::Result<()> {
    let pipeline = ProblemPipeline::new(engine(&state.settings.ocr));
    match (state.settings.image_source, image) {
        (ImageSource::Gallery, Some(path)) => {
            let record = solve_and_record(&pipeline, &state.book, &path).await?;
            println!("Solved {record}\n");
            print!("{}", render_list(&state.book.records().await));
            Ok(())
        }
        (ImageSource::Gallery, None) => {
            bail!("image source is gallery: pass an image path, or run `mathocr source camera`")
        }
        (ImageSource::Camera, Some(_)) => {
            bail!("image source is camera: pictures come from the capture folder, or run `mathocr source gallery`")
        }
        (ImageSource::Camera, None) => watch_captures(state, &pipeline).await,
    }
}

async fn solve_and_record(
    pipeline: &ProblemPipeline<Engine>,
    book: &ProblemBook,
    path: &Path,
) -> anyhow::Result<ProblemRecord> {
    let solved = pipeline
        .process_file(path)
        .await
        .with_context(|| format!("solving {}", path.display()))?;
    book.record(solved.record.clone())
        .await
        .context("saving problem")?;
    Ok(solved.record)
}

async fn watch_captures(state: &AppState, pipeline: &ProblemPipeline<Engine>) -> anyhow::Result<()> {
    let capture_dir = &state.settings.capture_dir;
    std::fs::create_dir_all(capture_dir)
        .with_context(|| format!("creating capture folder {}", capture_dir.display()))?;

    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    // The watcher stops when dropped.
    let _watcher = spawn_capture_watcher(capture_dir, tx).context("starting capture watcher")?;
    tracing::info!("Watching capture folder: {}", capture_dir.display());
    println!("Drop pictures into {} (Ctrl-C to stop)", capture_dir.display());

    loop {
        tokio::select! {
            Some(path) = rx.recv() => {
                tracing::info!("Processing capture: {}", path.display());
                match solve_and_record(pipeline, &state.book, &path).await {
                    Ok(record) => println!("{record}"),
                    Err(e) => tracing::warn!("capture {} failed: {e:#}", path.display()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("capture watch stopped");
                return Ok(());
            }
        }
    }
}

fn eval(fragments: &[String]) -> anyhow::Result<()> {
    let (evaluation, record) = solve(fragments)?;
    println!("{record}  ({:?})", evaluation.operator);
    Ok(())
}

async fn switch_backend(state: &mut AppState, kind: BackendKind) -> anyhow::Result<()> {
    let records = state
        .book
        .switch_backend(kind)
        .await
        .with_context(|| format!("opening {kind} storage"))?;
    state.settings.storage.backend = kind;
    state.settings.save(&state.data_dir)?;
    println!("You are now saving in {kind} storage\n");
    print!("{}", render_list(&records));
    Ok(())
}

fn set_source(state: &mut AppState, source: ImageSource) -> anyhow::Result<()> {
    state.settings.image_source = source;
    state.settings.save(&state.data_dir)?;
    match source {
        ImageSource::Camera => println!(
            "You are now taking pictures from the camera ({})",
            state.settings.capture_dir.display()
        ),
        ImageSource::Gallery => println!("You are now picking from the gallery"),
    }
    Ok(())
}

/// One `problem = result` row per record, numbered from 1.
pub fn render_list(records: &[ProblemRecord]) -> String {
    if records.is_empty() {
        return "No problems yet.\n".to_string();
    }
    records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{:>3}. {r}\n", i + 1))
        .collect()
}
