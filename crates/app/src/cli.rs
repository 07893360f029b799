use clap::{Parser, Subcommand};
use mathocr_ocr::ImageSource;
use mathocr_storage::BackendKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mathocr")]
#[command(about = "Solve photographed arithmetic problems and keep a history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding settings, stores and the capture folder
    #[arg(long, global = true, env = "MATHOCR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Solve a picture using the configured image source
    ///
    /// gallery: solve IMAGE. camera: watch the capture folder and solve
    /// each new picture until Ctrl-C.
    Pick {
        /// Image file (gallery source only)
        image: Option<PathBuf>,
    },

    /// Evaluate literal text fragments without OCR or saving
    Eval {
        #[arg(required = true)]
        fragments: Vec<String>,
    },

    /// Show the problem list from the active backend
    List,

    /// Switch the persistence backend and show its problem list
    Backend {
        /// file or database
        kind: BackendKind,
    },

    /// Choose where pictures come from
    Source {
        /// camera or gallery
        source: ImageSource,
    },

    /// Delete every problem in the active backend
    Clear,
}
