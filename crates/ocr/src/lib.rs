pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod source;

pub use pipeline::{PipelineError, ProblemPipeline, Solved};
pub use preprocess::{prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{split_fragments, MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
pub use source::{is_image_file, spawn_capture_watcher, ImageSource};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
