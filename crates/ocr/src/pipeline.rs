use mathocr_core::{solve, EvalError, Evaluation, ProblemRecord};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not evaluate problem: {0}")]
    Evaluate(#[from] EvalError),
}

/// The outcome of solving one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solved {
    /// Raw fragments from the recognizer; empty when nothing was recognized.
    pub fragments: Vec<String>,
    pub evaluation: Evaluation,
    pub record: ProblemRecord,
}

/// Orchestrates: preprocess → OCR → normalize → evaluate.
///
/// An image that cannot be decoded or recognized is solved as if no text was
/// found (`0 + 0`); only reading the file and evaluating can fail.
pub struct ProblemPipeline<R: OcrBackend> {
    recognizer: Arc<R>,
}

impl<R: OcrBackend + 'static> ProblemPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer: Arc::new(recognizer),
        }
    }

    /// Solve an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<Solved, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "image read");
        self.process_bytes(bytes).await
    }

    /// Solve raw image bytes (from a capture or a file read).
    pub async fn process_bytes(&self, data: Vec<u8>) -> Result<Solved, PipelineError> {
        let fragments = self.recognize(data).await;
        let (evaluation, record) = solve(&fragments)?;
        tracing::debug!(
            problem = record.problem(),
            operator = %evaluation.operator,
            result = evaluation.result,
            "problem solved"
        );
        Ok(Solved {
            fragments,
            evaluation,
            record,
        })
    }

    async fn recognize(&self, data: Vec<u8>) -> Vec<String> {
        let recognizer = Arc::clone(&self.recognizer);
        let outcome = tokio::task::spawn_blocking(move || {
            let png = preprocess::prepare_for_ocr_from_bytes(&data)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            recognizer.recognize(&png)
        })
        .await;

        match outcome {
            Ok(Ok(fragments)) => fragments,
            Ok(Err(e)) => {
                tracing::warn!("no text recognized: {e}");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("recognizer task failed: {e}");
                Vec::new()
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{MockRecognizer, UnavailableRecognizer};
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use mathocr_core::Operator;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn process_bytes_solves_fragments() {
        let pipeline = ProblemPipeline::new(MockRecognizer::new(["12", " + ", "7"]));

        let solved = pipeline.process_bytes(tiny_png()).await.unwrap();

        assert_eq!(solved.fragments, vec!["12", " + ", "7"]);
        assert_eq!(solved.evaluation.operator, Operator::Add);
        assert_eq!(solved.record, ProblemRecord::new("12+7", 19));
    }

    #[tokio::test]
    async fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expr.png");
        std::fs::write(&path, tiny_png()).unwrap();
        let pipeline = ProblemPipeline::new(MockRecognizer::new(["6 X 7"]));

        let solved = pipeline.process_file(&path).await.unwrap();

        assert_eq!(solved.record, ProblemRecord::new("6x7", 42));
        assert_eq!(solved.evaluation.operator, Operator::Multiply);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ProblemPipeline::new(MockRecognizer::new(["1+1"]));
        let err = pipeline
            .process_file(&dir.path().join("nope.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[tokio::test]
    async fn undecodable_image_solves_as_empty() {
        let pipeline = ProblemPipeline::new(MockRecognizer::new(["12+7"]));

        let solved = pipeline.process_bytes(b"not an image".to_vec()).await.unwrap();

        assert!(solved.fragments.is_empty());
        assert_eq!(solved.evaluation.operator, Operator::Add);
        assert_eq!(solved.record, ProblemRecord::new("", 0));
    }

    #[tokio::test]
    async fn recognizer_failure_solves_as_empty() {
        let pipeline = ProblemPipeline::new(UnavailableRecognizer);
        let solved = pipeline.process_bytes(tiny_png()).await.unwrap();
        assert_eq!(solved.record, ProblemRecord::new("", 0));
    }

    #[tokio::test]
    async fn divide_by_zero_surfaces() {
        let pipeline = ProblemPipeline::new(MockRecognizer::new(["10/0"]));
        let err = pipeline.process_bytes(tiny_png()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Evaluate(EvalError::DivideByZero)));
    }
}
