use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG/JPEG image bytes and return the best text
/// candidate for each detected text region, in reading order.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset fragments regardless of the image.
pub struct MockRecognizer {
    pub fragments: Vec<String>,
}

impl MockRecognizer {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        Ok(self.fragments.clone())
    }
}

/// Always fails with [`OcrError::NotAvailable`]; stands in when no engine
/// was compiled in.
pub struct UnavailableRecognizer;

impl OcrBackend for UnavailableRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

/// Split raw engine output into one fragment per non-blank line.
pub fn split_fragments(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{split_fragments, OcrBackend, OcrError};
    use leptess::{LepTess, Variable};

    /// Characters an arithmetic expression can contain.
    pub const EXPRESSION_WHITELIST: &str = "0123456789+-xX/";

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
        whitelist: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self {
                data_path,
                lang: lang.to_string(),
                whitelist: Some(EXPRESSION_WHITELIST.to_string()),
            }
        }

        /// Let the engine emit any character instead of the expression set.
        pub fn without_whitelist(mut self) -> Self {
            self.whitelist = None;
            self
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            if let Some(whitelist) = &self.whitelist {
                lt.set_variable(Variable::TesseditCharWhitelist, whitelist)
                    .map_err(|e| OcrError::Engine(e.to_string()))?;
            }
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(split_fragments(&text))
        }
    }
}
