//! Format classification and text extraction strategies.
//!
//! A declared MIME type selects exactly one [`StrategyKind`]; unknown types are rejected up
//! front instead of being guessed at. Strategies never fail outward: malformed input degrades to
//! an empty string plus a warning, and the orchestrator's single "too short" check turns that
//! into a reported error.

mod docx;
mod html;
mod pdf;

use crate::ocr::{OcrEngine, PageRenderer};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Minimum trimmed character count for extracted text to be worth summarizing.
pub const MIN_USABLE_CHARS: usize = 10;

/// Upscale factor applied when rasterizing PDF pages for OCR.
pub const PDF_RENDER_SCALE: f32 = 2.0;

const WORD_PROCESSOR_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extraction strategy selected from a declared MIME type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// `text/*` other than HTML.
    PlainText,
    /// `text/html` documents.
    Html,
    /// Office Open XML word-processing packages (`.docx`).
    WordProcessorPackage,
    /// `application/pdf`, text layer first with OCR fallback.
    Pdf,
    /// `image/*`, OCR only.
    Image,
}

impl StrategyKind {
    /// Stable lowercase label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::Html => "html",
            Self::WordProcessorPackage => "word_processor_package",
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a declared MIME type to its extraction strategy.
///
/// Matching ignores case, surrounding whitespace, and parameters such as `; charset=utf-8`.
/// `None` means the type is unsupported.
pub fn classify(declared_mime_type: &str) -> Option<StrategyKind> {
    let essence = declared_mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/pdf" => Some(StrategyKind::Pdf),
        WORD_PROCESSOR_MIME => Some(StrategyKind::WordProcessorPackage),
        value if value.starts_with("text/html") => Some(StrategyKind::Html),
        value if value.starts_with("text/") => Some(StrategyKind::PlainText),
        value if value.starts_with("image/") => Some(StrategyKind::Image),
        _ => None,
    }
}

/// Whether `text` carries enough characters to be summarized.
pub fn is_usable(text: &str) -> bool {
    text.trim().chars().count() >= MIN_USABLE_CHARS
}

/// Text produced by one extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Extracted text; may be empty when the strategy could not read the input.
    pub text: String,
    /// Strategy that produced the text.
    pub source_strategy: StrategyKind,
    /// Whether OCR contributed the text.
    pub used_ocr: bool,
}

impl ExtractedText {
    fn new(text: String, source_strategy: StrategyKind, used_ocr: bool) -> Self {
        Self {
            text,
            source_strategy,
            used_ocr,
        }
    }

    /// Whether the text clears the usability threshold.
    pub fn is_usable(&self) -> bool {
        is_usable(&self.text)
    }
}

/// Runs extraction strategies, owning the OCR collaborators some of them fall back to.
pub struct Extractor {
    ocr: Arc<dyn OcrEngine>,
    renderer: Arc<dyn PageRenderer>,
    language: String,
}

impl Extractor {
    /// Build an extractor around the shared OCR engine and page renderer.
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        renderer: Arc<dyn PageRenderer>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            ocr,
            renderer,
            language: language.into(),
        }
    }

    /// Convert `bytes` to text with the given strategy, including its OCR fallback.
    pub async fn extract(&self, strategy: StrategyKind, bytes: Bytes) -> ExtractedText {
        match strategy {
            StrategyKind::PlainText => ExtractedText::new(
                String::from_utf8_lossy(&bytes).into_owned(),
                strategy,
                false,
            ),
            StrategyKind::Html => ExtractedText::new(
                html::body_text(&String::from_utf8_lossy(&bytes)),
                strategy,
                false,
            ),
            StrategyKind::WordProcessorPackage => {
                let text = docx::raw_text(&bytes).unwrap_or_else(|error| {
                    tracing::warn!(error = %error, "Could not read word-processor package");
                    String::new()
                });
                ExtractedText::new(text, strategy, false)
            }
            StrategyKind::Pdf => {
                let layer = pdf::text_layer(bytes.clone()).await;
                self.pdf_text_or_ocr(layer, &bytes).await
            }
            StrategyKind::Image => {
                ExtractedText::new(self.recognize(&bytes, None).await, strategy, true)
            }
        }
    }

    /// Keep a usable text layer; otherwise OCR the rendered pages. OCR is never tried first.
    async fn pdf_text_or_ocr(&self, layer: String, pdf: &[u8]) -> ExtractedText {
        if is_usable(&layer) {
            return ExtractedText::new(layer, StrategyKind::Pdf, false);
        }

        tracing::info!(
            layer_chars = layer.trim().chars().count(),
            "PDF text layer insufficient; falling back to OCR"
        );
        let pages = match self.renderer.render_pages(pdf, PDF_RENDER_SCALE).await {
            Ok(pages) => pages,
            Err(error) => {
                tracing::warn!(error = %error, "Could not render PDF pages for OCR");
                return ExtractedText::new(String::new(), StrategyKind::Pdf, true);
            }
        };

        let mut text = String::new();
        for (index, page) in pages.iter().enumerate() {
            text.push_str(&self.recognize(page, Some(index + 1)).await);
            text.push('\n');
        }
        ExtractedText::new(text.trim().to_string(), StrategyKind::Pdf, true)
    }

    async fn recognize(&self, image: &[u8], page: Option<usize>) -> String {
        match self.ocr.recognize(image, &self.language).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(error = %error, page, "OCR failed");
                String::new()
            }
        }
    }
}
