//! Optical character recognition used when structural extraction comes up empty.
//!
//! OCR is slow (hundreds of milliseconds to seconds per image), so the extraction layer only
//! reaches for it for photographs and for PDFs whose text layer is missing. Two seams live here:
//! [`OcrEngine`] turns image bytes into text and [`PageRenderer`] rasterizes PDF pages. The
//! default implementations shell out to `tesseract` and `pdftoppm`.

mod render;
mod tesseract;

pub use render::PdftoppmRenderer;
pub use tesseract::TesseractCli;

use async_trait::async_trait;
use thiserror::Error;

/// PDF user-space units per inch; page rendering scales relative to this.
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Errors raised by OCR engines and page renderers.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Temporary files or the child process could not be set up.
    #[error("OCR I/O failure: {0}")]
    Io(#[from] std::io::Error),
    /// External tool exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        /// Executable that failed.
        program: String,
        /// Exit status rendered for display.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
    /// Renderer produced no page images.
    #[error("renderer produced no pages")]
    NoPages,
}

/// Recognizes text in a single image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Return the trimmed text found in `image` using the `language` hint.
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, OcrError>;
}

/// Rasterizes PDF pages for OCR.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render every page of `pdf` at `scale` times its natural size, returning encoded images
    /// in page order.
    async fn render_pages(&self, pdf: &[u8], scale: f32) -> Result<Vec<Vec<u8>>, OcrError>;
}

/// Normalize raw engine output: drop form feeds and surrounding whitespace.
pub(crate) fn clean_ocr_output(raw: &str) -> String {
    raw.replace('\x0c', "").trim().to_string()
}
