use super::{OcrEngine, OcrError, clean_ocr_output};
use async_trait::async_trait;
use tokio::process::Command;

/// [`OcrEngine`] that runs the `tesseract` command-line tool.
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    /// Use `binary` (a name on `PATH` or an absolute path) as the tesseract executable.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, OcrError> {
        // Held until the end of the call so the file outlives the child process.
        let input = tempfile::Builder::new()
            .prefix("dropnotes-ocr-")
            .tempfile()?;
        tokio::fs::write(input.path(), image).await?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .await?;

        if !output.status.success() {
            return Err(OcrError::CommandFailed {
                program: self.binary.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = clean_ocr_output(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(
            bytes = image.len(),
            chars = text.chars().count(),
            language,
            "OCR pass finished"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_surfaces_io_error() {
        let engine = TesseractCli::new("dropnotes-missing-tesseract-binary");
        let error = engine
            .recognize(b"not really an image", "tur")
            .await
            .expect_err("binary does not exist");
        assert!(matches!(error, OcrError::Io(_)));
    }

    #[tokio::test]
    #[ignore = "Requires a local tesseract installation"]
    async fn live_tesseract_rejects_garbage_input() {
        let engine = TesseractCli::new("tesseract");
        let result = engine.recognize(b"definitely not an image", "eng").await;
        assert!(matches!(result, Err(OcrError::CommandFailed { .. })));
    }
}
