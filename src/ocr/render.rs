use super::{OcrError, PDF_POINTS_PER_INCH, PageRenderer};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const PAGE_PREFIX: &str = "page";

/// [`PageRenderer`] backed by poppler's `pdftoppm`.
///
/// Pages are written as `page-<n>.png` into a scratch directory and read back ordered by `n`.
/// `pdftoppm` zero-pads the number for larger documents, so ordering goes through the parsed
/// integer rather than the file name.
pub struct PdftoppmRenderer {
    binary: String,
}

impl PdftoppmRenderer {
    /// Use `binary` (a name on `PATH` or an absolute path) as the pdftoppm executable.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl PageRenderer for PdftoppmRenderer {
    async fn render_pages(&self, pdf: &[u8], scale: f32) -> Result<Vec<Vec<u8>>, OcrError> {
        let workdir = tempfile::Builder::new()
            .prefix("dropnotes-pages-")
            .tempdir()?;
        let input = workdir.path().join("input.pdf");
        tokio::fs::write(&input, pdf).await?;

        let dpi = render_dpi(scale);
        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(&input)
            .arg(workdir.path().join(PAGE_PREFIX))
            .output()
            .await?;

        if !output.status.success() {
            return Err(OcrError::CommandFailed {
                program: self.binary.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut pages = collect_page_files(workdir.path()).await?;
        if pages.is_empty() {
            return Err(OcrError::NoPages);
        }
        pages.sort_by_key(|(number, _)| *number);

        let mut images = Vec::with_capacity(pages.len());
        for (_, path) in pages {
            images.push(tokio::fs::read(&path).await?);
        }
        tracing::debug!(pages = images.len(), dpi, "Rendered PDF pages");
        Ok(images)
    }
}

fn render_dpi(scale: f32) -> u32 {
    (PDF_POINTS_PER_INCH * scale).round().max(1.0) as u32
}

async fn collect_page_files(dir: &Path) -> Result<Vec<(usize, PathBuf)>, OcrError> {
    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
            continue;
        }
        if let Some(number) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(page_number)
        {
            pages.push((number, path));
        }
    }
    Ok(pages)
}

/// Parse the page index out of a `pdftoppm` output stem such as `page-07`.
fn page_number(stem: &str) -> Option<usize> {
    let (prefix, number) = stem.rsplit_once('-')?;
    if prefix != PAGE_PREFIX {
        return None;
    }
    number.parse().ok()
}
