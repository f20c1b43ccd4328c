use bytes::Bytes;

/// Text layer of a PDF, or an empty string when it cannot be read.
///
/// `pdf-extract` is CPU-bound and may panic on malformed files, so it runs on the blocking pool
/// where a panic surfaces as a join error instead of tearing down the request task.
pub(super) async fn text_layer(pdf: Bytes) -> String {
    let size = pdf.len();
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf)).await {
        Ok(Ok(text)) => {
            tracing::debug!(bytes = size, chars = text.chars().count(), "Read PDF text layer");
            text
        }
        Ok(Err(error)) => {
            tracing::warn!(bytes = size, error = %error, "PDF text layer extraction failed");
            String::new()
        }
        Err(error) => {
            tracing::warn!(bytes = size, error = %error, "PDF text layer extraction aborted");
            String::new()
        }
    }
}
