//! Pipeline orchestrator: inline text or fetch + classify + extract, then bound and summarize.

use crate::{
    config::Config,
    extraction::{Extractor, StrategyKind, classify},
    fetch::{Fetcher, HttpFetcher},
    metrics::{MetricsSnapshot, PipelineMetrics},
    ocr::{PdftoppmRenderer, TesseractCli},
    processing::{
        normalize::{bound_source_text, has_usable_inline_text},
        types::{ExtractionRequest, InitError, PipelineError},
    },
    summarization::{
        OpenAiSummarizationClient, PromptProfile, SummarizationClient, SummaryRequest,
        SummaryResult,
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Coordinates the full summarization pipeline.
///
/// Collaborators are built once at startup and shared read-only across requests, so a single
/// instance behind an `Arc` serves every concurrent caller.
pub struct SummaryPipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Extractor,
    summarizer: Arc<dyn SummarizationClient>,
    default_profile: PromptProfile,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait SummarizeApi: Send + Sync {
    /// Produce a summary for `request`, using `profile` or the configured default.
    async fn summarize(
        &self,
        request: ExtractionRequest,
        profile: Option<PromptProfile>,
    ) -> Result<SummaryResult, PipelineError>;

    /// Count a request the surface rejected before it could be resolved into a run.
    fn record_rejected(&self, error: &PipelineError);

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Extractor,
        summarizer: Arc<dyn SummarizationClient>,
        default_profile: PromptProfile,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            summarizer,
            default_profile,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build the production pipeline: HTTP fetcher, tesseract/pdftoppm OCR, OpenAI client.
    pub fn from_config(config: &Config) -> Result<Self, InitError> {
        tracing::info!("Initializing summarization pipeline");
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let extractor = Extractor::new(
            Arc::new(TesseractCli::new(config.tesseract_bin.clone())),
            Arc::new(PdftoppmRenderer::new(config.pdftoppm_bin.clone())),
            config.ocr_language.clone(),
        );
        let summarizer = OpenAiSummarizationClient::new(config)?;
        tracing::info!(
            default_profile = ?config.default_profile,
            ocr_language = %config.ocr_language,
            "Summarization pipeline initialized"
        );
        Ok(Self::new(
            Arc::new(fetcher),
            extractor,
            Arc::new(summarizer),
            config.default_profile,
        ))
    }

    /// Run the pipeline for one request.
    pub async fn summarize(
        &self,
        request: ExtractionRequest,
        profile: Option<PromptProfile>,
    ) -> Result<SummaryResult, PipelineError> {
        let request_id = Uuid::new_v4();
        let source = request.source_label();
        let span = tracing::info_span!("summarize", %request_id, source);

        async move {
            let started = Instant::now();
            self.metrics
                .record_request(matches!(request, ExtractionRequest::RemoteFile { .. }));

            let outcome = self
                .run(request, profile.unwrap_or(self.default_profile))
                .await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &outcome {
                Ok(result) => {
                    self.metrics.record_summary(result.used_fallback);
                    tracing::info!(
                        elapsed_ms,
                        summary_chars = result.summary_text.chars().count(),
                        used_fallback = result.used_fallback,
                        "Summary produced"
                    );
                }
                Err(error) => {
                    self.metrics.record_failure(error);
                    tracing::warn!(
                        elapsed_ms,
                        kind = error.kind(),
                        error = %error,
                        "Summarization request failed"
                    );
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request: ExtractionRequest,
        profile: PromptProfile,
    ) -> Result<SummaryResult, PipelineError> {
        let text = match request {
            ExtractionRequest::InlineText { content } => {
                if !has_usable_inline_text(&content) {
                    return Err(PipelineError::MissingInput);
                }
                content
            }
            ExtractionRequest::RemoteFile {
                url,
                declared_mime_type,
            } => self.extract_remote(&url, &declared_mime_type).await?,
        };

        let source_text = bound_source_text(&text);
        tracing::debug!(
            source_chars = source_text.chars().count(),
            profile = ?profile,
            "Requesting summary"
        );
        let result = self
            .summarizer
            .summarize(SummaryRequest {
                source_text,
                profile,
            })
            .await?;
        Ok(result)
    }

    async fn extract_remote(
        &self,
        url: &str,
        declared_mime_type: &str,
    ) -> Result<String, PipelineError> {
        // Classify before downloading so unsupported files cost nothing.
        let strategy = classify(declared_mime_type)
            .ok_or_else(|| PipelineError::UnsupportedType(declared_mime_type.to_string()))?;

        let content = self.fetcher.fetch(url).await?;
        tracing::debug!(
            %strategy,
            status = content.status,
            bytes = content.bytes.len(),
            "Extracting downloaded file"
        );

        let extracted = self.extractor.extract(strategy, content.bytes).await;
        if extracted.used_ocr && strategy == StrategyKind::Pdf {
            self.metrics.record_ocr_fallback();
        }
        if !extracted.is_usable() {
            return Err(PipelineError::ExtractionTooShort {
                strategy: extracted.source_strategy,
                chars: extracted.text.trim().chars().count(),
            });
        }
        Ok(extracted.text)
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl SummarizeApi for SummaryPipeline {
    async fn summarize(
        &self,
        request: ExtractionRequest,
        profile: Option<PromptProfile>,
    ) -> Result<SummaryResult, PipelineError> {
        SummaryPipeline::summarize(self, request, profile).await
    }

    fn record_rejected(&self, error: &PipelineError) {
        tracing::warn!(kind = error.kind(), error = %error, "Summarization request rejected");
        self.metrics.record_rejected(error);
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryPipeline::metrics_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::test_support::{EchoOcr, FixedPages};
    use crate::fetch::{FetchError, RawContent};
    use crate::processing::normalize::MAX_SOURCE_CHARS;
    use crate::summarization::SummarizationClientError;
    use bytes::Bytes;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    enum FetchReply {
        Body(&'static [u8]),
        Owned(Vec<u8>),
        Status(StatusCode),
    }

    struct StubFetcher {
        reply: FetchReply,
        urls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(reply: FetchReply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                urls: Mutex::new(Vec::new()),
            })
        }

        fn fetch_count(&self) -> usize {
            self.urls.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<RawContent, FetchError> {
            self.urls.lock().expect("lock").push(url.to_string());
            match &self.reply {
                FetchReply::Body(bytes) => Ok(RawContent {
                    status: 200,
                    bytes: Bytes::from_static(bytes),
                }),
                FetchReply::Owned(bytes) => Ok(RawContent {
                    status: 200,
                    bytes: Bytes::from(bytes.clone()),
                }),
                FetchReply::Status(status) => Err(FetchError::UnexpectedStatus {
                    status: *status,
                    body: "error page".into(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSummarizer {
        requests: Mutex<Vec<SummaryRequest>>,
        fail_with: Option<&'static str>,
    }

    impl RecordingSummarizer {
        fn last_request(&self) -> SummaryRequest {
            self.requests
                .lock()
                .expect("lock")
                .last()
                .cloned()
                .expect("summarizer was called")
        }

        fn call_count(&self) -> usize {
            self.requests.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl SummarizationClient for RecordingSummarizer {
        async fn summarize(
            &self,
            request: SummaryRequest,
        ) -> Result<SummaryResult, SummarizationClientError> {
            self.requests.lock().expect("lock").push(request);
            match self.fail_with {
                Some(body) => Err(SummarizationClientError::GenerationFailed(format!(
                    "provider returned 500 Internal Server Error: {body}"
                ))),
                None => Ok(SummaryResult {
                    summary_text: "Özet".into(),
                    used_fallback: false,
                }),
            }
        }
    }

    struct Harness {
        pipeline: SummaryPipeline,
        fetcher: Arc<StubFetcher>,
        ocr: Arc<EchoOcr>,
        summarizer: Arc<RecordingSummarizer>,
    }

    fn harness(reply: FetchReply, pages: Vec<&'static str>) -> Harness {
        harness_with(reply, pages, RecordingSummarizer::default())
    }

    fn harness_with(
        reply: FetchReply,
        pages: Vec<&'static str>,
        summarizer: RecordingSummarizer,
    ) -> Harness {
        let fetcher = StubFetcher::new(reply);
        let ocr = Arc::new(EchoOcr::default());
        let summarizer = Arc::new(summarizer);
        let pipeline = SummaryPipeline::new(
            fetcher.clone(),
            Extractor::new(ocr.clone(), Arc::new(FixedPages(pages)), "tur"),
            summarizer.clone(),
            PromptProfile::Brief,
        );
        Harness {
            pipeline,
            fetcher,
            ocr,
            summarizer,
        }
    }

    fn remote(mime: &str) -> ExtractionRequest {
        ExtractionRequest::RemoteFile {
            url: "https://files.example/shared".into(),
            declared_mime_type: mime.into(),
        }
    }

    #[tokio::test]
    async fn inline_text_never_fetches() {
        let h = harness(FetchReply::Body(b"unused"), vec![]);
        let result = h
            .pipeline
            .summarize(
                ExtractionRequest::InlineText {
                    content: "Ders notu: fotosentez ışık enerjisi gerektirir.".into(),
                },
                None,
            )
            .await
            .expect("summary");

        assert_eq!(result.summary_text, "Özet");
        assert_eq!(h.fetcher.fetch_count(), 0);
        let request = h.summarizer.last_request();
        assert_eq!(
            request.source_text,
            "Ders notu: fotosentez ışık enerjisi gerektirir."
        );
        assert_eq!(request.profile, PromptProfile::Brief);
    }

    #[tokio::test]
    async fn explicit_profile_overrides_default() {
        let h = harness(FetchReply::Body(b"unused"), vec![]);
        h.pipeline
            .summarize(
                ExtractionRequest::InlineText {
                    content: "Mitoz bölünme aşamaları".into(),
                },
                Some(PromptProfile::Detailed),
            )
            .await
            .expect("summary");
        assert_eq!(h.summarizer.last_request().profile, PromptProfile::Detailed);
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_without_fetching() {
        let h = harness(FetchReply::Body(b"PK\x03\x04 zip bytes"), vec![]);
        let error = h
            .pipeline
            .summarize(remote("application/zip"), None)
            .await
            .expect_err("unsupported");

        assert!(matches!(error, PipelineError::UnsupportedType(ref mime) if mime == "application/zip"));
        assert_eq!(error.status_code(), 415);
        assert_eq!(h.fetcher.fetch_count(), 0);
        assert_eq!(h.summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn download_failure_stops_before_extraction() {
        let h = harness(FetchReply::Status(StatusCode::NOT_FOUND), vec!["page"]);
        let error = h
            .pipeline
            .summarize(remote("application/pdf"), None)
            .await
            .expect_err("404");

        match &error {
            PipelineError::DownloadFailed(message) => assert!(message.contains("404")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.ocr.call_count(), 0);
        assert_eq!(h.summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn scanned_pdf_is_summarized_from_ocr_in_page_order() {
        let h = harness(
            FetchReply::Body(b"%PDF-1.4 scanned without text layer"),
            vec!["Sayfa bir: hücre", "Sayfa iki: doku", "Sayfa üç: organ"],
        );
        h.pipeline
            .summarize(remote("application/pdf"), None)
            .await
            .expect("summary");

        assert_eq!(h.ocr.call_count(), 3);
        assert_eq!(
            h.summarizer.last_request().source_text,
            "Sayfa bir: hücre\nSayfa iki: doku\nSayfa üç: organ"
        );
        assert_eq!(h.pipeline.metrics_snapshot().ocr_fallbacks, 1);
    }

    #[tokio::test]
    async fn ocr_yielding_too_little_text_is_too_short() {
        let h = harness(FetchReply::Body(b"%PDF-1.4 blank scan"), vec!["a", "b"]);
        let error = h
            .pipeline
            .summarize(remote("application/pdf"), None)
            .await
            .expect_err("too short");

        assert!(matches!(
            error,
            PipelineError::ExtractionTooShort {
                strategy: StrategyKind::Pdf,
                chars: 3
            }
        ));
        assert_eq!(error.status_code(), 400);
        assert_eq!(h.summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn too_short_check_applies_to_every_strategy() {
        let h = harness(FetchReply::Body(b"<html><body>  Az  </body></html>"), vec![]);
        let error = h
            .pipeline
            .summarize(remote("text/html"), None)
            .await
            .expect_err("too short");
        assert!(matches!(
            error,
            PipelineError::ExtractionTooShort {
                strategy: StrategyKind::Html,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn long_text_is_bounded_to_prefix() {
        let body = format!("{}SONU", "a".repeat(MAX_SOURCE_CHARS));
        let h = harness(FetchReply::Owned(body.into_bytes()), vec![]);
        h.pipeline
            .summarize(remote("text/plain"), None)
            .await
            .expect("summary");

        let source = h.summarizer.last_request().source_text;
        assert_eq!(source.chars().count(), MAX_SOURCE_CHARS);
        assert!(!source.contains("SONU"));
    }

    #[tokio::test]
    async fn text_within_bound_reaches_provider_unchanged() {
        let h = harness(
            FetchReply::Body(b"\n\n   Kisa ama yeterli bir not.\n"),
            vec![],
        );
        h.pipeline
            .summarize(remote("text/plain; charset=utf-8"), None)
            .await
            .expect("summary");
        assert_eq!(
            h.summarizer.last_request().source_text,
            "\n\n   Kisa ama yeterli bir not.\n"
        );
    }

    #[tokio::test]
    async fn leading_whitespace_is_part_of_the_bounded_prefix() {
        let body = format!("{}{}", " ".repeat(50), "a".repeat(MAX_SOURCE_CHARS));
        let expected: String = body.chars().take(MAX_SOURCE_CHARS).collect();
        let h = harness(FetchReply::Owned(body.into_bytes()), vec![]);
        h.pipeline
            .summarize(remote("text/plain"), None)
            .await
            .expect("summary");

        assert_eq!(h.summarizer.last_request().source_text, expected);
    }

    #[tokio::test]
    async fn short_inline_text_is_missing_input_even_without_resolution() {
        let h = harness(FetchReply::Body(b"unused"), vec![]);
        let error = h
            .pipeline
            .summarize(
                ExtractionRequest::InlineText {
                    content: "hi".into(),
                },
                None,
            )
            .await
            .expect_err("too short to summarize");

        assert!(matches!(error, PipelineError::MissingInput));
        assert_eq!(h.summarizer.call_count(), 0);
        assert_eq!(h.fetcher.fetch_count(), 0);
        let snapshot = h.pipeline.metrics_snapshot();
        assert_eq!(snapshot.client_errors, 1);
        assert_eq!(snapshot.summaries, 0);
    }

    #[test]
    fn rejected_requests_are_counted() {
        let h = harness(FetchReply::Body(b"unused"), vec![]);
        SummarizeApi::record_rejected(&h.pipeline, &PipelineError::MissingInput);

        let snapshot = h.pipeline.metrics_snapshot();
        assert_eq!(snapshot.requests, 1);
        assert_eq!(snapshot.client_errors, 1);
    }

    #[tokio::test]
    async fn provider_failure_is_propagated_with_its_message() {
        let h = harness_with(
            FetchReply::Body(b"unused"),
            vec![],
            RecordingSummarizer {
                fail_with: Some("quota exhausted"),
                ..Default::default()
            },
        );
        let error = h
            .pipeline
            .summarize(
                ExtractionRequest::InlineText {
                    content: "Ders notu: fotosentez".into(),
                },
                None,
            )
            .await
            .expect_err("provider failure");

        match &error {
            PipelineError::SummarizationFailed(message) => {
                assert!(message.contains("quota exhausted"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let snapshot = h.pipeline.metrics_snapshot();
        assert_eq!(snapshot.requests, 1);
        assert_eq!(snapshot.server_errors, 1);
        assert_eq!(snapshot.summaries, 0);
    }
}
