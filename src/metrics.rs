//! Process-wide counters for summarization activity.

use crate::processing::PipelineError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity since startup.
#[derive(Default)]
pub struct PipelineMetrics {
    requests: AtomicU64,
    summaries: AtomicU64,
    inline_sources: AtomicU64,
    file_sources: AtomicU64,
    ocr_fallbacks: AtomicU64,
    fallback_summaries: AtomicU64,
    client_errors: AtomicU64,
    unsupported_types: AtomicU64,
    server_errors: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a pipeline run.
    pub fn record_request(&self, from_file: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if from_file {
            self.file_sources.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inline_sources.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record that OCR had to stand in for structural extraction.
    pub fn record_ocr_fallback(&self) {
        self.ocr_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful summary; `used_fallback` marks the provider placeholder text.
    pub fn record_summary(&self, used_fallback: bool) {
        self.summaries.fetch_add(1, Ordering::Relaxed);
        if used_fallback {
            self.fallback_summaries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a failed run, bucketed by the HTTP class it maps to.
    pub fn record_failure(&self, error: &PipelineError) {
        let counter = match error.status_code() {
            415 => &self.unsupported_types,
            code if code < 500 => &self.client_errors,
            _ => &self.server_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that failed validation before a pipeline run started.
    pub fn record_rejected(&self, error: &PipelineError) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.record_failure(error);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            summaries: self.summaries.load(Ordering::Relaxed),
            inline_sources: self.inline_sources.load(Ordering::Relaxed),
            file_sources: self.file_sources.load(Ordering::Relaxed),
            ocr_fallbacks: self.ocr_fallbacks.load(Ordering::Relaxed),
            fallback_summaries: self.fallback_summaries.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            unsupported_types: self.unsupported_types.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Pipeline runs started.
    pub requests: u64,
    /// Runs that returned a summary.
    pub summaries: u64,
    /// Runs that summarized inline text.
    pub inline_sources: u64,
    /// Runs that went through fetch and extraction.
    pub file_sources: u64,
    /// PDF runs where the text layer was insufficient and OCR was used.
    pub ocr_fallbacks: u64,
    /// Summaries replaced by the placeholder because the provider response lacked content.
    pub fallback_summaries: u64,
    /// Runs rejected for missing input or too little extracted text.
    pub client_errors: u64,
    /// Runs rejected for an unsupported declared MIME type.
    pub unsupported_types: u64,
    /// Runs that failed on download, provider, or internal errors.
    pub server_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_sources_and_summaries() {
        let metrics = PipelineMetrics::new();
        metrics.record_request(false);
        metrics.record_request(true);
        metrics.record_summary(false);
        metrics.record_summary(true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.inline_sources, 1);
        assert_eq!(snapshot.file_sources, 1);
        assert_eq!(snapshot.summaries, 2);
        assert_eq!(snapshot.fallback_summaries, 1);
    }

    #[test]
    fn failures_are_bucketed_by_status_class() {
        let metrics = PipelineMetrics::new();
        metrics.record_failure(&PipelineError::MissingInput);
        metrics.record_failure(&PipelineError::UnsupportedType("application/zip".into()));
        metrics.record_failure(&PipelineError::DownloadFailed("HTTP 404".into()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.client_errors, 1);
        assert_eq!(snapshot.unsupported_types, 1);
        assert_eq!(snapshot.server_errors, 1);
    }

    #[test]
    fn rejected_requests_count_as_requests_and_client_errors() {
        let metrics = PipelineMetrics::new();
        metrics.record_rejected(&PipelineError::MissingInput);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 1);
        assert_eq!(snapshot.client_errors, 1);
        assert_eq!(snapshot.inline_sources + snapshot.file_sources, 0);
    }

    #[test]
    fn snapshot_starts_empty() {
        assert_eq!(PipelineMetrics::new().snapshot(), MetricsSnapshot::default());
    }
}
