//! Request and error types for the summarization pipeline.

use crate::extraction::StrategyKind;
use crate::fetch::FetchError;
use crate::processing::normalize::{has_usable_inline_text, sanitize_string};
use crate::summarization::SummarizationClientError;
use thiserror::Error;

/// What to summarize: text supplied by the caller, or a file that must be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionRequest {
    /// Text already available, such as the body of a shared note.
    InlineText {
        /// Note body.
        content: String,
    },
    /// A remotely stored file described by its URL and declared MIME type.
    RemoteFile {
        /// Download URL of the file.
        url: String,
        /// MIME type recorded when the file was uploaded.
        declared_mime_type: String,
    },
}

impl ExtractionRequest {
    /// Build a request from loosely populated inputs.
    ///
    /// Inline text wins only when it is long enough to summarize; otherwise both a URL and a
    /// MIME type are required.
    pub fn resolve(
        inline_text: Option<String>,
        url: Option<String>,
        declared_mime_type: Option<String>,
    ) -> Result<Self, PipelineError> {
        if let Some(content) = inline_text.filter(|text| has_usable_inline_text(text)) {
            return Ok(Self::InlineText { content });
        }

        match (sanitize_string(url), sanitize_string(declared_mime_type)) {
            (Some(url), Some(declared_mime_type)) => Ok(Self::RemoteFile {
                url,
                declared_mime_type,
            }),
            _ => Err(PipelineError::MissingInput),
        }
    }

    /// Short label for logs.
    pub fn source_label(&self) -> &'static str {
        match self {
            Self::InlineText { .. } => "inline",
            Self::RemoteFile { .. } => "file",
        }
    }
}

/// Every way a pipeline run can fail.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither usable inline text nor a complete file reference was supplied.
    #[error("no usable inline text and no complete file reference")]
    MissingInput,
    /// The referenced file could not be downloaded.
    #[error("download failed: {0}")]
    DownloadFailed(String),
    /// The declared MIME type has no extraction strategy.
    #[error("unsupported MIME type: {0}")]
    UnsupportedType(String),
    /// Extraction finished but produced too little text.
    #[error("{strategy} extraction produced {chars} characters")]
    ExtractionTooShort {
        /// Strategy that ran.
        strategy: StrategyKind,
        /// Trimmed character count it produced.
        chars: usize,
    },
    /// The summarization provider failed.
    #[error("summarization failed: {0}")]
    SummarizationFailed(String),
    /// Anything unexpected, including a panicked pipeline task.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// HTTP status the error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingInput | Self::ExtractionTooShort { .. } => 400,
            Self::UnsupportedType(_) => 415,
            Self::DownloadFailed(_) | Self::SummarizationFailed(_) | Self::Internal(_) => 500,
        }
    }

    /// Message shown to end users; server-side failures keep their cause for diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput => "İçerik veya dosya eksik.".into(),
            Self::UnsupportedType(_) => "Desteklenmeyen dosya türü.".into(),
            Self::ExtractionTooShort { .. } => "Metin çıkarılamadı veya çok kısa.".into(),
            Self::DownloadFailed(cause) => format!("Dosya indirilemedi: {cause}"),
            Self::SummarizationFailed(cause) => format!("Özet oluşturulamadı: {cause}"),
            Self::Internal(cause) => format!("Sunucu hatası: {cause}"),
        }
    }

    /// Stable error kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::DownloadFailed(_) => "download_failed",
            Self::UnsupportedType(_) => "unsupported_type",
            Self::ExtractionTooShort { .. } => "extraction_too_short",
            Self::SummarizationFailed(_) => "summarization_failed",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(error: FetchError) -> Self {
        Self::DownloadFailed(error.to_string())
    }
}

impl From<SummarizationClientError> for PipelineError {
    fn from(error: SummarizationClientError) -> Self {
        Self::SummarizationFailed(error.to_string())
    }
}

/// Errors raised while wiring the pipeline at startup.
#[derive(Debug, Error)]
pub enum InitError {
    /// The download client could not be built.
    #[error("failed to build file fetcher: {0}")]
    Fetcher(#[from] FetchError),
    /// The summarization client could not be built.
    #[error("failed to build summarization client: {0}")]
    Summarizer(#[from] SummarizationClientError),
}
