#![deny(missing_docs)]

//! Core library for the Dropnotes summarizer: text extraction from shared notes and files,
//! OCR fallback, and LLM summaries.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// MIME classification and per-format text extraction.
pub mod extraction;
/// Remote file download.
pub mod fetch;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline metrics helpers.
pub mod metrics;
/// OCR engine and PDF page rendering.
pub mod ocr;
/// Summarization pipeline orchestration.
pub mod processing;
/// Chat-completion summarization client.
pub mod summarization;
