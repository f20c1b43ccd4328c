//! Summarization pipeline: request resolution, orchestration, and error taxonomy.

pub mod normalize;
mod service;
pub mod types;

pub use service::{SummarizeApi, SummaryPipeline};
pub use types::{ExtractionRequest, InitError, PipelineError};
