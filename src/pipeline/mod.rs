//! End-to-end counting pipeline.
//!
//! The orchestrator wires the pieces together:
//!
//! 1. [`config`]: validate paths and parameters before touching the filesystem
//! 2. [`channel`]: create one named pipe per aligner worker
//! 3. [`orchestrator`]: attach one aggregating reader per pipe, then run the aligner
//! 4. [`aligner`]: the external aligner client (pblat by default)
//! 5. [`report`]: join merged tallies with reference statistics and write the table
//!
//! Readers must be attached before the aligner starts: opening a pipe for
//! writing blocks until a reader is present.

use std::path::PathBuf;

use thiserror::Error;

use crate::parsing::pslx::ParseError;

pub mod aligner;
pub mod channel;
pub mod config;
pub mod orchestrator;
pub mod report;

pub use aligner::{Aligner, AlignmentRequest, PblatAligner};
pub use config::{AlignerParams, PipelineConfig};
pub use orchestrator::{aggregate_files, Orchestrator, PipelineOutput};
pub use report::{Report, ReportFormat, ReportRow};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to create channel {path}: {source}")]
    ChannelCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Aligner failed: {0}")]
    Aligner(String),

    #[error("Worker {index} failed: {source}")]
    Worker {
        index: usize,
        #[source]
        source: ParseError,
    },

    #[error("Thread '{0}' panicked")]
    ThreadPanicked(String),

    #[error("Timed out after {0:?} waiting for workers")]
    Timeout(std::time::Duration),

    #[error("Failed to load reference: {0}")]
    Reference(#[source] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
