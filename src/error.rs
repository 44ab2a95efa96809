//! Typed pipeline error taxonomy (spec §7).
//!
//! Every library entry point returns [`PipelineError`]. The binary converts
//! these into nonzero exits with the typed message (`anyhow` at the edge);
//! no fabricated or empty answers. Modeled on the teacher's hand-written
//! enum (`Display` + `std::error::Error`, no macro crate).

/// The single error type returned by every Farm Advisor library operation.
#[derive(Debug)]
pub enum PipelineError {
    /// Missing corpus dir, empty corpus, missing/unreadable index artifact,
    /// missing `GOOGLE_API_KEY`, or otherwise invalid configuration.
    Configuration(String),
    /// An embedding or generation call failed after any retries.
    Service(String),
    /// A single source file could not be loaded; logged and skipped during
    /// the corpus walk rather than aborting it.
    PartialLoad { file: String, reason: String },
    /// Embedding dimensionality conflicts with the index it is used against.
    RetrievalMismatch {
        index_dims: usize,
        query_dims: usize,
    },
    /// SQLite failure reading or writing the index artifact.
    Storage(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            PipelineError::Service(msg) => write!(f, "service error: {}", msg),
            PipelineError::PartialLoad { file, reason } => {
                write!(f, "failed to load {}: {}", file, reason)
            }
            PipelineError::RetrievalMismatch {
                index_dims,
                query_dims,
            } => write!(
                f,
                "embedding dimensionality mismatch: index has {} dims, query has {} dims",
                index_dims, query_dims
            ),
            PipelineError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        PipelineError::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Service(e.to_string())
    }
}
