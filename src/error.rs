use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A step of the retrieval-generation pipeline, recorded on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Segmenting,
    Embedding,
    Indexed,
    Retrieving,
    Generating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Segmenting => "segmenting",
            Stage::Embedding => "embedding",
            Stage::Indexed => "indexing",
            Stage::Retrieving => "retrieving",
            Stage::Generating => "generating",
        };
        f.write_str(name)
    }
}

/// The input file could not be turned into page text
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a PDF document (detected {mime_type})", path.display())]
    NotPdf { path: PathBuf, mime_type: String },

    #[error("failed to extract text from PDF {}: {reason}", path.display())]
    InvalidPdf { path: PathBuf, reason: String },
}

/// An embedding or language model call failed
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed: {status} {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("no response generated")]
    EmptyResponse,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("search on an empty vector index")]
    Empty,

    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("overlap {overlap} must be smaller than chunk size {chunk_size}")]
    OverlapTooLarge { chunk_size: usize, overlap: usize },
}

/// Failure of one pipeline invocation, tagged with the stage that failed
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("{stage} failed: {source}")]
    Provider {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    #[error("{stage} failed: {source}")]
    Index {
        stage: Stage,
        #[source]
        source: IndexError,
    },

    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },
}

impl GenerationError {
    pub fn stage(&self) -> Stage {
        match self {
            GenerationError::Load(_) => Stage::Loading,
            GenerationError::Provider { stage, .. }
            | GenerationError::Index { stage, .. }
            | GenerationError::Timeout { stage, .. } => *stage,
        }
    }
}
