//! Errors of the evaluation core.
//!
//! All variants are fatal to the evaluation call that produced them: no metric is returned
//! and nothing is retried. Collaborator code (file readers, the binary) works with `anyhow`
//! and converts these with `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// a node used in an edge or a label assignment has no vector in the embedding table
    #[error("node {0} has no embedding")]
    MissingEmbedding(String),

    /// more negative edges requested than there are non edges in the reference graph
    #[error("cannot sample {requested} negative edges, only {available} node pairs are not edges")]
    InfeasibleSample { requested: usize, available: usize },

    /// rejection sampling did not collect enough pairs before its iteration cap
    #[error("negative sampling stopped after {nb_try} draws with {accepted} of {requested} pairs accepted")]
    SamplingCapExceeded {
        requested: usize,
        accepted: usize,
        nb_try: usize,
    },

    #[error("invalid task configuration: {0}")]
    InvalidTaskConfiguration(String),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("metric undefined: {0}")]
    Metric(String),

    #[error("embedding dimension mismatch, expected {expected} got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// persisted model with unexpected version or kind
    #[error("model file format error: {0}")]
    ModelFormat(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bson serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),

    #[error("bson deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
} // end of BenchError
