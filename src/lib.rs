//! lib target
//!
//! Benchmarks graph embeddings on link prediction and node classification.
//! Embeddings are produced by an external program (see [embedding::EmbedderT]),
//! the crate splits graphs and labels, samples negative edges, trains logistic regressions on
//! embedded vectors and reports classification metrics.

pub mod error;

pub mod graph;

pub mod embedding;

pub mod io;

pub mod classifier;

pub mod validation;

pub mod config;

pub mod tools;

pub mod prelude;
