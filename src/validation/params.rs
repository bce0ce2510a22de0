//! Validation parameters

use std::path::{Path, PathBuf};

use crate::classifier::logistic::LogisticParams;
use crate::error::BenchError;

/// default fraction of edges (or labeled nodes) held out for testing
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// default location of the node classifier dumped after each node classification evaluation
pub const DEFAULT_NODE_MODEL_OUTPUT: &str = "node_classifier.bson";

// a ratio must be strictly between 0 and 1
pub(crate) fn check_ratio(ratio: f64) -> Result<(), BenchError> {
    if !(ratio > 0. && ratio < 1.) {
        log::error!("test ratio {} not in ]0,1[", ratio);
        return Err(BenchError::InvalidTaskConfiguration(format!(
            "test ratio must be in ]0,1[, got {}",
            ratio
        )));
    }
    Ok(())
}

/// Describes how edges are split between the train graph and the held out positive edges.
#[derive(Copy, Clone, Debug)]
pub struct SplitParams {
    /// The fraction of edges to delete when constructing the train graph
    test_ratio: f64,
    /// seed of the random generator
    seed: u64,
} // end of SplitParams

impl SplitParams {
    pub fn new(test_ratio: f64, seed: u64) -> Self {
        SplitParams { test_ratio, seed }
    }

    /// fraction of edges to hold out
    pub fn get_test_ratio(&self) -> f64 {
        self.test_ratio
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }
} // end of impl SplitParams

impl Default for SplitParams {
    fn default() -> Self {
        SplitParams {
            test_ratio: DEFAULT_TEST_RATIO,
            seed: 0,
        }
    }
}

/// Parameters of a link prediction evaluation.
/// The seed drives negative sampling; the logistic solver is deterministic.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinkPredictionParams {
    seed: u64,
    logistic: LogisticParams,
} // end of LinkPredictionParams

impl LinkPredictionParams {
    pub fn new(seed: u64, logistic: LogisticParams) -> Self {
        LinkPredictionParams { seed, logistic }
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    pub fn get_logistic_params(&self) -> &LogisticParams {
        &self.logistic
    }
} // end of impl LinkPredictionParams

/// Parameters of a node classification evaluation.
#[derive(Clone, Debug)]
pub struct NodeClassificationParams {
    /// fraction of labeled nodes in the test set
    test_ratio: f64,
    ///
    seed: u64,
    ///
    logistic: LogisticParams,
    /// where the fitted one vs rest model is dumped
    model_output: PathBuf,
    /// fit labels in parallel
    parallel: bool,
} // end of NodeClassificationParams

impl NodeClassificationParams {
    pub fn new(test_ratio: f64, seed: u64, logistic: LogisticParams, model_output: PathBuf, parallel: bool) -> Self {
        NodeClassificationParams {
            test_ratio,
            seed,
            logistic,
            model_output,
            parallel,
        }
    }

    pub fn get_test_ratio(&self) -> f64 {
        self.test_ratio
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    pub fn get_logistic_params(&self) -> &LogisticParams {
        &self.logistic
    }

    pub fn get_model_output(&self) -> &Path {
        &self.model_output
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// returns a copy with another model output path
    pub fn with_model_output(&self, model_output: PathBuf) -> Self {
        NodeClassificationParams {
            model_output,
            ..self.clone()
        }
    }
} // end of impl NodeClassificationParams

impl Default for NodeClassificationParams {
    fn default() -> Self {
        NodeClassificationParams {
            test_ratio: DEFAULT_TEST_RATIO,
            seed: 0,
            logistic: LogisticParams::default(),
            model_output: PathBuf::from(DEFAULT_NODE_MODEL_OUTPUT),
            parallel: false,
        }
    }
}

// end of mod tests
