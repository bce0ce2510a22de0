//! Classifiers trained on embedded vectors.
//!
//! - [logistic::LogisticRegression] for binary link prediction
//! - [onevsrest::OneVsRestLogistic] one logistic regression per label for multi label node classification
//! - [binarizer::MultiLabelBinarizer] maps label sets to indicator rows

use ndarray::{Array1, Array2};

use crate::error::BenchError;

pub mod binarizer;

pub mod logistic;

pub mod onevsrest;

/// A classifier for labels in {0,1}. Rows of x are samples.
pub trait BinaryClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), BenchError>;
    /// probability of label 1 for each row
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, BenchError>;
    /// thresholded prediction
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, BenchError>;
} // end of trait BinaryClassifier

/// A classifier whose target is an indicator matrix (nb samples, nb labels).
pub trait MultiLabelClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array2<u8>) -> Result<(), BenchError>;
    /// probability of each label for each row
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, BenchError>;
    /// each label thresholded independently
    fn predict(&self, x: &Array2<f64>) -> Result<Array2<u8>, BenchError>;
} // end of trait MultiLabelClassifier
