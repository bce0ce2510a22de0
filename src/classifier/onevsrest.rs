//! One logistic regression per label.

use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classifier::logistic::{LogisticParams, LogisticRegression};
use crate::classifier::{BinaryClassifier, MultiLabelClassifier};
use crate::error::BenchError;

/// A label whose training column is constant cannot be fitted by a logistic regression,
/// its probability is the constant value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LabelEstimator {
    Logistic(LogisticRegression),
    Constant(f64),
}

impl LabelEstimator {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, BenchError> {
        match self {
            LabelEstimator::Logistic(clf) => clf.predict_proba(x),
            LabelEstimator::Constant(value) => Ok(Array1::from_elem(x.nrows(), *value)),
        }
    }
} // end of impl LabelEstimator

/// One vs rest multi label classifier with a logistic regression for each label.
/// Labels are fitted independently, in parallel if asked for, results do not depend on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OneVsRestLogistic {
    params: LogisticParams,
    parallel: bool,
    estimators: Vec<LabelEstimator>,
} // end of OneVsRestLogistic

impl OneVsRestLogistic {
    pub fn new(params: LogisticParams, parallel: bool) -> Self {
        OneVsRestLogistic {
            params,
            parallel,
            estimators: Vec::new(),
        }
    }

    pub fn get_estimators(&self) -> &[LabelEstimator] {
        &self.estimators
    }

    pub fn get_nb_labels(&self) -> usize {
        self.estimators.len()
    }

    fn fit_label(params: LogisticParams, x: &Array2<f64>, y: &Array2<u8>, label: usize) -> Result<LabelEstimator, BenchError> {
        let column = y.column(label).to_owned();
        let nb_pos = column.iter().filter(|v| **v != 0).count();
        if nb_pos == 0 || nb_pos == column.len() {
            let value = if nb_pos == 0 { 0. } else { 1. };
            log::warn!(
                "label column {} is constant ({}) in all training examples, using a constant predictor",
                label,
                value
            );
            return Ok(LabelEstimator::Constant(value));
        }
        let mut clf = LogisticRegression::new(params);
        clf.fit(x, &column)?;
        if !clf.is_converged() {
            log::warn!("logistic regression of label column {} did not converge", label);
        }
        Ok(LabelEstimator::Logistic(clf))
    } // end of fit_label
} // end of impl OneVsRestLogistic

impl MultiLabelClassifier for OneVsRestLogistic {
    fn fit(&mut self, x: &Array2<f64>, y: &Array2<u8>) -> Result<(), BenchError> {
        if x.nrows() != y.nrows() {
            return Err(BenchError::Classifier(format!(
                "one vs rest fit with {} rows and {} label rows",
                x.nrows(),
                y.nrows()
            )));
        }
        let nb_labels = y.ncols();
        log::debug!("one vs rest fit, {} labels, parallel : {}", nb_labels, self.parallel);
        let params = self.params;
        self.estimators = if self.parallel {
            (0..nb_labels)
                .into_par_iter()
                .map(|label| Self::fit_label(params, x, y, label))
                .collect::<Result<Vec<LabelEstimator>, BenchError>>()?
        } else {
            (0..nb_labels)
                .map(|label| Self::fit_label(params, x, y, label))
                .collect::<Result<Vec<LabelEstimator>, BenchError>>()?
        };
        Ok(())
    } // end of fit

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, BenchError> {
        if self.estimators.is_empty() {
            return Err(BenchError::Classifier("one vs rest used before fit".to_string()));
        }
        let mut proba = Array2::<f64>::zeros((x.nrows(), self.estimators.len()));
        for (label, estimator) in self.estimators.iter().enumerate() {
            proba.column_mut(label).assign(&estimator.predict_proba(x)?);
        }
        Ok(proba)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array2<u8>, BenchError> {
        Ok(self.predict_proba(x)?.mapv(|p| if p > 0.5 { 1 } else { 0 }))
    }
} // end of impl MultiLabelClassifier for OneVsRestLogistic

/// sums of rows, useful to get the number of labels of each sample in an indicator matrix
pub fn label_counts(y: &Array2<u8>) -> Array1<usize> {
    y.map(|v| *v as usize).sum_axis(Axis(1))
}

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_one_vs_rest_constant_label() {
        log_init_test();
        let x = array![[-2., 0.], [-1., 0.5], [1., -0.5], [2., 0.]];
        // label 0 follows sign of first coordinate, label 1 always present
        let y = array![[0u8, 1], [0, 1], [1, 1], [1, 1]];
        let mut clf = OneVsRestLogistic::new(LogisticParams::default(), false);
        clf.fit(&x, &y).unwrap();
        assert!(matches!(clf.get_estimators()[1], LabelEstimator::Constant(v) if v == 1.));
        assert_eq!(clf.predict(&x).unwrap(), y);
        assert_eq!(label_counts(&y), array![1usize, 1, 2, 2]);
    }

    #[test]
    fn test_parallel_same_result() {
        log_init_test();
        let x = array![[0.1, 1.], [0.4, -0.3], [0.8, 0.2], [-0.5, 0.7], [0.3, 0.3], [-0.2, -0.9]];
        let y = array![[1u8, 0, 0], [0, 1, 0], [1, 0, 1], [0, 1, 1], [0, 0, 1], [1, 1, 0]];
        let mut seq = OneVsRestLogistic::new(LogisticParams::default(), false);
        seq.fit(&x, &y).unwrap();
        let mut par = OneVsRestLogistic::new(LogisticParams::default(), true);
        par.fit(&x, &y).unwrap();
        assert_eq!(seq.predict_proba(&x).unwrap(), par.predict_proba(&x).unwrap());
    }
} // end of mod tests
