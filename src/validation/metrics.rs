//! Classification metrics.
//!
//! Binary metrics take labels in {0,1}, multi label metrics take indicator matrices (nb samples, nb labels).

use ndarray::{Array1, Array2, Axis};

use crate::error::BenchError;

/// counts of a binary confusion matrix
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BinaryConfusion {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
} // end of BinaryConfusion

impl BinaryConfusion {
    /// accumulates (true, predicted) couples, non zero is positive
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a u8, &'a u8)>,
    {
        let mut confusion = BinaryConfusion::default();
        for (truth, pred) in pairs {
            match (*truth != 0, *pred != 0) {
                (true, true) => confusion.tp += 1,
                (false, true) => confusion.fp += 1,
                (false, false) => confusion.tn += 1,
                (true, false) => confusion.fn_ += 1,
            }
        }
        confusion
    }

    pub fn get_nb_samples(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// 0 if there is no true and no predicted positive
    pub fn f1(&self) -> f64 {
        let denom = 2 * self.tp + self.fp + self.fn_;
        if denom == 0 {
            0.
        } else {
            (2 * self.tp) as f64 / denom as f64
        }
    }

    #[cfg_attr(doc, katexit::katexit)]
    /// Matthews correlation coefficient
    /// $$ \frac{tp \cdot tn - fp \cdot fn}{\sqrt{(tp+fp)(tp+fn)(tn+fp)(tn+fn)}} $$
    /// 0 when one of the sums is 0.
    pub fn mcc(&self) -> f64 {
        let (tp, fp, tn, fn_) = (self.tp as f64, self.fp as f64, self.tn as f64, self.fn_ as f64);
        let denom = (tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_);
        if denom == 0. {
            0.
        } else {
            (tp * tn - fp * fn_) / denom.sqrt()
        }
    }
} // end of impl BinaryConfusion

fn check_lengths(nb_true: usize, nb_other: usize) -> Result<(), BenchError> {
    if nb_true != nb_other {
        return Err(BenchError::Metric(format!(
            "{} true labels and {} predictions",
            nb_true, nb_other
        )));
    }
    if nb_true == 0 {
        return Err(BenchError::Metric("no sample".to_string()));
    }
    Ok(())
}

// counts positives, errors if one class is absent
fn count_classes(y_true: &Array1<u8>, metric: &str) -> Result<(usize, usize), BenchError> {
    let nb_pos = y_true.iter().filter(|l| **l != 0).count();
    let nb_neg = y_true.len() - nb_pos;
    if nb_pos == 0 || nb_neg == 0 {
        log::error!("{} needs both classes in true labels, got {} positive, {} negative", metric, nb_pos, nb_neg);
        return Err(BenchError::Metric(format!("{} with only one class in true labels", metric)));
    }
    Ok((nb_pos, nb_neg))
}

/// Area under ROC curve, computed as the Mann-Whitney statistic with ties given their average rank.
pub fn roc_auc(y_true: &Array1<u8>, scores: &Array1<f64>) -> Result<f64, BenchError> {
    check_lengths(y_true.len(), scores.len())?;
    let (nb_pos, nb_neg) = count_classes(y_true, "roc auc")?;
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));
    // sum of ranks (starting at 1) of positives
    let mut rank_sum = 0.;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // ranks i+1..=j+1 share their mean
        let mean_rank = (i + j + 2) as f64 / 2.;
        let nb_pos_tied = order[i..=j].iter().filter(|k| y_true[**k] != 0).count();
        rank_sum += mean_rank * nb_pos_tied as f64;
        i = j + 1;
    }
    let u = rank_sum - (nb_pos * (nb_pos + 1)) as f64 / 2.;
    Ok(u / (nb_pos as f64 * nb_neg as f64))
} // end of roc_auc

#[cfg_attr(doc, katexit::katexit)]
/// Average precision (area under the precision recall curve) :
/// $$ AP = \sum_n (R_n - R_{n-1}) P_n $$
/// where $P_n$ and $R_n$ are precision and recall at the n-th threshold, thresholds being the distinct scores
/// in decreasing order.
pub fn average_precision(y_true: &Array1<u8>, scores: &Array1<f64>) -> Result<f64, BenchError> {
    check_lengths(y_true.len(), scores.len())?;
    let nb_pos = y_true.iter().filter(|l| **l != 0).count();
    if nb_pos == 0 {
        log::error!("average precision with no positive sample");
        return Err(BenchError::Metric("average precision with no positive sample".to_string()));
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    let mut ap = 0.;
    let mut tp = 0usize;
    let mut nb_selected = 0usize;
    let mut last_recall = 0.;
    let mut i = 0;
    while i < order.len() {
        // take all samples with same score
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if y_true[order[i]] != 0 {
                tp += 1;
            }
            nb_selected += 1;
            i += 1;
        }
        let recall = tp as f64 / nb_pos as f64;
        let precision = tp as f64 / nb_selected as f64;
        ap += (recall - last_recall) * precision;
        last_recall = recall;
    }
    Ok(ap)
} // end of average_precision

/// fraction of exact predictions
pub fn accuracy(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> Result<f64, BenchError> {
    check_lengths(y_true.len(), y_pred.len())?;
    let nb_ok = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    Ok(nb_ok as f64 / y_true.len() as f64)
}

/// f1 of positive class, 0 if undefined
pub fn f1_score(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> Result<f64, BenchError> {
    check_lengths(y_true.len(), y_pred.len())?;
    Ok(BinaryConfusion::from_pairs(y_true.iter().zip(y_pred.iter())).f1())
}

/// Matthews correlation coefficient, 0 if undefined
pub fn matthews_corrcoef(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> Result<f64, BenchError> {
    check_lengths(y_true.len(), y_pred.len())?;
    Ok(BinaryConfusion::from_pairs(y_true.iter().zip(y_pred.iter())).mcc())
}

//========================================================================================
// multi label

fn check_shapes(y_true: &Array2<u8>, y_pred: &Array2<u8>) -> Result<(), BenchError> {
    if y_true.dim() != y_pred.dim() {
        return Err(BenchError::Metric(format!(
            "indicator matrices of shapes {:?} and {:?}",
            y_true.dim(),
            y_pred.dim()
        )));
    }
    if y_true.nrows() == 0 {
        return Err(BenchError::Metric("no sample".to_string()));
    }
    Ok(())
}

/// fraction of samples whose predicted label set is exactly the true one
pub fn subset_accuracy(y_true: &Array2<u8>, y_pred: &Array2<u8>) -> Result<f64, BenchError> {
    check_shapes(y_true, y_pred)?;
    let nb_ok = y_true
        .outer_iter()
        .zip(y_pred.outer_iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(nb_ok as f64 / y_true.nrows() as f64)
}

/// f1 on counts pooled over all (sample, label) cells
pub fn micro_f1(y_true: &Array2<u8>, y_pred: &Array2<u8>) -> Result<f64, BenchError> {
    check_shapes(y_true, y_pred)?;
    Ok(BinaryConfusion::from_pairs(y_true.iter().zip(y_pred.iter())).f1())
}

/// unweighted mean over labels of per label f1. A label with no true and no predicted sample counts as 0.
pub fn macro_f1(y_true: &Array2<u8>, y_pred: &Array2<u8>) -> Result<f64, BenchError> {
    check_shapes(y_true, y_pred)?;
    let nb_labels = y_true.ncols();
    if nb_labels == 0 {
        return Ok(0.);
    }
    let sum: f64 = y_true
        .axis_iter(Axis(1))
        .zip(y_pred.axis_iter(Axis(1)))
        .map(|(t, p)| BinaryConfusion::from_pairs(t.iter().zip(p.iter())).f1())
        .sum();
    Ok(sum / nb_labels as f64)
}

/// Matthews correlation coefficient of the flattened indicator matrices
pub fn multilabel_mcc(y_true: &Array2<u8>, y_pred: &Array2<u8>) -> Result<f64, BenchError> {
    check_shapes(y_true, y_pred)?;
    Ok(BinaryConfusion::from_pairs(y_true.iter().zip(y_pred.iter())).mcc())
}

// end of mod tests
