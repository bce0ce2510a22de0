//! Node classification evaluation of an embedding.
//!
//! Labeled nodes are split in train and test sets, a one vs rest logistic regression is trained
//! on the vectors of train nodes and scored on test nodes.
//!
//! **The predicted label sets use an oracle on label cardinality**: for each test node the number
//! of labels to predict is taken from its true label set, and the labels of highest probability are selected.
//! This is an evaluation artifact kept for comparability with published benchmark figures,
//! not a classification strategy usable on unlabeled nodes.

use std::collections::BTreeMap;

use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::classifier::binarizer::MultiLabelBinarizer;
use crate::classifier::onevsrest::{label_counts, OneVsRestLogistic};
use crate::classifier::MultiLabelClassifier;
use crate::embedding::EmbeddingTable;
use crate::error::BenchError;
use crate::graph::NodeId;
use crate::io::model::dump_model;
use crate::validation::features::node_features;
use crate::validation::metrics::{macro_f1, micro_f1, multilabel_mcc, subset_accuracy};
use crate::validation::params::{check_ratio, NodeClassificationParams};

/// Nodes and their label sets, labels\[i\] are the labels of nodes\[i\]
#[derive(Clone, Debug)]
pub struct NodeLabels {
    nodes: Vec<NodeId>,
    labels: Vec<Vec<String>>,
} // end of NodeLabels

impl NodeLabels {
    pub fn new(nodes: Vec<NodeId>, labels: Vec<Vec<String>>) -> Result<Self, BenchError> {
        if nodes.len() != labels.len() {
            log::error!("{} nodes and {} label sets", nodes.len(), labels.len());
            return Err(BenchError::InvalidTaskConfiguration(format!(
                "{} nodes and {} label sets",
                nodes.len(),
                labels.len()
            )));
        }
        Ok(NodeLabels { nodes, labels })
    }

    pub fn get_nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn get_labels(&self) -> &[Vec<String>] {
        &self.labels
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.nodes.len()
    }
} // end of impl NodeLabels

/// indexes (in [NodeLabels]) of train and test nodes
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles nb_nodes indexes, the first floor((1 - test_ratio) * nb_nodes) are the train set, the others the test set.
pub fn split_labeled_nodes(nb_nodes: usize, test_ratio: f64, seed: u64) -> Result<NodeSplit, BenchError> {
    check_ratio(test_ratio)?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut indexes: Vec<usize> = (0..nb_nodes).collect();
    indexes.shuffle(&mut rng);
    let train_size = ((1. - test_ratio) * nb_nodes as f64).floor() as usize;
    let test = indexes.split_off(train_size);
    log::debug!("node split, train size : {}, test size : {}", indexes.len(), test.len());
    Ok(NodeSplit { train: indexes, test })
}

/// For each row, sets to 1 the k labels of highest probability, k being the number of labels in the same row of y_true.
/// Among equal probabilities the label of higher column comes first.
pub fn oracle_predictions(y_true: &Array2<u8>, proba: &Array2<f64>) -> Result<Array2<u8>, BenchError> {
    if y_true.dim() != proba.dim() {
        return Err(BenchError::Classifier(format!(
            "probabilities of shape {:?} for labels of shape {:?}",
            proba.dim(),
            y_true.dim()
        )));
    }
    let counts = label_counts(y_true);
    let mut y_pred = Array2::<u8>::zeros(y_true.dim());
    for (i, row) in proba.axis_iter(Axis(0)).enumerate() {
        let mut order: Vec<usize> = (0..row.len()).collect();
        // ascending stable sort then reversal
        order.sort_by(|a, b| row[*a].total_cmp(&row[*b]));
        order.reverse();
        for j in order.into_iter().take(counts[i]) {
            y_pred[[i, j]] = 1;
        }
    }
    Ok(y_pred)
} // end of oracle_predictions

/// Node classification scores
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeClassificationMetrics {
    pub accuracy: f64,
    pub mcc: f64,
    pub micro_f1: f64,
    pub macro_f1: f64,
} // end of NodeClassificationMetrics

impl NodeClassificationMetrics {
    /// (accuracy, mcc, micro_f1, macro_f1)
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        (self.accuracy, self.mcc, self.micro_f1, self.macro_f1)
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("accuracy".to_string(), self.accuracy),
            ("mcc".to_string(), self.mcc),
            ("f1_micro".to_string(), self.micro_f1),
            ("f1_macro".to_string(), self.macro_f1),
        ])
    }
} // end of impl NodeClassificationMetrics

fn gather<T: Clone>(values: &[T], indexes: &[usize]) -> Vec<T> {
    indexes.iter().map(|i| values[*i].clone()).collect()
}

/// Evaluates embeddings on multi label node classification.
/// The fitted model is dumped in the model output path of params.
pub fn evaluate_node_classification(
    embeddings: &EmbeddingTable,
    node_labels: &NodeLabels,
    params: &NodeClassificationParams,
) -> Result<NodeClassificationMetrics, BenchError> {
    log::info!(
        "evaluate_node_classification, nb labeled nodes : {}, test ratio : {}, seed : {}",
        node_labels.get_nb_nodes(),
        params.get_test_ratio(),
        params.get_seed()
    );
    let split = split_labeled_nodes(node_labels.get_nb_nodes(), params.get_test_ratio(), params.get_seed())?;
    let x_train = node_features(embeddings, &gather(node_labels.get_nodes(), &split.train))?;
    let x_test = node_features(embeddings, &gather(node_labels.get_nodes(), &split.test))?;
    let labels_train = gather(node_labels.get_labels(), &split.train);
    let labels_test = gather(node_labels.get_labels(), &split.test);
    // columns are given by all labels, train and test
    let mut binarizer = MultiLabelBinarizer::new();
    binarizer.fit(node_labels.get_labels());
    if binarizer.get_classes().is_empty() {
        log::error!("no label found in node labels");
        return Err(BenchError::InvalidTaskConfiguration("no label in node labels".to_string()));
    }
    let y_train = binarizer.transform(&labels_train);
    let y_test = binarizer.transform(&labels_test);
    //
    let mut model = OneVsRestLogistic::new(*params.get_logistic_params(), params.is_parallel());
    model.fit(&x_train, &y_train)?;
    let proba = model.predict_proba(&x_test)?;
    let y_pred = oracle_predictions(&y_test, &proba)?;
    //
    let metrics = NodeClassificationMetrics {
        accuracy: subset_accuracy(&y_test, &y_pred)?,
        mcc: multilabel_mcc(&y_test, &y_pred)?,
        micro_f1: micro_f1(&y_test, &y_pred)?,
        macro_f1: macro_f1(&y_test, &y_pred)?,
    };
    dump_model(&model, params.get_model_output())?;
    log::info!(
        "node classification Accuracy: {:.3}, MCC: {:.3}, Micro-F1: {:.3}, Macro-F1: {:.3}",
        metrics.accuracy,
        metrics.mcc,
        metrics.micro_f1,
        metrics.macro_f1
    );
    Ok(metrics)
} // end of evaluate_node_classification

//================================================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use crate::classifier::logistic::LogisticParams;
    use crate::io::model::load_model;
    use ndarray::array;
    use std::collections::HashSet;
    use std::path::Path;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // 10 nodes, 5 in class c0 and 5 in class c1, embedded along 2 axes
    fn ten_nodes() -> (NodeLabels, EmbeddingTable) {
        let mut nodes = Vec::new();
        let mut labels = Vec::new();
        let mut rows = Vec::new();
        for i in 0..10 {
            let node = format!("n{}", i);
            let strength = 1. + 0.1 * i as f64;
            if i < 5 {
                labels.push(vec!["c0".to_string()]);
                rows.push((node.clone(), vec![strength, -0.5]));
            } else {
                labels.push(vec!["c1".to_string()]);
                rows.push((node.clone(), vec![-0.5, strength]));
            }
            nodes.push(node);
        }
        (
            NodeLabels::new(nodes, labels).unwrap(),
            EmbeddingTable::from_rows(rows).unwrap(),
        )
    }

    fn params_in(dir: &Path, seed: u64) -> NodeClassificationParams {
        NodeClassificationParams::new(0.2, seed, LogisticParams::default(), dir.join("ovr.bson"), false)
    }

    #[test]
    fn test_split_nodes() {
        let split = split_labeled_nodes(10, 0.2, 3).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);
        let all: HashSet<usize> = split.train.iter().chain(split.test.iter()).cloned().collect();
        assert_eq!(all.len(), 10);
        assert_eq!(split, split_labeled_nodes(10, 0.2, 3).unwrap());
        assert!(split_labeled_nodes(10, 0., 3).is_err());
    }

    #[test]
    fn test_oracle() {
        let y_true = array![[1u8, 0, 1], [0, 1, 0], [0, 0, 0]];
        let proba = array![[0.2, 0.9, 0.5], [0.3, 0.1, 0.6], [0.9, 0.9, 0.9]];
        let y_pred = oracle_predictions(&y_true, &proba).unwrap();
        assert_eq!(y_pred, array![[0u8, 1, 1], [0, 0, 1], [0, 0, 0]]);
        assert_eq!(label_counts(&y_pred), label_counts(&y_true));
        // ties
        let y_pred = oracle_predictions(&array![[1u8, 0]], &array![[0.5, 0.5]]).unwrap();
        assert_eq!(y_pred, array![[0u8, 1]]);
    }

    #[test]
    fn test_ten_nodes_scenario() {
        log_init_test();
        let (node_labels, embeddings) = ten_nodes();
        let dir = tempfile::tempdir().unwrap();
        let params = params_in(dir.path(), 0);
        let metrics = evaluate_node_classification(&embeddings, &node_labels, &params).unwrap();
        let (acc, mcc, micro, macro_) = metrics.to_tuple();
        for v in [acc, micro, macro_] {
            assert!((0. ..=1.).contains(&v));
        }
        assert!((-1. ..=1.).contains(&mcc));
        // one label per node, the oracle predicts exactly one
        let split = split_labeled_nodes(10, 0.2, 0).unwrap();
        assert_eq!(split.test.len(), 2);
        // classes are separated by the embedding
        assert_eq!(acc, 1.);
        // model was dumped
        let model: OneVsRestLogistic = load_model(params.get_model_output()).unwrap();
        assert_eq!(model.get_nb_labels(), 2);
        // deterministic
        let again = evaluate_node_classification(&embeddings, &node_labels, &params).unwrap();
        assert_eq!(metrics.to_tuple(), again.to_tuple());
    }

    #[test]
    fn test_missing_node_embedding() {
        log_init_test();
        let (node_labels, _) = ten_nodes();
        let embeddings = EmbeddingTable::from_rows(vec![("n0".to_string(), vec![1., 0.])]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let res = evaluate_node_classification(&embeddings, &node_labels, &params_in(dir.path(), 0));
        assert!(matches!(res, Err(BenchError::MissingEmbedding(_))));
    }

    #[test]
    fn test_node_labels_lengths() {
        let res = NodeLabels::new(vec!["a".to_string()], vec![]);
        assert!(matches!(res, Err(BenchError::InvalidTaskConfiguration(_))));
    }
} // end of mod tests
