//! Link prediction evaluation of an embedding.
//!
//! Edge features are Hadamard products of node vectors (see [features](super::features)),
//! a logistic regression is trained on train graph edges against sampled negative edges
//! and scored on held out edges against other negative edges.
//!
//! Training negative edges are sampled from the original graph. They are then added to a copy of the
//! original graph (the auxiliary graph) from which testing negative edges are sampled, so no pair
//! can be both a training and a testing negative edge, and no testing negative edge is an edge of the original graph.

use std::collections::BTreeMap;
use std::path::Path;

use petgraph::EdgeType;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::classifier::logistic::LogisticRegression;
use crate::classifier::BinaryClassifier;
use crate::embedding::EmbeddingTable;
use crate::error::BenchError;
use crate::graph::{GraphData, NodeId};
use crate::io::model::dump_model;
use crate::validation::features::edge_features;
use crate::validation::metrics::{accuracy, average_precision, f1_score, matthews_corrcoef, roc_auc};
use crate::validation::negative::sample_negative_edges;
use crate::validation::params::LinkPredictionParams;

/// Positive and negative edges of the train and test sets.
#[derive(Clone, Debug)]
pub struct LinkSamples {
    pub train_positive: Vec<(NodeId, NodeId)>,
    pub train_negative: Vec<(NodeId, NodeId)>,
    pub test_positive: Vec<(NodeId, NodeId)>,
    pub test_negative: Vec<(NodeId, NodeId)>,
} // end of LinkSamples

/// Link prediction scores
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkPredictionMetrics {
    pub auc_roc: f64,
    pub auc_pr: f64,
    pub accuracy: f64,
    pub f1: f64,
    pub mcc: f64,
} // end of LinkPredictionMetrics

impl LinkPredictionMetrics {
    /// (auc_roc, auc_pr, accuracy, f1, mcc)
    pub fn to_tuple(&self) -> (f64, f64, f64, f64, f64) {
        (self.auc_roc, self.auc_pr, self.accuracy, self.f1, self.mcc)
    }

    /// metric name to value, as recorded in result files
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("auc_roc".to_string(), self.auc_roc),
            ("auc_pr".to_string(), self.auc_pr),
            ("accuracy".to_string(), self.accuracy),
            ("f1".to_string(), self.f1),
            ("mcc".to_string(), self.mcc),
        ])
    }
} // end of impl LinkPredictionMetrics

/// Samples negative edges for train and test sets. Training negatives are as many as train graph edges,
/// testing negatives as many as test positive edges. The caller graphs are not modified.
pub fn sample_link_edges<Ty: EdgeType>(
    original: &GraphData<Ty>,
    train: &GraphData<Ty>,
    test_positive: &[(NodeId, NodeId)],
    rng: &mut Xoshiro256PlusPlus,
) -> Result<LinkSamples, BenchError> {
    let train_positive = train.edge_ids();
    let train_negative = sample_negative_edges(original, train_positive.len(), rng)?;
    // training negative edges are occupied pairs for test sampling
    let mut auxiliary = original.clone();
    for (node1, node2) in &train_negative {
        auxiliary.add_edge(node1, node2, 1.);
    }
    let test_negative = sample_negative_edges(&auxiliary, test_positive.len(), rng)?;
    log::debug!(
        "link samples, train : {} + {}, test : {} + {}",
        train_positive.len(),
        train_negative.len(),
        test_positive.len(),
        test_negative.len()
    );
    Ok(LinkSamples {
        train_positive,
        train_negative,
        test_positive: test_positive.to_vec(),
        test_negative,
    })
} // end of sample_link_edges

/// Evaluates embeddings on link prediction.
/// The logistic regression is dumped in save_model if a path is given.
pub fn evaluate_link_prediction<Ty: EdgeType>(
    embeddings: &EmbeddingTable,
    original: &GraphData<Ty>,
    train: &GraphData<Ty>,
    test_positive: &[(NodeId, NodeId)],
    params: &LinkPredictionParams,
    save_model: Option<&Path>,
) -> Result<LinkPredictionMetrics, BenchError> {
    log::info!(
        "evaluate_link_prediction, nb train edges : {}, nb test edges : {}, seed : {}",
        train.get_nb_edges(),
        test_positive.len(),
        params.get_seed()
    );
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.get_seed());
    let samples = sample_link_edges(original, train, test_positive, &mut rng)?;
    //
    let (x_train, y_train) = edge_features(embeddings, &samples.train_positive, &samples.train_negative)?;
    let mut clf = LogisticRegression::new(*params.get_logistic_params());
    clf.fit(&x_train, &y_train)?;
    //
    let (x_test, y_test) = edge_features(embeddings, &samples.test_positive, &samples.test_negative)?;
    let proba = clf.predict_proba(&x_test)?;
    let y_pred = clf.predict(&x_test)?;
    let metrics = LinkPredictionMetrics {
        auc_roc: roc_auc(&y_test, &proba)?,
        auc_pr: average_precision(&y_test, &proba)?,
        accuracy: accuracy(&y_test, &y_pred)?,
        f1: f1_score(&y_test, &y_pred)?,
        mcc: matthews_corrcoef(&y_test, &y_pred)?,
    };
    if let Some(path) = save_model {
        dump_model(&clf, path)?;
    }
    log::info!(
        "link prediction AUC-ROC: {:.3}, AUC-PR: {:.3}, Accuracy: {:.3}, F1: {:.3}, MCC: {:.3}",
        metrics.auc_roc,
        metrics.auc_pr,
        metrics.accuracy,
        metrics.f1,
        metrics.mcc
    );
    Ok(metrics)
} // end of evaluate_link_prediction

/// Trains a link predictor on all edges of graph, with as many sampled negative edges, without evaluation.
/// The model is returned and dumped in save_model if a path is given.
pub fn fit_link_predictor<Ty: EdgeType>(
    embeddings: &EmbeddingTable,
    graph: &GraphData<Ty>,
    params: &LinkPredictionParams,
    save_model: Option<&Path>,
) -> Result<LogisticRegression, BenchError> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.get_seed());
    let positive = graph.edge_ids();
    let negative = sample_negative_edges(graph, positive.len(), &mut rng)?;
    let (x, y) = edge_features(embeddings, &positive, &negative)?;
    let mut clf = LogisticRegression::new(*params.get_logistic_params());
    clf.fit(&x, &y)?;
    log::info!(
        "link predictor fitted on {} edges, converged : {}",
        positive.len(),
        clf.is_converged()
    );
    if let Some(path) = save_model {
        dump_model(&clf, path)?;
    }
    Ok(clf)
} // end of fit_link_predictor

//================================================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use crate::io::model::load_model;
    use crate::validation::params::SplitParams;
    use crate::validation::split::{split_train_test_graph, GraphSplit};
    use ndarray::Array2;
    use petgraph::Undirected;
    use std::collections::HashSet;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // 2 cliques of 5 nodes joined by one edge, and an embedding separating them
    fn two_communities() -> (GraphData<Undirected>, EmbeddingTable) {
        let mut graph = GraphData::<Undirected>::new(false);
        for community in 0..2 {
            for i in 0..5 {
                for j in (i + 1)..5 {
                    graph.add_edge(&format!("{}_{}", community, i), &format!("{}_{}", community, j), 1.);
                }
            }
        }
        graph.add_edge("0_0", "1_0", 1.);
        let rows = (0..2).flat_map(|community| {
            (0..5).map(move |i| {
                let strength = 1. + 0.1 * i as f64;
                let vector = if community == 0 {
                    vec![strength, 0.1]
                } else {
                    vec![0.1, strength]
                };
                (format!("{}_{}", community, i), vector)
            })
        });
        let embeddings = EmbeddingTable::from_rows(rows).unwrap();
        (graph, embeddings)
    }

    fn in_ranges(metrics: &LinkPredictionMetrics) -> bool {
        let (auc_roc, auc_pr, acc, f1, mcc) = metrics.to_tuple();
        [auc_roc, auc_pr, acc, f1].iter().all(|v| (0. ..=1.).contains(v)) && (-1. ..=1.).contains(&mcc)
    }

    #[test]
    fn test_link_prediction_completes() {
        log_init_test();
        let (graph, embeddings) = two_communities();
        let split = split_train_test_graph(&graph, &SplitParams::new(0.2, 5)).unwrap();
        // floor(21 * 0.2) candidates
        assert!(!split.get_test_edges().is_empty() && split.get_test_edges().len() <= 4);
        let params = LinkPredictionParams::default();
        let metrics = evaluate_link_prediction(
            &embeddings,
            split.get_original(),
            split.get_train(),
            split.get_test_edges(),
            &params,
            None,
        )
        .unwrap();
        assert!(in_ranges(&metrics));
        // same inputs same seed, same results
        let again = evaluate_link_prediction(
            &embeddings,
            split.get_original(),
            split.get_train(),
            split.get_test_edges(),
            &params,
            None,
        )
        .unwrap();
        assert_eq!(metrics.to_tuple(), again.to_tuple());
        assert_eq!(metrics.to_map().len(), 5);
    }

    #[test]
    fn test_negative_sets_disjoint() {
        log_init_test();
        let (graph, _) = two_communities();
        let split = split_train_test_graph(&graph, &SplitParams::new(0.2, 11)).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let samples =
            sample_link_edges(split.get_original(), split.get_train(), split.get_test_edges(), &mut rng).unwrap();
        assert_eq!(samples.train_negative.len(), samples.train_positive.len());
        assert_eq!(samples.test_negative.len(), samples.test_positive.len());
        let unordered = |(a, b): &(NodeId, NodeId)| {
            if a < b {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            }
        };
        let train_negative: HashSet<(NodeId, NodeId)> = samples.train_negative.iter().map(unordered).collect();
        let original: HashSet<(NodeId, NodeId)> = graph.edge_ids().iter().map(unordered).collect();
        for edge in &samples.test_negative {
            assert!(!train_negative.contains(&unordered(edge)));
            assert!(!original.contains(&unordered(edge)));
        }
        // original graph not modified by auxiliary graph
        assert_eq!(split.get_original().get_nb_edges(), graph.get_nb_edges());
    }

    #[test]
    fn test_cycle4_scenario() {
        log_init_test();
        let mut graph = GraphData::<Undirected>::new(false);
        for (a, b) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")] {
            graph.add_edge(a, b, 1.);
        }
        let mut embeddings = Array2::<f64>::zeros((4, 2));
        for i in 0..4 {
            embeddings[[i, 0]] = (i as f64).cos();
            embeddings[[i, 1]] = (i as f64).sin();
        }
        let embeddings = EmbeddingTable::new(graph.get_node_indexation().clone(), embeddings).unwrap();
        let split = split_train_test_graph(&graph, &SplitParams::new(0.25, 0)).unwrap();
        assert_eq!(split.get_test_edges().len(), 1);
        assert_eq!(split.get_train().get_nb_edges(), 3);
        // 3 training negative edges are needed, the cycle has only 2 non edges
        let res = evaluate_link_prediction(
            &embeddings,
            split.get_original(),
            split.get_train(),
            split.get_test_edges(),
            &LinkPredictionParams::default(),
            None,
        );
        assert!(matches!(
            res,
            Err(BenchError::InfeasibleSample {
                requested: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_missing_embedding_fails() {
        log_init_test();
        let (mut graph, embeddings) = two_communities();
        graph.add_edge("0_1", "stranger", 1.);
        let split = split_train_test_graph(&graph, &SplitParams::new(0.2, 1)).unwrap();
        let res = evaluate_link_prediction(
            &embeddings,
            split.get_original(),
            split.get_train(),
            split.get_test_edges(),
            &LinkPredictionParams::default(),
            None,
        );
        assert!(matches!(res, Err(BenchError::MissingEmbedding(_))));
    }

    #[test]
    fn test_input_edge_never_negative_with_edge_lists() {
        log_init_test();
        // ring of 8 nodes plus a chord (0,4) absent from both supplied lists
        let mut input = GraphData::<Undirected>::new(false);
        for i in 0..8 {
            input.add_edge(&i.to_string(), &((i + 1) % 8).to_string(), 1.);
        }
        input.add_edge("0", "4", 1.);
        let train: Vec<(NodeId, NodeId, f64)> = (0..7).map(|i| (i.to_string(), (i + 1).to_string(), 1.)).collect();
        let test = vec![("7".to_string(), "0".to_string(), 1.)];
        let split = GraphSplit::<Undirected>::from_edge_lists(&input, &train, &test);
        let chord = |(a, b): &(NodeId, NodeId)| (a == "0" && b == "4") || (a == "4" && b == "0");
        for seed in 0..200 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let samples =
                sample_link_edges(split.get_original(), split.get_train(), split.get_test_edges(), &mut rng).unwrap();
            assert!(!samples.train_negative.iter().any(chord));
            assert!(!samples.test_negative.iter().any(chord));
        }
    }

    #[test]
    fn test_fit_link_predictor_saved() {
        log_init_test();
        let (graph, embeddings) = two_communities();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link.bson");
        let clf = fit_link_predictor(&embeddings, &graph, &LinkPredictionParams::default(), Some(&path)).unwrap();
        let reloaded: LogisticRegression = load_model(&path).unwrap();
        assert_eq!(reloaded.get_coef(), clf.get_coef());
        assert_eq!(reloaded.get_intercept(), clf.get_intercept());
    }
} // end of mod tests
