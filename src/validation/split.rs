//! Train / test split of graph edges for link prediction.
//!
//! Candidate test edges are drawn without replacement. A candidate is deleted from the train graph
//! only if its nodes keep at least one edge, as we cannot train anything on a disconnected node.
//! Candidates that would isolate a node stay in the train graph and are not held out,
//! so held out edges and train graph are always disjoint.

use std::path::{Path, PathBuf};

use petgraph::EdgeType;
use rand::seq::index;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::BenchError;
use crate::graph::{Edge, GraphData, NodeId};
use crate::io::csv::{dump_edge_list, load_edge_list};
use crate::tools::degrees::{get_graph_degrees, Degree};
use crate::validation::params::{check_ratio, SplitParams};

/// The result of a split: the original graph, the train graph and the held out positive edges.
/// The train graph has the same node indexation as the original graph.
#[derive(Clone, Debug)]
pub struct GraphSplit<Ty: EdgeType> {
    original: GraphData<Ty>,
    train: GraphData<Ty>,
    test_edges: Vec<(NodeId, NodeId)>,
    /// file where the train graph was dumped for embedding training
    train_file: Option<PathBuf>,
} // end of GraphSplit

impl<Ty: EdgeType> GraphSplit<Ty> {
    pub fn get_original(&self) -> &GraphData<Ty> {
        &self.original
    }

    pub fn get_train(&self) -> &GraphData<Ty> {
        &self.train
    }

    /// held out positive edges
    pub fn get_test_edges(&self) -> &[(NodeId, NodeId)] {
        &self.test_edges
    }

    /// path of the materialized train graph, if [materialize](Self::materialize) was called
    pub fn get_train_file(&self) -> Option<&Path> {
        self.train_file.as_deref()
    }

    /// dumps the train graph as an edge list in path, the handle given to the embedding program
    pub fn materialize(&mut self, path: PathBuf) -> anyhow::Result<&Path> {
        dump_edge_list(&self.train, &path)?;
        let path: &Path = self.train_file.insert(path);
        Ok(path)
    }

    /// Builds a split from caller supplied train and test edge lists, no random deletion is done.
    /// The original graph is the input graph, completed with list edges it would miss, so negative edges
    /// are never sampled among input edges. The train graph has all nodes of the original graph but only train edges.
    pub fn from_edge_lists(
        input: &GraphData<Ty>,
        train_edges: &[(NodeId, NodeId, f64)],
        test_edges: &[(NodeId, NodeId, f64)],
    ) -> Self {
        let weighted = input.is_weighted();
        let mut original = input.clone();
        let mut nb_added: usize = 0;
        for (node1, node2, weight) in train_edges.iter().chain(test_edges.iter()) {
            if original.add_edge(node1, node2, *weight) {
                nb_added += 1;
            }
        }
        if nb_added > 0 {
            log::warn!("{} edges of train or test lists are not in input graph, added to original graph", nb_added);
        }
        let mut train = GraphData::<Ty>::with_indexation(original.get_node_indexation().clone(), weighted);
        for (node1, node2, weight) in train_edges {
            train.add_edge(node1, node2, *weight);
        }
        let test_edges: Vec<(NodeId, NodeId)> = test_edges
            .iter()
            .filter(|(node1, node2, _)| node1 != node2)
            .map(|(node1, node2, _)| (node1.clone(), node2.clone()))
            .collect();
        log::info!(
            "split from edge lists, nb nodes : {}, original edges : {}, train edges : {}, test edges : {}",
            original.get_nb_nodes(),
            original.get_nb_edges(),
            train.get_nb_edges(),
            test_edges.len()
        );
        GraphSplit {
            original,
            train,
            test_edges,
            train_file: None,
        }
    } // end of from_edge_lists

    /// as [from_edge_lists](Self::from_edge_lists) reading the lists from files
    pub fn from_edge_list_files(input: &GraphData<Ty>, train_file: &Path, test_file: &Path) -> anyhow::Result<Self> {
        let train_edges = load_edge_list(train_file)?;
        let test_edges = load_edge_list(test_file)?;
        Ok(GraphSplit::from_edge_lists(input, &train_edges, &test_edges))
    }
} // end of impl GraphSplit

// can we delete edge without isolating one of its nodes. Degrees as returned by get_graph_degrees
fn deletable(degrees: &[Degree], edge: &Edge, directed: bool) -> bool {
    let (row, col) = (edge.0, edge.1);
    if directed {
        (degrees[row].degree_out() > 1 || degrees[row].degree_in() > 0)
            && (degrees[col].degree_in() > 1 || degrees[col].degree_out() > 0)
    } else {
        degrees[row].d_out > 1 && degrees[col].d_in > 1
    }
}

/// Deletes a fraction of edges of graph. The number of candidate edges is floor(nb_edges * test_ratio).
/// Deterministic given the seed of params.
pub fn split_train_test_graph<Ty: EdgeType>(
    graph: &GraphData<Ty>,
    params: &SplitParams,
) -> Result<GraphSplit<Ty>, BenchError> {
    check_ratio(params.get_test_ratio())?;
    let directed = graph.is_directed();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.get_seed());
    let edges: Vec<Edge> = graph.edges().collect();
    let nb_edge = edges.len();
    let nb_to_discard = (nb_edge as f64 * params.get_test_ratio()).floor() as usize;
    log::debug!(
        "split_train_test_graph nb edge : {}, number to discard {}, directed : {}",
        nb_edge,
        nb_to_discard,
        directed
    );
    let mut degrees = get_graph_degrees(graph);
    let mut train = graph.clone();
    let mut test_edges = Vec::<(NodeId, NodeId)>::with_capacity(nb_to_discard);
    let mut nb_isolation_not_discarded: usize = 0;
    for i in index::sample(&mut rng, nb_edge, nb_to_discard).into_iter() {
        let edge = &edges[i];
        if !deletable(&degrees, edge, directed) {
            nb_isolation_not_discarded += 1;
            continue;
        }
        log::trace!("split : deleting edge {}->{}", edge.0, edge.1);
        train.remove_edge_ranks(edge.0, edge.1);
        degrees[edge.0].d_out -= 1;
        degrees[edge.1].d_in -= 1;
        if !directed {
            degrees[edge.0].d_in -= 1;
            degrees[edge.1].d_out -= 1;
        }
        test_edges.push((
            graph.get_node_indexation()[edge.0].clone(),
            graph.get_node_indexation()[edge.1].clone(),
        ));
    }
    log::info!(
        "split : {} test edges, {} train edges, {} candidates kept to avoid isolated nodes",
        test_edges.len(),
        train.get_nb_edges(),
        nb_isolation_not_discarded
    );
    Ok(GraphSplit {
        original: graph.clone(),
        train,
        test_edges,
        train_file: None,
    })
} // end of split_train_test_graph

//==========================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use petgraph::{Directed, Undirected};
    use std::collections::HashSet;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn cycle4() -> GraphData<Undirected> {
        let mut graph = GraphData::<Undirected>::new(false);
        for (a, b) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")] {
            graph.add_edge(a, b, 1.);
        }
        graph
    }

    #[test]
    fn test_split_cycle() {
        log_init_test();
        let graph = cycle4();
        let split = split_train_test_graph(&graph, &SplitParams::new(0.25, 0)).unwrap();
        assert_eq!(split.get_test_edges().len(), 1);
        assert_eq!(split.get_train().get_nb_edges(), 3);
        assert_eq!(split.get_train().get_nb_nodes(), 4);
        assert_eq!(split.get_original().get_nb_edges(), 4);
        // held out edge is a real edge, absent from train graph
        let (a, b) = &split.get_test_edges()[0];
        let (ra, rb) = (graph.get_node_rank(a).unwrap(), graph.get_node_rank(b).unwrap());
        assert!(graph.is_linked(ra, rb));
        assert!(!split.get_train().is_linked(ra, rb));
    }

    #[test]
    fn test_split_no_isolated_node() {
        log_init_test();
        // a star : deleting any edge isolates a leaf
        let mut graph = GraphData::<Undirected>::new(false);
        for leaf in ["a", "b", "c", "d", "e"] {
            graph.add_edge("center", leaf, 1.);
        }
        let split = split_train_test_graph(&graph, &SplitParams::new(0.5, 3)).unwrap();
        assert!(split.get_test_edges().is_empty());
        assert_eq!(split.get_train().get_nb_edges(), 5);
    }

    #[test]
    fn test_split_deterministic_and_disjoint() {
        log_init_test();
        let mut graph = GraphData::<Directed>::new(false);
        for i in 0..20 {
            for j in 0..20 {
                if i != j && (i * 7 + j * 3) % 5 == 0 {
                    graph.add_edge(&i.to_string(), &j.to_string(), 1.);
                }
            }
        }
        let params = SplitParams::new(0.3, 17);
        let split1 = split_train_test_graph(&graph, &params).unwrap();
        let split2 = split_train_test_graph(&graph, &params).unwrap();
        assert_eq!(split1.get_test_edges(), split2.get_test_edges());
        let train_edges: HashSet<(NodeId, NodeId)> = split1.get_train().edge_ids().into_iter().collect();
        for edge in split1.get_test_edges() {
            assert!(!train_edges.contains(edge));
        }
        assert_eq!(
            train_edges.len() + split1.get_test_edges().len(),
            graph.get_nb_edges()
        );
        for rank in 0..graph.get_nb_nodes() {
            assert!(split1.get_train().degree(rank) > 0);
        }
    }

    #[test]
    fn test_split_bad_ratio() {
        let graph = cycle4();
        let res = split_train_test_graph(&graph, &SplitParams::new(1., 0));
        assert!(matches!(res, Err(BenchError::InvalidTaskConfiguration(_))));
    }

    #[test]
    fn test_from_edge_lists() {
        log_init_test();
        let mut input = GraphData::<Undirected>::new(false);
        for (a, b) in [("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")] {
            input.add_edge(a, b, 1.);
        }
        let train = vec![
            ("A".to_string(), "B".to_string(), 1.),
            ("B".to_string(), "C".to_string(), 1.),
        ];
        let test = vec![("C".to_string(), "D".to_string(), 1.)];
        let mut split = GraphSplit::<Undirected>::from_edge_lists(&input, &train, &test);
        // (A,D) is in no list but stays an edge of the original graph
        assert_eq!(split.get_original().get_nb_edges(), 4);
        assert_eq!(split.get_train().get_nb_nodes(), 4);
        assert_eq!(split.get_train().get_nb_edges(), 2);
        assert_eq!(split.get_train().get_node_indexation(), input.get_node_indexation());
        assert_eq!(split.get_test_edges(), &[("C".to_string(), "D".to_string())]);
        //
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.edgelist");
        split.materialize(path.clone()).unwrap();
        assert_eq!(split.get_train_file(), Some(path.as_path()));
        let reloaded = load_edge_list(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_from_edge_lists_completes_input() {
        log_init_test();
        let mut input = GraphData::<Undirected>::new(false);
        input.add_edge("A", "B", 1.);
        let train = vec![("A".to_string(), "B".to_string(), 1.)];
        let test = vec![("B".to_string(), "E".to_string(), 1.)];
        let split = GraphSplit::<Undirected>::from_edge_lists(&input, &train, &test);
        assert_eq!(split.get_original().get_nb_nodes(), 3);
        assert_eq!(split.get_original().get_nb_edges(), 2);
        assert_eq!(split.get_train().get_nb_nodes(), 3);
    }
} // end of mod tests
