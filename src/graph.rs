//! The graph on which embeddings are evaluated.
//!
//! Nodes are opaque string identifiers. As in an embedding, each node id is associated to a rank
//! through an IndexSet (the node indexation) and the edge structure is stored on ranks in a petgraph GraphMap.
//! The type parameter Ty is petgraph [Directed](petgraph::Directed) or [Undirected](petgraph::Undirected).
//!
//! Self loops are not stored: they carry no information for link prediction.
//! An undirected edge is stored once whatever the orientation given at insertion.

use indexmap::IndexSet;
use petgraph::graphmap::GraphMap;
use petgraph::EdgeType;

use sprs::TriMatI;

/// node identifier as found in data files
pub type NodeId = String;

/// an edge between 2 node ranks with its weight
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge(pub usize, pub usize, pub f64);

/// A graph with nodes identified by a [NodeId], possibly weighted.
#[derive(Debug)]
pub struct GraphData<Ty: EdgeType> {
    /// association of node id to a rank
    nodeindexation: IndexSet<NodeId>,
    /// edges between node ranks
    graph: GraphMap<usize, f64, Ty>,
    ///
    weighted: bool,
} // end of GraphData

impl<Ty: EdgeType> GraphData<Ty> {
    pub fn new(weighted: bool) -> Self {
        GraphData {
            nodeindexation: IndexSet::new(),
            graph: GraphMap::new(),
            weighted,
        }
    }

    /// a graph with all nodes of nodeindexation and no edges.
    /// Useful to build a graph sharing node ranks with another one.
    pub fn with_indexation(nodeindexation: IndexSet<NodeId>, weighted: bool) -> Self {
        let mut graph = GraphMap::with_capacity(nodeindexation.len(), nodeindexation.len());
        for rank in 0..nodeindexation.len() {
            graph.add_node(rank);
        }
        GraphData {
            nodeindexation,
            graph,
            weighted,
        }
    }

    /// inserts a node if not already present and returns its rank
    pub fn add_node(&mut self, node: &str) -> usize {
        if let Some(rank) = self.nodeindexation.get_index_of(node) {
            return rank;
        }
        let (rank, _) = self.nodeindexation.insert_full(node.to_string());
        self.graph.add_node(rank);
        rank
    }

    /// adds an edge between node ids, inserting nodes if necessary.
    /// Returns true if the edge was not already present. Self loops are refused.
    pub fn add_edge(&mut self, node1: &str, node2: &str, weight: f64) -> bool {
        let rank1 = self.add_node(node1);
        let rank2 = self.add_node(node2);
        if rank1 == rank2 {
            log::warn!("self loop on node {} ignored", node1);
            return false;
        }
        self.add_edge_ranks(rank1, rank2, weight)
    }

    /// adds an edge between 2 existing node ranks. Returns true if the edge is new,
    /// false for a self loop or a rank outside the indexation.
    pub(crate) fn add_edge_ranks(&mut self, rank1: usize, rank2: usize, weight: f64) -> bool {
        if rank1 >= self.nodeindexation.len() || rank2 >= self.nodeindexation.len() {
            log::error!("add_edge_ranks : rank out of indexation, {} {}", rank1, rank2);
            return false;
        }
        if rank1 == rank2 {
            return false;
        }
        let weight = if self.weighted { weight } else { 1. };
        self.graph.add_edge(rank1, rank2, weight).is_none()
    }

    /// removes edge, returns its weight if it was present
    pub fn remove_edge_ranks(&mut self, rank1: usize, rank2: usize) -> Option<f64> {
        self.graph.remove_edge(rank1, rank2)
    }

    /// true if edge rank1 -> rank2 is in graph (orientation matters only for directed graphs)
    pub fn contains_edge(&self, rank1: usize, rank2: usize) -> bool {
        self.graph.contains_edge(rank1, rank2)
    }

    /// true if there is an edge between the 2 nodes in any orientation
    pub fn is_linked(&self, rank1: usize, rank2: usize) -> bool {
        self.graph.contains_edge(rank1, rank2) || self.graph.contains_edge(rank2, rank1)
    }

    pub fn is_directed(&self) -> bool {
        Ty::is_directed()
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.nodeindexation.len()
    }

    pub fn get_nb_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// to retrieve the indexation
    pub fn get_node_indexation(&self) -> &IndexSet<NodeId> {
        &self.nodeindexation
    }

    /// get rank of a node id
    pub fn get_node_rank(&self, node: &str) -> Option<usize> {
        self.nodeindexation.get_index_of(node)
    }

    /// get node id given its rank
    pub fn get_node_id(&self, rank: usize) -> Option<&NodeId> {
        self.nodeindexation.get_index(rank)
    }

    /// iterates on edges in insertion order. For an undirected graph each edge appears once.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph
            .all_edges()
            .map(|(rank1, rank2, weight)| Edge(rank1, rank2, *weight))
    }

    /// edges as pairs of node ids
    pub fn edge_ids(&self) -> Vec<(NodeId, NodeId)> {
        self.edges()
            .map(|edge| {
                (
                    self.nodeindexation[edge.0].clone(),
                    self.nodeindexation[edge.1].clone(),
                )
            })
            .collect()
    }

    /// number of unordered node pairs linked by at least one edge
    pub fn get_nb_linked_pairs(&self) -> usize {
        if !Ty::is_directed() {
            return self.get_nb_edges();
        }
        // a pair linked in both directions holds 2 edges
        let nb_reciprocal = self
            .edges()
            .filter(|edge| self.graph.contains_edge(edge.1, edge.0))
            .count();
        self.get_nb_edges() - nb_reciprocal / 2
    }

    /// number of edges incident to a node (in + out for a directed graph)
    pub fn degree(&self, rank: usize) -> usize {
        if Ty::is_directed() {
            self.graph
                .neighbors_directed(rank, petgraph::Direction::Outgoing)
                .count()
                + self
                    .graph
                    .neighbors_directed(rank, petgraph::Direction::Incoming)
                    .count()
        } else {
            self.graph.neighbors(rank).count()
        }
    }

    /// returns adjacency matrix in triplet form. An undirected graph gives a symetric matrix.
    /// This is the in memory handle an embedder working on sparse matrices expects.
    pub fn to_trimat(&self) -> TriMatI<f64, usize> {
        let nb_nodes = self.get_nb_nodes();
        let nb_entries = if Ty::is_directed() {
            self.get_nb_edges()
        } else {
            2 * self.get_nb_edges()
        };
        let mut rows = Vec::<usize>::with_capacity(nb_entries);
        let mut cols = Vec::<usize>::with_capacity(nb_entries);
        let mut values = Vec::<f64>::with_capacity(nb_entries);
        for edge in self.edges() {
            rows.push(edge.0);
            cols.push(edge.1);
            values.push(edge.2);
            if !Ty::is_directed() {
                rows.push(edge.1);
                cols.push(edge.0);
                values.push(edge.2);
            }
        }
        TriMatI::<f64, usize>::from_triplets((nb_nodes, nb_nodes), rows, cols, values)
    }
} // end of impl GraphData

// deep copy keeping edge order
impl<Ty: EdgeType> Clone for GraphData<Ty> {
    fn clone(&self) -> Self {
        let mut copy = GraphData::<Ty>::with_indexation(self.nodeindexation.clone(), self.weighted);
        for edge in self.edges() {
            copy.graph.add_edge(edge.0, edge.1, edge.2);
        }
        copy
    }
}

//==========================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use petgraph::{Directed, Undirected};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_undirected_orientation() {
        log_init_test();
        let mut graph = GraphData::<Undirected>::new(false);
        assert!(graph.add_edge("A", "B", 3.));
        // same edge reversed is a duplicate
        assert!(!graph.add_edge("B", "A", 1.));
        assert!(!graph.add_edge("C", "C", 1.));
        assert_eq!(graph.get_nb_nodes(), 3);
        assert_eq!(graph.get_nb_edges(), 1);
        let a = graph.get_node_rank("A").unwrap();
        let b = graph.get_node_rank("B").unwrap();
        assert!(graph.contains_edge(b, a));
        // unweighted graph forces weight to 1
        assert_eq!(graph.edges().next().unwrap().2, 1.);
        assert_eq!(graph.degree(a), 1);
        assert_eq!(graph.degree(graph.get_node_rank("C").unwrap()), 0);
    }

    #[test]
    fn test_directed_linked_pairs() {
        log_init_test();
        let mut graph = GraphData::<Directed>::new(true);
        graph.add_edge("A", "B", 0.5);
        graph.add_edge("B", "A", 0.5);
        graph.add_edge("B", "C", 2.);
        assert_eq!(graph.get_nb_edges(), 3);
        assert_eq!(graph.get_nb_linked_pairs(), 2);
        let a = graph.get_node_rank("A").unwrap();
        let c = graph.get_node_rank("C").unwrap();
        assert!(!graph.contains_edge(c, a));
        let b = graph.get_node_rank("B").unwrap();
        assert!(graph.contains_edge(b, c) && !graph.contains_edge(c, b));
        assert!(graph.is_linked(c, b));
        assert_eq!(graph.degree(b), 3);
    }

    #[test]
    fn test_trimat_symetric() {
        log_init_test();
        let mut graph = GraphData::<Undirected>::new(false);
        graph.add_edge("A", "B", 1.);
        graph.add_edge("B", "C", 1.);
        let trimat = graph.to_trimat();
        assert_eq!(trimat.shape(), (3, 3));
        assert_eq!(trimat.nnz(), 4);
        let csr = trimat.to_csr::<usize>();
        assert_eq!(csr.get(0, 1), Some(&1.));
        assert_eq!(csr.get(1, 0), Some(&1.));
    }

    #[test]
    fn test_add_edge_bad_rank() {
        log_init_test();
        let mut graph = GraphData::<Undirected>::new(false);
        graph.add_edge("x", "y", 1.);
        assert!(!graph.add_edge_ranks(0, 5, 1.));
        assert!(!graph.add_edge_ranks(1, 1, 1.));
        assert_eq!(graph.get_nb_edges(), 1);
    }

    #[test]
    fn test_with_indexation_shares_ranks() {
        let mut graph = GraphData::<Undirected>::new(false);
        graph.add_edge("x", "y", 1.);
        graph.add_edge("y", "z", 1.);
        let empty = GraphData::<Undirected>::with_indexation(graph.get_node_indexation().clone(), false);
        assert_eq!(empty.get_nb_nodes(), 3);
        assert_eq!(empty.get_nb_edges(), 0);
        assert_eq!(empty.get_node_rank("z"), graph.get_node_rank("z"));
    }
} // end of mod tests
