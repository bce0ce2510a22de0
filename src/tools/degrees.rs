//! compute degrees in and out of graph nodes

use petgraph::EdgeType;

use crate::graph::GraphData;

/// first component is in, second component is out!
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Degree {
    pub d_in: u32,
    pub d_out: u32,
}

impl Degree {
    /// get degree in
    pub fn degree_in(&self) -> u32 {
        self.d_in
    }
    /// get degree out
    pub fn degree_out(&self) -> u32 {
        self.d_out
    }
} // end of impl Degree

/// returns a vector of degrees (in, out) indexed by node rank.
/// For an undirected graph each edge counts as in and out for both its nodes,
/// so d_in and d_out are both equal to the number of neighbours.
/// Degrees are used to delete edges in link prediction splits without making isolated nodes.
pub fn get_graph_degrees<Ty: EdgeType>(graph: &GraphData<Ty>) -> Vec<Degree> {
    let mut degrees = vec![Degree::default(); graph.get_nb_nodes()];
    for edge in graph.edges() {
        degrees[edge.0].d_out += 1; // one more out for edge.0
        degrees[edge.1].d_in += 1; // one more in for edge.1
        if !graph.is_directed() {
            degrees[edge.0].d_in += 1;
            degrees[edge.1].d_out += 1;
        }
    }
    degrees
} // end of get_graph_degrees

// end of mod tests
